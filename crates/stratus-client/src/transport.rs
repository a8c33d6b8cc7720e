//! Request delivery.

use crate::{ClientError, Request, Response};

/// Delivers requests to a service.
pub trait Transport: Send + Sync {
    /// Send `request` and return the service's response.
    fn send(&self, request: &Request) -> Result<Response, ClientError>;
}

impl<F> Transport for F
where
    F: Fn(&Request) -> Result<Response, ClientError> + Send + Sync,
{
    fn send(&self, request: &Request) -> Result<Response, ClientError> {
        self(request)
    }
}

/// Answers every request locally with an empty `200` response.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubTransport;

impl Transport for StubTransport {
    fn send(&self, request: &Request) -> Result<Response, ClientError> {
        tracing::trace!(request = %request, "stubbed request");
        Ok(Response::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_stub_transport_returns_empty_success() {
        let request = Request::new(Method::POST, "importexport.amazonaws.com");
        let response = StubTransport.send(&request).unwrap();
        assert_eq!(response, Response::empty());
    }

    #[test]
    fn test_closure_transport() {
        let transport = |request: &Request| {
            Ok::<_, ClientError>(Response::new(
                201,
                Default::default(),
                request.host().as_bytes().to_vec(),
            ))
        };
        let response = transport
            .send(&Request::new(Method::GET, "example.com"))
            .unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.bytes(), b"example.com");
    }
}
