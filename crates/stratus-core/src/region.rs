//! Endpoint to region inference.
//!
//! Service endpoints follow `<service>.<region>.amazonaws.com` (or the older
//! dashed form `<service>-<region>.amazonaws.com`). Global services drop the
//! region label entirely and are served from [`DEFAULT_REGION`].

use std::sync::OnceLock;

use regex::Regex;

/// Region assumed when an endpoint names no region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Hostname suffix shared by every service endpoint.
pub const ENDPOINT_SUFFIX: &str = ".amazonaws.com";

/// A partition whose hostnames do not always spell out a concrete region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionOverride {
    /// Substring identifying the partition in a hostname.
    pub marker: &'static str,
    /// Region used when the hostname only carries the marker.
    pub canonical_region: &'static str,
}

/// Known partition special cases.
///
/// `iam.us-gov.amazonaws.com` parses literally as `us-gov`, which is not a
/// region. The service actually lives in `us-gov-west-1`.
pub const PARTITION_OVERRIDES: &[PartitionOverride] = &[PartitionOverride {
    marker: "us-gov",
    canonical_region: "us-gov-west-1",
}];

/// Resolve the region for `endpoint`, falling back to [`DEFAULT_REGION`].
///
/// Never fails: anything that does not look like a regional endpoint
/// resolves to the default.
///
/// ```
/// use stratus_core::resolve_region;
///
/// assert_eq!(resolve_region("ec2", "ec2.us-west-2.amazonaws.com"), "us-west-2");
/// assert_eq!(resolve_region("ec2", "ec2.amazonaws.com"), "us-east-1");
/// assert_eq!(resolve_region("iam", "iam.us-gov.amazonaws.com"), "us-gov-west-1");
/// ```
pub fn resolve_region(service_code: &str, endpoint: &str) -> String {
    resolve_region_or(service_code, endpoint, DEFAULT_REGION)
}

/// Resolve the region for `endpoint`, using `fallback` when the endpoint
/// carries no parseable region.
pub fn resolve_region_or(service_code: &str, endpoint: &str, fallback: &str) -> String {
    let host = normalize_host(endpoint);

    if let Some(region) = partition_region(&host) {
        return region;
    }

    match labelled_region(service_code, &host) {
        Some(region) => region.to_string(),
        None => fallback.to_string(),
    }
}

/// Reduce an endpoint to a bare hostname. Case is preserved so regions are
/// returned verbatim.
fn normalize_host(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    let without_scheme = trimmed
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(trimmed);
    let host = without_scheme.split('/').next().unwrap_or_default();
    let host = host.split(':').next().unwrap_or_default();
    host.trim_end_matches('.').to_string()
}

fn partition_region(host: &str) -> Option<String> {
    let lowered = host.to_ascii_lowercase();
    let partition = PARTITION_OVERRIDES
        .iter()
        .find(|p| lowered.contains(p.marker))?;

    match literal_gov_region().find(host) {
        Some(m) => Some(m.as_str().to_string()),
        None => Some(partition.canonical_region.to_string()),
    }
}

fn literal_gov_region() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)us-gov-[a-z]+-\d+").expect("static pattern compiles"))
}

fn generic_region() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^.+?[.-](.+)\.amazonaws\.com$").expect("static pattern compiles")
    })
}

/// Extract the text between the service prefix and the endpoint suffix.
fn labelled_region<'a>(service_code: &str, host: &'a str) -> Option<&'a str> {
    let stem = strip_ignore_case_suffix(host, ENDPOINT_SUFFIX)?;

    if !service_code.is_empty() {
        let after_prefix = strip_ignore_case_prefix(stem, service_code)
            .and_then(|rest| rest.strip_prefix(['.', '-']));
        if let Some(region) = after_prefix {
            return (!region.is_empty()).then_some(region);
        }
    }

    generic_region()
        .captures(host)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn strip_ignore_case_prefix<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

fn strip_ignore_case_suffix<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let split = s.len().checked_sub(suffix.len())?;
    let tail = s.get(split..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| &s[..split])
}
