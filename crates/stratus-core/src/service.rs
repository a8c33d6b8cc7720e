//! Known services and their default endpoints.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Declares the service table.
///
/// For every entry this generates a [`Service`] variant plus the
/// `<code>_endpoint()` / `<code>_region()` accessors on
/// [`Configuration`](crate::Configuration).
macro_rules! define_services {
    ($( $variant:ident => $code:ident, $endpoint:literal, $name:literal; )+) => {
        /// A service reachable through the SDK.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Service {
            $(
                #[doc = $name]
                $variant,
            )+
        }

        impl Service {
            /// Every known service, in declaration order.
            pub const ALL: &'static [Service] = &[$(Service::$variant),+];

            /// Option-name code (e.g. `ec2`, `import_export`).
            pub fn code(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($code),)+
                }
            }

            /// Endpoint used when the configuration carries no override.
            pub fn default_endpoint(&self) -> &'static str {
                match self {
                    $(Self::$variant => $endpoint,)+
                }
            }

            /// Human-readable service name.
            pub fn display_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl crate::config::Configuration {
            paste::paste! {
                $(
                    #[doc = concat!("Endpoint for ", $name, ".")]
                    pub fn [<$code _endpoint>](&self) -> &str {
                        self.endpoint(Service::$variant)
                    }

                    #[doc = concat!("Region for ", $name, ", derived from its endpoint unless overridden.")]
                    pub fn [<$code _region>](&self) -> String {
                        self.region(Service::$variant)
                    }
                )+
            }
        }
    };
}

define_services! {
    AutoScaling => auto_scaling, "autoscaling.us-east-1.amazonaws.com", "Auto Scaling";
    CloudFormation => cloud_formation, "cloudformation.us-east-1.amazonaws.com", "CloudFormation";
    CloudWatch => cloud_watch, "monitoring.us-east-1.amazonaws.com", "CloudWatch";
    DynamoDb => dynamo_db, "dynamodb.us-east-1.amazonaws.com", "DynamoDB";
    Ec2 => ec2, "ec2.amazonaws.com", "Elastic Compute Cloud";
    Elb => elb, "elasticloadbalancing.us-east-1.amazonaws.com", "Elastic Load Balancing";
    Emr => emr, "elasticmapreduce.us-east-1.amazonaws.com", "Elastic MapReduce";
    Glacier => glacier, "glacier.us-east-1.amazonaws.com", "Glacier";
    Iam => iam, "iam.amazonaws.com", "Identity and Access Management";
    ImportExport => import_export, "importexport.amazonaws.com", "Import/Export";
    Rds => rds, "rds.us-east-1.amazonaws.com", "Relational Database Service";
    Route53 => route_53, "route53.amazonaws.com", "Route 53";
    S3 => s3, "s3.amazonaws.com", "Simple Storage Service";
    SimpleDb => simple_db, "sdb.amazonaws.com", "SimpleDB";
    SimpleEmail => simple_email, "email.us-east-1.amazonaws.com", "Simple Email Service";
    Sns => sns, "sns.us-east-1.amazonaws.com", "Simple Notification Service";
    Sqs => sqs, "sqs.us-east-1.amazonaws.com", "Simple Queue Service";
    Sts => sts, "sts.amazonaws.com", "Security Token Service";
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Service {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Service::ALL
            .iter()
            .copied()
            .find(|service| service.code() == s)
            .ok_or_else(|| ConfigError::UnknownService(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_codes_are_unique() {
        let mut codes: Vec<_> = Service::ALL.iter().map(|s| s.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), Service::ALL.len());
    }

    #[test]
    fn test_service_from_code() {
        assert_eq!("ec2".parse::<Service>().unwrap(), Service::Ec2);
        assert_eq!("import_export".parse::<Service>().unwrap(), Service::ImportExport);
        assert!("ec3".parse::<Service>().is_err());
    }

    #[test]
    fn test_default_endpoints_share_suffix() {
        for service in Service::ALL {
            assert!(
                service.default_endpoint().ends_with(crate::region::ENDPOINT_SUFFIX),
                "{} has an unexpected endpoint",
                service
            );
        }
    }

    #[test]
    fn test_display_uses_code() {
        assert_eq!(Service::DynamoDb.to_string(), "dynamo_db");
        assert_eq!(Service::Glacier.display_name(), "Glacier");
    }
}
