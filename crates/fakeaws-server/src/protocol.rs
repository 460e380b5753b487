//! AWS API protocols and the service -> protocol table

use std::collections::HashMap;
use std::fmt;

use fakeaws_query::Dialect;
use serde::Deserialize;

/// Wire protocol family of an AWS service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Query,
    Ec2Query,
    RestXml,
    RestJson,
    JsonRpc,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Query => "query",
            Protocol::Ec2Query => "ec2query",
            Protocol::RestXml => "restxml",
            Protocol::RestJson => "restjson",
            Protocol::JsonRpc => "jsonrpc",
        }
    }

    /// The query-codec dialect for this protocol, if the dispatcher serves it
    pub fn dialect(&self) -> Option<Dialect> {
        match self {
            Protocol::Query => Some(Dialect::Query),
            Protocol::Ec2Query => Some(Dialect::Ec2Query),
            Protocol::RestXml | Protocol::RestJson | Protocol::JsonRpc => None,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const PROTOCOL_USAGE: &[(Protocol, &[&str])] = &[
    (Protocol::Ec2Query, &["ec2"]),
    (Protocol::RestXml, &["cloudfront", "route53", "s3"]),
    (
        Protocol::Query,
        &[
            "autoscaling",
            "cloudformation",
            "cloudsearch",
            "cloudwatch",
            "elasticache",
            "elasticbeanstalk",
            "elb",
            "iam",
            "rds",
            "redshift",
            "ses",
            "simpledb",
            "sns",
            "sqs",
            "sts",
        ],
    ),
    (
        Protocol::RestJson,
        &[
            "apigateway",
            "cloudsearchdomain",
            "cognitosync",
            "efs",
            "elasticsearchservice",
            "elastictranscoder",
            "glacier",
            "iot",
            "iotdataplane",
            "lambda",
            "mobileanalytics",
        ],
    ),
    (
        Protocol::JsonRpc,
        &[
            "cloudhsm",
            "cloudtrail",
            "cloudwatchlogs",
            "codecommit",
            "codedeploy",
            "codepipeline",
            "cognitoidentity",
            "configservice",
            "datapipeline",
            "devicefarm",
            "directconnect",
            "directoryservice",
            "dynamodb",
            "dynamodbstreams",
            "ecs",
            "emr",
            "firehose",
            "inspector",
            "kinesis",
            "kms",
            "machinelearning",
            "marketplacecommerceanalytics",
            "opsworks",
            "route53domains",
            "ssm",
            "storagegateway",
            "support",
            "swf",
            "waf",
            "workspaces",
        ],
    ),
];

/// Immutable mapping from service name (`cloudformation`, `ec2`, ...) to protocol.
///
/// Built once at startup and handed to the registry; nothing consults a
/// global table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolMap {
    services: HashMap<String, Protocol>,
}

impl ProtocolMap {
    /// A table with no services
    pub fn empty() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    /// Add or replace one service (builder style)
    pub fn with(mut self, service: impl Into<String>, protocol: Protocol) -> Self {
        self.services.insert(service.into(), protocol);
        self
    }

    /// Apply overrides on top of this table
    pub fn extend<I, S>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (S, Protocol)>,
        S: Into<String>,
    {
        self.services
            .extend(overrides.into_iter().map(|(service, protocol)| (service.into(), protocol)));
        self
    }

    pub fn get(&self, service: &str) -> Option<Protocol> {
        self.services.get(service).copied()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl Default for ProtocolMap {
    fn default() -> Self {
        let services = PROTOCOL_USAGE
            .iter()
            .flat_map(|(protocol, services)| {
                services.iter().map(move |service| (service.to_string(), *protocol))
            })
            .collect();
        Self { services }
    }
}
