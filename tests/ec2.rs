//! A fake EC2 (capitalized, wrapper-less dialect) served over HTTP

mod test_helpers;

use std::sync::Arc;

use fakeaws_query::{Dialect, QueryShape};
use fakeaws_server::prelude::*;
use test_helpers::{Call, element_text, post, request_body, start_server};

const VERSION: &str = "2015-10-01";

#[derive(Debug, Default, Clone, PartialEq, QueryShape)]
struct CreateKeyPairInput {
    #[query(location_name = "keyName")]
    key_name: Option<String>,
    #[query(location_name = "dryRun")]
    dry_run: Option<bool>,
}

#[derive(Debug, Default, Clone, PartialEq, QueryShape)]
struct CreateKeyPairOutput {
    #[query(location_name = "keyName")]
    key_name: Option<String>,
    #[query(location_name = "keyFingerprint")]
    key_fingerprint: Option<String>,
    #[query(location_name = "keyMaterial")]
    key_material: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, QueryShape)]
struct Filter {
    name: Option<String>,
    #[query(location_name = "Value", location_name_list = "item")]
    values: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, QueryShape)]
struct DescribeInstancesInput {
    #[query(location_name = "InstanceId", location_name_list = "InstanceId")]
    instance_ids: Vec<String>,
    #[query(location_name = "Filter", location_name_list = "Filter")]
    filters: Vec<Filter>,
    #[query(location_name = "maxResults")]
    max_results: Option<i64>,
}

#[derive(Debug, Default, Clone, PartialEq, QueryShape)]
struct Instance {
    #[query(location_name = "instanceId")]
    instance_id: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, QueryShape)]
struct Reservation {
    #[query(location_name = "instancesSet", location_name_list = "item")]
    instances: Option<Vec<Instance>>,
}

#[derive(Debug, Default, Clone, PartialEq, QueryShape)]
struct DescribeInstancesOutput {
    #[query(location_name = "reservationSet", location_name_list = "item")]
    reservations: Option<Vec<Reservation>>,
}

#[derive(Default)]
struct FakeEc2 {
    create_key_pair: Call<CreateKeyPairInput, CreateKeyPairOutput>,
    describe_instances: Call<DescribeInstancesInput, DescribeInstancesOutput>,
}

impl FakeEc2 {
    fn create_key_pair(&self, input: CreateKeyPairInput) -> Result<CreateKeyPairOutput, ErrorResponse> {
        self.create_key_pair.receive(input)
    }

    fn describe_instances(
        &self,
        input: DescribeInstancesInput,
    ) -> Result<DescribeInstancesOutput, ErrorResponse> {
        self.describe_instances.receive(input)
    }
}

impl Backend for FakeEc2 {
    fn service_name(&self) -> &str {
        "ec2"
    }

    fn register(ops: &mut Operations<Self>) {
        ops.action("CreateKeyPair", Self::create_key_pair)
            .action("DescribeInstances", Self::describe_instances);
    }
}

async fn start(backend: &Arc<FakeEc2>) -> std::net::SocketAddr {
    let registry = ActionRegistry::builder(ProtocolMap::default())
        .backend(Arc::clone(backend))
        .expect("register backend")
        .build()
        .expect("build registry");
    assert_eq!(
        registry.get("CreateKeyPair").map(|action| action.dialect()),
        Some(Dialect::Ec2Query)
    );
    start_server(registry).await
}

#[tokio::test]
async fn test_backend_receives_capitalized_names() {
    let backend = Arc::new(FakeEc2::default());
    let addr = start(&backend).await;

    let (status, _) = post(
        addr,
        "Action=CreateKeyPair&KeyName=some-key-name&DryRun=false&Version=2015-10-01".to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        backend.create_key_pair.received(),
        vec![CreateKeyPairInput {
            key_name: Some("some-key-name".to_string()),
            dry_run: Some(false),
        }]
    );
}

#[tokio::test]
async fn test_lists_have_no_wrapper_segment() {
    let backend = Arc::new(FakeEc2::default());
    let addr = start(&backend).await;

    let body = "Action=DescribeInstances&InstanceId.1=i-1&InstanceId.2=i-2\
        &Filter.1.Name=instance-state-name&Filter.1.Value.1=running&Filter.1.Value.2=pending\
        &MaxResults=5";
    let (status, _) = post(addr, body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    let received = backend.describe_instances.received();
    assert_eq!(received[0].instance_ids, ["i-1", "i-2"]);
    assert_eq!(
        received[0].filters,
        vec![Filter {
            name: Some("instance-state-name".to_string()),
            values: vec!["running".to_string(), "pending".to_string()],
        }]
    );
    assert_eq!(received[0].max_results, Some(5));
}

#[tokio::test]
async fn test_general_dialect_keys_are_not_recognized() {
    let backend = Arc::new(FakeEc2::default());
    let addr = start(&backend).await;

    let (status, _) = post(addr, "Action=DescribeInstances&InstanceId.member.1=i-1".to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(backend.describe_instances.received()[0].instance_ids.is_empty());
}

#[tokio::test]
async fn test_typed_client_request_round_trips() {
    let backend = Arc::new(FakeEc2::default());
    let addr = start(&backend).await;

    let input = DescribeInstancesInput {
        instance_ids: vec!["i-1".to_string()],
        filters: vec![Filter {
            name: Some("tag:Name".to_string()),
            values: vec!["web server".to_string()],
        }],
        max_results: None,
    };
    let body = request_body("DescribeInstances", VERSION, &input, Dialect::Ec2Query);
    assert!(body.contains("Filter.1.Value.1=web%20server"), "{body}");

    let (status, _) = post(addr, body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(backend.describe_instances.received(), vec![input]);
}

#[tokio::test]
async fn test_success_output_uses_location_names() {
    let backend = Arc::new(FakeEc2::default());
    backend.create_key_pair.returns(Ok(CreateKeyPairOutput {
        key_name: Some("some-key-name".to_string()),
        key_fingerprint: Some("some-fingerprint".to_string()),
        key_material: Some("some-pem-data".to_string()),
    }));
    backend.describe_instances.returns(Ok(DescribeInstancesOutput {
        reservations: Some(vec![Reservation {
            instances: Some(vec![Instance {
                instance_id: Some("i-1".to_string()),
            }]),
        }]),
    }));
    let addr = start(&backend).await;

    let (status, body) = post(addr, "Action=CreateKeyPair&KeyName=some-key-name".to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        "<CreateKeyPairResult><keyName>some-key-name</keyName>\
         <keyFingerprint>some-fingerprint</keyFingerprint>\
         <keyMaterial>some-pem-data</keyMaterial></CreateKeyPairResult>"
    );

    let (status, body) = post(addr, "Action=DescribeInstances".to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        "<DescribeInstancesResult><reservationSet><item><instancesSet><item>\
         <instanceId>i-1</instanceId>\
         </item></instancesSet></item></reservationSet></DescribeInstancesResult>"
    );
}

#[tokio::test]
async fn test_domain_error_renders_ec2_fault() {
    let backend = Arc::new(FakeEc2::default());
    backend
        .create_key_pair
        .returns(Err(ErrorResponse::bad_request("ValidationError", "some error message")));
    let addr = start(&backend).await;

    let (status, body) = post(addr, "Action=CreateKeyPair&KeyName=some-key-name".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with("<Response><Errors><Error><Code>ValidationError</Code>"), "{body}");
    assert_eq!(element_text(&body, "Message"), Some("some error message"));
    assert!(body.contains("</Errors><RequestId>"));
}

#[tokio::test]
async fn test_missing_error_fields_are_visible() {
    let backend = Arc::new(FakeEc2::default());
    backend
        .create_key_pair
        .returns(Err(ErrorResponse::from_status(StatusCode::SERVICE_UNAVAILABLE)));
    let addr = start(&backend).await;

    let (status, body) = post(addr, "Action=CreateKeyPair".to_string()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(element_text(&body, "Code"), Some(fakeaws_server::MISSING_CODE));
    assert_eq!(element_text(&body, "Message"), Some(fakeaws_server::MISSING_MESSAGE));
}

#[tokio::test]
async fn test_malformed_scalar_aborts_request() {
    let backend = Arc::new(FakeEc2::default());
    let addr = start(&backend).await;

    let (status, body) = post(addr, "Action=CreateKeyPair&KeyName=k&DryRun=maybe".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("error parsing field \"DryRun\" value \"maybe\""), "{body}");
    assert!(backend.create_key_pair.received().is_empty());
}
