//! A fake CloudFormation (general query dialect) served over HTTP

mod test_helpers;

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use fakeaws_query::{Dialect, QueryShape};
use fakeaws_server::prelude::*;
use test_helpers::{Call, element_text, post, request_body, start_server};
use tracing::info;

const VERSION: &str = "2010-05-15";

#[derive(Debug, Default, Clone, PartialEq, QueryShape)]
struct DescribeStacksInput {
    stack_name: Option<String>,
    next_token: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, QueryShape)]
struct DescribeStacksOutput {
    stacks: Option<Vec<Stack>>,
    next_token: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, QueryShape)]
struct Stack {
    stack_name: Option<String>,
    stack_id: Option<String>,
    creation_time: Option<DateTime<Utc>>,
    outputs: Option<Vec<Output>>,
}

#[derive(Debug, Default, Clone, PartialEq, QueryShape)]
struct Output {
    output_key: Option<String>,
    output_value: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, QueryShape)]
struct Parameter {
    parameter_key: Option<String>,
    parameter_value: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, QueryShape)]
struct UpdateStackInput {
    stack_name: Option<String>,
    parameters: Vec<Parameter>,
    capabilities: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, QueryShape)]
struct UpdateStackOutput {
    stack_id: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, QueryShape)]
struct CreateStackInput {
    stack_name: Option<String>,
    template_body: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, QueryShape)]
struct CreateStackOutput {
    stack_id: Option<String>,
}

#[derive(Default)]
struct FakeCloudFormation {
    describe_stacks: Call<DescribeStacksInput, DescribeStacksOutput>,
    update_stack: Call<UpdateStackInput, UpdateStackOutput>,
    created: std::sync::Mutex<Vec<String>>,
}

impl FakeCloudFormation {
    fn describe_stacks(&self, input: DescribeStacksInput) -> Result<DescribeStacksOutput, ErrorResponse> {
        self.describe_stacks.receive(input)
    }

    fn update_stack(&self, input: UpdateStackInput) -> Result<UpdateStackOutput, ErrorResponse> {
        self.update_stack.receive(input)
    }

    fn create_stack(&self, input: CreateStackInput) -> Result<CreateStackOutput, ErrorResponse> {
        let stack_name = input.stack_name.unwrap_or_default();
        info!(stack_name = %stack_name, "CreateStack called");

        let mut created = self.created.lock().expect("lock");
        if created.contains(&stack_name) {
            return Err(ErrorResponse::bad_request(
                "AlreadyExistsException",
                format!("Stack [{stack_name}] already exists"),
            ));
        }
        created.push(stack_name);
        Ok(CreateStackOutput {
            stack_id: Some("some-id".to_string()),
        })
    }
}

impl Backend for FakeCloudFormation {
    fn service_name(&self) -> &str {
        "cloudformation"
    }

    fn register(ops: &mut Operations<Self>) {
        ops.action("DescribeStacks", Self::describe_stacks)
            .action("UpdateStack", Self::update_stack)
            .action("CreateStack", Self::create_stack);
    }
}

async fn start(backend: &Arc<FakeCloudFormation>) -> std::net::SocketAddr {
    let registry = ActionRegistry::builder(ProtocolMap::default())
        .backend(Arc::clone(backend))
        .expect("register backend")
        .build()
        .expect("build registry");
    start_server(registry).await
}

#[tokio::test]
async fn test_backend_receives_decoded_input() {
    let backend = Arc::new(FakeCloudFormation::default());
    let addr = start(&backend).await;

    let (status, _) = post(
        addr,
        "Action=DescribeStacks&StackName=some-stack-name&Version=2010-05-15".to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let received = backend.describe_stacks.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].stack_name.as_deref(), Some("some-stack-name"));
    assert_eq!(received[0].next_token, None);
}

#[tokio::test]
async fn test_nested_list_of_structures_keeps_order() {
    let backend = Arc::new(FakeCloudFormation::default());
    let addr = start(&backend).await;

    let body = "Action=UpdateStack&StackName=x\
        &Parameters.member.1.ParameterKey=k0&Parameters.member.1.ParameterValue=v0\
        &Parameters.member.2.ParameterKey=k1&Parameters.member.2.ParameterValue=v1";
    let (status, _) = post(addr, body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    let received = backend.update_stack.received();
    assert_eq!(received[0].stack_name.as_deref(), Some("x"));
    assert_eq!(
        received[0].parameters,
        vec![
            Parameter {
                parameter_key: Some("k0".to_string()),
                parameter_value: Some("v0".to_string()),
            },
            Parameter {
                parameter_key: Some("k1".to_string()),
                parameter_value: Some("v1".to_string()),
            },
        ]
    );
    assert!(received[0].capabilities.is_empty());
}

#[tokio::test]
async fn test_typed_client_request_round_trips() {
    let backend = Arc::new(FakeCloudFormation::default());
    let addr = start(&backend).await;

    let input = UpdateStackInput {
        stack_name: Some("some-stack-name".to_string()),
        parameters: vec![
            Parameter {
                parameter_key: Some("some-key-0".to_string()),
                parameter_value: Some("some value & more".to_string()),
            },
            Parameter {
                parameter_key: Some("some-key-1".to_string()),
                parameter_value: None,
            },
        ],
        capabilities: vec!["CAPABILITY_IAM".to_string()],
    };
    let body = request_body("UpdateStack", VERSION, &input, Dialect::Query);
    let (status, _) = post(addr, body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(backend.update_stack.received(), vec![input]);
}

#[tokio::test]
async fn test_success_output_renders_as_result_xml() {
    let backend = Arc::new(FakeCloudFormation::default());
    backend.describe_stacks.returns(Ok(DescribeStacksOutput {
        stacks: Some(vec![
            Stack {
                stack_name: Some("first stack".to_string()),
                creation_time: Some(Utc.with_ymd_and_hms(2016, 1, 2, 3, 4, 5).unwrap()),
                outputs: Some(vec![Output {
                    output_key: Some("some-key".to_string()),
                    output_value: Some("some-value".to_string()),
                }]),
                ..Stack::default()
            },
            Stack {
                stack_name: Some("second stack".to_string()),
                ..Stack::default()
            },
        ]),
        next_token: None,
    }));
    let addr = start(&backend).await;

    let (status, body) = post(addr, "Action=DescribeStacks&StackName=some-stack-name".to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        "<DescribeStacksResult><Stacks>\
         <member><StackName>first stack</StackName>\
         <CreationTime>2016-01-02T03:04:05Z</CreationTime>\
         <Outputs><member><OutputKey>some-key</OutputKey><OutputValue>some-value</OutputValue></member></Outputs>\
         </member>\
         <member><StackName>second stack</StackName></member>\
         </Stacks></DescribeStacksResult>"
    );
}

#[tokio::test]
async fn test_domain_error_renders_query_fault() {
    let backend = Arc::new(FakeCloudFormation::default());
    backend
        .describe_stacks
        .returns(Err(ErrorResponse::bad_request("ValidationError", "some error message")));
    let addr = start(&backend).await;

    let (status, body) = post(addr, "Action=DescribeStacks&StackName=some-stack-name".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with("<ErrorResponse><Error>"), "{body}");
    assert_eq!(element_text(&body, "Code"), Some("ValidationError"));
    assert_eq!(element_text(&body, "Message"), Some("some error message"));
    assert!(element_text(&body, "RequestId").is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn test_stateful_backend_across_requests() {
    let backend = Arc::new(FakeCloudFormation::default());
    let addr = start(&backend).await;
    let input = CreateStackInput {
        stack_name: Some("some-stack".to_string()),
        template_body: None,
    };

    let (status, body) = post(addr, request_body("CreateStack", VERSION, &input, Dialect::Query)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(element_text(&body, "StackId"), Some("some-id"));

    let (status, body) = post(addr, request_body("CreateStack", VERSION, &input, Dialect::Query)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(element_text(&body, "Code"), Some("AlreadyExistsException"));
    assert_eq!(element_text(&body, "Message"), Some("Stack [some-stack] already exists"));
}

#[tokio::test]
async fn test_unimplemented_action_is_reported() {
    let backend = Arc::new(FakeCloudFormation::default());
    let addr = start(&backend).await;

    let (status, body) = post(addr, "Action=DeleteStack&StackName=x".to_string()).await;

    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert!(body.contains("DeleteStack"), "{body}");
}

#[tokio::test]
async fn test_malformed_body_is_rejected_before_backend() {
    let backend = Arc::new(FakeCloudFormation::default());
    let addr = start(&backend).await;

    let (status, body) = post(addr, "Action=DescribeStacks&StackName=%".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("unable to parse request body"), "{body}");
    assert!(backend.describe_stacks.received().is_empty());
}
