//! Fake service backends and the operations they expose
//!
//! A backend implements whichever subset of a service's actions the code
//! under test needs:
//!
//! ```rust,ignore
//! impl Backend for FakeCloudFormation {
//!     fn service_name(&self) -> &str {
//!         "cloudformation"
//!     }
//!
//!     fn register(ops: &mut Operations<Self>) {
//!         ops.action("DescribeStacks", Self::describe_stacks);
//!     }
//! }
//! ```

use fakeaws_query::{QueryShape, Shape, ShapeError, Value};

use crate::error::ErrorResponse;

/// What an action produced: the output value, or a domain error
pub type Outcome = Result<Option<Value>, ErrorResponse>;

/// Type-erased action body over a backend of type `B`
pub(crate) type Invoke<B> = Box<dyn Fn(&B, Option<Value>) -> Result<Outcome, ShapeError> + Send + Sync>;

/// A fake implementation of one AWS service
pub trait Backend: Send + Sync + 'static {
    /// Service name as it appears in the protocol table, e.g. `ec2`
    fn service_name(&self) -> &str;

    /// Declare the actions this backend implements
    fn register(ops: &mut Operations<Self>)
    where
        Self: Sized;
}

/// One declared action
pub(crate) struct Operation<B> {
    pub(crate) name: String,
    pub(crate) input: Shape,
    pub(crate) output: Shape,
    pub(crate) invoke: Invoke<B>,
}

/// Collects the actions of a backend during registration
pub struct Operations<B> {
    operations: Vec<Operation<B>>,
}

impl<B: Backend> Operations<B> {
    pub(crate) fn new() -> Self {
        Self {
            operations: Vec::new(),
        }
    }

    /// Declare `name` as handled by `handler`. Input and output shapes come
    /// from the handler's argument and return types.
    pub fn action<I, O, F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        I: QueryShape + 'static,
        O: QueryShape + 'static,
        F: Fn(&B, I) -> Result<O, ErrorResponse> + Send + Sync + 'static,
    {
        let invoke: Invoke<B> = Box::new(move |backend, value| {
            let input = I::from_value(value)?;
            Ok(handler(backend, input).map(|output| output.to_value()))
        });
        self.operations.push(Operation {
            name: name.into(),
            input: I::shape(),
            output: O::shape(),
            invoke,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub(crate) fn into_operations(self) -> Vec<Operation<B>> {
        self.operations
    }
}
