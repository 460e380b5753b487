//! Action registry built once from a set of backends

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use fakeaws_query::{Dialect, Shape, ShapeError, Value};
use tracing::debug;

use crate::backend::{Backend, Operations, Outcome};
use crate::error::RegistryError;
use crate::protocol::ProtocolMap;

type Invoker = Box<dyn Fn(Option<Value>) -> Result<Outcome, ShapeError> + Send + Sync>;

/// A registered action, bound to its backend instance
pub struct Action {
    name: String,
    service: String,
    dialect: Dialect,
    input: Shape,
    output: Shape,
    invoke: Invoker,
}

impl Action {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Wire dialect, resolved from the service's protocol at registration
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn input_shape(&self) -> &Shape {
        &self.input
    }

    pub fn output_shape(&self) -> &Shape {
        &self.output
    }

    /// Convert the decoded input and call the backend
    pub fn invoke(&self, input: Option<Value>) -> Result<Outcome, ShapeError> {
        (self.invoke)(input)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("service", &self.service)
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

/// Immutable action name -> [`Action`] table
#[derive(Debug)]
pub struct ActionRegistry {
    actions: HashMap<String, Action>,
}

impl ActionRegistry {
    pub fn builder(protocols: ProtocolMap) -> ActionRegistryBuilder {
        ActionRegistryBuilder {
            protocols,
            actions: HashMap::new(),
            backends: 0,
        }
    }

    pub fn get(&self, action: &str) -> Option<&Action> {
        self.actions.get(action)
    }

    /// Registered action names, sorted
    pub fn action_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Builder for [`ActionRegistry`]
#[derive(Debug)]
pub struct ActionRegistryBuilder {
    protocols: ProtocolMap,
    actions: HashMap<String, Action>,
    backends: usize,
}

impl ActionRegistryBuilder {
    /// Register every action `backend` declares.
    ///
    /// Fails if the backend's service is unknown or not a query protocol, if
    /// it declares no actions, or if an action is already registered.
    pub fn backend<B: Backend>(mut self, backend: Arc<B>) -> Result<Self, RegistryError> {
        let service = backend.service_name().to_string();
        let protocol = self
            .protocols
            .get(&service)
            .ok_or_else(|| RegistryError::UnknownService {
                service: service.clone(),
            })?;
        let dialect = protocol
            .dialect()
            .ok_or_else(|| RegistryError::UnsupportedProtocol {
                service: service.clone(),
                protocol,
            })?;

        let mut ops = Operations::new();
        B::register(&mut ops);
        if ops.is_empty() {
            return Err(RegistryError::NoOperations { service });
        }

        for operation in ops.into_operations() {
            if let Some(existing) = self.actions.get(&operation.name) {
                return Err(RegistryError::DuplicateAction {
                    action: operation.name,
                    first: existing.service.clone(),
                    second: service,
                });
            }

            debug!(
                service = %service,
                action = %operation.name,
                dialect = %dialect,
                "Registering action"
            );

            let backend = Arc::clone(&backend);
            let invoke = operation.invoke;
            self.actions.insert(
                operation.name.clone(),
                Action {
                    name: operation.name,
                    service: service.clone(),
                    dialect,
                    input: operation.input,
                    output: operation.output,
                    invoke: Box::new(move |input| invoke(&backend, input)),
                },
            );
        }

        self.backends += 1;
        Ok(self)
    }

    pub fn build(self) -> Result<ActionRegistry, RegistryError> {
        if self.backends == 0 {
            return Err(RegistryError::NoBackends);
        }
        Ok(ActionRegistry {
            actions: self.actions,
        })
    }
}
