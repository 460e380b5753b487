//! Per-request dispatch: parse, look up, decode, invoke, render

use bytes::Bytes;
use fakeaws_query::{FlatKeyValueSet, decode_value};
use http::StatusCode;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DispatchError;
use crate::fault::Fault;
use crate::registry::ActionRegistry;
use crate::xml::{XmlSerializer, XmlWriter};

/// A rendered response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Bytes,
    pub request_id: Uuid,
}

/// Routes query-protocol request bodies to registered actions
pub struct QueryDispatcher {
    registry: ActionRegistry,
    serializer: Box<dyn XmlSerializer>,
}

impl QueryDispatcher {
    pub fn new(registry: ActionRegistry) -> Self {
        Self::with_serializer(registry, XmlWriter::new())
    }

    pub fn with_serializer(registry: ActionRegistry, serializer: impl XmlSerializer + 'static) -> Self {
        Self {
            registry,
            serializer: Box::new(serializer),
        }
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Handle one request body.
    ///
    /// Domain errors returned by a backend are rendered as faults and come
    /// back as `Ok`. `Err` means the request never reached a backend or its
    /// output could not be rendered.
    pub fn dispatch(&self, body: &[u8]) -> Result<Reply, DispatchError> {
        let request_id = Uuid::new_v4();
        let values = FlatKeyValueSet::parse(body)?;

        let name = values
            .get("Action")
            .filter(|name| !name.is_empty())
            .ok_or(DispatchError::MissingAction)?;
        let action = self
            .registry
            .get(name)
            .ok_or_else(|| DispatchError::UnknownAction {
                action: name.to_string(),
            })?;

        debug!(
            request_id = %request_id,
            action = action.name(),
            dialect = %action.dialect(),
            "Dispatching request"
        );

        let input = decode_value(&values, action.input_shape(), action.dialect()).map_err(|source| {
            DispatchError::Decode {
                action: action.name().to_string(),
                source,
            }
        })?;
        let outcome = action.invoke(input).map_err(|source| DispatchError::Input {
            action: action.name().to_string(),
            source,
        })?;

        match outcome {
            Ok(output) => {
                let body = self
                    .serializer
                    .result(action.name(), action.output_shape(), output.as_ref())
                    .map_err(|source| DispatchError::Render {
                        action: action.name().to_string(),
                        source,
                    })?;
                Ok(Reply {
                    status: StatusCode::OK,
                    body,
                    request_id,
                })
            }
            Err(error) => {
                info!(
                    request_id = %request_id,
                    action = action.name(),
                    status = error.status.as_u16(),
                    code = error.code.as_deref().unwrap_or_default(),
                    "Backend returned error"
                );
                let fault = Fault::specialize(&error, action.dialect()).with_request_id(request_id.to_string());
                Ok(Reply {
                    status: fault.status,
                    body: self.serializer.fault(&fault),
                    request_id,
                })
            }
        }
    }
}
