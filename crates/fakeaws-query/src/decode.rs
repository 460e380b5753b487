//! Decoding flat key/value sets into [`Value`] trees
//!
//! The decoder walks a [`Shape`] top-down, consuming only the keys the shape
//! names. Keys it does not recognise (`Action`, `Version`, ...) are ignored.
//! A subtree with no keys under its prefix is left absent rather than treated
//! as an error, so handlers only see what the client actually sent.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::NaiveDateTime;
use tracing::trace;

use crate::error::{DecodeError, ScalarError};
use crate::flat::FlatKeyValueSet;
use crate::namer::{ElementNamer, MapNamer};
use crate::shape::{ContainerTraits, Dialect, ScalarKind, Shape, StructureShape, join, wrapper_segment};
use crate::value::{MapEntry, Structure, Value};

/// Wire layout of timestamps in both directions
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Decode the root `shape` from `values`.
///
/// Returns `Ok(None)` when the set is empty.
pub fn decode_value(
    values: &FlatKeyValueSet,
    shape: &Shape,
    dialect: Dialect,
) -> Result<Option<Value>, DecodeError> {
    Decoder::new(values, dialect).decode(shape, "", &ContainerTraits::default())
}

/// Shape-directed reader over one request's key/value set
pub struct Decoder<'a> {
    values: &'a FlatKeyValueSet,
    dialect: Dialect,
}

impl<'a> Decoder<'a> {
    pub fn new(values: &'a FlatKeyValueSet, dialect: Dialect) -> Self {
        Self { values, dialect }
    }

    /// Decode `shape` found under `prefix`. `traits` are the container
    /// annotations of the member being decoded, if any.
    pub fn decode(
        &self,
        shape: &Shape,
        prefix: &str,
        traits: &ContainerTraits,
    ) -> Result<Option<Value>, DecodeError> {
        if !self.values.contains_prefix(prefix) {
            return Ok(None);
        }

        match shape {
            Shape::Structure(structure) => self.decode_structure(structure, prefix).map(Some),
            Shape::List(element) => self.decode_list(element, prefix, traits).map(Some),
            Shape::Map { key, value } => self.decode_map(key, value, prefix, traits).map(Some),
            Shape::Scalar(kind) => self.decode_scalar(*kind, prefix),
        }
    }

    fn decode_structure(
        &self,
        structure: &StructureShape,
        prefix: &str,
    ) -> Result<Value, DecodeError> {
        let mut fields = Structure::new();
        for member in &structure.members {
            let name = member.wire_name(prefix, self.dialect);
            let value = self.decode(&member.shape, &name, &member.traits)?;
            fields.set(member.name.as_str(), value);
        }
        Ok(Value::Structure(fields))
    }

    fn decode_list(
        &self,
        element: &Shape,
        prefix: &str,
        traits: &ContainerTraits,
    ) -> Result<Value, DecodeError> {
        let namer = ElementNamer::new(self.container_prefix(prefix, traits, "member"));
        let mut items = Vec::new();

        for index in 0.. {
            let element_prefix = namer.name(index);
            if !self.values.contains_prefix(&element_prefix) {
                trace!(prefix, count = index, "list ends");
                break;
            }
            if let Some(item) = self.decode(element, &element_prefix, &ContainerTraits::default())? {
                items.push(item);
            }
        }

        Ok(Value::List(items))
    }

    fn decode_map(
        &self,
        key: &Shape,
        value: &Shape,
        prefix: &str,
        traits: &ContainerTraits,
    ) -> Result<Value, DecodeError> {
        let namer = MapNamer::new(self.container_prefix(prefix, traits, "entry"), traits);
        let mut entries = Vec::new();

        for index in 0.. {
            let key_path = namer.key_name(index);
            if !self.values.contains_prefix(&key_path) {
                trace!(prefix, count = index, "map ends");
                break;
            }
            let Some(decoded_key) = self.decode(key, &key_path, &ContainerTraits::default())? else {
                continue;
            };
            let decoded_value =
                self.decode(value, &namer.value_name(index), &ContainerTraits::default())?;
            entries.push(MapEntry::new(decoded_key, decoded_value));
        }

        Ok(Value::Map(entries))
    }

    fn decode_scalar(&self, kind: ScalarKind, path: &str) -> Result<Option<Value>, DecodeError> {
        let Some(raw) = self.values.get(path) else {
            return Ok(None);
        };
        // Only strings and blobs can carry an empty value
        if raw.is_empty() && !matches!(kind, ScalarKind::String | ScalarKind::Blob) {
            trace!(path, kind = kind.as_str(), "empty value left unset");
            return Ok(None);
        }
        parse_scalar(kind, raw)
            .map(Some)
            .map_err(|source| DecodeError::new(path, raw, source))
    }

    fn container_prefix(&self, prefix: &str, traits: &ContainerTraits, wrapper: &'static str) -> String {
        match wrapper_segment(traits, self.dialect, wrapper) {
            Some(segment) => join(prefix, segment),
            None => prefix.to_string(),
        }
    }
}

/// Parse one raw wire string as `kind`
pub fn parse_scalar(kind: ScalarKind, raw: &str) -> Result<Value, ScalarError> {
    Ok(match kind {
        ScalarKind::String => Value::String(raw.to_string()),
        ScalarKind::Blob => Value::Blob(BASE64.decode(raw)?.into()),
        ScalarKind::Boolean => Value::Boolean(parse_bool(raw)?),
        ScalarKind::Integer => Value::Integer(raw.parse()?),
        ScalarKind::Float => Value::Float(raw.parse()?),
        ScalarKind::Timestamp => {
            Value::Timestamp(NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)?.and_utc())
        }
    })
}

fn parse_bool(raw: &str) -> Result<bool, ScalarError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ScalarError::Boolean),
    }
}
