//! Encoding [`Value`] trees into flat key/value sets
//!
//! Naming, wrapper and indexing rules mirror the decoder exactly. Absent
//! values produce no keys; an empty list, map or nested structure produces
//! the single key `{prefix}=` so that it decodes back to an empty value.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::decode::TIMESTAMP_FORMAT;
use crate::error::EncodeError;
use crate::flat::FlatKeyValueSet;
use crate::namer::{ElementNamer, MapNamer};
use crate::shape::{ContainerTraits, Dialect, ScalarKind, Shape, StructureShape, join, wrapper_segment};
use crate::value::{MapEntry, Value};

/// Encode `value` laid out as `shape` into a fresh key/value set
pub fn encode_value(
    value: &Value,
    shape: &Shape,
    dialect: Dialect,
) -> Result<FlatKeyValueSet, EncodeError> {
    let mut out = FlatKeyValueSet::new();
    Encoder::new(dialect).encode(&mut out, shape, value, "", &ContainerTraits::default())?;
    Ok(out)
}

/// Shape-directed writer
pub struct Encoder {
    dialect: Dialect,
}

impl Encoder {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn encode(
        &self,
        out: &mut FlatKeyValueSet,
        shape: &Shape,
        value: &Value,
        prefix: &str,
        traits: &ContainerTraits,
    ) -> Result<(), EncodeError> {
        match (shape, value) {
            (Shape::Structure(structure), Value::Structure(_)) => {
                self.encode_structure(out, structure, value, prefix)
            }
            (Shape::List(element), Value::List(items)) => {
                self.encode_list(out, element, items, prefix, traits)
            }
            (Shape::Map { key, value: value_shape }, Value::Map(entries)) => {
                self.encode_map(out, key, value_shape, entries, prefix, traits)
            }
            (Shape::Scalar(kind), scalar) => {
                out.insert(prefix, format_scalar(*kind, scalar, prefix)?);
                Ok(())
            }
            (shape, value) => Err(mismatch(prefix, shape.category().as_str(), value)),
        }
    }

    fn encode_structure(
        &self,
        out: &mut FlatKeyValueSet,
        structure: &StructureShape,
        value: &Value,
        prefix: &str,
    ) -> Result<(), EncodeError> {
        let Value::Structure(fields) = value else {
            return Err(mismatch(prefix, "structure", value));
        };
        let written = out.len();
        for member in &structure.members {
            if let Some(field) = fields.get(&member.name) {
                let name = member.wire_name(prefix, self.dialect);
                self.encode(out, &member.shape, field, &name, &member.traits)?;
            }
        }
        // A nested structure with nothing set still has to hold its place
        if out.len() == written && !prefix.is_empty() {
            out.insert(prefix, "");
        }
        Ok(())
    }

    fn encode_list(
        &self,
        out: &mut FlatKeyValueSet,
        element: &Shape,
        items: &[Value],
        prefix: &str,
        traits: &ContainerTraits,
    ) -> Result<(), EncodeError> {
        if items.is_empty() {
            out.insert(prefix, "");
            return Ok(());
        }
        let namer = ElementNamer::new(self.container_prefix(prefix, traits, "member"));
        for (index, item) in items.iter().enumerate() {
            self.encode(out, element, item, &namer.name(index), &ContainerTraits::default())?;
        }
        Ok(())
    }

    fn encode_map(
        &self,
        out: &mut FlatKeyValueSet,
        key: &Shape,
        value: &Shape,
        entries: &[MapEntry],
        prefix: &str,
        traits: &ContainerTraits,
    ) -> Result<(), EncodeError> {
        if entries.is_empty() {
            out.insert(prefix, "");
            return Ok(());
        }
        let namer = MapNamer::new(self.container_prefix(prefix, traits, "entry"), traits);
        for (index, entry) in entries.iter().enumerate() {
            let default = ContainerTraits::default();
            self.encode(out, key, &entry.key, &namer.key_name(index), &default)?;
            if let Some(entry_value) = &entry.value {
                self.encode(out, value, entry_value, &namer.value_name(index), &default)?;
            }
        }
        Ok(())
    }

    fn container_prefix(&self, prefix: &str, traits: &ContainerTraits, wrapper: &'static str) -> String {
        match wrapper_segment(traits, self.dialect, wrapper) {
            Some(segment) => join(prefix, segment),
            None => prefix.to_string(),
        }
    }
}

/// Render a scalar the way the decoder expects to read it back
pub fn format_scalar(kind: ScalarKind, value: &Value, path: &str) -> Result<String, EncodeError> {
    Ok(match (kind, value) {
        (ScalarKind::String, Value::String(s)) => s.clone(),
        (ScalarKind::Blob, Value::Blob(b)) => BASE64.encode(b),
        (ScalarKind::Boolean, Value::Boolean(b)) => b.to_string(),
        (ScalarKind::Integer, Value::Integer(i)) => i.to_string(),
        (ScalarKind::Float, Value::Float(f)) => f.to_string(),
        (ScalarKind::Timestamp, Value::Timestamp(t)) => t.format(TIMESTAMP_FORMAT).to_string(),
        (kind, value) => return Err(mismatch(path, kind.as_str(), value)),
    })
}

fn mismatch(path: &str, expected: &'static str, found: &Value) -> EncodeError {
    EncodeError::Mismatch {
        path: path.to_string(),
        expected,
        found: found.kind_name(),
    }
}
