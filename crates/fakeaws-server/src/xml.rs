//! XML rendering of action results and faults
//!
//! [`XmlWriter`] follows the AWS query response layout: members render under
//! their location name, lists wrap elements in `member` unless flattened,
//! and maps wrap each pair in an `entry` element.

use bytes::Bytes;
use fakeaws_query::encode::format_scalar;
use fakeaws_query::shape::join;
use fakeaws_query::{ContainerTraits, EncodeError, Shape, StructureShape, Structure, Value};

use crate::fault::{Fault, FaultShape};

/// Renders response bodies
pub trait XmlSerializer: Send + Sync {
    /// Render `value` (shaped as `shape`) wrapped in `<{action}Result>`.
    /// `None` renders an empty result element.
    fn result(&self, action: &str, shape: &Shape, value: Option<&Value>) -> Result<Bytes, EncodeError>;

    /// Render a fault envelope
    fn fault(&self, fault: &Fault) -> Bytes;
}

/// Default [`XmlSerializer`]
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlWriter;

impl XmlWriter {
    pub fn new() -> Self {
        Self
    }

    fn members(
        &self,
        out: &mut String,
        structure: &StructureShape,
        fields: &Structure,
        path: &str,
    ) -> Result<(), EncodeError> {
        for member in &structure.members {
            let Some(field) = fields.get(&member.name) else {
                continue;
            };
            let name = member.location_name.as_deref().unwrap_or(&member.name);
            self.element(out, name, &member.shape, &member.traits, field, &join(path, name))?;
        }
        Ok(())
    }

    fn element(
        &self,
        out: &mut String,
        name: &str,
        shape: &Shape,
        traits: &ContainerTraits,
        value: &Value,
        path: &str,
    ) -> Result<(), EncodeError> {
        let plain = ContainerTraits::default();
        match (shape, value) {
            (Shape::Structure(structure), Value::Structure(fields)) => {
                open(out, name);
                self.members(out, structure, fields, path)?;
                close(out, name);
            }
            (Shape::List(element), Value::List(items)) => {
                if traits.flattened {
                    for (index, item) in items.iter().enumerate() {
                        let item_path = join(path, &(index + 1).to_string());
                        self.element(out, name, element, &plain, item, &item_path)?;
                    }
                } else {
                    let member = traits.location_name_list.as_deref().unwrap_or("member");
                    open(out, name);
                    for (index, item) in items.iter().enumerate() {
                        let item_path = join(path, &(index + 1).to_string());
                        self.element(out, member, element, &plain, item, &item_path)?;
                    }
                    close(out, name);
                }
            }
            (Shape::Map { key, value: value_shape }, Value::Map(entries)) => {
                let entry_tag = if traits.flattened { name } else { "entry" };
                if !traits.flattened {
                    open(out, name);
                }
                for (index, entry) in entries.iter().enumerate() {
                    let entry_path = join(path, &(index + 1).to_string());
                    open(out, entry_tag);
                    self.element(out, traits.key_name(), key, &plain, &entry.key, &entry_path)?;
                    if let Some(entry_value) = &entry.value {
                        self.element(out, traits.value_name(), value_shape, &plain, entry_value, &entry_path)?;
                    }
                    close(out, entry_tag);
                }
                if !traits.flattened {
                    close(out, name);
                }
            }
            (Shape::Scalar(kind), scalar) => {
                let text = format_scalar(*kind, scalar, path)?;
                open(out, name);
                escape_into(out, &text);
                close(out, name);
            }
            (shape, value) => {
                return Err(EncodeError::Mismatch {
                    path: path.to_string(),
                    expected: shape.category().as_str(),
                    found: value.kind_name(),
                });
            }
        }
        Ok(())
    }
}

impl XmlSerializer for XmlWriter {
    fn result(&self, action: &str, shape: &Shape, value: Option<&Value>) -> Result<Bytes, EncodeError> {
        let wrapper = format!("{action}Result");
        let mut out = String::new();
        open(&mut out, &wrapper);
        match (shape, value) {
            (_, None) => {}
            (Shape::Structure(structure), Some(Value::Structure(fields))) => {
                self.members(&mut out, structure, fields, "")?;
            }
            (shape, Some(value)) => {
                return Err(EncodeError::Mismatch {
                    path: String::new(),
                    expected: shape.category().as_str(),
                    found: value.kind_name(),
                });
            }
        }
        close(&mut out, &wrapper);
        Ok(Bytes::from(out))
    }

    fn fault(&self, fault: &Fault) -> Bytes {
        let mut out = String::new();
        let (envelope, errors) = match fault.shape {
            FaultShape::Query => ("ErrorResponse", None),
            FaultShape::Ec2 => ("Response", Some("Errors")),
        };

        open(&mut out, envelope);
        if let Some(errors) = errors {
            open(&mut out, errors);
        }
        open(&mut out, "Error");
        text_element(&mut out, "Code", &fault.code);
        text_element(&mut out, "Message", &fault.message);
        close(&mut out, "Error");
        if let Some(errors) = errors {
            close(&mut out, errors);
        }
        text_element(&mut out, "RequestId", &fault.request_id);
        close(&mut out, envelope);

        Bytes::from(out)
    }
}

fn open(out: &mut String, name: &str) {
    out.push('<');
    out.push_str(name);
    out.push('>');
}

fn close(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn text_element(out: &mut String, name: &str, text: &str) {
    open(out, name);
    escape_into(out, text);
    close(out, name);
}

/// Escape character data. Characters XML 1.0 cannot carry become U+FFFD.
fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            c if is_xml_char(c) => out.push(c),
            _ => out.push('\u{FFFD}'),
        }
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}
