//! Schema model and name resolution
//!
//! A [`Shape`] describes how a value is laid out on the wire. Structures are
//! described by an ordered list of [`Member`]s; each member carries the naming
//! overrides and container traits that the query protocol honours.

use std::fmt;

/// Wire naming convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// The general query protocol (CloudFormation, IAM, SQS, ...)
    #[default]
    Query,
    /// The EC2 variant: no `member`/`entry` wrappers, capitalized names
    Ec2Query,
}

impl Dialect {
    /// Returns true for the capitalized, wrapper-less variant
    pub fn is_ec2(&self) -> bool {
        matches!(self, Dialect::Ec2Query)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Query => "query",
            Dialect::Ec2Query => "ec2query",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar leaf kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Blob,
    Boolean,
    Integer,
    Float,
    Timestamp,
}

impl ScalarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Blob => "blob",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Integer => "integer",
            ScalarKind::Float => "float",
            ScalarKind::Timestamp => "timestamp",
        }
    }
}

/// Structural category of a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Scalar,
    Structure,
    List,
    Map,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Scalar => "scalar",
            Category::Structure => "structure",
            Category::List => "list",
            Category::Map => "map",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire layout of a value
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Scalar(ScalarKind),
    Structure(StructureShape),
    List(Box<Shape>),
    Map { key: Box<Shape>, value: Box<Shape> },
}

impl Shape {
    pub fn list(element: Shape) -> Self {
        Shape::List(Box::new(element))
    }

    pub fn map(key: Shape, value: Shape) -> Self {
        Shape::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Shape::Scalar(_) => Category::Scalar,
            Shape::Structure(_) => Category::Structure,
            Shape::List(_) => Category::List,
            Shape::Map { .. } => Category::Map,
        }
    }

    /// Returns the structure description if this is a structure shape
    pub fn as_structure(&self) -> Option<&StructureShape> {
        match self {
            Shape::Structure(structure) => Some(structure),
            _ => None,
        }
    }
}

/// Ordered member list of a structure type
#[derive(Debug, Clone, PartialEq)]
pub struct StructureShape {
    pub name: String,
    pub members: Vec<Member>,
}

impl StructureShape {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Append a member (builder style, used by the derive macro)
    pub fn member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Look up a member by its native name
    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Annotations that only matter for list and map members
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerTraits {
    pub flattened: bool,
    pub location_name_list: Option<String>,
    pub location_name_key: Option<String>,
    pub location_name_value: Option<String>,
}

impl ContainerTraits {
    /// Name of the map key sub-field (`key` unless overridden)
    pub fn key_name(&self) -> &str {
        self.location_name_key.as_deref().unwrap_or("key")
    }

    /// Name of the map value sub-field (`value` unless overridden)
    pub fn value_name(&self) -> &str {
        self.location_name_value.as_deref().unwrap_or("value")
    }
}

/// A named field of a structure
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// Native (declared) member name, e.g. `StackName`
    pub name: String,
    pub shape: Shape,
    pub location_name: Option<String>,
    pub query_name: Option<String>,
    pub traits: ContainerTraits,
}

impl Member {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            location_name: None,
            query_name: None,
            traits: ContainerTraits::default(),
        }
    }

    pub fn location_name(mut self, name: impl Into<String>) -> Self {
        self.location_name = Some(name.into());
        self
    }

    pub fn query_name(mut self, name: impl Into<String>) -> Self {
        self.query_name = Some(name.into());
        self
    }

    pub fn location_name_list(mut self, name: impl Into<String>) -> Self {
        self.traits.location_name_list = Some(name.into());
        self
    }

    pub fn location_name_key(mut self, name: impl Into<String>) -> Self {
        self.traits.location_name_key = Some(name.into());
        self
    }

    pub fn location_name_value(mut self, name: impl Into<String>) -> Self {
        self.traits.location_name_value = Some(name.into());
        self
    }

    pub fn flattened(mut self) -> Self {
        self.traits.flattened = true;
        self
    }

    pub fn category(&self) -> Category {
        self.shape.category()
    }

    /// Resolve this member's full dotted path under `prefix` for `dialect`.
    ///
    /// Precedence: the EC2 `query_name`, then `location_name_list` for
    /// flattened members, then `location_name`, then the native name. The EC2
    /// dialect upper-cases the first character of whatever was chosen.
    pub fn wire_name(&self, prefix: &str, dialect: Dialect) -> String {
        let resolved = dialect
            .is_ec2()
            .then_some(self.query_name.as_deref())
            .flatten()
            .or_else(|| {
                self.traits
                    .flattened
                    .then_some(self.traits.location_name_list.as_deref())
                    .flatten()
            })
            .or(self.location_name.as_deref())
            .unwrap_or(self.name.as_str());

        let name = if dialect.is_ec2() {
            capitalize(resolved)
        } else {
            resolved.to_string()
        };
        join(prefix, &name)
    }
}

/// Synthetic segment inserted between a container and its elements, if any
pub fn wrapper_segment(
    traits: &ContainerTraits,
    dialect: Dialect,
    wrapper: &'static str,
) -> Option<&'static str> {
    (!traits.flattened && !dialect.is_ec2()).then_some(wrapper)
}

/// Join two path fragments with `.`, treating an empty prefix as the root
pub fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
