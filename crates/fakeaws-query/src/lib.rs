//! # AWS Query Protocol Codec
//!
//! Translates between the flat, dotted-key form bodies of the AWS query
//! protocol and nested structured values, guided only by schema metadata.
//!
//! ## Features
//! - Both naming dialects: general query and the EC2 variant
//! - `member`/`entry` wrappers, flattening and custom map key/value names
//! - Strict scalar parsing (base64 blobs, ISO 8601 timestamps, ...)
//! - Typed access through [`QueryShape`] and `#[derive(QueryShape)]`
//!
//! ```rust
//! use fakeaws_query::{Dialect, FlatKeyValueSet, QueryShape};
//!
//! #[derive(Debug, Default, PartialEq, QueryShape)]
//! struct DescribeStacksInput {
//!     stack_name: Option<String>,
//! }
//!
//! let values = FlatKeyValueSet::parse(b"Action=DescribeStacks&StackName=web").unwrap();
//! let input: DescribeStacksInput = fakeaws_query::decode(&values, Dialect::Query).unwrap();
//! assert_eq!(input.stack_name.as_deref(), Some("web"));
//! ```

extern crate self as fakeaws_query;

pub mod decode;
pub mod encode;
pub mod error;
pub mod flat;
pub mod namer;
pub mod prelude;
pub mod shape;
pub mod typed;
pub mod value;

// Re-export main types
pub use decode::{Decoder, decode_value};
pub use encode::{Encoder, encode_value};
pub use error::{CodecError, DecodeError, EncodeError, ParseError, ScalarError, ShapeError};
pub use flat::FlatKeyValueSet;
pub use shape::{Category, ContainerTraits, Dialect, Member, ScalarKind, Shape, StructureShape};
pub use typed::QueryShape;
pub use value::{MapEntry, Structure, Value};

#[cfg(feature = "derive")]
pub use fakeaws_derive::QueryShape;

/// Decode a typed value from a request's key/value set
pub fn decode<T: QueryShape>(values: &FlatKeyValueSet, dialect: Dialect) -> Result<T, CodecError> {
    let value = decode_value(values, &T::shape(), dialect)?;
    Ok(T::from_value(value)?)
}

/// Encode a typed value into a key/value set
pub fn encode<T: QueryShape>(value: &T, dialect: Dialect) -> Result<FlatKeyValueSet, CodecError> {
    match value.to_value() {
        Some(value) => Ok(encode_value(&value, &T::shape(), dialect)?),
        None => Ok(FlatKeyValueSet::new()),
    }
}
