//! # Query Codec Prelude
//!
//! ```rust
//! use fakeaws_query::prelude::*;
//! ```

pub use crate::error::{CodecError, DecodeError, ShapeError};
pub use crate::flat::FlatKeyValueSet;
pub use crate::shape::{Dialect, Member, ScalarKind, Shape, StructureShape};
pub use crate::typed::QueryShape;
pub use crate::value::{Structure, Value};
pub use crate::{decode, encode};

#[cfg(feature = "derive")]
pub use fakeaws_derive::QueryShape;
