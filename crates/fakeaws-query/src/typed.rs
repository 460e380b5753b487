//! Bridge between Rust types and [`Value`] trees
//!
//! Every type that can appear in an operation's input or output implements
//! [`QueryShape`]. Structures normally get it from `#[derive(QueryShape)]`.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::ShapeError;
use crate::shape::{Category, ScalarKind, Shape};
use crate::value::{MapEntry, Structure, Value};

/// A type with a known wire shape.
///
/// `from_value(None)` is called for absent data and should produce the
/// type's zero value (or `None` for `Option`). `to_value` returns `None` when
/// nothing should be written.
pub trait QueryShape: Sized {
    fn shape() -> Shape;

    fn from_value(value: Option<Value>) -> Result<Self, ShapeError>;

    fn to_value(&self) -> Option<Value>;
}

macro_rules! scalar_shape {
    ($ty:ty, $kind:ident, $variant:ident) => {
        impl QueryShape for $ty {
            fn shape() -> Shape {
                Shape::Scalar(ScalarKind::$kind)
            }

            fn from_value(value: Option<Value>) -> Result<Self, ShapeError> {
                match value {
                    None => Ok(Default::default()),
                    Some(Value::$variant(inner)) => Ok(inner),
                    Some(other) => Err(ShapeError::mismatch(Category::Scalar, other.kind_name())),
                }
            }

            fn to_value(&self) -> Option<Value> {
                Some(Value::$variant(self.clone()))
            }
        }
    };
}

scalar_shape!(String, String, String);
scalar_shape!(bool, Boolean, Boolean);
scalar_shape!(i64, Integer, Integer);
scalar_shape!(f64, Float, Float);
scalar_shape!(Bytes, Blob, Blob);

impl QueryShape for i32 {
    fn shape() -> Shape {
        Shape::Scalar(ScalarKind::Integer)
    }

    fn from_value(value: Option<Value>) -> Result<Self, ShapeError> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|_| ShapeError::OutOfRange {
            path: String::new(),
            value: wide,
            target: "i32",
        })
    }

    fn to_value(&self) -> Option<Value> {
        Some(Value::Integer(i64::from(*self)))
    }
}

impl QueryShape for f32 {
    fn shape() -> Shape {
        Shape::Scalar(ScalarKind::Float)
    }

    fn from_value(value: Option<Value>) -> Result<Self, ShapeError> {
        f64::from_value(value).map(|wide| wide as f32)
    }

    fn to_value(&self) -> Option<Value> {
        Some(Value::Float(f64::from(*self)))
    }
}

impl QueryShape for DateTime<Utc> {
    fn shape() -> Shape {
        Shape::Scalar(ScalarKind::Timestamp)
    }

    fn from_value(value: Option<Value>) -> Result<Self, ShapeError> {
        match value {
            None => Ok(DateTime::<Utc>::default()),
            Some(Value::Timestamp(t)) => Ok(t),
            Some(other) => Err(ShapeError::mismatch(Category::Scalar, other.kind_name())),
        }
    }

    fn to_value(&self) -> Option<Value> {
        Some(Value::Timestamp(*self))
    }
}

impl<T: QueryShape> QueryShape for Option<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn from_value(value: Option<Value>) -> Result<Self, ShapeError> {
        match value {
            None => Ok(None),
            Some(value) => T::from_value(Some(value)).map(Some),
        }
    }

    fn to_value(&self) -> Option<Value> {
        self.as_ref().and_then(T::to_value)
    }
}

impl<T: QueryShape> QueryShape for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn from_value(value: Option<Value>) -> Result<Self, ShapeError> {
        T::from_value(value).map(Box::new)
    }

    fn to_value(&self) -> Option<Value> {
        T::to_value(self)
    }
}

impl<T: QueryShape> QueryShape for Vec<T> {
    fn shape() -> Shape {
        Shape::list(T::shape())
    }

    fn from_value(value: Option<Value>) -> Result<Self, ShapeError> {
        match value {
            None => Ok(Vec::new()),
            Some(Value::List(items)) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    T::from_value(Some(item)).map_err(|err| err.within(&(index + 1).to_string()))
                })
                .collect(),
            Some(other) => Err(ShapeError::mismatch(Category::List, other.kind_name())),
        }
    }

    /// `None` elements (as in `Vec<Option<T>>`) are dropped and the indices stay dense.
    fn to_value(&self) -> Option<Value> {
        Some(Value::List(self.iter().filter_map(T::to_value).collect()))
    }
}

fn map_entries<K, V>(value: Option<Value>) -> Result<Vec<(K, V)>, ShapeError>
where
    K: QueryShape,
    V: QueryShape,
{
    match value {
        None => Ok(Vec::new()),
        Some(Value::Map(entries)) => entries
            .into_iter()
            .enumerate()
            .map(|(index, MapEntry { key, value })| {
                let segment = (index + 1).to_string();
                let key = K::from_value(Some(key)).map_err(|err| err.within(&segment))?;
                let value = V::from_value(value).map_err(|err| err.within(&segment))?;
                Ok((key, value))
            })
            .collect(),
        Some(other) => Err(ShapeError::mismatch(Category::Map, other.kind_name())),
    }
}

fn map_value<'a, K, V>(entries: impl Iterator<Item = (&'a K, &'a V)>) -> Option<Value>
where
    K: QueryShape + 'a,
    V: QueryShape + 'a,
{
    let entries = entries
        .filter_map(|(key, value)| Some(MapEntry::new(key.to_value()?, value.to_value())))
        .collect();
    Some(Value::Map(entries))
}

impl<K, V, S> QueryShape for HashMap<K, V, S>
where
    K: QueryShape + Eq + Hash,
    V: QueryShape,
    S: BuildHasher + Default,
{
    fn shape() -> Shape {
        Shape::map(K::shape(), V::shape())
    }

    fn from_value(value: Option<Value>) -> Result<Self, ShapeError> {
        Ok(map_entries(value)?.into_iter().collect())
    }

    fn to_value(&self) -> Option<Value> {
        map_value(self.iter())
    }
}

impl<K, V> QueryShape for BTreeMap<K, V>
where
    K: QueryShape + Ord,
    V: QueryShape,
{
    fn shape() -> Shape {
        Shape::map(K::shape(), V::shape())
    }

    fn from_value(value: Option<Value>) -> Result<Self, ShapeError> {
        Ok(map_entries(value)?.into_iter().collect())
    }

    fn to_value(&self) -> Option<Value> {
        map_value(self.iter())
    }
}

impl Structure {
    /// Unwrap the members of a structure value; absence yields no members.
    /// Used by derived [`QueryShape`] implementations.
    pub fn from_value(value: Option<Value>) -> Result<Self, ShapeError> {
        match value {
            None => Ok(Structure::new()),
            Some(Value::Structure(fields)) => Ok(fields),
            Some(other) => Err(ShapeError::mismatch(Category::Structure, other.kind_name())),
        }
    }
}
