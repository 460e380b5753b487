//! # Query Shape Derive Macro
//!
//! `#[derive(QueryShape)]` generates the wire schema of a structure together
//! with its conversions to and from `fakeaws_query::Value`, so the codec never
//! needs runtime reflection over handler types.
//!
//! ## Attributes
//!
//! - `#[query(name = "...")]` on the struct - shape name (defaults to the type name)
//! - `#[query(name = "...")]` on a field - native member name (defaults to the
//!   field name in UpperCamelCase)
//! - `#[query(location_name = "...")]` - general wire name override
//! - `#[query(query_name = "...")]` - EC2 wire name override
//! - `#[query(flattened)]` - drop the `member`/`entry` wrapper segment
//! - `#[query(location_name_list = "...")]` - element name for flattened lists
//! - `#[query(key_name = "...", value_name = "...")]` - map entry field names
//!
//! ## Example
//!
//! ```rust,ignore
//! use fakeaws_query::QueryShape;
//!
//! #[derive(QueryShape)]
//! struct UpdateStackInput {
//!     stack_name: Option<String>,
//!     parameters: Vec<Parameter>,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod shape_derive;
mod utils;

#[cfg(test)]
mod tests;

/// Derive macro implementing `fakeaws_query::QueryShape` for a struct
#[proc_macro_derive(QueryShape, attributes(query))]
pub fn derive_query_shape(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    shape_derive::derive_query_shape_impl(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
