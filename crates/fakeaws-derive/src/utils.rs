//! Attribute parsing shared by the derive implementations

use syn::{Attribute, LitBool, LitStr, Result};

/// Struct-level `#[query(...)]` metadata
#[derive(Debug, Default)]
pub struct StructMeta {
    pub name: Option<String>,
}

/// Extract `#[query(name = "...")]` from a struct's attributes
pub fn extract_struct_meta(attrs: &[Attribute]) -> Result<StructMeta> {
    let mut meta = StructMeta::default();

    for attr in attrs {
        if attr.path().is_ident("query") {
            attr.parse_nested_meta(|nested| {
                if nested.path.is_ident("name") {
                    let s: LitStr = nested.value()?.parse()?;
                    meta.name = Some(s.value());
                    Ok(())
                } else {
                    Err(nested.error("unsupported struct attribute, expected `name`"))
                }
            })?;
        }
    }

    Ok(meta)
}

/// Field-level `#[query(...)]` metadata
#[derive(Debug, Default)]
pub struct FieldMeta {
    pub name: Option<String>,
    pub location_name: Option<String>,
    pub query_name: Option<String>,
    pub location_name_list: Option<String>,
    pub key_name: Option<String>,
    pub value_name: Option<String>,
    pub flattened: bool,
}

/// Extract member overrides from a field's attributes
pub fn extract_field_meta(attrs: &[Attribute]) -> Result<FieldMeta> {
    let mut meta = FieldMeta::default();

    for attr in attrs {
        if !attr.path().is_ident("query") {
            continue;
        }
        attr.parse_nested_meta(|nested| {
            let slot = if nested.path.is_ident("name") {
                &mut meta.name
            } else if nested.path.is_ident("location_name") {
                &mut meta.location_name
            } else if nested.path.is_ident("query_name") {
                &mut meta.query_name
            } else if nested.path.is_ident("location_name_list") {
                &mut meta.location_name_list
            } else if nested.path.is_ident("key_name") {
                &mut meta.key_name
            } else if nested.path.is_ident("value_name") {
                &mut meta.value_name
            } else if nested.path.is_ident("flattened") {
                // Handle both #[query(flattened)] and #[query(flattened = true/false)]
                meta.flattened = if nested.input.peek(syn::Token![=]) {
                    nested.value()?.parse::<LitBool>()?.value
                } else {
                    true
                };
                return Ok(());
            } else {
                return Err(nested.error(
                    "unsupported field attribute, expected one of `name`, `location_name`, \
                     `query_name`, `location_name_list`, `key_name`, `value_name`, `flattened`",
                ));
            };

            let s: LitStr = nested.value()?.parse()?;
            *slot = Some(s.value());
            Ok(())
        })?;
    }

    Ok(meta)
}

/// `stack_name` -> `StackName`, `r#type` -> `Type`
pub fn to_upper_camel_case(ident: &str) -> String {
    ident
        .trim_start_matches("r#")
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
