//! Implementation of #[derive(QueryShape)]

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

use crate::utils::{extract_field_meta, extract_struct_meta, to_upper_camel_case};

pub fn derive_query_shape_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let struct_meta = extract_struct_meta(&input.attrs)?;
    let shape_name = struct_meta.name.unwrap_or_else(|| struct_name.to_string());

    let data = match &input.data {
        Data::Struct(data) => data,
        Data::Enum(_) | Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "QueryShape can only be derived for structs",
            ));
        }
    };

    let named = match &data.fields {
        Fields::Named(named) => Some(named),
        Fields::Unit => None,
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                &data.fields,
                "QueryShape requires named fields",
            ));
        }
    };

    let mut members = Vec::new();
    let mut readers = Vec::new();
    let mut writers = Vec::new();

    for field in named.into_iter().flat_map(|named| named.named.iter()) {
        let Some(ident) = &field.ident else {
            continue;
        };
        let ty = &field.ty;
        let meta = extract_field_meta(&field.attrs)?;
        let native = meta
            .name
            .clone()
            .unwrap_or_else(|| to_upper_camel_case(&ident.to_string()));

        let mut member = quote! {
            ::fakeaws_query::Member::new(#native, <#ty as ::fakeaws_query::QueryShape>::shape())
        };
        if let Some(name) = &meta.location_name {
            member = quote! { #member.location_name(#name) };
        }
        if let Some(name) = &meta.query_name {
            member = quote! { #member.query_name(#name) };
        }
        if let Some(name) = &meta.location_name_list {
            member = quote! { #member.location_name_list(#name) };
        }
        if let Some(name) = &meta.key_name {
            member = quote! { #member.location_name_key(#name) };
        }
        if let Some(name) = &meta.value_name {
            member = quote! { #member.location_name_value(#name) };
        }
        if meta.flattened {
            member = quote! { #member.flattened() };
        }
        members.push(member);

        readers.push(quote! {
            #ident: <#ty as ::fakeaws_query::QueryShape>::from_value(__fields.take(#native))
                .map_err(|err| err.within(#native))?
        });
        writers.push(quote! {
            __fields.set(#native, <#ty as ::fakeaws_query::QueryShape>::to_value(&self.#ident));
        });
    }

    let construct = if named.is_some() {
        quote! { Self { #(#readers,)* } }
    } else {
        quote! { Self }
    };

    let expanded = quote! {
        #[automatically_derived]
        impl #impl_generics ::fakeaws_query::QueryShape for #struct_name #ty_generics #where_clause {
            fn shape() -> ::fakeaws_query::Shape {
                ::fakeaws_query::Shape::Structure(
                    ::fakeaws_query::StructureShape::new(#shape_name)
                        #(.member(#members))*
                )
            }

            fn from_value(
                value: ::core::option::Option<::fakeaws_query::Value>,
            ) -> ::core::result::Result<Self, ::fakeaws_query::ShapeError> {
                #[allow(unused_mut, unused_variables)]
                let mut __fields = ::fakeaws_query::Structure::from_value(value)?;
                ::core::result::Result::Ok(#construct)
            }

            fn to_value(&self) -> ::core::option::Option<::fakeaws_query::Value> {
                #[allow(unused_mut)]
                let mut __fields = ::fakeaws_query::Structure::new();
                #(#writers)*
                ::core::option::Option::Some(::fakeaws_query::Value::Structure(__fields))
            }
        }
    };

    Ok(expanded)
}
