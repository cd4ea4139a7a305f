// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitStr};

/// `#[derive(Record)]` macro: generates `Record` + `FromValue` impls
///
/// Maps a struct with named fields onto a registered class. Each field reads
/// the attribute of the same name; every field type must implement
/// `attrobj::FromValue` (nested records do, through this derive).
///
/// Attributes:
/// - `#[record(class = "Name")]` on the struct selects the backing class
///   (default: the struct name)
/// - `#[record(rename = "attr")]` on a field reads a differently named attribute
///
/// Example:
/// ```ignore
/// use attrobj::Record;
///
/// #[derive(Record)]
/// #[record(class = "Child")]
/// struct Kid {
///     name: String,
///     #[record(rename = "toys")]
///     playthings: Vec<Toy>,
/// }
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_record(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_record(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Generic records are not supported",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(f) => &f.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Only named fields are supported",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(input, "Only structs are supported")),
    };

    let class = parse_record_attr(&input.attrs, "class")?.unwrap_or_else(|| name.to_string());

    let mut initializers = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "Field must have a name"));
        };
        let attribute = parse_record_attr(&field.attrs, "rename")?
            .unwrap_or_else(|| field_name.to_string());
        let field_type = &field.ty;
        initializers.push(quote! {
            #field_name: ::attrobj::record::field::<#field_type>(instance, #attribute)?
        });
    }

    Ok(quote! {
        impl ::attrobj::Record for #name {
            fn class_name() -> &'static str {
                #class
            }

            fn from_instance(
                instance: &::attrobj::Instance,
            ) -> ::core::result::Result<Self, ::attrobj::RecordError> {
                ::attrobj::record::expect_class(instance, #class)?;
                Ok(Self {
                    #(#initializers,)*
                })
            }
        }

        impl ::attrobj::FromValue for #name {
            fn from_value(
                value: &::attrobj::Value,
            ) -> ::core::result::Result<Self, ::attrobj::RecordError> {
                match value.as_instance() {
                    Some(instance) => <Self as ::attrobj::Record>::from_instance(instance),
                    None => Err(::attrobj::RecordError::mismatch(#class, value)),
                }
            }
        }
    })
}

/// Read `#[record(<key> = "...")]`; any other key is an error.
fn parse_record_attr(attrs: &[Attribute], key: &str) -> syn::Result<Option<String>> {
    let mut found = None;
    for attr in attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(key) {
                let lit: LitStr = meta.value()?.parse()?;
                found = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error(format!("unsupported record attribute, expected `{key} = \"...\"`")))
            }
        })?;
    }
    Ok(found)
}
