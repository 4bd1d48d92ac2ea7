// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Field, Fields, Index, Member};

/// A struct field with the options read from its `#[morphic(...)]` attributes.
pub struct SourceField<'a> {
    pub field: &'a Field,
    pub member: Member,
    pub skip: bool,
}

impl SourceField<'_> {
    /// `name: value` for named fields, `value` for tuple fields.
    pub fn field_init(&self, value: TokenStream) -> TokenStream {
        match &self.member {
            Member::Named(ident) => quote! { #ident: #value },
            Member::Unnamed(_) => value,
        }
    }
}

pub fn source_fields(fields: &Fields) -> syn::Result<Vec<SourceField<'_>>> {
    fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let member = match &field.ident {
                Some(ident) => Member::Named(ident.clone()),
                None => Member::Unnamed(Index::from(index)),
            };
            Ok(SourceField {
                field,
                member,
                skip: is_skipped(field)?,
            })
        })
        .collect()
}

fn is_skipped(field: &Field) -> syn::Result<bool> {
    let mut skip = false;
    for attr in &field.attrs {
        if !attr.path().is_ident("morphic") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported morphic attribute, expected `skip`"))
            }
        })?;
    }
    Ok(skip)
}

/// `Self(..)`, `Self { .. }` or `Self` depending on the struct kind.
pub fn self_construction(fields: &Fields, field_inits: &[TokenStream]) -> TokenStream {
    match fields {
        Fields::Named(_) => quote! { Self { #(#field_inits),* } },
        Fields::Unnamed(_) => quote! { Self( #(#field_inits),* ) },
        Fields::Unit => quote! { Self },
    }
}
