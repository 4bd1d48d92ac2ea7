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
use syn::Fields;

use crate::util::{self_construction, SourceField};

pub fn gen_load(fields: &Fields, source_fields: &[SourceField]) -> TokenStream {
    let field_inits: Vec<TokenStream> = source_fields
        .iter()
        .map(|source| {
            let ty = &source.field.ty;
            let value = if source.skip {
                quote! { <#ty as ::std::default::Default>::default() }
            } else {
                quote! { <#ty as ::morphic_core::serializer::Load>::load(ar)? }
            };
            source.field_init(value)
        })
        .collect();
    let construction = self_construction(fields, &field_inits);
    quote! { Ok(#construction) }
}

/// `Some(Self { .. })` built from each field's `placeholder` or
/// `shared_placeholder`; `None` as soon as one field has none.
pub fn gen_placeholder(
    fields: &Fields,
    source_fields: &[SourceField],
    method: TokenStream,
) -> TokenStream {
    let field_inits: Vec<TokenStream> = source_fields
        .iter()
        .map(|source| {
            let ty = &source.field.ty;
            let value = if source.skip {
                quote! { <#ty as ::std::default::Default>::default() }
            } else {
                quote! { <#ty as ::morphic_core::serializer::Load>::#method()? }
            };
            source.field_init(value)
        })
        .collect();
    let construction = self_construction(fields, &field_inits);
    quote! { ::std::option::Option::Some(#construction) }
}

pub fn gen_load_in_place(source_fields: &[SourceField]) -> TokenStream {
    let stmts = source_fields
        .iter()
        .filter(|source| !source.skip)
        .map(|source| {
            let member = &source.member;
            quote! {
                ::morphic_core::serializer::Load::load_in_place(&self.#member, ar)?;
            }
        });
    quote! {
        #(#stmts)*
        Ok(())
    }
}
