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
use syn::{parse_quote, Data, DeriveInput, Generics};

use crate::util::source_fields;

mod read;
mod write;

fn struct_fields<'a>(ast: &'a DeriveInput, derive: &str) -> syn::Result<&'a syn::Fields> {
    match &ast.data {
        Data::Struct(s) => Ok(&s.fields),
        Data::Enum(_) => Err(syn::Error::new_spanned(
            &ast.ident,
            format!("#[derive({})] does not support enums", derive),
        )),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &ast.ident,
            format!("#[derive({})] does not support unions", derive),
        )),
    }
}

fn add_bounds(generics: &Generics, bound: syn::TypeParamBound) -> Generics {
    let mut generics = generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(bound.clone());
    }
    generics
}

pub fn derive_save(ast: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &ast.ident;
    let fields = struct_fields(ast, "Save")?;
    let source_fields = source_fields(fields)?;
    let generics = add_bounds(&ast.generics, parse_quote!(::morphic_core::serializer::Save));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let body = write::gen_save(&source_fields);

    Ok(quote! {
        impl #impl_generics ::morphic_core::serializer::Save for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn save<__MorphicArchive: ::morphic_core::archive::OutputArchive>(
                &self,
                ar: &mut __MorphicArchive,
            ) -> ::std::result::Result<(), ::morphic_core::error::Error> {
                #body
            }
        }
    })
}

pub fn derive_load(ast: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &ast.ident;
    let fields = struct_fields(ast, "Load")?;
    let source_fields = source_fields(fields)?;
    let generics = add_bounds(&ast.generics, parse_quote!(::morphic_core::serializer::Load));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let body = read::gen_load(fields, &source_fields);
    let placeholder = read::gen_placeholder(fields, &source_fields, quote!(placeholder));
    let shared_placeholder =
        read::gen_placeholder(fields, &source_fields, quote!(shared_placeholder));
    let in_place = read::gen_load_in_place(&source_fields);

    Ok(quote! {
        impl #impl_generics ::morphic_core::serializer::Load for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn load<__MorphicArchive: ::morphic_core::archive::InputArchive>(
                ar: &mut __MorphicArchive,
            ) -> ::std::result::Result<Self, ::morphic_core::error::Error> {
                #body
            }

            fn placeholder() -> ::std::option::Option<Self> {
                #placeholder
            }

            fn shared_placeholder() -> ::std::option::Option<Self> {
                #shared_placeholder
            }

            #[allow(unused_variables)]
            fn load_in_place<__MorphicArchive: ::morphic_core::archive::InputArchive>(
                &self,
                ar: &mut __MorphicArchive,
            ) -> ::std::result::Result<(), ::morphic_core::error::Error> {
                #in_place
            }
        }
    })
}
