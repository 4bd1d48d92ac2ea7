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

//! # Morphic Derive Macros
//!
//! `#[derive(Save)]` and `#[derive(Load)]` for structs with named fields,
//! tuple structs and unit structs. Fields are written in declaration order.
//!
//! A field marked `#[morphic(skip)]` is not written, and is filled from
//! `Default::default()` on load.
//!
//! ```rust
//! use morphic_derive::{Load, Save};
//! use std::rc::Rc;
//!
//! #[derive(Save, Load)]
//! struct Document {
//!     title: String,
//!     shared: Rc<Vec<u8>>,
//!     #[morphic(skip)]
//!     dirty: bool,
//! }
//! ```
//!
//! Generic parameters get a `Save` (or `Load`) bound. Enums are not
//! supported.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod object;
mod util;

/// Derives `morphic_core::serializer::Save`.
#[proc_macro_derive(Save, attributes(morphic))]
pub fn proc_macro_derive_save(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    object::derive_save(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derives `morphic_core::serializer::Load`.
#[proc_macro_derive(Load, attributes(morphic))]
pub fn proc_macro_derive_load(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    object::derive_load(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
