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

//! # Morphic Core
//!
//! Serialization of object graphs that contain shared, unique, weak and
//! polymorphic pointers, preserving object identity across a round trip.
//!
//! ## Architecture
//!
//! - **`polymorphic`**: relation registry with cached shortest cast paths,
//!   type-erased casters, and the per-archive binding tables
//! - **`serializer`**: the `Save` / `Load` contract and pointer support
//! - **`archive`**: the archive traits and the binary and compact families
//! - **`resolver`**: per-archive identity and type name tables
//! - **`buffer`**: byte level reader and writer
//! - **`error`**, **`config`**, **`types`**
//!
//! ## Polymorphism
//!
//! A pointer to a trait object is written as the registered name of its
//! dynamic type followed by the concrete object. On load the name selects
//! the binding that constructs the concrete type, which is then cast back
//! to the expected trait along a path through registered relations. Paths
//! are composed transitively, so `dyn Animal -> dyn Mammal -> Dog` needs
//! only the two direct relations.
//!
//! ## Identity
//!
//! Within one archive, every shared allocation is written once and later
//! references carry only its id. Objects with a shared placeholder (a
//! `RefCell`, or a derived struct whose loaded fields are all `RefCell`s) are
//! allocated before their body is read, so strong cycles through them load
//! with the same aliasing. For any other object, a reference read while its
//! body is still being read yields a pending handle: weak pointers are
//! patched once the object is complete, strong ones are a
//! [`CyclicReference`](error::Error::CyclicReference) error.
//!
//! This crate is usually used through the `morphic` crate, which adds the
//! derive macros.

pub mod archive;
pub mod buffer;
pub mod config;
pub mod error;
pub mod morphic;
pub mod polymorphic;
pub mod resolver;
pub mod serializer;
pub mod types;

#[doc(hidden)]
pub use inventory;

pub use archive::{
    BinaryInputArchive, BinaryOutputArchive, CompactInputArchive, CompactOutputArchive,
    InputArchive, OutputArchive,
};
pub use config::Config;
pub use error::Error;
pub use morphic::{Format, Morphic};
pub use polymorphic::{register_relation, register_trait_relation, register_type, Polymorphic};
pub use serializer::{Load, Pointee, RcWeak, Save};
pub use types::TypeKey;
