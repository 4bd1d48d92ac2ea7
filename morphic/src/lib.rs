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

//! # Morphic
//!
//! Serialization of object graphs with shared, weak, unique and
//! polymorphic pointers. Object identity survives the round trip, and a
//! pointer to a trait object comes back as the same concrete type.
//!
//! ```rust
//! use morphic::{polymorphic_base, register_polymorphic, Load, Morphic, Polymorphic, Save};
//! use std::rc::Rc;
//!
//! pub trait Animal: Polymorphic {
//!     fn name(&self) -> &str;
//! }
//! polymorphic_base!(Animal);
//!
//! #[derive(Save, Load)]
//! struct Dog {
//!     name: String,
//! }
//!
//! impl Animal for Dog {
//!     fn name(&self) -> &str {
//!         &self.name
//!     }
//! }
//!
//! register_polymorphic!(Dog, "Dog", dyn Animal);
//!
//! # fn main() {
//! let morphic = Morphic::default();
//! let dog: Rc<dyn Animal> = Rc::new(Dog { name: "Rex".to_string() });
//! let bytes = morphic.serialize(&vec![dog.clone(), dog]).unwrap();
//! let animals: Vec<Rc<dyn Animal>> = morphic.deserialize(&bytes).unwrap();
//! assert_eq!(animals[0].name(), "Rex");
//! assert!(Rc::ptr_eq(&animals[0], &animals[1]));
//! # }
//! ```

pub use morphic_core::{
    archive, bail, buffer, config, ensure, error, polymorphic, polymorphic_base,
    register_polymorphic, register_polymorphic_relation, register_relation,
    register_trait_relation, register_type, resolver, serializer, types,
    BinaryInputArchive, BinaryOutputArchive, CompactInputArchive, CompactOutputArchive, Config,
    Error, Format, InputArchive, Load, Morphic, OutputArchive, Pointee, Polymorphic, RcWeak, Save,
    TypeKey,
};
// derive macros share the names of the traits they implement
pub use morphic_derive::{Load, Save};
