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

//! Polymorphic pointer support.
//!
//! A polymorphic base is a trait object. The trait extends [`Polymorphic`],
//! is turned into a pointer target with [`polymorphic_base!`](crate::polymorphic_base),
//! and concrete types are connected to it with
//! [`register_polymorphic!`](crate::register_polymorphic):
//!
//! ```rust
//! use morphic_core::archive::{BinaryInputArchive, BinaryOutputArchive, InputArchive, OutputArchive};
//! use morphic_core::error::Error;
//! use morphic_core::polymorphic::Polymorphic;
//! use morphic_core::serializer::{Load, Save};
//! use morphic_core::{polymorphic_base, register_polymorphic};
//! use std::rc::Rc;
//!
//! pub trait Shape: Polymorphic {
//!     fn area(&self) -> f64;
//! }
//! polymorphic_base!(Shape);
//!
//! struct Square(f64);
//!
//! impl Shape for Square {
//!     fn area(&self) -> f64 {
//!         self.0 * self.0
//!     }
//! }
//!
//! impl Save for Square {
//!     fn save<A: OutputArchive>(&self, ar: &mut A) -> Result<(), Error> {
//!         ar.write_f64(self.0)
//!     }
//! }
//!
//! impl Load for Square {
//!     fn load<A: InputArchive>(ar: &mut A) -> Result<Self, Error> {
//!         Ok(Square(ar.read_f64()?))
//!     }
//! }
//!
//! register_polymorphic!(Square, "Square", dyn Shape);
//!
//! # fn main() {
//! let shape: Rc<dyn Shape> = Rc::new(Square(3.0));
//! let mut out = BinaryOutputArchive::new();
//! out.process(&shape).unwrap();
//! let mut input = BinaryInputArchive::new(out.into_bytes()).unwrap();
//! let loaded: Rc<dyn Shape> = input.process().unwrap();
//! assert_eq!(loaded.area(), 9.0);
//! # }
//! ```

mod binding;
mod caster;
mod erased;
mod macros;
mod pointer;
mod registration;
mod relations;

use std::any::Any;
use std::rc::Rc;

use crate::types::TypeKey;

pub use binding::{BindingRegistry, InputBinding, OutputBinding, SharedErased};
pub use caster::{CastPath, ConcreteCaster, PolymorphicCaster, TraitCaster};
pub use erased::{ErasedBox, ErasedRc};
pub use pointer::{load_shared, load_unique, save_null, save_shared, save_unique};
pub use registration::{ensure_initialized, StaticRegistration};
pub use relations::{
    downcast, register_relation, register_trait_relation, upcast, PolymorphicCasters,
    RelationGraph,
};

/// Runtime type access for polymorphic bases.
///
/// Implemented for every sized `'static` type. Base traits list it as a
/// supertrait so that a `dyn Base` can report its concrete type and be
/// turned into `dyn Any` for checked downcasts.
///
/// Call these through the trait (`<B as Polymorphic>::as_any(&*rc)`): on an
/// `Rc<dyn Base>` receiver, method syntax would pick the blanket impl for
/// the `Rc` itself.
pub trait Polymorphic: Any {
    fn dyn_type_key(&self) -> TypeKey;

    fn as_any(&self) -> &dyn Any;

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any>;

    fn into_any_box(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> Polymorphic for T {
    #[inline(always)]
    fn dyn_type_key(&self) -> TypeKey {
        TypeKey::of::<T>()
    }

    #[inline(always)]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline(always)]
    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }

    #[inline(always)]
    fn into_any_box(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Registers a concrete type for polymorphic use under a stable name for
/// every built-in archive. Relations to its bases are registered separately.
///
/// Prefer [`register_polymorphic!`](crate::register_polymorphic) for types
/// known at compile time; this function is for registration at run time.
pub fn register_type<T>(name: &'static str) -> Result<(), crate::error::Error>
where
    T: crate::serializer::Save + crate::serializer::Load + Polymorphic,
{
    BindingRegistry::global().register_type::<T>(name)
}
