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

use std::any::type_name;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::error::Error;
use crate::polymorphic::erased::{ErasedBox, ErasedRc};
use crate::polymorphic::relations::PolymorphicCasters;
use crate::polymorphic::Polymorphic;
use crate::types::TypeKey;

/// A primitive cast between one base and one directly derived type.
///
/// `downcast` is checked against the dynamic type of the object, and a
/// failure means a cast path was applied to the wrong object. `upcast`
/// always succeeds for a true derived pointer. Shared upcasts keep the
/// original allocation, so the object is still dropped exactly once.
pub trait PolymorphicCaster: Send + Sync {
    fn base(&self) -> TypeKey;

    fn derived(&self) -> TypeKey;

    fn downcast(&self, ptr: ErasedRc) -> Result<ErasedRc, Error>;

    fn upcast(&self, ptr: ErasedRc) -> Result<ErasedRc, Error>;

    fn upcast_box(&self, ptr: ErasedBox) -> Result<ErasedBox, Error>;
}

/// Caster from a base trait `B` to a concrete type `D`.
pub struct ConcreteCaster<B: ?Sized, D> {
    upcast_rc: fn(Rc<D>) -> Rc<B>,
    upcast_box: fn(Box<D>) -> Box<B>,
}

impl<B: ?Sized + Polymorphic, D: Polymorphic> ConcreteCaster<B, D> {
    /// Both functions are plain unsizing coercions, `|d| d`.
    pub fn new(upcast_rc: fn(Rc<D>) -> Rc<B>, upcast_box: fn(Box<D>) -> Box<B>) -> Self {
        ConcreteCaster {
            upcast_rc,
            upcast_box,
        }
    }
}

impl<B: ?Sized + Polymorphic, D: Polymorphic> PolymorphicCaster for ConcreteCaster<B, D> {
    fn base(&self) -> TypeKey {
        TypeKey::of::<B>()
    }

    fn derived(&self) -> TypeKey {
        TypeKey::of::<D>()
    }

    fn downcast(&self, ptr: ErasedRc) -> Result<ErasedRc, Error> {
        let base = ptr.into_rc::<B>()?;
        let found = <B as Polymorphic>::dyn_type_key(&*base);
        <B as Polymorphic>::into_any_rc(base)
            .downcast::<D>()
            .map(ErasedRc::new)
            .map_err(|_| Error::type_mismatch(type_name::<D>(), found.name()))
    }

    fn upcast(&self, ptr: ErasedRc) -> Result<ErasedRc, Error> {
        let derived = ptr.into_concrete::<D>()?;
        Ok(ErasedRc::new((self.upcast_rc)(derived)))
    }

    fn upcast_box(&self, ptr: ErasedBox) -> Result<ErasedBox, Error> {
        let derived = ptr.into_box::<D>()?;
        Ok(ErasedBox::new((self.upcast_box)(derived)))
    }
}

/// Caster from a base trait `B` to a derived trait `D`.
///
/// Trait objects cannot be downcast directly; the downcast starts from the
/// object's concrete type and replays the registered concrete-to-`D` path.
pub struct TraitCaster<B: ?Sized, D: ?Sized> {
    upcast_rc: fn(Rc<D>) -> Rc<B>,
    upcast_box: fn(Box<D>) -> Box<B>,
}

impl<B: ?Sized + Polymorphic, D: ?Sized + Polymorphic> TraitCaster<B, D> {
    /// Both functions are trait upcasting coercions, `|d| d`.
    pub fn new(upcast_rc: fn(Rc<D>) -> Rc<B>, upcast_box: fn(Box<D>) -> Box<B>) -> Self {
        TraitCaster {
            upcast_rc,
            upcast_box,
        }
    }
}

impl<B: ?Sized + Polymorphic, D: ?Sized + Polymorphic> PolymorphicCaster for TraitCaster<B, D> {
    fn base(&self) -> TypeKey {
        TypeKey::of::<B>()
    }

    fn derived(&self) -> TypeKey {
        TypeKey::of::<D>()
    }

    fn downcast(&self, ptr: ErasedRc) -> Result<ErasedRc, Error> {
        let base = ptr.into_rc::<B>()?;
        let concrete = <B as Polymorphic>::dyn_type_key(&*base);
        let any = <B as Polymorphic>::into_any_rc(base);
        PolymorphicCasters::global()
            .cast_path(self.derived(), concrete)?
            .upcast(ErasedRc::from_any(any, concrete))
    }

    fn upcast(&self, ptr: ErasedRc) -> Result<ErasedRc, Error> {
        let derived = ptr.into_rc::<D>()?;
        Ok(ErasedRc::new((self.upcast_rc)(derived)))
    }

    fn upcast_box(&self, ptr: ErasedBox) -> Result<ErasedBox, Error> {
        let derived = ptr.into_box::<D>()?;
        Ok(ErasedBox::new((self.upcast_box)(derived)))
    }
}

/// Ordered chain of casters from a base (first link) to a derived type
/// (last link). Cloning is O(1).
#[derive(Clone)]
pub struct CastPath {
    links: Arc<[Arc<dyn PolymorphicCaster>]>,
}

impl CastPath {
    pub(crate) fn direct(caster: Arc<dyn PolymorphicCaster>) -> Self {
        CastPath {
            links: Arc::from(vec![caster]),
        }
    }

    pub(crate) fn compose(&self, tail: &CastPath) -> Self {
        let links: Vec<_> = self.links.iter().chain(tail.links.iter()).cloned().collect();
        CastPath {
            links: Arc::from(links),
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn links(&self) -> &[Arc<dyn PolymorphicCaster>] {
        &self.links
    }

    /// Applies the links base to derived.
    pub fn downcast(&self, ptr: ErasedRc) -> Result<ErasedRc, Error> {
        self.links.iter().try_fold(ptr, |ptr, link| link.downcast(ptr))
    }

    /// Applies the links derived to base.
    pub fn upcast(&self, ptr: ErasedRc) -> Result<ErasedRc, Error> {
        self.links
            .iter()
            .rev()
            .try_fold(ptr, |ptr, link| link.upcast(ptr))
    }

    pub fn upcast_box(&self, ptr: ErasedBox) -> Result<ErasedBox, Error> {
        self.links
            .iter()
            .rev()
            .try_fold(ptr, |ptr, link| link.upcast_box(ptr))
    }
}

impl fmt::Debug for CastPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.links
                    .iter()
                    .map(|link| format!("{} -> {}", link.base(), link.derived())),
            )
            .finish()
    }
}
