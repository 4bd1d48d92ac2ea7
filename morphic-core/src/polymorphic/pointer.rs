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

//! Saving and loading pointers to polymorphic bases.
//!
//! Record layout: the polymorphic id (`u32`, msb set when the type name
//! follows), the name on first occurrence, then the concrete record of the
//! binding, which is a shared or unique pointer record of the concrete type.
//! A null pointer is a polymorphic id of 0 with nothing after it.
//!
//! The relation between the base and the concrete type is checked before
//! any byte of the record is written or any body is read.

use std::any::Any;
use std::rc::Rc;

use crate::archive::{InputArchive, OutputArchive};
use crate::error::Error;
use crate::polymorphic::binding::{BindingRegistry, InputBinding, SharedErased};
use crate::polymorphic::erased::{ErasedBox, ErasedRc};
use crate::polymorphic::relations::PolymorphicCasters;
use crate::polymorphic::Polymorphic;
use crate::serializer::{
    load_shared_concrete, save_shared_concrete, Load, PendingRef, Save, SharedHandle,
};
use crate::types::{is_first_occurrence, strip_msb, TypeKey, NULL_ID};

fn require_relation(base: TypeKey, derived: TypeKey) -> Result<(), Error> {
    PolymorphicCasters::global()
        .cast_path(base, derived)
        .map(|_| ())
}

fn write_metadata<A: OutputArchive>(ar: &mut A, name: &'static str) -> Result<(), Error> {
    let id = ar.context().type_names.register(name);
    ar.write_u32(id)?;
    if is_first_occurrence(id) {
        ar.write_str(name)?;
    }
    Ok(())
}

fn read_metadata<A: InputArchive>(ar: &mut A) -> Result<Option<InputBinding<A>>, Error> {
    let id = ar.read_u32()?;
    if id == NULL_ID {
        return Ok(None);
    }
    let registry = BindingRegistry::global();
    if is_first_occurrence(id) {
        let name = ar.read_string()?;
        let binding = registry.input::<A>(&name)?;
        ar.context().type_names.register(strip_msb(id), name)?;
        return Ok(Some(binding));
    }
    let name = ar.context().type_names.get(id)?;
    registry.input::<A>(name).map(Some)
}

/// Writes `rc` through the binding of its dynamic type.
pub fn save_shared<A, B>(rc: &Rc<B>, ar: &mut A) -> Result<(), Error>
where
    A: OutputArchive,
    B: ?Sized + Polymorphic,
{
    let key = <B as Polymorphic>::dyn_type_key(&**rc);
    let binding = BindingRegistry::global().output::<A>(key)?;
    require_relation(TypeKey::of::<B>(), key)?;
    write_metadata(ar, binding.name)?;
    (binding.save_shared)(ar, ErasedRc::new(rc.clone()))
}

pub fn save_null<A: OutputArchive>(ar: &mut A) -> Result<(), Error> {
    ar.write_u32(NULL_ID)
}

/// Writes a uniquely owned object through the binding of its dynamic type.
pub fn save_unique<A, B>(value: Option<&B>, ar: &mut A) -> Result<(), Error>
where
    A: OutputArchive,
    B: ?Sized + Polymorphic,
{
    let Some(value) = value else {
        return save_null(ar);
    };
    let key = <B as Polymorphic>::dyn_type_key(value);
    let binding = BindingRegistry::global().output::<A>(key)?;
    require_relation(TypeKey::of::<B>(), key)?;
    write_metadata(ar, binding.name)?;
    (binding.save_unique)(ar, <B as Polymorphic>::as_any(value), TypeKey::of::<B>())
}

/// Reads a shared pointer to the base `B`.
pub fn load_shared<A, B>(ar: &mut A) -> Result<SharedHandle<B>, Error>
where
    A: InputArchive,
    B: ?Sized + Polymorphic,
{
    let Some(binding) = read_metadata::<A>(ar)? else {
        return Ok(SharedHandle::Null);
    };
    let base = TypeKey::of::<B>();
    let concrete = binding.key;
    require_relation(base, concrete)?;
    match (binding.load_shared)(ar, base)? {
        SharedErased::Ready(ptr) => ptr.into_rc::<B>().map(SharedHandle::Ready),
        SharedErased::Pending(id) => Ok(SharedHandle::Pending(PendingRef::new(
            id,
            Box::new(move |object: Rc<dyn Any>| {
                PolymorphicCasters::global()
                    .upcast_any(object, concrete, base)?
                    .into_rc::<B>()
            }),
        ))),
    }
}

/// Reads a uniquely owned pointer to the base `B`.
pub fn load_unique<A, B>(ar: &mut A) -> Result<Option<Box<B>>, Error>
where
    A: InputArchive,
    B: ?Sized + Polymorphic,
{
    let Some(binding) = read_metadata::<A>(ar)? else {
        return Ok(None);
    };
    let base = TypeKey::of::<B>();
    require_relation(base, binding.key)?;
    (binding.load_unique)(ar, base)?.into_box::<B>().map(Some)
}

pub(crate) fn save_shared_body<A, T>(ar: &mut A, ptr: ErasedRc) -> Result<(), Error>
where
    A: OutputArchive,
    T: Save + Polymorphic,
{
    let rc = PolymorphicCasters::global().downcast_rc::<T>(ptr)?;
    save_shared_concrete(&rc, ar)
}

pub(crate) fn save_unique_body<A, T>(ar: &mut A, object: &dyn Any, base: TypeKey) -> Result<(), Error>
where
    A: OutputArchive,
    T: Save + Polymorphic,
{
    let value = PolymorphicCasters::global().downcast_ref::<T>(object, base)?;
    ar.write_u8(1)?;
    value.save(ar)
}

pub(crate) fn load_shared_body<A, T>(ar: &mut A, base: TypeKey) -> Result<SharedErased, Error>
where
    A: InputArchive,
    T: Load + Polymorphic,
{
    match load_shared_concrete::<A, T>(ar)? {
        SharedHandle::Ready(rc) => PolymorphicCasters::global()
            .upcast_rc(rc, base)
            .map(SharedErased::Ready),
        SharedHandle::Pending(pending) => Ok(SharedErased::Pending(pending.id())),
        SharedHandle::Null => Err(Error::invalid_data(format!(
            "polymorphic record of {} holds a null shared id",
            std::any::type_name::<T>()
        ))),
    }
}

pub(crate) fn load_unique_body<A, T>(ar: &mut A, base: TypeKey) -> Result<ErasedBox, Error>
where
    A: InputArchive,
    T: Load + Polymorphic,
{
    let flag = ar.read_u8()?;
    crate::ensure!(
        flag == 1,
        Error::invalid_data(format!("invalid unique pointer flag {} in polymorphic record", flag))
    );
    ar.context().inc_depth()?;
    let value = T::load(ar)?;
    ar.context().dec_depth();
    PolymorphicCasters::global().upcast_box(Box::new(value), base)
}
