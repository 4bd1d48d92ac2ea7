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

use std::any::{type_name, Any};
use std::rc::Rc;

use crate::archive::{InputArchive, OutputArchive};
use crate::error::Error;
use crate::serializer::{Load, PendingRef, Pointee, Save, SharedHandle};
use crate::types::{is_first_occurrence, strip_msb, NULL_ID};

/// Writes the shared pointer record of a concrete object: its id, and the
/// body the first time the allocation is seen by this archive.
pub fn save_shared_concrete<A, T>(rc: &Rc<T>, ar: &mut A) -> Result<(), Error>
where
    A: OutputArchive,
    T: Save + Any,
{
    let id = ar.context().identity.register(rc);
    ar.write_u32(id)?;
    if is_first_occurrence(id) {
        T::save(rc, ar)?;
        ar.context().identity.finish(rc);
    }
    Ok(())
}

/// Reads a shared pointer record of a concrete object.
///
/// When `T` has a shared placeholder, the placeholder is allocated and the id
/// registered as valid before the body is read into it, so nested strong
/// references alias the object under construction. Otherwise the id is
/// provisional until the body is read, and nested records pointing back at
/// it see a pending reference instead of re-entering construction.
pub fn load_shared_concrete<A, T>(ar: &mut A) -> Result<SharedHandle<T>, Error>
where
    A: InputArchive,
    T: Load,
{
    let id = ar.read_u32()?;
    if id == NULL_ID {
        return Ok(SharedHandle::Null);
    }
    if is_first_occurrence(id) {
        let id = strip_msb(id);
        ar.context().identity.begin(id)?;
        if let Some(placeholder) = T::shared_placeholder() {
            let rc = Rc::new(placeholder);
            ar.context().identity.finish(id, rc.clone())?;
            ar.context().inc_depth()?;
            T::load_in_place(&rc, ar)?;
            ar.context().dec_depth();
            return Ok(SharedHandle::Ready(rc));
        }
        ar.context().inc_depth()?;
        let value = T::load(ar)?;
        ar.context().dec_depth();
        let rc = Rc::new(value);
        ar.context().identity.finish(id, rc.clone())?;
        return Ok(SharedHandle::Ready(rc));
    }
    match ar.context().identity.resolve(id)? {
        Some(object) => downcast_shared::<T>(object, id).map(SharedHandle::Ready),
        None => Ok(SharedHandle::Pending(PendingRef::new(
            id,
            Box::new(move |object: Rc<dyn Any>| downcast_shared::<T>(object, id)),
        ))),
    }
}

fn downcast_shared<T: Any>(object: Rc<dyn Any>, id: u32) -> Result<Rc<T>, Error> {
    object
        .downcast::<T>()
        .map_err(|_| Error::type_mismatch(type_name::<T>(), format!("shared object {}", id)))
}

impl<T: Pointee + ?Sized> Save for Rc<T> {
    fn save<A: OutputArchive>(&self, ar: &mut A) -> Result<(), Error> {
        T::save_shared(self, ar)
    }
}

impl<T: Pointee + ?Sized> Load for Rc<T> {
    fn load<A: InputArchive>(ar: &mut A) -> Result<Self, Error> {
        match T::load_shared(ar)? {
            SharedHandle::Ready(rc) => Ok(rc),
            SharedHandle::Null => Err(Error::invalid_data(format!(
                "null pointer read for a non-optional Rc<{}>",
                type_name::<T>()
            ))),
            SharedHandle::Pending(pending) => Err(Error::cyclic_reference(pending.id())),
        }
    }
}

impl<T: Pointee + ?Sized> Save for Option<Rc<T>> {
    fn save<A: OutputArchive>(&self, ar: &mut A) -> Result<(), Error> {
        match self {
            Some(rc) => T::save_shared(rc, ar),
            None => T::save_null(ar),
        }
    }
}

impl<T: Pointee + ?Sized> Load for Option<Rc<T>> {
    fn load<A: InputArchive>(ar: &mut A) -> Result<Self, Error> {
        match T::load_shared(ar)? {
            SharedHandle::Ready(rc) => Ok(Some(rc)),
            SharedHandle::Null => Ok(None),
            SharedHandle::Pending(pending) => Err(Error::cyclic_reference(pending.id())),
        }
    }

    fn placeholder() -> Option<Self> {
        Some(None)
    }
}
