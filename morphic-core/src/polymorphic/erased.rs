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

use crate::error::Error;
use crate::types::TypeKey;

/// A strongly typed `Rc<T>` behind `dyn Any`, tagged with the key of `T`.
///
/// This is what travels along a cast path. The view is either an `Rc<T>`
/// for the tagged type, or an `Rc<dyn Any>` holding the concrete type when
/// the pointer came back out of an identity table.
pub struct ErasedRc {
    view: Box<dyn Any>,
    key: TypeKey,
}

impl ErasedRc {
    pub fn new<T: ?Sized + 'static>(rc: Rc<T>) -> Self {
        let view: Box<dyn Any> = Box::new(rc);
        ErasedRc {
            view,
            key: TypeKey::of::<T>(),
        }
    }

    /// Wraps a type-erased concrete object whose type is `concrete`.
    pub fn from_any(any: Rc<dyn Any>, concrete: TypeKey) -> Self {
        let view: Box<dyn Any> = Box::new(any);
        ErasedRc {
            view,
            key: concrete,
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Recovers the exact `Rc<T>` this handle was built from.
    pub fn into_rc<T: ?Sized + 'static>(self) -> Result<Rc<T>, Error> {
        let found = self.key;
        self.view
            .downcast::<Rc<T>>()
            .map(|rc| *rc)
            .map_err(|_| Error::type_mismatch(type_name::<T>(), found.name()))
    }

    /// Like [`into_rc`](Self::into_rc), also accepting an `Rc<dyn Any>` view
    /// of a sized `T`.
    pub fn into_concrete<T: Any>(self) -> Result<Rc<T>, Error> {
        let found = self.key;
        let mismatch = || Error::type_mismatch(type_name::<T>(), found.name());
        match self.view.downcast::<Rc<T>>() {
            Ok(rc) => Ok(*rc),
            Err(view) => {
                let any = view.downcast::<Rc<dyn Any>>().map_err(|_| mismatch())?;
                (*any).downcast::<T>().map_err(|_| mismatch())
            }
        }
    }
}

/// A strongly typed `Box<T>` behind `dyn Any`, tagged with the key of `T`.
pub struct ErasedBox {
    view: Box<dyn Any>,
    key: TypeKey,
}

impl ErasedBox {
    pub fn new<T: ?Sized + 'static>(boxed: Box<T>) -> Self {
        let view: Box<dyn Any> = Box::new(boxed);
        ErasedBox {
            view,
            key: TypeKey::of::<T>(),
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn into_box<T: ?Sized + 'static>(self) -> Result<Box<T>, Error> {
        let found = self.key;
        self.view
            .downcast::<Box<T>>()
            .map(|boxed| *boxed)
            .map_err(|_| Error::type_mismatch(type_name::<T>(), found.name()))
    }
}
