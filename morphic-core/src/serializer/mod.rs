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

//! Serialization contract and the built-in implementations.

use std::any::Any;
use std::rc::Rc;

use crate::archive::{InputArchive, OutputArchive};
use crate::error::Error;

mod box_;
mod list;
mod number;
mod rc;
mod refcell;
mod string;
pub mod weak;

pub use rc::{load_shared_concrete, save_shared_concrete};
pub use weak::RcWeak;

/// Writes a value into an output archive.
pub trait Save {
    fn save<A: OutputArchive>(&self, ar: &mut A) -> Result<(), Error>;
}

/// Constructs a value from an input archive.
///
/// [`load`](Load::load) builds the value from the archive in one step. Types
/// that can also be built in two steps (allocate a placeholder, then fill its
/// fields) report it through [`shared_placeholder`](Load::shared_placeholder).
/// A shared object loaded that way is valid before its body is read, so
/// strong references back to it from inside the body alias the real object.
/// `RefCell<T>` and derived structs whose fields all support it do.
pub trait Load: Sized + 'static {
    fn load<A: InputArchive>(ar: &mut A) -> Result<Self, Error>;

    /// A value that stands in for `Self` until the real one is read.
    fn placeholder() -> Option<Self> {
        None
    }

    /// A placeholder that [`load_in_place`](Load::load_in_place) can fill.
    fn shared_placeholder() -> Option<Self> {
        None
    }

    /// Reads the body into a value obtained from
    /// [`shared_placeholder`](Load::shared_placeholder).
    fn load_in_place<A: InputArchive>(&self, _ar: &mut A) -> Result<(), Error> {
        Err(Error::invalid_data(format!(
            "{} cannot be loaded in place",
            std::any::type_name::<Self>()
        )))
    }
}

/// A type that smart pointers (`Rc`, `Box`, [`RcWeak`]) can point to.
///
/// Every sized `Save + Load` type is a pointee. A polymorphic base trait
/// becomes one through [`polymorphic_base!`](crate::polymorphic_base), which
/// routes these calls through the polymorphic bindings.
pub trait Pointee: 'static {
    fn save_shared<A: OutputArchive>(rc: &Rc<Self>, ar: &mut A) -> Result<(), Error>;

    fn save_null<A: OutputArchive>(ar: &mut A) -> Result<(), Error>;

    fn load_shared<A: InputArchive>(ar: &mut A) -> Result<SharedHandle<Self>, Error>;

    fn save_unique<A: OutputArchive>(value: Option<&Self>, ar: &mut A) -> Result<(), Error>;

    fn load_unique<A: InputArchive>(ar: &mut A) -> Result<Option<Box<Self>>, Error>;
}

impl<T: Save + Load> Pointee for T {
    #[inline(always)]
    fn save_shared<A: OutputArchive>(rc: &Rc<Self>, ar: &mut A) -> Result<(), Error> {
        save_shared_concrete(rc, ar)
    }

    #[inline(always)]
    fn save_null<A: OutputArchive>(ar: &mut A) -> Result<(), Error> {
        ar.write_u32(crate::types::NULL_ID)
    }

    #[inline(always)]
    fn load_shared<A: InputArchive>(ar: &mut A) -> Result<SharedHandle<Self>, Error> {
        load_shared_concrete(ar)
    }

    fn save_unique<A: OutputArchive>(value: Option<&Self>, ar: &mut A) -> Result<(), Error> {
        match value {
            None => ar.write_u8(0),
            Some(value) => {
                ar.write_u8(1)?;
                value.save(ar)
            }
        }
    }

    fn load_unique<A: InputArchive>(ar: &mut A) -> Result<Option<Box<Self>>, Error> {
        match ar.read_u8()? {
            0 => Ok(None),
            1 => {
                ar.context().inc_depth()?;
                let value = T::load(ar)?;
                ar.context().dec_depth();
                Ok(Some(Box::new(value)))
            }
            other => Err(Error::invalid_data(format!(
                "invalid unique pointer flag {}",
                other
            ))),
        }
    }
}

/// Result of reading a shared pointer record.
pub enum SharedHandle<T: ?Sized> {
    Null,
    Ready(Rc<T>),
    /// The record refers to an object whose body is still being read.
    Pending(PendingRef<T>),
}

/// A reference to a shared object that is not constructed yet.
///
/// Keeps the conversion from the stored concrete object to `Rc<T>`, to be
/// applied once the object becomes valid.
pub struct PendingRef<T: ?Sized> {
    id: u32,
    convert: Box<dyn FnOnce(Rc<dyn Any>) -> Result<Rc<T>, Error>>,
}

impl<T: ?Sized> PendingRef<T> {
    pub fn new(id: u32, convert: Box<dyn FnOnce(Rc<dyn Any>) -> Result<Rc<T>, Error>>) -> Self {
        PendingRef { id, convert }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn resolve(self, object: Rc<dyn Any>) -> Result<Rc<T>, Error> {
        (self.convert)(object)
    }
}
