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

//! Weak pointer serialization.
//!
//! [`RcWeak<T>`] wraps `std::rc::Weak<T>` in a cell shared by all clones.
//! A weak pointer is written as the shared pointer record of its target,
//! so it aliases the strong pointers to the same object, or as a null
//! record when the target is gone.
//!
//! On load, a weak pointer may refer to an object whose body is still
//! being read, for example a child pointing back at its parent. The cell
//! is then left empty and filled in once the parent is constructed.
//!
//! ```rust
//! use morphic_core::archive::{BinaryInputArchive, BinaryOutputArchive, InputArchive, OutputArchive};
//! use morphic_core::error::Error;
//! use morphic_core::serializer::{Load, RcWeak, Save};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! struct Node {
//!     value: i32,
//!     parent: RcWeak<RefCell<Node>>,
//!     children: Vec<Rc<RefCell<Node>>>,
//! }
//!
//! impl Save for Node {
//!     fn save<A: OutputArchive>(&self, ar: &mut A) -> Result<(), Error> {
//!         ar.process(&self.value)?;
//!         ar.process(&self.parent)?;
//!         ar.process(&self.children)
//!     }
//! }
//!
//! impl Load for Node {
//!     fn load<A: InputArchive>(ar: &mut A) -> Result<Self, Error> {
//!         Ok(Node {
//!             value: ar.process()?,
//!             parent: ar.process()?,
//!             children: ar.process()?,
//!         })
//!     }
//! }
//!
//! let parent = Rc::new(RefCell::new(Node {
//!     value: 1,
//!     parent: RcWeak::new(),
//!     children: vec![],
//! }));
//! let child = Rc::new(RefCell::new(Node {
//!     value: 2,
//!     parent: RcWeak::from(&parent),
//!     children: vec![],
//! }));
//! parent.borrow_mut().children.push(child);
//!
//! let mut out = BinaryOutputArchive::new();
//! out.process(&parent).unwrap();
//! let mut input = BinaryInputArchive::new(out.into_bytes()).unwrap();
//! let loaded: Rc<RefCell<Node>> = input.process().unwrap();
//!
//! let loaded_child = loaded.borrow().children[0].clone();
//! let back = loaded_child.borrow().parent.upgrade().unwrap();
//! assert!(Rc::ptr_eq(&loaded, &back));
//! assert_eq!(loaded_child.borrow().value, 2);
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::archive::{InputArchive, OutputArchive};
use crate::error::Error;
use crate::serializer::{Load, Pointee, Save, SharedHandle};

pub struct RcWeak<T: ?Sized> {
    // clones share the cell, so patching one patches all of them
    inner: Rc<RefCell<Option<Weak<T>>>>,
}

impl<T: ?Sized> std::fmt::Debug for RcWeak<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RcWeak")
            .field("strong_count", &self.strong_count())
            .finish()
    }
}

impl<T: ?Sized> RcWeak<T> {
    /// An empty weak pointer that never upgrades until updated.
    pub fn new() -> Self {
        RcWeak {
            inner: Rc::new(RefCell::new(None)),
        }
    }

    pub fn upgrade(&self) -> Option<Rc<T>> {
        self.inner.borrow().as_ref().and_then(Weak::upgrade)
    }

    pub fn strong_count(&self) -> usize {
        self.inner.borrow().as_ref().map_or(0, Weak::strong_count)
    }

    /// True when both point to the same allocation, or both are empty.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self.inner.borrow().as_ref(), other.inner.borrow().as_ref()) {
            (Some(a), Some(b)) => Weak::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    pub fn update(&self, weak: Weak<T>) {
        *self.inner.borrow_mut() = Some(weak);
    }

    pub fn from_std(weak: Weak<T>) -> Self {
        RcWeak {
            inner: Rc::new(RefCell::new(Some(weak))),
        }
    }
}

impl<T: ?Sized> Default for RcWeak<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for RcWeak<T> {
    fn clone(&self) -> Self {
        RcWeak {
            inner: self.inner.clone(),
        }
    }
}

impl<T: ?Sized> From<&Rc<T>> for RcWeak<T> {
    fn from(rc: &Rc<T>) -> Self {
        RcWeak::from_std(Rc::downgrade(rc))
    }
}

impl<T: Pointee + ?Sized> Save for RcWeak<T> {
    fn save<A: OutputArchive>(&self, ar: &mut A) -> Result<(), Error> {
        match self.upgrade() {
            Some(rc) => T::save_shared(&rc, ar),
            None => T::save_null(ar),
        }
    }
}

impl<T: Pointee + ?Sized> Load for RcWeak<T> {
    fn load<A: InputArchive>(ar: &mut A) -> Result<Self, Error> {
        match T::load_shared(ar)? {
            SharedHandle::Null => Ok(RcWeak::new()),
            SharedHandle::Ready(rc) => Ok(RcWeak::from(&rc)),
            SharedHandle::Pending(pending) => {
                let weak = RcWeak::new();
                let cell = weak.clone();
                let id = pending.id();
                ar.context().identity.on_resolved(
                    id,
                    Box::new(move |object: &Rc<dyn Any>| -> Result<(), Error> {
                        let rc = pending.resolve(object.clone())?;
                        cell.update(Rc::downgrade(&rc));
                        tracing::trace!(id, "patched weak reference");
                        Ok(())
                    }),
                );
                Ok(weak)
            }
        }
    }

    fn placeholder() -> Option<Self> {
        Some(RcWeak::new())
    }
}
