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

//! Per-archive object identity tables.
//!
//! Output side: `Unseen -> Writing -> Seen(id)`, keyed by the address of the
//! shared allocation. Input side: `Unseen -> Provisional(id) -> Valid(id)`,
//! keyed by the stream id. Ids start at 1; 0 is the null pointer.

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Error;
use crate::types::{MSB_32BIT, NULL_ID};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SharedState {
    /// The body is being written; nested references only get the id.
    Writing,
    Seen,
}

struct SharedEntry {
    id: u32,
    state: SharedState,
}

/// Assigns stream ids to shared allocations during one serialization run.
///
/// Every registered allocation is anchored by an `Rc<dyn Any>` clone, so an
/// address cannot be freed and reused by another object while the archive
/// is alive.
///
/// ```rust
/// use morphic_core::resolver::identity::IdentityWriter;
/// use morphic_core::types::MSB_32BIT;
/// use std::rc::Rc;
///
/// let mut identity = IdentityWriter::new();
/// let rc = Rc::new(42);
/// assert_eq!(identity.register(&rc), 1 | MSB_32BIT);
/// assert_eq!(identity.register(&rc.clone()), 1);
/// ```
pub struct IdentityWriter {
    ids: HashMap<usize, SharedEntry>,
    anchors: Vec<Rc<dyn Any>>,
    next_id: u32,
}

impl Default for IdentityWriter {
    fn default() -> Self {
        IdentityWriter {
            ids: HashMap::new(),
            anchors: Vec::new(),
            next_id: 1,
        }
    }
}

impl IdentityWriter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    fn address<T: ?Sized>(rc: &Rc<T>) -> usize {
        Rc::as_ptr(rc) as *const () as usize
    }

    /// Returns the id to write for `rc`. The msb is set when the allocation
    /// is new to this archive and its body must follow.
    pub fn register<T: Any>(&mut self, rc: &Rc<T>) -> u32 {
        let addr = Self::address(rc);
        if let Some(entry) = self.ids.get(&addr) {
            if entry.state == SharedState::Writing {
                tracing::trace!(id = entry.id, "back reference to object still being written");
            }
            return entry.id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.ids.insert(
            addr,
            SharedEntry {
                id,
                state: SharedState::Writing,
            },
        );
        let anchor: Rc<dyn Any> = rc.clone();
        self.anchors.push(anchor);
        tracing::trace!(id, type_name = std::any::type_name::<T>(), "assigned shared id");
        id | MSB_32BIT
    }

    /// Marks the body of `rc` as completely written.
    pub fn finish<T: ?Sized>(&mut self, rc: &Rc<T>) {
        if let Some(entry) = self.ids.get_mut(&Self::address(rc)) {
            entry.state = SharedState::Seen;
        }
    }

    pub fn state<T: ?Sized>(&self, rc: &Rc<T>) -> Option<SharedState> {
        self.ids.get(&Self::address(rc)).map(|entry| entry.state)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.anchors.clear();
        self.next_id = 1;
    }
}

/// Invoked with the finished object once a provisional id becomes valid.
/// An error fails the load that finished the object.
pub type ResolveCallback = Box<dyn FnOnce(&Rc<dyn Any>) -> Result<(), Error>>;

pub enum SharedSlot {
    /// Id read, body still being constructed.
    Provisional,
    Valid(Rc<dyn Any>),
}

/// Resolves stream ids back to shared objects during one deserialization run.
///
/// ```rust
/// use morphic_core::resolver::identity::IdentityReader;
/// use std::any::Any;
/// use std::rc::Rc;
///
/// let mut identity = IdentityReader::new();
/// identity.begin(1).unwrap();
/// assert!(identity.resolve(1).unwrap().is_none());
/// let rc: Rc<dyn Any> = Rc::new(7u32);
/// identity.finish(1, rc.clone()).unwrap();
/// assert!(Rc::ptr_eq(&identity.resolve(1).unwrap().unwrap(), &rc));
/// assert!(identity.resolve(2).is_err());
/// ```
#[derive(Default)]
pub struct IdentityReader {
    slots: HashMap<u32, SharedSlot>,
    callbacks: HashMap<u32, Vec<ResolveCallback>>,
}

impl IdentityReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `id` as provisional before its body is read.
    pub fn begin(&mut self, id: u32) -> Result<(), Error> {
        if id == NULL_ID {
            return Err(Error::invalid_data("shared id 0 cannot carry a body"));
        }
        if self.slots.contains_key(&id) {
            return Err(Error::invalid_data(format!(
                "shared id {} has its body written twice",
                id
            )));
        }
        self.slots.insert(id, SharedSlot::Provisional);
        Ok(())
    }

    /// Stores the constructed object for `id` and resolves pending weak references.
    pub fn finish(&mut self, id: u32, rc: Rc<dyn Any>) -> Result<(), Error> {
        self.slots.insert(id, SharedSlot::Valid(rc.clone()));
        if let Some(callbacks) = self.callbacks.remove(&id) {
            tracing::trace!(id, count = callbacks.len(), "resolving pending weak references");
            for callback in callbacks {
                callback(&rc)?;
            }
        }
        Ok(())
    }

    /// `Some` for a valid id, `None` for a provisional one.
    pub fn resolve(&self, id: u32) -> Result<Option<Rc<dyn Any>>, Error> {
        match self.slots.get(&id) {
            Some(SharedSlot::Valid(rc)) => Ok(Some(rc.clone())),
            Some(SharedSlot::Provisional) => Ok(None),
            None => Err(Error::unknown_shared_id(id)),
        }
    }

    /// Defers `callback` until the provisional `id` becomes valid.
    pub fn on_resolved(&mut self, id: u32, callback: ResolveCallback) {
        self.callbacks.entry(id).or_default().push(callback);
    }

    pub fn has_pending(&self) -> bool {
        !self.callbacks.is_empty()
    }

    /// Fails when a weak reference is still waiting for its target.
    pub fn check_resolved(&self) -> Result<(), Error> {
        match self.callbacks.keys().min() {
            Some(&id) => Err(Error::invalid_data(format!(
                "weak reference to shared id {} was never resolved",
                id
            ))),
            None => Ok(()),
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.callbacks.clear();
    }
}
