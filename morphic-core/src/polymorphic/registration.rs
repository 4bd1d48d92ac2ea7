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

use std::cell::Cell;
use std::sync::OnceLock;

use crate::error::Error;
use crate::polymorphic::binding::BindingRegistry;
use crate::polymorphic::relations::PolymorphicCasters;

/// A registration submitted at compile time by
/// [`register_polymorphic!`](crate::register_polymorphic) or
/// [`register_polymorphic_relation!`](crate::register_polymorphic_relation).
///
/// `apply` should register through the handles it is given. Calling the
/// public helpers (`register_relation`, `register_type`, `::global()`) from
/// inside it also works: on the initializing thread they skip
/// [`ensure_initialized`] instead of waiting on it.
pub struct StaticRegistration {
    apply: fn(&PolymorphicCasters, &BindingRegistry) -> Result<(), Error>,
}

impl StaticRegistration {
    pub const fn new(apply: fn(&PolymorphicCasters, &BindingRegistry) -> Result<(), Error>) -> Self {
        StaticRegistration { apply }
    }
}

inventory::collect!(StaticRegistration);

static INITIALIZED: OnceLock<()> = OnceLock::new();

thread_local! {
    static APPLYING: Cell<bool> = const { Cell::new(false) };
}

struct ApplyingGuard;

impl ApplyingGuard {
    fn enter() -> Self {
        APPLYING.with(|applying| applying.set(true));
        ApplyingGuard
    }
}

impl Drop for ApplyingGuard {
    fn drop(&mut self) {
        APPLYING.with(|applying| applying.set(false));
    }
}

/// Applies every static registration exactly once per process.
///
/// Called by the registry accessors, so user code never needs to call it.
/// A conflicting registration does not abort startup: it is logged and
/// reported by every later polymorphic (de)serialization.
pub fn ensure_initialized() {
    // re-entered from an apply fn on this thread
    if APPLYING.with(Cell::get) {
        return;
    }
    INITIALIZED.get_or_init(|| {
        let _guard = ApplyingGuard::enter();
        let casters = PolymorphicCasters::instance();
        let bindings = BindingRegistry::instance();
        let mut count = 0usize;
        for registration in inventory::iter::<StaticRegistration> {
            if let Err(error) = (registration.apply)(casters, bindings) {
                tracing::warn!(%error, "static polymorphic registration failed");
                bindings.poison(&error);
            }
            count += 1;
        }
        tracing::debug!(count, "applied static polymorphic registrations");
    });
}
