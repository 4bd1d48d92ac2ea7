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

//! Per-archive serializer bindings for polymorphic types.

use std::any::{type_name, Any, TypeId};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;

use crate::archive::{
    BinaryInputArchive, BinaryOutputArchive, CompactInputArchive, CompactOutputArchive,
    InputArchive, OutputArchive,
};
use crate::error::Error;
use crate::polymorphic::erased::{ErasedBox, ErasedRc};
use crate::polymorphic::pointer;
use crate::polymorphic::Polymorphic;
use crate::serializer::{Load, Save};
use crate::types::TypeKey;

/// Writes one concrete type through archive `A` given a base-typed view.
pub struct OutputBinding<A> {
    pub name: &'static str,
    pub key: TypeKey,
    pub save_shared: fn(&mut A, ErasedRc) -> Result<(), Error>,
    pub save_unique: fn(&mut A, &dyn Any, TypeKey) -> Result<(), Error>,
}

impl<A: OutputArchive> OutputBinding<A> {
    pub fn of<T: Save + Polymorphic>(name: &'static str) -> Self {
        OutputBinding {
            name,
            key: TypeKey::of::<T>(),
            save_shared: pointer::save_shared_body::<A, T>,
            save_unique: pointer::save_unique_body::<A, T>,
        }
    }
}

impl<A> Clone for OutputBinding<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for OutputBinding<A> {}

/// A shared object produced by an input binding.
pub enum SharedErased {
    Ready(ErasedRc),
    /// The id is still being constructed further up the stack.
    Pending(u32),
}

/// Constructs one concrete type from archive `A` and returns it as the base
/// type named by the `TypeKey` argument.
pub struct InputBinding<A> {
    pub name: &'static str,
    pub key: TypeKey,
    pub load_shared: fn(&mut A, TypeKey) -> Result<SharedErased, Error>,
    pub load_unique: fn(&mut A, TypeKey) -> Result<ErasedBox, Error>,
}

impl<A: InputArchive> InputBinding<A> {
    pub fn of<T: Load + Polymorphic>(name: &'static str) -> Self {
        InputBinding {
            name,
            key: TypeKey::of::<T>(),
            load_shared: pointer::load_shared_body::<A, T>,
            load_unique: pointer::load_unique_body::<A, T>,
        }
    }
}

impl<A> Clone for InputBinding<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for InputBinding<A> {}

/// Output bindings of archive `A`, by concrete type.
pub struct OutputBindingMap<A> {
    by_key: HashMap<TypeKey, OutputBinding<A>>,
}

/// Input bindings of archive `A`, by registered name.
pub struct InputBindingMap<A> {
    by_name: HashMap<&'static str, InputBinding<A>>,
}

trait BindingTable: Send + Sync + 'static {
    type Binding: 'static;

    fn empty() -> Self;

    fn insert(&mut self, binding: Self::Binding);
}

impl<A: 'static> BindingTable for OutputBindingMap<A> {
    type Binding = OutputBinding<A>;

    fn empty() -> Self {
        OutputBindingMap {
            by_key: HashMap::new(),
        }
    }

    fn insert(&mut self, binding: OutputBinding<A>) {
        self.by_key.insert(binding.key, binding);
    }
}

impl<A: 'static> BindingTable for InputBindingMap<A> {
    type Binding = InputBinding<A>;

    fn empty() -> Self {
        InputBindingMap {
            by_name: HashMap::new(),
        }
    }

    fn insert(&mut self, binding: InputBinding<A>) {
        self.by_name.insert(binding.name, binding);
    }
}

type BindFn = fn(TypeId, &'static str) -> Option<Box<dyn Any + Send + Sync>>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Every built-in archive, both directions.
    Builtin,
    /// One binding table.
    Table(TypeId),
}

struct TypeRegistration {
    name: &'static str,
    key: TypeKey,
    scope: Scope,
    bind: BindFn,
}

fn builtin_binding<T>(table: TypeId, name: &'static str) -> Option<Box<dyn Any + Send + Sync>>
where
    T: Save + Load + Polymorphic,
{
    output_binding::<BinaryOutputArchive, T>(table, name)
        .or_else(|| output_binding::<CompactOutputArchive, T>(table, name))
        .or_else(|| input_binding::<BinaryInputArchive, T>(table, name))
        .or_else(|| input_binding::<CompactInputArchive, T>(table, name))
}

fn output_binding<A, T>(table: TypeId, name: &'static str) -> Option<Box<dyn Any + Send + Sync>>
where
    A: OutputArchive,
    T: Save + Polymorphic,
{
    if table != TypeId::of::<OutputBindingMap<A>>() {
        return None;
    }
    Some(Box::new(OutputBinding::<A>::of::<T>(name)))
}

fn input_binding<A, T>(table: TypeId, name: &'static str) -> Option<Box<dyn Any + Send + Sync>>
where
    A: InputArchive,
    T: Load + Polymorphic,
{
    if table != TypeId::of::<InputBindingMap<A>>() {
        return None;
    }
    Some(Box::new(InputBinding::<A>::of::<T>(name)))
}

#[derive(Default)]
struct BindingState {
    registrations: Vec<TypeRegistration>,
    tables: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    conflict: Option<Cow<'static, str>>,
}

impl BindingState {
    fn check(&self) -> Result<(), Error> {
        match &self.conflict {
            Some(conflict) => Err(Error::ambiguous_shape(conflict.clone())),
            None => Ok(()),
        }
    }
}

static BINDINGS: LazyLock<BindingRegistry> = LazyLock::new(|| BindingRegistry {
    state: RwLock::new(BindingState::default()),
});

/// Process-wide registry of polymorphic type names and their bindings.
///
/// Registrations are recorded once; the binding table of a given archive
/// type is built from them on the first polymorphic lookup through that
/// archive and cached until the next registration.
pub struct BindingRegistry {
    state: RwLock<BindingState>,
}

impl BindingRegistry {
    /// The registry, with static registrations applied.
    pub fn global() -> &'static BindingRegistry {
        super::registration::ensure_initialized();
        &BINDINGS
    }

    pub(crate) fn instance() -> &'static BindingRegistry {
        &BINDINGS
    }

    /// Binds `T` under `name` for every built-in archive.
    pub fn register_type<T>(&self, name: &'static str) -> Result<(), Error>
    where
        T: Save + Load + Polymorphic,
    {
        self.add(TypeRegistration {
            name,
            key: TypeKey::of::<T>(),
            scope: Scope::Builtin,
            bind: builtin_binding::<T>,
        })
    }

    /// Binds `T` under `name` for writing through the archive type `A`.
    pub fn bind_output<A, T>(&self, name: &'static str) -> Result<(), Error>
    where
        A: OutputArchive,
        T: Save + Polymorphic,
    {
        self.add(TypeRegistration {
            name,
            key: TypeKey::of::<T>(),
            scope: Scope::Table(TypeId::of::<OutputBindingMap<A>>()),
            bind: output_binding::<A, T>,
        })
    }

    /// Binds `T` under `name` for reading through the archive type `A`.
    pub fn bind_input<A, T>(&self, name: &'static str) -> Result<(), Error>
    where
        A: InputArchive,
        T: Load + Polymorphic,
    {
        self.add(TypeRegistration {
            name,
            key: TypeKey::of::<T>(),
            scope: Scope::Table(TypeId::of::<InputBindingMap<A>>()),
            bind: input_binding::<A, T>,
        })
    }

    fn add(&self, registration: TypeRegistration) -> Result<(), Error> {
        let mut state = self.state.write();
        for existing in &state.registrations {
            if existing.key == registration.key && existing.name != registration.name {
                return Err(Error::ambiguous_shape(format!(
                    "{} is registered under two names, {:?} and {:?}",
                    registration.key, existing.name, registration.name
                )));
            }
            if existing.name == registration.name && existing.key != registration.key {
                return Err(Error::ambiguous_shape(format!(
                    "name {:?} is registered for two types, {} and {}",
                    registration.name, existing.key, registration.key
                )));
            }
            if existing.key == registration.key && existing.scope == registration.scope {
                return Ok(());
            }
        }
        tracing::debug!(
            name = registration.name,
            type_name = registration.key.name(),
            "registered polymorphic type"
        );
        state.registrations.push(registration);
        state.tables.clear();
        Ok(())
    }

    pub(crate) fn poison(&self, error: &Error) {
        let mut state = self.state.write();
        if state.conflict.is_none() {
            state.conflict = Some(Cow::Owned(error.to_string()));
        }
    }

    /// Fails if static registration found conflicting bindings.
    pub fn check(&self) -> Result<(), Error> {
        self.state.read().check()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.state
            .read()
            .registrations
            .iter()
            .any(|registration| registration.name == name)
    }

    /// The output binding of the concrete type `key` for archive `A`.
    pub fn output<A: OutputArchive>(&self, key: TypeKey) -> Result<OutputBinding<A>, Error> {
        let table = self.table::<OutputBindingMap<A>>()?;
        table.by_key.get(&key).copied().ok_or_else(|| {
            Error::unregistered_type(format!(
                "{} is not registered for polymorphic output through {}",
                key,
                type_name::<A>()
            ))
        })
    }

    /// The input binding registered as `name` for archive `A`.
    pub fn input<A: InputArchive>(&self, name: &str) -> Result<InputBinding<A>, Error> {
        let table = self.table::<InputBindingMap<A>>()?;
        table.by_name.get(name).copied().ok_or_else(|| {
            Error::unregistered_type(format!(
                "no type is registered as {:?} for polymorphic input through {}",
                name,
                type_name::<A>()
            ))
        })
    }

    fn table<M: BindingTable>(&self) -> Result<Arc<M>, Error> {
        let table_id = TypeId::of::<M>();
        {
            let state = self.state.read();
            state.check()?;
            if let Some(table) = state.tables.get(&table_id) {
                return Self::downcast_table(table.clone());
            }
        }

        let mut state = self.state.write();
        if let Some(table) = state.tables.get(&table_id) {
            return Self::downcast_table(table.clone());
        }
        let mut table = M::empty();
        let mut count = 0usize;
        for registration in &state.registrations {
            let Some(binding) = (registration.bind)(table_id, registration.name) else {
                continue;
            };
            if let Ok(binding) = binding.downcast::<M::Binding>() {
                table.insert(*binding);
                count += 1;
            }
        }
        tracing::debug!(table = type_name::<M>(), count, "materialized binding table");
        let table = Arc::new(table);
        state.tables.insert(table_id, table.clone());
        Ok(table)
    }

    fn downcast_table<M: BindingTable>(table: Arc<dyn Any + Send + Sync>) -> Result<Arc<M>, Error> {
        table
            .downcast::<M>()
            .map_err(|_| Error::unknown(format!("binding table is not a {}", type_name::<M>())))
    }
}
