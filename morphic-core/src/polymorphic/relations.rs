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

//! Registry of base/derived relations with cached shortest cast paths.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;

use crate::error::Error;
use crate::polymorphic::caster::{CastPath, ConcreteCaster, PolymorphicCaster, TraitCaster};
use crate::polymorphic::erased::{ErasedBox, ErasedRc};
use crate::polymorphic::registration::ensure_initialized;
use crate::polymorphic::Polymorphic;
use crate::types::TypeKey;

/// Directed graph of known relations.
///
/// `paths[base][derived]` holds the shortest known chain of casters from
/// `base` to `derived`, for every pair connected directly or transitively.
/// `ancestors[derived]` lists every `base` with such an entry.
#[derive(Default)]
pub struct RelationGraph {
    paths: HashMap<TypeKey, HashMap<TypeKey, CastPath>>,
    ancestors: HashMap<TypeKey, Vec<TypeKey>>,
}

impl RelationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, base: TypeKey, derived: TypeKey) -> Option<CastPath> {
        self.paths.get(&base)?.get(&derived).cloned()
    }

    pub fn exists(&self, base: TypeKey, derived: TypeKey) -> bool {
        self.paths
            .get(&base)
            .is_some_and(|children| children.contains_key(&derived))
    }

    /// Number of (base, derived) pairs with a known path.
    pub fn len(&self) -> usize {
        self.paths.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Inserts the direct relation described by `caster` and shortens every
    /// path that can now route through it.
    ///
    /// Returns `false` when the direct relation was already known.
    pub fn register(&mut self, caster: Arc<dyn PolymorphicCaster>) -> bool {
        let base = caster.base();
        let derived = caster.derived();
        if base == derived {
            return false;
        }
        if self.lookup(base, derived).is_some_and(|path| path.len() == 1) {
            return false;
        }

        self.paths
            .entry(base)
            .or_default()
            .insert(derived, CastPath::direct(caster));
        self.add_ancestor(derived, base);

        let mut dirty: HashSet<TypeKey> = HashSet::from([derived]);
        let mut processed: HashSet<TypeKey> = HashSet::from([base]);
        let mut parents = vec![base];

        while let Some(parent) = parents.pop() {
            let updates = self.shorter_paths_from(parent, &dirty);
            for (target, path) in updates {
                tracing::trace!(
                    base = %parent,
                    derived = %target,
                    links = path.len(),
                    "updated cast path"
                );
                self.paths.entry(parent).or_default().insert(target, path);
                self.add_ancestor(target, parent);
            }
            dirty.insert(parent);

            if let Some(grandparents) = self.ancestors.get(&parent) {
                for grandparent in grandparents {
                    if processed.insert(*grandparent) {
                        parents.push(*grandparent);
                    }
                }
            }
        }
        true
    }

    /// Paths from `parent` that become strictly shorter by routing through
    /// one of its dirty descendants. Equal-length alternatives keep the path
    /// found first; descendants are visited in `TypeKey` order.
    fn shorter_paths_from(
        &self,
        parent: TypeKey,
        dirty: &HashSet<TypeKey>,
    ) -> Vec<(TypeKey, CastPath)> {
        let mut updates: Vec<(TypeKey, CastPath)> = Vec::new();
        let Some(children) = self.paths.get(&parent) else {
            return updates;
        };
        let mut child_keys: Vec<TypeKey> = children
            .keys()
            .filter(|child| dirty.contains(*child))
            .copied()
            .collect();
        child_keys.sort();

        for child in child_keys {
            let Some(grandchildren) = self.paths.get(&child) else {
                continue;
            };
            let parent_child = &children[&child];
            let mut targets: Vec<(&TypeKey, &CastPath)> = grandchildren.iter().collect();
            targets.sort_by_key(|(key, _)| **key);

            for (target, child_target) in targets {
                if *target == parent {
                    continue;
                }
                let length = parent_child.len() + child_target.len();
                let known = children.get(target).map_or(usize::MAX, CastPath::len);
                if length >= known {
                    continue;
                }
                match updates.iter_mut().find(|(key, _)| key == target) {
                    Some((_, pending)) if pending.len() <= length => {}
                    Some((_, pending)) => *pending = parent_child.compose(child_target),
                    None => updates.push((*target, parent_child.compose(child_target))),
                }
            }
        }
        updates
    }

    fn add_ancestor(&mut self, derived: TypeKey, base: TypeKey) {
        let ancestors = self.ancestors.entry(derived).or_default();
        if !ancestors.contains(&base) {
            ancestors.push(base);
        }
    }
}

static CASTERS: LazyLock<PolymorphicCasters> = LazyLock::new(|| PolymorphicCasters {
    graph: RwLock::new(RelationGraph::new()),
});

/// Process-wide relation registry.
///
/// Registration takes the write lock; lookups take the read lock only long
/// enough to clone the cached path.
pub struct PolymorphicCasters {
    graph: RwLock<RelationGraph>,
}

impl PolymorphicCasters {
    /// The registry, with static registrations applied.
    pub fn global() -> &'static PolymorphicCasters {
        ensure_initialized();
        &CASTERS
    }

    pub(crate) fn instance() -> &'static PolymorphicCasters {
        &CASTERS
    }

    pub fn register(&self, caster: Arc<dyn PolymorphicCaster>) -> bool {
        let base = caster.base();
        let derived = caster.derived();
        let changed = self.graph.write().register(caster);
        if changed {
            tracing::debug!(base = %base, derived = %derived, "registered polymorphic relation");
        }
        changed
    }

    pub fn lookup(&self, base: TypeKey, derived: TypeKey) -> Option<CastPath> {
        self.graph.read().lookup(base, derived)
    }

    pub fn exists(&self, base: TypeKey, derived: TypeKey) -> bool {
        self.graph.read().exists(base, derived)
    }

    /// Like [`lookup`](Self::lookup), failing with
    /// [`Error::UnregisteredRelation`] when no path is known.
    pub fn cast_path(&self, base: TypeKey, derived: TypeKey) -> Result<CastPath, Error> {
        self.lookup(base, derived)
            .ok_or_else(|| Error::unregistered_relation(base.name(), derived.name()))
    }

    pub fn downcast_rc<D: Any>(&self, ptr: ErasedRc) -> Result<Rc<D>, Error> {
        let path = self.cast_path(ptr.key(), TypeKey::of::<D>())?;
        path.downcast(ptr)?.into_rc::<D>()
    }

    /// Checked reference downcast of an object viewed through `base`.
    pub fn downcast_ref<'a, D: Any>(&self, object: &'a dyn Any, base: TypeKey) -> Result<&'a D, Error> {
        self.cast_path(base, TypeKey::of::<D>())?;
        object.downcast_ref::<D>().ok_or_else(|| {
            Error::type_mismatch(std::any::type_name::<D>(), format!("an object behind {}", base))
        })
    }

    pub fn upcast_rc<D: Any>(&self, rc: Rc<D>, base: TypeKey) -> Result<ErasedRc, Error> {
        self.cast_path(base, TypeKey::of::<D>())?
            .upcast(ErasedRc::new(rc))
    }

    pub fn upcast_box<D: Any>(&self, boxed: Box<D>, base: TypeKey) -> Result<ErasedBox, Error> {
        self.cast_path(base, TypeKey::of::<D>())?
            .upcast_box(ErasedBox::new(boxed))
    }

    /// Upcasts a type-erased object whose concrete type is `concrete`.
    pub fn upcast_any(
        &self,
        any: Rc<dyn Any>,
        concrete: TypeKey,
        base: TypeKey,
    ) -> Result<ErasedRc, Error> {
        self.cast_path(base, concrete)?
            .upcast(ErasedRc::from_any(any, concrete))
    }
}

/// Registers `D` as directly derived from the base trait `B`.
///
/// ```rust
/// use morphic_core::polymorphic::{register_relation, upcast, Polymorphic};
/// use std::rc::Rc;
///
/// trait Named: Polymorphic {}
/// struct Tag;
/// impl Named for Tag {}
///
/// register_relation::<dyn Named, Tag>(
///     |d: Rc<Tag>| -> Rc<dyn Named> { d },
///     |d: Box<Tag>| -> Box<dyn Named> { d },
/// );
/// let named: Rc<dyn Named> = upcast::<dyn Named, Tag>(Rc::new(Tag)).unwrap();
/// ```
pub fn register_relation<B, D>(upcast_rc: fn(Rc<D>) -> Rc<B>, upcast_box: fn(Box<D>) -> Box<B>) -> bool
where
    B: ?Sized + Polymorphic,
    D: Polymorphic,
{
    PolymorphicCasters::global().register(Arc::new(ConcreteCaster::new(upcast_rc, upcast_box)))
}

/// Registers the trait `D` as directly derived from the base trait `B`.
pub fn register_trait_relation<B, D>(
    upcast_rc: fn(Rc<D>) -> Rc<B>,
    upcast_box: fn(Box<D>) -> Box<B>,
) -> bool
where
    B: ?Sized + Polymorphic,
    D: ?Sized + Polymorphic,
{
    PolymorphicCasters::global().register(Arc::new(TraitCaster::new(upcast_rc, upcast_box)))
}

/// Converts a concrete `Rc<D>` into an `Rc<B>` along the registered path.
pub fn upcast<B: ?Sized + 'static, D: Any>(rc: Rc<D>) -> Result<Rc<B>, Error> {
    PolymorphicCasters::global()
        .upcast_rc(rc, TypeKey::of::<B>())?
        .into_rc::<B>()
}

/// Recovers the concrete `Rc<D>` behind an `Rc<B>`.
pub fn downcast<B: ?Sized + 'static, D: Any>(rc: Rc<B>) -> Result<Rc<D>, Error> {
    PolymorphicCasters::global().downcast_rc::<D>(ErasedRc::new(rc))
}
