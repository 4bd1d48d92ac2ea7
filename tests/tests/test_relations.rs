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

use morphic_core::polymorphic::{
    downcast, register_relation, register_trait_relation, upcast, BindingRegistry,
    ConcreteCaster, PolymorphicCaster, PolymorphicCasters, Polymorphic, RelationGraph,
    StaticRegistration, TraitCaster,
};
use morphic_core::error::Error;
use morphic_core::TypeKey;
use std::rc::Rc;
use std::sync::Arc;

trait Top: Polymorphic {
    fn id(&self) -> u32;
}
trait Middle: Top {}
trait Bottom: Middle {}

struct Leaf(u32);

impl Top for Leaf {
    fn id(&self) -> u32 {
        self.0
    }
}
impl Middle for Leaf {}
impl Bottom for Leaf {}

fn top_middle() -> Arc<dyn PolymorphicCaster> {
    Arc::new(TraitCaster::<dyn Top, dyn Middle>::new(|d| d, |d| d))
}

fn middle_bottom() -> Arc<dyn PolymorphicCaster> {
    Arc::new(TraitCaster::<dyn Middle, dyn Bottom>::new(|d| d, |d| d))
}

fn top_bottom() -> Arc<dyn PolymorphicCaster> {
    Arc::new(TraitCaster::<dyn Top, dyn Bottom>::new(|d| d, |d| d))
}

fn bottom_leaf() -> Arc<dyn PolymorphicCaster> {
    Arc::new(ConcreteCaster::<dyn Bottom, Leaf>::new(|d| d, |d| d))
}

fn links<B: ?Sized + 'static, D: ?Sized + 'static>(graph: &RelationGraph) -> Option<usize> {
    graph
        .lookup(TypeKey::of::<B>(), TypeKey::of::<D>())
        .map(|path| path.len())
}

#[test]
fn test_transitive_path() {
    let mut graph = RelationGraph::new();
    graph.register(top_middle());
    graph.register(middle_bottom());
    assert_eq!(links::<dyn Top, dyn Bottom>(&graph), Some(2));
    assert!(graph.exists(TypeKey::of::<dyn Top>(), TypeKey::of::<dyn Bottom>()));
    assert!(!graph.exists(TypeKey::of::<dyn Bottom>(), TypeKey::of::<dyn Top>()));
}

#[test]
fn test_descendants_of_new_base_are_reachable() {
    let mut graph = RelationGraph::new();
    graph.register(bottom_leaf());
    graph.register(middle_bottom());
    graph.register(top_middle());
    assert_eq!(links::<dyn Middle, Leaf>(&graph), Some(2));
    assert_eq!(links::<dyn Top, Leaf>(&graph), Some(3));
    assert_eq!(graph.len(), 6);
}

#[test]
fn test_shorter_path_replaces_cached_one() {
    let mut graph = RelationGraph::new();
    graph.register(top_middle());
    graph.register(middle_bottom());
    graph.register(bottom_leaf());
    assert_eq!(links::<dyn Top, Leaf>(&graph), Some(3));

    assert!(graph.register(top_bottom()));
    assert_eq!(links::<dyn Top, dyn Bottom>(&graph), Some(1));
    assert_eq!(links::<dyn Top, Leaf>(&graph), Some(2));
    // paths that do not start at the new base are untouched
    assert_eq!(links::<dyn Middle, Leaf>(&graph), Some(2));
}

#[test]
fn test_duplicate_registration_is_ignored() {
    let mut graph = RelationGraph::new();
    assert!(graph.register(top_middle()));
    assert!(!graph.register(top_middle()));
    assert_eq!(graph.len(), 1);
}

#[test]
fn test_global_casts_preserve_address() {
    register_relation::<dyn Bottom, Leaf>(|d| d, |d| d);
    register_trait_relation::<dyn Middle, dyn Bottom>(|d| d, |d| d);
    register_trait_relation::<dyn Top, dyn Middle>(|d| d, |d| d);

    let casters = PolymorphicCasters::global();
    let path = casters
        .cast_path(TypeKey::of::<dyn Top>(), TypeKey::of::<Leaf>())
        .unwrap();
    assert_eq!(path.len(), 3);

    let leaf = Rc::new(Leaf(17));
    let address = Rc::as_ptr(&leaf) as *const ();
    let top: Rc<dyn Top> = upcast::<dyn Top, Leaf>(leaf.clone()).unwrap();
    assert_eq!(Rc::as_ptr(&top) as *const (), address);
    assert_eq!(top.id(), 17);

    let back: Rc<Leaf> = downcast::<dyn Top, Leaf>(top).unwrap();
    assert!(Rc::ptr_eq(&back, &leaf));
    assert_eq!(Rc::strong_count(&leaf), 2);

    // a direct relation shortens the global path and casts still agree
    register_trait_relation::<dyn Top, dyn Bottom>(|d| d, |d| d);
    let path = casters
        .cast_path(TypeKey::of::<dyn Top>(), TypeKey::of::<Leaf>())
        .unwrap();
    assert_eq!(path.len(), 2);
    let top: Rc<dyn Top> = upcast::<dyn Top, Leaf>(leaf.clone()).unwrap();
    assert_eq!(Rc::as_ptr(&top) as *const (), address);
    let back: Rc<Leaf> = downcast::<dyn Top, Leaf>(top).unwrap();
    assert!(Rc::ptr_eq(&back, &leaf));
}

#[test]
fn test_missing_relation_names_both_types() {
    if morphic_core::error::should_panic_on_error() {
        return;
    }
    struct Stray;
    impl Top for Stray {
        fn id(&self) -> u32 {
            0
        }
    }
    let err = match upcast::<dyn Top, Stray>(Rc::new(Stray)) {
        Ok(_) => panic!("upcast without a relation must fail"),
        Err(err) => err,
    };
    let message = err.to_string();
    assert!(message.contains("Stray"), "{}", message);
    assert!(message.contains("Top"), "{}", message);
}

trait Gauge: Polymorphic {}

struct Dial;
impl Gauge for Dial {}

fn register_gauges(_casters: &PolymorphicCasters, _bindings: &BindingRegistry) -> Result<(), Error> {
    // goes through the global accessors while static registration is running
    register_relation::<dyn Gauge, Dial>(|d| d, |d| d);
    Ok(())
}

morphic_core::inventory::submit! {
    StaticRegistration::new(register_gauges)
}

#[test]
fn test_static_registration_using_global_helpers() {
    assert!(PolymorphicCasters::global().exists(TypeKey::of::<dyn Gauge>(), TypeKey::of::<Dial>()));
    let dial = Rc::new(Dial);
    let gauge: Rc<dyn Gauge> = upcast(dial.clone()).unwrap();
    let back: Rc<Dial> = downcast(gauge).unwrap();
    assert!(Rc::ptr_eq(&dial, &back));
}
