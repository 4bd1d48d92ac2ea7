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

use morphic::{polymorphic_base, register_polymorphic, Load, Morphic, Polymorphic, RcWeak, Save};
use morphic_core::error::Error;
use morphic_core::polymorphic::downcast;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Save, Load)]
struct TreeNode {
    value: i32,
    parent: RcWeak<RefCell<TreeNode>>,
    children: Vec<Rc<RefCell<TreeNode>>>,
}

fn node(value: i32) -> Rc<RefCell<TreeNode>> {
    Rc::new(RefCell::new(TreeNode {
        value,
        parent: RcWeak::new(),
        children: vec![],
    }))
}

#[test]
fn test_parent_child_weak_links() {
    let root = node(1);
    for value in [2, 3, 4] {
        let child = node(value);
        child.borrow_mut().parent = RcWeak::from(&root);
        root.borrow_mut().children.push(child);
    }

    let morphic = Morphic::default();
    let bytes = morphic.serialize(&root).unwrap();
    let loaded: Rc<RefCell<TreeNode>> = morphic.deserialize(&bytes).unwrap();

    let loaded_ref = loaded.borrow();
    assert_eq!(loaded_ref.value, 1);
    assert!(loaded_ref.parent.upgrade().is_none());
    let values: Vec<i32> = loaded_ref
        .children
        .iter()
        .map(|child| child.borrow().value)
        .collect();
    assert_eq!(values, vec![2, 3, 4]);
    for child in &loaded_ref.children {
        let parent = child.borrow().parent.upgrade().unwrap();
        assert!(Rc::ptr_eq(&parent, &loaded));
    }
    // weak links do not keep the parent alive
    assert_eq!(Rc::strong_count(&loaded), 1);
}

#[derive(Save, Load)]
struct SelfAware {
    name: String,
    this: RcWeak<RefCell<SelfAware>>,
}

#[test]
fn test_self_handle() {
    let object = Rc::new(RefCell::new(SelfAware {
        name: "me".to_string(),
        this: RcWeak::new(),
    }));
    object.borrow().this.update(Rc::downgrade(&object));

    let morphic = Morphic::default();
    let bytes = morphic.serialize(&object).unwrap();
    let loaded: Rc<RefCell<SelfAware>> = morphic.deserialize(&bytes).unwrap();
    let this = loaded.borrow().this.upgrade().unwrap();
    assert!(Rc::ptr_eq(&this, &loaded));
    assert_eq!(this.borrow().name, "me");
}

#[test]
fn test_dead_weak_is_null() {
    let weak: RcWeak<RefCell<TreeNode>> = {
        let temporary = node(9);
        RcWeak::from(&temporary)
    };
    assert!(weak.upgrade().is_none());

    let morphic = Morphic::default().header(false);
    let bytes = morphic.serialize(&weak).unwrap();
    assert_eq!(bytes, vec![0, 0, 0, 0]);
    let loaded: RcWeak<RefCell<TreeNode>> = morphic.deserialize(&bytes).unwrap();
    assert!(loaded.upgrade().is_none());
}

#[test]
fn test_weak_clones_share_cell() {
    let target = node(5);
    let weak: RcWeak<RefCell<TreeNode>> = RcWeak::new();
    let clone = weak.clone();
    assert!(clone.upgrade().is_none());
    weak.update(Rc::downgrade(&target));
    assert!(Rc::ptr_eq(&clone.upgrade().unwrap(), &target));
    assert!(weak.ptr_eq(&clone));
    assert_eq!(clone.strong_count(), 1);
}

pub trait Component: Polymorphic {
    fn label(&self) -> &str;
    fn parent(&self) -> Option<Rc<dyn Component>>;
}
polymorphic_base!(Component);

#[derive(Save, Load)]
struct Panel {
    label: String,
    children: Vec<Rc<dyn Component>>,
}

impl Component for Panel {
    fn label(&self) -> &str {
        &self.label
    }

    fn parent(&self) -> Option<Rc<dyn Component>> {
        None
    }
}

#[derive(Save, Load)]
struct Button {
    label: String,
    parent: RcWeak<dyn Component>,
}

impl Component for Button {
    fn label(&self) -> &str {
        &self.label
    }

    fn parent(&self) -> Option<Rc<dyn Component>> {
        self.parent.upgrade()
    }
}

register_polymorphic!(Panel, "ui::Panel", dyn Component);
register_polymorphic!(Button, "ui::Button", dyn Component);

#[test]
fn test_polymorphic_weak_back_reference() {
    let panel = Rc::new_cyclic(|this: &Weak<Panel>| {
        let parent: Weak<dyn Component> = this.clone();
        Panel {
            label: "main".to_string(),
            children: vec![
                Rc::new(Button {
                    label: "ok".to_string(),
                    parent: RcWeak::from_std(parent.clone()),
                }),
                Rc::new(Button {
                    label: "cancel".to_string(),
                    parent: RcWeak::from_std(parent),
                }),
            ],
        }
    });
    let root: Rc<dyn Component> = panel;

    let morphic = Morphic::default();
    let bytes = morphic.serialize(&root).unwrap();
    let loaded: Rc<dyn Component> = morphic.deserialize(&bytes).unwrap();
    assert_eq!(loaded.label(), "main");

    let panel = downcast::<dyn Component, Panel>(loaded.clone()).unwrap();
    assert_eq!(panel.children.len(), 2);
    for child in &panel.children {
        let parent = child.parent().unwrap();
        assert!(Rc::ptr_eq(&parent, &loaded));
    }
    assert_eq!(panel.children[1].label(), "cancel");
}

#[derive(Save, Load)]
struct Knot {
    name: RefCell<String>,
    next: RefCell<Option<Rc<Knot>>>,
}

#[test]
fn test_strong_self_cycle() {
    let knot = Rc::new(Knot {
        name: RefCell::new("bowline".to_string()),
        next: RefCell::new(None),
    });
    *knot.next.borrow_mut() = Some(knot.clone());

    let morphic = Morphic::default();
    let bytes = morphic.serialize(&knot).unwrap();
    let loaded: Rc<Knot> = morphic.deserialize(&bytes).unwrap();

    assert_eq!(*loaded.name.borrow(), "bowline");
    let next = loaded.next.borrow().clone().unwrap();
    assert!(Rc::ptr_eq(&loaded, &next));
    assert_eq!(Rc::strong_count(&loaded), 3);

    loaded.next.borrow_mut().take();
    knot.next.borrow_mut().take();
}

#[derive(Save, Load)]
struct Alpha {
    beta: RefCell<Option<Rc<Beta>>>,
}

#[derive(Save, Load)]
struct Beta {
    weight: u32,
    alpha: Option<Rc<Alpha>>,
}

#[test]
fn test_strong_two_object_cycle() {
    let alpha = Rc::new(Alpha {
        beta: RefCell::new(None),
    });
    let beta = Rc::new(Beta {
        weight: 12,
        alpha: Some(alpha.clone()),
    });
    *alpha.beta.borrow_mut() = Some(beta);

    let morphic = Morphic::default();
    let bytes = morphic.serialize(&alpha).unwrap();
    let loaded: Rc<Alpha> = morphic.deserialize(&bytes).unwrap();

    let beta = loaded.beta.borrow().clone().unwrap();
    assert_eq!(beta.weight, 12);
    let back = beta.alpha.clone().unwrap();
    assert!(Rc::ptr_eq(&loaded, &back));

    loaded.beta.borrow_mut().take();
    alpha.beta.borrow_mut().take();
}

#[test]
fn test_strong_cycle_through_refcell_node() {
    let first = node(1);
    let second = node(2);
    first.borrow_mut().children.push(second.clone());
    second.borrow_mut().children.push(first.clone());

    let morphic = Morphic::default();
    let bytes = morphic.serialize(&first).unwrap();
    let loaded: Rc<RefCell<TreeNode>> = morphic.deserialize(&bytes).unwrap();

    let second = loaded.borrow().children[0].clone();
    assert_eq!(second.borrow().value, 2);
    assert!(Rc::ptr_eq(&second.borrow().children[0], &loaded));

    second.borrow_mut().children.clear();
    first.borrow_mut().children.clear();
}

#[derive(Save, Load)]
struct Looped {
    id: u32,
    next: RefCell<Option<Rc<Looped>>>,
}

#[test]
fn test_strong_cycle_without_placeholder_is_an_error() {
    if morphic_core::error::should_panic_on_error() {
        return;
    }
    let looped = Rc::new(Looped {
        id: 1,
        next: RefCell::new(None),
    });
    *looped.next.borrow_mut() = Some(looped.clone());

    let morphic = Morphic::default();
    // saving terminates: the back edge is written as a known id
    let bytes = morphic.serialize(&looped).unwrap();
    let result: Result<Rc<Looped>, Error> = morphic.deserialize(&bytes);
    assert!(matches!(result, Err(Error::CyclicReference(1))));

    looped.next.borrow_mut().take();
}

#[derive(Save, Load)]
struct Owner {
    tag: u32,
    this: RcWeak<Owner>,
}

#[derive(Save, Load)]
struct Impostor {
    tag: u32,
    this: RcWeak<u32>,
}

#[test]
fn test_weak_reference_to_wrong_type_fails() {
    if morphic_core::error::should_panic_on_error() {
        return;
    }
    let owner = Rc::new_cyclic(|weak| Owner {
        tag: 7,
        this: RcWeak::from_std(weak.clone()),
    });

    let morphic = Morphic::default();
    let bytes = morphic.serialize(&owner).unwrap();

    let loaded: Rc<Owner> = morphic.deserialize(&bytes).unwrap();
    assert_eq!(loaded.tag, 7);
    assert!(Rc::ptr_eq(&loaded.this.upgrade().unwrap(), &loaded));

    let result: Result<Rc<Impostor>, Error> = morphic.deserialize(&bytes);
    assert!(matches!(result, Err(Error::TypeMismatch { .. })));
}

#[derive(Save, Load)]
struct Chain {
    depth: u32,
    next: Option<Box<Chain>>,
}

fn chain(length: u32) -> Chain {
    let mut head = Chain {
        depth: length,
        next: None,
    };
    for depth in (0..length).rev() {
        head = Chain {
            depth,
            next: Some(Box::new(head)),
        };
    }
    head
}

#[test]
fn test_depth_limit() {
    if morphic_core::error::should_panic_on_error() {
        return;
    }
    let bytes = Morphic::default().serialize(&chain(8)).unwrap();

    let result: Result<Chain, Error> = Morphic::default().max_depth(4).deserialize(&bytes);
    assert!(matches!(result, Err(Error::DepthExceed(_))));

    let loaded: Chain = Morphic::default().max_depth(8).deserialize(&bytes).unwrap();
    let mut depth = 0;
    let mut current = &loaded;
    while let Some(next) = &current.next {
        depth += 1;
        current = next;
    }
    assert_eq!(depth, 8);
    assert_eq!(current.depth, 8);
}
