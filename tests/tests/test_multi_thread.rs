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

use morphic::{
    polymorphic_base, register_polymorphic, register_relation, register_trait_relation, Format,
    Load, Morphic, Polymorphic, Save,
};
use morphic_core::polymorphic::PolymorphicCasters;
use morphic_core::TypeKey;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

pub trait Message: Polymorphic {
    fn text(&self) -> String;
}
polymorphic_base!(Message);

#[derive(Save, Load)]
struct Greeting {
    who: String,
    times: u32,
}

impl Message for Greeting {
    fn text(&self) -> String {
        format!("hello {} x{}", self.who, self.times)
    }
}

register_polymorphic!(Greeting, "Greeting", dyn Message);

#[test]
fn test_archives_on_many_threads() {
    let morphic = Arc::new(Morphic::default().format(Format::Compact));
    let mut handles = vec![];
    for i in 0..8u32 {
        let morphic = Arc::clone(&morphic);
        handles.push(thread::spawn(move || {
            let message: Rc<dyn Message> = Rc::new(Greeting {
                who: format!("thread-{}", i),
                times: i,
            });
            let bytes = morphic
                .serialize(&vec![message.clone(), message])
                .unwrap();
            let loaded: Vec<Rc<dyn Message>> = morphic.deserialize(&bytes).unwrap();
            assert!(Rc::ptr_eq(&loaded[0], &loaded[1]));
            loaded[0].text()
        }));
    }
    let texts: HashSet<String> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    let expected: HashSet<String> = (0..8u32)
        .map(|i| format!("hello thread-{} x{}", i, i))
        .collect();
    assert_eq!(texts, expected);
}

trait Outer: Polymorphic {}
trait Inner: Outer {}

struct Widget;
impl Outer for Widget {}
impl Inner for Widget {}

#[test]
fn test_concurrent_registration() {
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let inserted = Arc::new(AtomicUsize::new(0));
    let mut handles = vec![];
    for i in 0..threads {
        let barrier = Arc::clone(&barrier);
        let inserted = Arc::clone(&inserted);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let mut count = 0;
            if i % 2 == 0 {
                count += register_relation::<dyn Inner, Widget>(|d| d, |d| d) as usize;
                count += register_trait_relation::<dyn Outer, dyn Inner>(|d| d, |d| d) as usize;
            } else {
                count += register_trait_relation::<dyn Outer, dyn Inner>(|d| d, |d| d) as usize;
                count += register_relation::<dyn Inner, Widget>(|d| d, |d| d) as usize;
            }
            inserted.fetch_add(count, Ordering::SeqCst);
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(inserted.load(Ordering::SeqCst), 2);
    let path = PolymorphicCasters::global()
        .lookup(TypeKey::of::<dyn Outer>(), TypeKey::of::<Widget>())
        .unwrap();
    assert_eq!(path.len(), 2);

    let widget = Rc::new(Widget);
    let outer: Rc<dyn Outer> = morphic_core::polymorphic::upcast(widget.clone()).unwrap();
    let back: Rc<Widget> = morphic_core::polymorphic::downcast(outer).unwrap();
    assert!(Rc::ptr_eq(&widget, &back));
}
