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

use morphic::archive::InputArchive;
use morphic::{Error, Load, Morphic, Save};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Save, Load, Debug, PartialEq, Default)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Save, Load, Debug, PartialEq)]
struct Meters(f64, u8);

#[derive(Save, Load, Debug, PartialEq)]
struct Marker;

#[derive(Save, Load, Debug, PartialEq)]
struct Cached {
    key: String,
    #[morphic(skip)]
    hits: u64,
    values: Vec<u16>,
}

#[derive(Save, Load, Debug, PartialEq)]
struct Pair<T> {
    left: T,
    right: T,
}

#[derive(Save, Load, Debug)]
struct Scene {
    origin: Rc<Point>,
    cursor: Rc<Point>,
    history: RefCell<Vec<Point>>,
    label: Option<Box<String>>,
}

#[test]
fn test_named_struct() {
    let morphic = Morphic::default();
    let bytes = morphic.serialize(&Point { x: -3, y: 7 }).unwrap();
    let loaded: Point = morphic.deserialize(&bytes).unwrap();
    assert_eq!(loaded, Point { x: -3, y: 7 });
}

#[test]
fn test_tuple_and_unit_struct() {
    let morphic = Morphic::default().header(false);
    let bytes = morphic.serialize(&Meters(2.5, 9)).unwrap();
    assert_eq!(bytes.len(), 9);
    let loaded: Meters = morphic.deserialize(&bytes).unwrap();
    assert_eq!(loaded, Meters(2.5, 9));

    let bytes = morphic.serialize(&Marker).unwrap();
    assert!(bytes.is_empty());
    let loaded: Marker = morphic.deserialize(&bytes).unwrap();
    assert_eq!(loaded, Marker);
}

#[test]
fn test_skipped_field_uses_default() {
    let morphic = Morphic::default();
    let cached = Cached {
        key: "users".to_string(),
        hits: 42,
        values: vec![1, 2, 3],
    };
    let bytes = morphic.serialize(&cached).unwrap();
    let loaded: Cached = morphic.deserialize(&bytes).unwrap();
    assert_eq!(
        loaded,
        Cached {
            key: "users".to_string(),
            hits: 0,
            values: vec![1, 2, 3],
        }
    );
}

#[test]
fn test_generic_struct() {
    let morphic = Morphic::default();
    let pair = Pair {
        left: "l".to_string(),
        right: "r".to_string(),
    };
    let bytes = morphic.serialize(&pair).unwrap();
    let loaded: Pair<String> = morphic.deserialize(&bytes).unwrap();
    assert_eq!(loaded, pair);

    let nested = Pair {
        left: Pair { left: 1u8, right: 2 },
        right: Pair { left: 3, right: 4 },
    };
    let bytes = morphic.serialize(&nested).unwrap();
    let loaded: Pair<Pair<u8>> = morphic.deserialize(&bytes).unwrap();
    assert_eq!(loaded, nested);
}

#[test]
fn test_struct_with_pointers() {
    let morphic = Morphic::default();
    let origin = Rc::new(Point::default());
    let scene = Scene {
        origin: origin.clone(),
        cursor: origin,
        history: RefCell::new(vec![Point { x: 1, y: 1 }]),
        label: Some(Box::new("main".to_string())),
    };
    let bytes = morphic.serialize(&scene).unwrap();
    let loaded: Scene = morphic.deserialize(&bytes).unwrap();
    assert!(Rc::ptr_eq(&loaded.origin, &loaded.cursor));
    assert_eq!(*loaded.origin, Point::default());
    assert_eq!(*loaded.history.borrow(), vec![Point { x: 1, y: 1 }]);
    assert_eq!(loaded.label.as_deref().map(String::as_str), Some("main"));
}

struct Percent(u8);

impl Save for Percent {
    fn save<A: morphic::OutputArchive>(&self, ar: &mut A) -> Result<(), Error> {
        self.0.save(ar)
    }
}

impl Load for Percent {
    fn load<A: InputArchive>(ar: &mut A) -> Result<Self, Error> {
        let value = u8::load(ar)?;
        if value > 100 {
            return Err(Error::construction(format!("{} is not a percentage", value)));
        }
        Ok(Percent(value))
    }
}

#[test]
fn test_construction_failure_propagates() {
    if morphic::error::should_panic_on_error() {
        return;
    }
    let morphic = Morphic::default();
    let bytes = morphic.serialize(&Rc::new(Percent(250))).unwrap();
    match morphic.deserialize::<Rc<Percent>>(&bytes) {
        Err(Error::Construction(msg)) => assert_eq!(msg, "250 is not a percentage"),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("out of range value must be rejected"),
    }

    let bytes = morphic.serialize(&Rc::new(Percent(40))).unwrap();
    let loaded: Rc<Percent> = morphic.deserialize(&bytes).unwrap();
    assert_eq!(loaded.0, 40);
}

#[derive(Save, Load, Debug, PartialEq)]
struct A {
    value: u8,
}

#[derive(Save, Load, Debug)]
struct HoldsA {
    first: A,
    shared: Option<Rc<A>>,
}

#[test]
fn test_field_type_named_like_archive_parameter() {
    let morphic = Morphic::default();
    let holder = HoldsA {
        first: A { value: 1 },
        shared: Some(Rc::new(A { value: 2 })),
    };
    let bytes = morphic.serialize(&holder).unwrap();
    let loaded: HoldsA = morphic.deserialize(&bytes).unwrap();
    assert_eq!(loaded.first, A { value: 1 });
    assert_eq!(loaded.shared.as_deref(), Some(&A { value: 2 }));
}

#[derive(Save, Load, Debug)]
struct Counters {
    hits: RefCell<u64>,
    names: RefCell<Vec<String>>,
    #[morphic(skip)]
    scratch: u32,
}

#[derive(Save, Load, Debug)]
struct Plain {
    hits: u64,
}

#[test]
fn test_derived_placeholders() {
    let placeholder = Counters::shared_placeholder().unwrap();
    assert_eq!(*placeholder.hits.borrow(), 0);
    assert!(placeholder.names.borrow().is_empty());
    assert_eq!(placeholder.scratch, 0);
    assert!(Plain::placeholder().is_some());
    assert!(Plain::shared_placeholder().is_none());
    assert!(<Option<Rc<Plain>>>::placeholder().unwrap().is_none());

    let morphic = Morphic::default();
    let counters = Rc::new(Counters {
        hits: RefCell::new(3),
        names: RefCell::new(vec!["a".to_string()]),
        scratch: 9,
    });
    let bytes = morphic.serialize(&counters).unwrap();
    let loaded: Rc<Counters> = morphic.deserialize(&bytes).unwrap();
    assert_eq!(*loaded.hits.borrow(), 3);
    assert_eq!(*loaded.names.borrow(), vec!["a".to_string()]);
    assert_eq!(loaded.scratch, 0);
}
