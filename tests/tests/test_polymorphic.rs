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
    polymorphic_base, register_polymorphic, register_polymorphic_relation, BinaryInputArchive,
    BinaryOutputArchive, Format, InputArchive, Load, Morphic, OutputArchive, Polymorphic, Save,
};
use morphic_core::polymorphic::downcast;
use std::rc::Rc;

pub trait Animal: Polymorphic {
    fn name(&self) -> String;
}
polymorphic_base!(Animal);

pub trait Mammal: Animal {
    fn legs(&self) -> u32;
}
polymorphic_base!(Mammal);

#[derive(Save, Load, Debug, PartialEq)]
struct Dog {
    name: String,
}

impl Animal for Dog {
    fn name(&self) -> String {
        self.name.clone()
    }
}

#[derive(Save, Load, Debug, PartialEq)]
struct Bird {
    name: String,
    wingspan: f32,
}

impl Animal for Bird {
    fn name(&self) -> String {
        self.name.clone()
    }
}

#[derive(Save, Load, Debug, PartialEq)]
struct Cat {
    name: String,
    lives: u8,
}

impl Animal for Cat {
    fn name(&self) -> String {
        self.name.clone()
    }
}

impl Mammal for Cat {
    fn legs(&self) -> u32 {
        4
    }
}

register_polymorphic!(Dog, "Dog", dyn Animal);
register_polymorphic!(Bird, "zoo::Bird", dyn Animal);
register_polymorphic!(Cat, "zoo::Cat", dyn Mammal);
register_polymorphic_relation!(dyn Animal => dyn Mammal);

fn rex() -> Rc<dyn Animal> {
    Rc::new(Dog {
        name: "Rex".to_string(),
    })
}

fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack
        .windows(needle.len())
        .filter(|window| *window == needle)
        .count()
}

#[test]
fn test_shared_round_trip_keeps_dynamic_type() {
    let morphic = Morphic::default();
    let bytes = morphic.serialize(&rex()).unwrap();
    let loaded: Rc<dyn Animal> = morphic.deserialize(&bytes).unwrap();
    assert_eq!(loaded.name(), "Rex");

    let dog: Rc<Dog> = downcast::<dyn Animal, Dog>(loaded).unwrap();
    assert_eq!(
        *dog,
        Dog {
            name: "Rex".to_string()
        }
    );
}

#[test]
fn test_binary_layout() {
    let morphic = Morphic::default().header(false);
    let bytes = morphic.serialize(&rex()).unwrap();

    let mut expected = Vec::new();
    // polymorphic id 1, name follows
    expected.extend_from_slice(&0x8000_0001u32.to_le_bytes());
    expected.extend_from_slice(&3u64.to_le_bytes());
    expected.extend_from_slice(b"Dog");
    // shared id 1, body follows
    expected.extend_from_slice(&0x8000_0001u32.to_le_bytes());
    expected.extend_from_slice(&3u64.to_le_bytes());
    expected.extend_from_slice(b"Rex");
    assert_eq!(bytes, expected);
}

#[test]
fn test_header() {
    let bytes = Morphic::default().serialize(&rex()).unwrap();
    assert_eq!(&bytes[..3], &[0x63, 0x6d, 0x00]);
    let compact = Morphic::default()
        .format(Format::Compact)
        .serialize(&rex())
        .unwrap();
    assert_eq!(&compact[..3], &[0x63, 0x6d, 0x01]);
}

#[test]
fn test_aliased_object_written_once() {
    let morphic = Morphic::default().header(false);
    let dog = rex();
    let bytes = morphic
        .serialize(&vec![dog.clone(), dog.clone(), dog])
        .unwrap();
    assert_eq!(count(&bytes, b"Rex"), 1);
    assert_eq!(count(&bytes, b"Dog"), 1);

    // second reference: known polymorphic id, known shared id
    let tail = 8 + 4 + 8 + 3 + 4 + 8 + 3;
    assert_eq!(&bytes[tail..tail + 8], &[1, 0, 0, 0, 1, 0, 0, 0]);

    let loaded: Vec<Rc<dyn Animal>> = morphic.deserialize(&bytes).unwrap();
    assert_eq!(loaded.len(), 3);
    assert!(Rc::ptr_eq(&loaded[0], &loaded[1]));
    assert!(Rc::ptr_eq(&loaded[1], &loaded[2]));
    assert_eq!(Rc::strong_count(&loaded[0]), 3);
}

#[test]
fn test_distinct_objects_and_types() {
    let morphic = Morphic::default();
    let animals: Vec<Rc<dyn Animal>> = vec![
        rex(),
        Rc::new(Bird {
            name: "Tweety".to_string(),
            wingspan: 0.25,
        }),
        rex(),
    ];
    let bytes = morphic.serialize(&animals).unwrap();
    assert_eq!(count(&bytes, b"zoo::Bird"), 1);
    assert_eq!(count(&bytes, b"Dog"), 1);
    assert_eq!(count(&bytes, b"Rex"), 2);

    let loaded: Vec<Rc<dyn Animal>> = morphic.deserialize(&bytes).unwrap();
    let names: Vec<String> = loaded.iter().map(|animal| animal.name()).collect();
    assert_eq!(names, ["Rex", "Tweety", "Rex"]);
    assert!(!Rc::ptr_eq(&loaded[0], &loaded[2]));
    let bird = downcast::<dyn Animal, Bird>(loaded[1].clone()).unwrap();
    assert_eq!(bird.wingspan, 0.25);
}

#[test]
fn test_null_polymorphic_pointer() {
    let morphic = Morphic::default().header(false);
    let none: Option<Rc<dyn Animal>> = None;
    let bytes = morphic.serialize(&none).unwrap();
    assert_eq!(bytes, vec![0, 0, 0, 0]);
    let loaded: Option<Rc<dyn Animal>> = morphic.deserialize(&bytes).unwrap();
    assert!(loaded.is_none());

    let some = Some(rex());
    let bytes = morphic.serialize(&some).unwrap();
    let loaded: Option<Rc<dyn Animal>> = morphic.deserialize(&bytes).unwrap();
    assert_eq!(loaded.unwrap().name(), "Rex");
}

#[test]
fn test_unique_polymorphic_pointer() {
    let morphic = Morphic::default().header(false);
    let boxed: Box<dyn Animal> = Box::new(Bird {
        name: "Polly".to_string(),
        wingspan: 0.5,
    });
    let bytes = morphic.serialize(&boxed).unwrap();
    // polymorphic id, name, valid flag, body
    assert_eq!(bytes[4 + 8 + 9], 1);
    assert_eq!(bytes.len(), 4 + 8 + 9 + 1 + 8 + 5 + 4);

    let loaded: Box<dyn Animal> = morphic.deserialize(&bytes).unwrap();
    assert_eq!(loaded.name(), "Polly");

    let none: Option<Box<dyn Animal>> = None;
    let bytes = morphic.serialize(&none).unwrap();
    let loaded: Option<Box<dyn Animal>> = morphic.deserialize(&bytes).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn test_trait_hierarchy() {
    let morphic = Morphic::default();
    let cat: Rc<dyn Animal> = Rc::new(Cat {
        name: "Tom".to_string(),
        lives: 9,
    });
    let bytes = morphic.serialize(&cat).unwrap();
    let loaded: Rc<dyn Animal> = morphic.deserialize(&bytes).unwrap();
    assert_eq!(loaded.name(), "Tom");
    let cat = downcast::<dyn Animal, Cat>(loaded).unwrap();
    assert_eq!(cat.lives, 9);

    let mammal: Box<dyn Mammal> = Box::new(Cat {
        name: "Felix".to_string(),
        lives: 7,
    });
    let bytes = morphic.serialize(&mammal).unwrap();
    let loaded: Box<dyn Mammal> = morphic.deserialize(&bytes).unwrap();
    assert_eq!(loaded.legs(), 4);
    assert_eq!(loaded.name(), "Felix");
}

#[derive(Save, Load)]
struct Kennel {
    resident: Rc<Dog>,
    animal: Rc<dyn Animal>,
    visitors: Vec<Option<Rc<dyn Animal>>>,
}

#[test]
fn test_concrete_and_polymorphic_alias() {
    let dog = Rc::new(Dog {
        name: "Rex".to_string(),
    });
    let kennel = Kennel {
        resident: dog.clone(),
        animal: dog.clone(),
        visitors: vec![None, Some(dog)],
    };
    let morphic = Morphic::default();
    let bytes = morphic.serialize(&kennel).unwrap();
    assert_eq!(count(&bytes, b"Rex"), 1);

    let loaded: Kennel = morphic.deserialize(&bytes).unwrap();
    let resident = Rc::as_ptr(&loaded.resident) as *const ();
    assert_eq!(Rc::as_ptr(&loaded.animal) as *const (), resident);
    assert!(loaded.visitors[0].is_none());
    let visitor = loaded.visitors[1].as_ref().unwrap();
    assert_eq!(Rc::as_ptr(visitor) as *const (), resident);
}

#[test]
fn test_compact_round_trip() {
    let morphic = Morphic::default().format(Format::Compact);
    let dog = rex();
    let bytes = morphic.serialize(&vec![dog.clone(), dog]).unwrap();
    let loaded: Vec<Rc<dyn Animal>> = morphic.deserialize(&bytes).unwrap();
    assert!(Rc::ptr_eq(&loaded[0], &loaded[1]));
    assert_eq!(loaded[0].name(), "Rex");

    let compact = morphic.serialize(&rex()).unwrap();
    let binary = Morphic::default().serialize(&rex()).unwrap();
    assert!(compact.len() < binary.len());
}

#[test]
fn test_format_mismatch_rejected() {
    if morphic_core::error::should_panic_on_error() {
        return;
    }
    let bytes = Morphic::default()
        .format(Format::Compact)
        .serialize(&rex())
        .unwrap();
    let result: Result<Rc<dyn Animal>, _> = Morphic::default().deserialize(&bytes);
    assert!(result.is_err());
}

#[test]
fn test_archives_directly() {
    let dog = rex();
    let mut out = BinaryOutputArchive::new();
    out.process(&dog).unwrap();
    out.process(&42u32).unwrap();
    out.process(&dog).unwrap();

    let mut input = BinaryInputArchive::new(out.into_bytes()).unwrap();
    let first: Rc<dyn Animal> = input.process().unwrap();
    let number: u32 = input.process().unwrap();
    let second: Rc<dyn Animal> = input.process().unwrap();
    assert_eq!(number, 42);
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(input.remaining(), 0);
}
