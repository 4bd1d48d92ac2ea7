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

use std::collections::HashMap;

use crate::error::Error;
use crate::types::MSB_32BIT;

/// Assigns per-archive ordinals to polymorphic type names. A name is written
/// in full once; later occurrences reuse its ordinal.
pub struct TypeNameWriter {
    ids: HashMap<&'static str, u32>,
    next_id: u32,
}

impl Default for TypeNameWriter {
    fn default() -> Self {
        TypeNameWriter {
            ids: HashMap::new(),
            next_id: 1,
        }
    }
}

impl TypeNameWriter {
    /// Returns the id to write; the msb is set when `name` must follow.
    pub fn register(&mut self, name: &'static str) -> u32 {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.ids.insert(name, id);
        id | MSB_32BIT
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.next_id = 1;
    }
}

#[derive(Default)]
pub struct TypeNameReader {
    names: Vec<String>,
}

impl TypeNameReader {
    /// Records the name read for `id`; ordinals must arrive in order.
    pub fn register(&mut self, id: u32, name: String) -> Result<(), Error> {
        let expected = self.names.len() as u32 + 1;
        if id != expected {
            return Err(Error::invalid_data(format!(
                "polymorphic type id {} out of order, expected {}",
                id, expected
            )));
        }
        self.names.push(name);
        Ok(())
    }

    pub fn get(&self, id: u32) -> Result<&str, Error> {
        id.checked_sub(1)
            .and_then(|index| self.names.get(index as usize))
            .map(String::as_str)
            .ok_or_else(|| Error::unknown_polymorphic_id(id))
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }
}
