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

//! `RefCell<T>` is transparent: only the contained value is written.
//!
//! This is what makes `Rc<RefCell<Node>>` graphs with back edges possible,
//! since the links can be patched after construction. A `RefCell` whose
//! contents have a placeholder is allocated first and filled afterwards, so
//! strong back edges resolve to the cell being loaded.

use std::cell::RefCell;

use crate::archive::{InputArchive, OutputArchive};
use crate::error::Error;
use crate::serializer::{Load, Save};

impl<T: Save> Save for RefCell<T> {
    fn save<A: OutputArchive>(&self, ar: &mut A) -> Result<(), Error> {
        let value = self.try_borrow().map_err(|_| {
            Error::invalid_data(format!(
                "RefCell<{}> is mutably borrowed while being saved",
                std::any::type_name::<T>()
            ))
        })?;
        T::save(&value, ar)
    }
}

impl<T: Load> Load for RefCell<T> {
    fn load<A: InputArchive>(ar: &mut A) -> Result<Self, Error> {
        Ok(RefCell::new(T::load(ar)?))
    }

    fn placeholder() -> Option<Self> {
        T::placeholder().map(RefCell::new)
    }

    fn shared_placeholder() -> Option<Self> {
        Self::placeholder()
    }

    fn load_in_place<A: InputArchive>(&self, ar: &mut A) -> Result<(), Error> {
        let value = T::load(ar)?;
        let mut slot = self.try_borrow_mut().map_err(|_| {
            Error::invalid_data(format!(
                "RefCell<{}> is borrowed while being loaded",
                std::any::type_name::<T>()
            ))
        })?;
        *slot = value;
        Ok(())
    }
}
