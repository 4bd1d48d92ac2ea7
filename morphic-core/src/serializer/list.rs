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

use crate::archive::{InputArchive, OutputArchive};
use crate::error::Error;
use crate::serializer::{Load, Save};

impl<T: Save> Save for [T] {
    fn save<A: OutputArchive>(&self, ar: &mut A) -> Result<(), Error> {
        ar.write_size(self.len())?;
        for item in self {
            item.save(ar)?;
        }
        Ok(())
    }
}

impl<T: Save> Save for Vec<T> {
    fn save<A: OutputArchive>(&self, ar: &mut A) -> Result<(), Error> {
        self.as_slice().save(ar)
    }
}

impl<T: Load> Load for Vec<T> {
    fn load<A: InputArchive>(ar: &mut A) -> Result<Self, Error> {
        let len = ar.read_size()?;
        // the length comes from the stream, so do not trust it for allocation
        let mut items = Vec::with_capacity(len.min(4096));
        for _ in 0..len {
            items.push(T::load(ar)?);
        }
        Ok(items)
    }

    fn placeholder() -> Option<Self> {
        Some(Vec::new())
    }
}
