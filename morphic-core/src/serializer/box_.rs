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

use std::any::type_name;

use crate::archive::{InputArchive, OutputArchive};
use crate::error::Error;
use crate::serializer::{Load, Pointee, Save};

impl<T: Pointee + ?Sized> Save for Box<T> {
    fn save<A: OutputArchive>(&self, ar: &mut A) -> Result<(), Error> {
        T::save_unique(Some(self.as_ref()), ar)
    }
}

impl<T: Pointee + ?Sized> Load for Box<T> {
    fn load<A: InputArchive>(ar: &mut A) -> Result<Self, Error> {
        T::load_unique(ar)?.ok_or_else(|| {
            Error::invalid_data(format!(
                "null pointer read for a non-optional Box<{}>",
                type_name::<T>()
            ))
        })
    }
}

impl<T: Pointee + ?Sized> Save for Option<Box<T>> {
    fn save<A: OutputArchive>(&self, ar: &mut A) -> Result<(), Error> {
        T::save_unique(self.as_deref(), ar)
    }
}

impl<T: Pointee + ?Sized> Load for Option<Box<T>> {
    fn load<A: InputArchive>(ar: &mut A) -> Result<Self, Error> {
        T::load_unique(ar)
    }

    fn placeholder() -> Option<Self> {
        Some(None)
    }
}
