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

macro_rules! impl_num_serializer {
    ($ty:ty, $writer:ident, $reader:ident) => {
        impl Save for $ty {
            #[inline(always)]
            fn save<A: OutputArchive>(&self, ar: &mut A) -> Result<(), Error> {
                ar.$writer(*self)
            }
        }

        impl Load for $ty {
            #[inline(always)]
            fn load<A: InputArchive>(ar: &mut A) -> Result<Self, Error> {
                ar.$reader()
            }

            fn placeholder() -> Option<Self> {
                Some(<$ty>::default())
            }
        }
    };
}

impl_num_serializer!(bool, write_bool, read_bool);
impl_num_serializer!(u8, write_u8, read_u8);
impl_num_serializer!(i8, write_i8, read_i8);
impl_num_serializer!(u16, write_u16, read_u16);
impl_num_serializer!(i16, write_i16, read_i16);
impl_num_serializer!(u32, write_u32, read_u32);
impl_num_serializer!(i32, write_i32, read_i32);
impl_num_serializer!(u64, write_u64, read_u64);
impl_num_serializer!(i64, write_i64, read_i64);
impl_num_serializer!(f32, write_f32, read_f32);
impl_num_serializer!(f64, write_f64, read_f64);

impl Save for usize {
    fn save<A: OutputArchive>(&self, ar: &mut A) -> Result<(), Error> {
        ar.write_u64(*self as u64)
    }
}

impl Load for usize {
    fn load<A: InputArchive>(ar: &mut A) -> Result<Self, Error> {
        let value = ar.read_u64()?;
        usize::try_from(value)
            .map_err(|_| Error::invalid_data(format!("{} does not fit in usize", value)))
    }

    fn placeholder() -> Option<Self> {
        Some(0)
    }
}
