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

//! Archive traits and the built-in archive families.
//!
//! An archive owns its buffer and the per-instance identity tables. It is
//! confined to one thread at a time; different archive instances can be
//! used from different threads freely.

pub mod binary;
pub mod compact;

pub use binary::{BinaryInputArchive, BinaryOutputArchive};
pub use compact::{CompactInputArchive, CompactOutputArchive};

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::{Load, Save};
use crate::types::MAGIC_NUMBER;

/// Sink side of an archive.
///
/// Every method describes a logical value; how it is encoded is up to the
/// implementation. Polymorphic bindings are kept per implementing type.
pub trait OutputArchive: Sized + 'static {
    fn write_u8(&mut self, value: u8) -> Result<(), Error>;
    fn write_i8(&mut self, value: i8) -> Result<(), Error>;
    fn write_u16(&mut self, value: u16) -> Result<(), Error>;
    fn write_i16(&mut self, value: i16) -> Result<(), Error>;
    fn write_u32(&mut self, value: u32) -> Result<(), Error>;
    fn write_i32(&mut self, value: i32) -> Result<(), Error>;
    fn write_u64(&mut self, value: u64) -> Result<(), Error>;
    fn write_i64(&mut self, value: i64) -> Result<(), Error>;
    fn write_f32(&mut self, value: f32) -> Result<(), Error>;
    fn write_f64(&mut self, value: f64) -> Result<(), Error>;
    /// Writes a collection or string length.
    fn write_size(&mut self, len: usize) -> Result<(), Error>;
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error>;

    fn context(&mut self) -> &mut WriteContext;

    fn write_bool(&mut self, value: bool) -> Result<(), Error> {
        self.write_u8(value as u8)
    }

    fn write_str(&mut self, value: &str) -> Result<(), Error> {
        self.write_size(value.len())?;
        self.write_bytes(value.as_bytes())
    }

    /// Serializes a nested value.
    fn process<T: Save + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        value.save(self)
    }
}

/// Source side of an archive.
pub trait InputArchive: Sized + 'static {
    fn read_u8(&mut self) -> Result<u8, Error>;
    fn read_i8(&mut self) -> Result<i8, Error>;
    fn read_u16(&mut self) -> Result<u16, Error>;
    fn read_i16(&mut self) -> Result<i16, Error>;
    fn read_u32(&mut self) -> Result<u32, Error>;
    fn read_i32(&mut self) -> Result<i32, Error>;
    fn read_u64(&mut self) -> Result<u64, Error>;
    fn read_i64(&mut self) -> Result<i64, Error>;
    fn read_f32(&mut self) -> Result<f32, Error>;
    fn read_f64(&mut self) -> Result<f64, Error>;
    fn read_size(&mut self) -> Result<usize, Error>;
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, Error>;

    fn context(&mut self) -> &mut ReadContext;

    fn read_bool(&mut self) -> Result<bool, Error> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::invalid_data(format!("invalid bool value {}", other))),
        }
    }

    fn read_string(&mut self) -> Result<String, Error> {
        let len = self.read_size()?;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes)
            .map_err(|e| Error::invalid_data(format!("invalid utf8 string: {}", e)))
    }

    /// Deserializes a nested value.
    fn process<T: Load>(&mut self) -> Result<T, Error> {
        T::load(self)
    }
}

pub(crate) fn write_header(writer: &mut Writer, flags: u8) {
    writer.write_u16(MAGIC_NUMBER);
    writer.write_u8(flags);
}

pub(crate) fn read_header(reader: &mut Reader, flags: u8) -> Result<(), Error> {
    let magic = reader.read_u16()?;
    if magic != MAGIC_NUMBER {
        return Err(Error::invalid_data(format!(
            "invalid magic number {:#06x}, the data was not written by a morphic archive",
            magic
        )));
    }
    let found = reader.read_u8()?;
    if found != flags {
        return Err(Error::invalid_data(format!(
            "archive flags mismatch: expected {:#04x}, found {:#04x}",
            flags, found
        )));
    }
    Ok(())
}

pub(crate) fn usize_from(len: u64) -> Result<usize, Error> {
    usize::try_from(len)
        .map_err(|_| Error::invalid_data(format!("length {} does not fit in usize", len)))
}
