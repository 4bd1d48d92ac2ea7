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

//! Varint archives: integers wider than a byte are LEB128 encoded, signed
//! ones zigzag encoded first. Floats stay fixed-width.

use crate::archive::{read_header, usize_from, write_header, InputArchive, OutputArchive};
use crate::buffer::{Reader, Writer};
use crate::config::Config;
use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::types::header_flags::IS_COMPACT_FLAG;

pub struct CompactOutputArchive {
    writer: Writer,
    context: WriteContext,
}

impl Default for CompactOutputArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl CompactOutputArchive {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let mut writer = Writer::default();
        if config.has_header() {
            write_header(&mut writer, IS_COMPACT_FLAG);
        }
        CompactOutputArchive {
            writer,
            context: WriteContext::new(config),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.writer.as_slice()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

impl OutputArchive for CompactOutputArchive {
    fn write_u8(&mut self, value: u8) -> Result<(), Error> {
        self.writer.write_u8(value);
        Ok(())
    }

    fn write_i8(&mut self, value: i8) -> Result<(), Error> {
        self.writer.write_i8(value);
        Ok(())
    }

    fn write_u16(&mut self, value: u16) -> Result<(), Error> {
        self.writer.write_varuint32(value as u32);
        Ok(())
    }

    fn write_i16(&mut self, value: i16) -> Result<(), Error> {
        self.writer.write_varint32(value as i32);
        Ok(())
    }

    fn write_u32(&mut self, value: u32) -> Result<(), Error> {
        self.writer.write_varuint32(value);
        Ok(())
    }

    fn write_i32(&mut self, value: i32) -> Result<(), Error> {
        self.writer.write_varint32(value);
        Ok(())
    }

    fn write_u64(&mut self, value: u64) -> Result<(), Error> {
        self.writer.write_varuint64(value);
        Ok(())
    }

    fn write_i64(&mut self, value: i64) -> Result<(), Error> {
        self.writer.write_varint64(value);
        Ok(())
    }

    fn write_f32(&mut self, value: f32) -> Result<(), Error> {
        self.writer.write_f32(value);
        Ok(())
    }

    fn write_f64(&mut self, value: f64) -> Result<(), Error> {
        self.writer.write_f64(value);
        Ok(())
    }

    fn write_size(&mut self, len: usize) -> Result<(), Error> {
        self.writer.write_varuint64(len as u64);
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.writer.write_bytes(bytes);
        Ok(())
    }

    fn context(&mut self) -> &mut WriteContext {
        &mut self.context
    }
}

pub struct CompactInputArchive {
    reader: Reader,
    context: ReadContext,
}

impl CompactInputArchive {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, Error> {
        Self::with_config(bytes, Config::default())
    }

    pub fn with_config(bytes: impl Into<Vec<u8>>, config: Config) -> Result<Self, Error> {
        let mut reader = Reader::new(bytes);
        if config.has_header() {
            read_header(&mut reader, IS_COMPACT_FLAG)?;
        }
        Ok(CompactInputArchive {
            reader,
            context: ReadContext::new(config),
        })
    }

    pub fn remaining(&self) -> usize {
        self.reader.remaining()
    }
}

impl InputArchive for CompactInputArchive {
    fn read_u8(&mut self) -> Result<u8, Error> {
        self.reader.read_u8()
    }

    fn read_i8(&mut self) -> Result<i8, Error> {
        self.reader.read_i8()
    }

    fn read_u16(&mut self) -> Result<u16, Error> {
        let value = self.reader.read_varuint32()?;
        u16::try_from(value).map_err(|_| Error::invalid_data(format!("{} overflows u16", value)))
    }

    fn read_i16(&mut self) -> Result<i16, Error> {
        let value = self.reader.read_varint32()?;
        i16::try_from(value).map_err(|_| Error::invalid_data(format!("{} overflows i16", value)))
    }

    fn read_u32(&mut self) -> Result<u32, Error> {
        self.reader.read_varuint32()
    }

    fn read_i32(&mut self) -> Result<i32, Error> {
        self.reader.read_varint32()
    }

    fn read_u64(&mut self) -> Result<u64, Error> {
        self.reader.read_varuint64()
    }

    fn read_i64(&mut self) -> Result<i64, Error> {
        self.reader.read_varint64()
    }

    fn read_f32(&mut self) -> Result<f32, Error> {
        self.reader.read_f32()
    }

    fn read_f64(&mut self) -> Result<f64, Error> {
        self.reader.read_f64()
    }

    fn read_size(&mut self) -> Result<usize, Error> {
        usize_from(self.reader.read_varuint64()?)
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, Error> {
        Ok(self.reader.read_bytes(len)?.to_vec())
    }

    fn read_string(&mut self) -> Result<String, Error> {
        let len = self.read_size()?;
        self.reader.read_utf8_string(len)
    }

    fn context(&mut self) -> &mut ReadContext {
        &mut self.context
    }
}
