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

use crate::archive::{
    BinaryInputArchive, BinaryOutputArchive, CompactInputArchive, CompactOutputArchive,
    InputArchive, OutputArchive,
};
use crate::config::Config;
use crate::error::Error;
use crate::serializer::{Load, Save};

/// Encoding used by [`Morphic`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    /// Fixed-width little endian integers.
    #[default]
    Binary,
    /// Variable-length integers.
    Compact,
}

/// One-call serialization of a whole value into a fresh archive.
///
/// Each call runs with its own identity tables, so aliasing is preserved
/// within one value and never across calls.
///
/// ```rust
/// use morphic_core::{Format, Morphic};
/// use std::rc::Rc;
///
/// let morphic = Morphic::default().format(Format::Compact);
/// let shared = Rc::new(7u64);
/// let bytes = morphic.serialize(&vec![shared.clone(), shared]).unwrap();
/// let loaded: Vec<Rc<u64>> = morphic.deserialize(&bytes).unwrap();
/// assert!(Rc::ptr_eq(&loaded[0], &loaded[1]));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Morphic {
    config: Config,
    format: Format,
}

impl Morphic {
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Sets whether streams carry the magic number and flag byte.
    ///
    /// A stream written without a header can only be read back by a
    /// `Morphic` (or archive) that also has it disabled.
    pub fn header(mut self, header: bool) -> Self {
        self.config.header = header;
        self
    }

    /// Sets the maximum nesting of pointer bodies accepted while reading.
    ///
    /// ```rust
    /// use morphic_core::Morphic;
    ///
    /// let morphic = Morphic::default().max_depth(16);
    /// assert_eq!(morphic.config().max_depth(), 16);
    /// ```
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn get_format(&self) -> Format {
        self.format
    }

    pub fn serialize<T: Save + ?Sized>(&self, value: &T) -> Result<Vec<u8>, Error> {
        match self.format {
            Format::Binary => {
                let mut ar = BinaryOutputArchive::with_config(self.config.clone());
                ar.process(value)?;
                Ok(ar.into_bytes())
            }
            Format::Compact => {
                let mut ar = CompactOutputArchive::with_config(self.config.clone());
                ar.process(value)?;
                Ok(ar.into_bytes())
            }
        }
    }

    /// Reads a value. The whole input must be consumed and every weak
    /// reference must have found its target.
    pub fn deserialize<T: Load>(&self, bytes: &[u8]) -> Result<T, Error> {
        match self.format {
            Format::Binary => {
                let mut ar = BinaryInputArchive::with_config(bytes, self.config.clone())?;
                let value = ar.process()?;
                ar.context().identity.check_resolved()?;
                Self::ensure_consumed(ar.remaining())?;
                Ok(value)
            }
            Format::Compact => {
                let mut ar = CompactInputArchive::with_config(bytes, self.config.clone())?;
                let value = ar.process()?;
                ar.context().identity.check_resolved()?;
                Self::ensure_consumed(ar.remaining())?;
                Ok(value)
            }
        }
    }

    fn ensure_consumed(remaining: usize) -> Result<(), Error> {
        if remaining != 0 {
            return Err(Error::invalid_data(format!(
                "{} trailing bytes after the deserialized value",
                remaining
            )));
        }
        Ok(())
    }
}
