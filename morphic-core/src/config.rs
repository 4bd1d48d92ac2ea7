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

/// Options shared by an archive instance and its read/write context.
///
/// The same value is used by `Morphic` and by archives built with
/// `with_config`, so a stream written under one config can be read back
/// by an archive built with the same one.
#[derive(Clone, Debug)]
pub struct Config {
    /// Whether the archive starts with a magic number and flag byte.
    pub header: bool,
    /// Maximum nesting of pointer bodies while reading.
    pub max_depth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            header: true,
            max_depth: 128,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn has_header(&self) -> bool {
        self.header
    }

    #[inline(always)]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }
}
