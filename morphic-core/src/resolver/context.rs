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

use crate::config::Config;
use crate::error::Error;
use crate::resolver::identity::{IdentityReader, IdentityWriter};
use crate::resolver::type_names::{TypeNameReader, TypeNameWriter};

/// Per-archive state of a serialization run.
pub struct WriteContext {
    config: Config,
    pub identity: IdentityWriter,
    pub type_names: TypeNameWriter,
}

impl WriteContext {
    pub fn new(config: Config) -> WriteContext {
        WriteContext {
            config,
            identity: IdentityWriter::new(),
            type_names: TypeNameWriter::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn reset(&mut self) {
        self.identity.clear();
        self.type_names.clear();
    }
}

/// Per-archive state of a deserialization run.
pub struct ReadContext {
    config: Config,
    pub identity: IdentityReader,
    pub type_names: TypeNameReader,
    current_depth: u32,
}

impl ReadContext {
    pub fn new(config: Config) -> ReadContext {
        ReadContext {
            config,
            identity: IdentityReader::new(),
            type_names: TypeNameReader::default(),
            current_depth: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn inc_depth(&mut self) -> Result<(), Error> {
        self.current_depth += 1;
        if self.current_depth > self.config.max_depth() {
            return Err(Error::depth_exceed(format!(
                "Maximum pointer nesting depth ({}) exceeded. Current depth: {}. \
                 Consider increasing Config::max_depth if the object graph is this deep.",
                self.config.max_depth(),
                self.current_depth
            )));
        }
        Ok(())
    }

    pub fn dec_depth(&mut self) {
        self.current_depth = self.current_depth.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        self.identity.clear();
        self.type_names.clear();
        self.current_depth = 0;
    }
}
