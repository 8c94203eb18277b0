// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::error::Fallible;
use crate::queue::DEFAULT_LIMIT;
use crate::scheduler::SchedulerParams;

/// Name of the optional per-directory config file.
pub const CONFIG_FILE: &str = "cardbox.toml";

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Port the API server binds to.
    pub port: u16,
    /// Queue size when a pull does not say how many cards it wants.
    pub queue_limit: usize,
    pub scheduler: SchedulerParams,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            queue_limit: DEFAULT_LIMIT,
            scheduler: SchedulerParams::default(),
        }
    }
}

impl Config {
    /// Load the config file from `directory`, falling back to defaults if
    /// there is none.
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE);
        if path.exists() {
            let content = read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            log::debug!("No {CONFIG_FILE} found, using defaults.");
            Ok(Config::default())
        }
    }
}
