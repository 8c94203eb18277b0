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

pub mod due;
pub mod serve;
pub mod stats;

use std::env::current_dir;
use std::path::PathBuf;

use crate::error::Fallible;
use crate::error::fail;

/// Resolve the deck directory argument, defaulting to the current directory.
pub fn resolve_directory(directory: Option<String>) -> Fallible<PathBuf> {
    let directory: PathBuf = match directory {
        Some(dir) => PathBuf::from(dir),
        None => current_dir()?,
    };
    if directory.exists() {
        Ok(directory.canonicalize()?)
    } else {
        fail("directory does not exist.")
    }
}
