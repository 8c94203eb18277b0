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

use crate::cmd::resolve_directory;
use crate::config::Config;
use crate::db::DB_FILE;
use crate::db::Database;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::queue::select_due;
use crate::types::timestamp::Timestamp;

/// Print the current study queue as JSON.
pub fn print_due(
    directory: Option<String>,
    learner: &str,
    deck: Option<&str>,
    limit: Option<usize>,
) -> Fallible<()> {
    let directory = resolve_directory(directory)?;
    let config = Config::load(&directory)?;
    let db_path = directory.join(DB_FILE);
    let db = Database::new(
        db_path
            .to_str()
            .ok_or_else(|| ErrorReport::new("invalid path"))?,
    )?;

    let now = Timestamp::now();
    let entries = db.learner_queue(learner, deck, now)?;
    let queue = select_due(&entries, now, limit.unwrap_or(config.queue_limit));
    let json = serde_json::to_string_pretty(&queue)?;
    println!("{}", json);
    Ok(())
}
