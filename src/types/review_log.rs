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

use crate::types::card_id::CardId;
use crate::types::rating::Rating;
use crate::types::state::Phase;
use crate::types::timestamp::Timestamp;

/// One applied review, as appended to the audit log. Log entries are written
/// once and never read back into the scheduler.
#[derive(Clone, Debug)]
pub struct ReviewLogEntry {
    pub card_id: CardId,
    pub learner: String,
    pub rating: Rating,
    /// The phase the review left the card in.
    pub phase: Phase,
    pub elapsed_days: f64,
    pub scheduled_days: f64,
    /// How long the learner spent on the card, if the client reported it.
    pub duration_ms: Option<u64>,
    pub reviewed_at: Timestamp,
}
