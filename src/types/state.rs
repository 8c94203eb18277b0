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

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Serialize;

use crate::fsrs;
use crate::fsrs::Difficulty;
use crate::fsrs::Stability;
use crate::types::timestamp::Timestamp;

/// Where a card sits in its learning lifecycle.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    New,
    Learning,
    Review,
    Relearning,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::New => "new",
            Phase::Learning => "learning",
            Phase::Review => "review",
            Phase::Relearning => "relearning",
        }
    }
}

impl ToSql for Phase {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Phase {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        match string.as_str() {
            "new" => Ok(Phase::New),
            "learning" => Ok(Phase::Learning),
            "review" => Ok(Phase::Review),
            "relearning" => Ok(Phase::Relearning),
            _ => Err(FromSqlError::Other(
                format!("invalid phase in database: {string}").into(),
            )),
        }
    }
}

/// The scheduling state of one card for one learner.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardState {
    /// Memory stability, in days.
    pub stability: Stability,
    /// Intrinsic hardness of the card, in [1, 10].
    pub difficulty: Difficulty,
    /// Days between the previous two reviews, as observed at the last
    /// scheduling decision.
    pub elapsed_days: f64,
    /// The interval the last scheduling decision assigned, in days.
    /// Stored unrounded; rounding is a display concern.
    pub scheduled_days: f64,
    /// How many reviews have been applied.
    pub reps: u32,
    /// How many times a review-phase card was forgotten.
    pub lapses: u32,
    pub phase: Phase,
    /// When the card next becomes eligible for study.
    pub due: Timestamp,
    pub last_review: Option<Timestamp>,
}

impl CardState {
    /// The implicit state of a card that has never been reviewed. No row is
    /// stored for these; the state is synthesized at the boundary.
    pub fn new(now: Timestamp) -> Self {
        Self {
            stability: 0.0,
            difficulty: 0.0,
            elapsed_days: 0.0,
            scheduled_days: 0.0,
            reps: 0,
            lapses: 0,
            phase: Phase::New,
            due: now,
            last_review: None,
        }
    }

    /// Probability of recalling this card at time `now`. None for cards that
    /// have never been reviewed.
    pub fn retrievability(&self, now: Timestamp) -> Option<f64> {
        let last_review = self.last_review?;
        let elapsed = now.days_since(last_review).max(0.0);
        Some(fsrs::retrievability(elapsed, self.stability))
    }

    pub fn is_due(&self, now: Timestamp) -> bool {
        self.phase == Phase::New || self.due <= now
    }

    /// Repair a state loaded from storage. Out-of-range or non-finite values
    /// are clamped into valid bounds rather than rejected.
    pub fn sanitize(mut self) -> Self {
        if !self.stability.is_finite() {
            self.stability = fsrs::STABILITY_MIN;
        }
        self.stability = self.stability.clamp(fsrs::STABILITY_MIN, fsrs::STABILITY_MAX);
        if !self.difficulty.is_finite() {
            self.difficulty = fsrs::DIFFICULTY_MID;
        }
        self.difficulty = self.difficulty.clamp(fsrs::DIFFICULTY_MIN, fsrs::DIFFICULTY_MAX);
        if !self.elapsed_days.is_finite() || self.elapsed_days < 0.0 {
            self.elapsed_days = 0.0;
        }
        if !self.scheduled_days.is_finite() || self.scheduled_days < 0.0 {
            self.scheduled_days = 0.0;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    fn at(s: &str) -> Timestamp {
        Timestamp::from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_new_state_invariants() {
        let now = at("2025-06-01T12:00:00+00:00");
        let state = CardState::new(now);
        assert_eq!(state.phase, Phase::New);
        assert_eq!(state.reps, 0);
        assert_eq!(state.lapses, 0);
        assert!(state.last_review.is_none());
        assert!(state.is_due(now));
    }

    #[test]
    fn test_new_card_is_due_regardless_of_due_field() {
        let now = at("2025-06-01T12:00:00+00:00");
        let mut state = CardState::new(now.add_days(10.0));
        state.due = now.add_days(10.0);
        assert!(state.is_due(now));
    }

    #[test]
    fn test_reviewed_card_due_at_or_before_now() {
        let now = at("2025-06-01T12:00:00+00:00");
        let mut state = CardState::new(now);
        state.phase = Phase::Review;
        state.due = now;
        assert!(state.is_due(now));
        state.due = now.add_days(1.0);
        assert!(!state.is_due(now));
    }

    #[test]
    fn test_retrievability_none_for_new() {
        let now = at("2025-06-01T12:00:00+00:00");
        let state = CardState::new(now);
        assert!(state.retrievability(now).is_none());
    }

    #[test]
    fn test_retrievability_decreases_over_time() {
        let now = at("2025-06-01T12:00:00+00:00");
        let mut state = CardState::new(now);
        state.phase = Phase::Review;
        state.stability = 10.0;
        state.difficulty = 5.0;
        state.last_review = Some(now);
        let r0 = state.retrievability(now).unwrap();
        let r1 = state.retrievability(now.add_days(5.0)).unwrap();
        let r2 = state.retrievability(now.add_days(30.0)).unwrap();
        assert!((r0 - 1.0).abs() < 1e-9);
        assert!(r1 > r2);
    }

    #[test]
    fn test_sanitize_clamps_corrupt_values() {
        let now = at("2025-06-01T12:00:00+00:00");
        let mut state = CardState::new(now);
        state.stability = f64::NAN;
        state.difficulty = 250.0;
        state.elapsed_days = -3.0;
        state.scheduled_days = f64::INFINITY;
        let state = state.sanitize();
        assert!(state.stability.is_finite());
        assert!(state.difficulty >= 1.0);
        assert!(state.difficulty <= 10.0);
        assert_eq!(state.elapsed_days, 0.0);
        assert_eq!(state.scheduled_days, 0.0);
    }

    #[test]
    fn test_state_json_shape() -> Fallible<()> {
        let now = at("2025-06-01T12:00:00+00:00");
        let state = CardState::new(now);
        let json = serde_json::to_string(&state)?;
        assert!(json.contains("\"phase\":\"new\""));
        assert!(json.contains("\"scheduledDays\":0.0"));
        assert!(json.contains("\"lastReview\":null"));
        Ok(())
    }
}
