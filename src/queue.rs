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

use serde::Serialize;

use crate::types::card_id::CardId;
use crate::types::state::CardState;
use crate::types::state::Phase;
use crate::types::timestamp::Timestamp;

/// How many cards a study pull returns when the caller does not say.
pub const DEFAULT_LIMIT: usize = 20;

/// One card as it appears in a study queue.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub card_id: CardId,
    pub deck: String,
    pub state: CardState,
}

/// Select and order the cards eligible for study at time `now`.
///
/// Unseen cards come first, in the order the caller supplied them (card
/// creation order); due cards follow, soonest-due first. Ties keep the input
/// order, so repeated pulls with no intervening reviews are identical. At
/// most `limit` cards are returned, and never an ineligible one.
pub fn select_due(entries: &[QueueEntry], now: Timestamp, limit: usize) -> Vec<QueueEntry> {
    let mut new: Vec<QueueEntry> = Vec::new();
    let mut due: Vec<QueueEntry> = Vec::new();
    for entry in entries {
        if !entry.state.is_due(now) {
            continue;
        }
        if entry.state.phase == Phase::New {
            new.push(entry.clone());
        } else {
            due.push(entry.clone());
        }
    }
    due.sort_by_key(|entry| entry.state.due);
    let mut queue = new;
    queue.extend(due);
    queue.truncate(limit);
    queue
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> Timestamp {
        Timestamp::from_rfc3339(s).unwrap()
    }

    fn now() -> Timestamp {
        at("2025-06-01T12:00:00+00:00")
    }

    fn new_entry(id: &str) -> QueueEntry {
        QueueEntry {
            card_id: CardId::new(id),
            deck: "default".to_string(),
            state: CardState::new(now()),
        }
    }

    fn review_entry(id: &str, due: Timestamp) -> QueueEntry {
        let mut state = CardState::new(now());
        state.phase = Phase::Review;
        state.stability = 10.0;
        state.difficulty = 5.0;
        state.due = due;
        state.last_review = Some(due.add_days(-10.0));
        state.reps = 3;
        QueueEntry {
            card_id: CardId::new(id),
            deck: "default".to_string(),
            state,
        }
    }

    fn ids(queue: &[QueueEntry]) -> Vec<&str> {
        queue.iter().map(|e| e.card_id.as_str()).collect()
    }

    #[test]
    fn test_new_before_due_reviews() {
        let entries = vec![
            review_entry("r1", now().add_days(-2.0)),
            new_entry("n1"),
            review_entry("r2", now().add_days(-5.0)),
            new_entry("n2"),
            new_entry("n3"),
        ];
        let queue = select_due(&entries, now(), 10);
        assert_eq!(ids(&queue), vec!["n1", "n2", "n3", "r2", "r1"]);
    }

    #[test]
    fn test_ineligible_cards_never_pad() {
        let entries = vec![
            new_entry("n1"),
            review_entry("future", now().add_days(3.0)),
            review_entry("overdue", now().add_days(-1.0)),
        ];
        let queue = select_due(&entries, now(), 10);
        assert_eq!(ids(&queue), vec!["n1", "overdue"]);
    }

    #[test]
    fn test_due_exactly_now_is_eligible() {
        let entries = vec![review_entry("r1", now())];
        let queue = select_due(&entries, now(), 10);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_limit_truncates() {
        let entries: Vec<QueueEntry> = (0..30).map(|i| new_entry(&format!("n{i}"))).collect();
        let queue = select_due(&entries, now(), DEFAULT_LIMIT);
        assert_eq!(queue.len(), DEFAULT_LIMIT);
        assert_eq!(queue[0].card_id.as_str(), "n0");
    }

    #[test]
    fn test_ties_keep_input_order() {
        let due = now().add_days(-1.0);
        let entries = vec![
            review_entry("a", due),
            review_entry("b", due),
            review_entry("c", due),
        ];
        let queue = select_due(&entries, now(), 10);
        assert_eq!(ids(&queue), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let entries = vec![
            new_entry("n1"),
            review_entry("r1", now().add_days(-0.5)),
            review_entry("r2", now().add_days(-0.25)),
        ];
        let first = ids(&select_due(&entries, now(), 10))
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        for _ in 0..5 {
            let again = ids(&select_due(&entries, now(), 10))
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_empty_input() {
        let queue = select_due(&[], now(), 10);
        assert!(queue.is_empty());
    }
}
