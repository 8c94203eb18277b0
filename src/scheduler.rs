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

//! Scheduling decisions. Everything here is a pure function of the card
//! state, the rating, and an explicit `now`: the clock is never read.

use serde::Deserialize;

use crate::fsrs;
use crate::types::rating::Rating;
use crate::types::state::CardState;
use crate::types::state::Phase;
use crate::types::timestamp::Timestamp;

const MINUTES_PER_DAY: f64 = 1440.0;

/// Scheduler tunables. The defaults are sane; decks can override them in
/// their config file.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerParams {
    /// The recall probability the next interval aims for.
    pub desired_retention: f64,
    /// The minimum review interval in days.
    pub minimum_interval: f64,
    /// The maximum review interval in days.
    pub maximum_interval: f64,
    /// Re-queue delay, in minutes, after Again in a learning phase.
    pub learn_again_minutes: f64,
    /// Re-queue delay, in minutes, after Hard in a learning phase.
    pub learn_hard_minutes: f64,
    /// First-sight delay, in minutes, after Good on a new card.
    pub learn_good_minutes: f64,
    /// Re-queue delay, in minutes, after forgetting a review-phase card.
    pub relearn_minutes: f64,
}

impl Default for SchedulerParams {
    fn default() -> Self {
        Self {
            desired_retention: 0.9,
            minimum_interval: 1.0,
            maximum_interval: 128.0,
            learn_again_minutes: 1.0,
            learn_hard_minutes: 5.0,
            learn_good_minutes: 10.0,
            relearn_minutes: 10.0,
        }
    }
}

/// The four candidate outcomes of reviewing a card, one per rating. Computed
/// without committing anything, so clients can show interval previews.
#[derive(Clone, Copy, Debug)]
pub struct SchedulePreview {
    pub again: CardState,
    pub hard: CardState,
    pub good: CardState,
    pub easy: CardState,
}

impl SchedulePreview {
    pub fn branch(&self, rating: Rating) -> &CardState {
        match rating {
            Rating::Again => &self.again,
            Rating::Hard => &self.hard,
            Rating::Good => &self.good,
            Rating::Easy => &self.easy,
        }
    }
}

/// Compute all four candidate next states for a card at time `now`.
pub fn schedule_preview(
    state: &CardState,
    now: Timestamp,
    params: &SchedulerParams,
) -> SchedulePreview {
    SchedulePreview {
        again: next_state(state, Rating::Again, now, params),
        hard: next_state(state, Rating::Hard, now, params),
        good: next_state(state, Rating::Good, now, params),
        easy: next_state(state, Rating::Easy, now, params),
    }
}

/// Apply a rating to a card state, producing the authoritative next state.
///
/// Selects the matching branch of [`schedule_preview`], so the committed
/// outcome can never disagree with a preview shown for the same inputs.
pub fn apply_review(
    state: &CardState,
    rating: Rating,
    now: Timestamp,
    params: &SchedulerParams,
) -> CardState {
    *schedule_preview(state, now, params).branch(rating)
}

fn next_state(
    state: &CardState,
    rating: Rating,
    now: Timestamp,
    params: &SchedulerParams,
) -> CardState {
    // Clock skew is not an error: an elapsed time in the past clamps to zero.
    let elapsed = match state.last_review {
        Some(last_review) => now.days_since(last_review).max(0.0),
        None => 0.0,
    };

    let (phase, stability, difficulty, scheduled) = match state.phase {
        Phase::New => {
            let stability = fsrs::initial_stability(rating);
            let difficulty = fsrs::initial_difficulty(rating);
            match rating {
                Rating::Again => {
                    let step = params.learn_again_minutes / MINUTES_PER_DAY;
                    (Phase::Learning, stability, difficulty, step)
                }
                Rating::Hard => {
                    let step = params.learn_hard_minutes / MINUTES_PER_DAY;
                    (Phase::Learning, stability, difficulty, step)
                }
                Rating::Good => {
                    let step = params.learn_good_minutes / MINUTES_PER_DAY;
                    (Phase::Learning, stability, difficulty, step)
                }
                Rating::Easy => {
                    let interval = review_interval(stability, params);
                    (Phase::Review, stability, difficulty, interval)
                }
            }
        }
        Phase::Learning | Phase::Relearning => {
            // Learning steps are sub-day, so the long-term forgetting curve
            // says nothing useful yet; use the short-term stability update.
            let stability = fsrs::short_term_stability(state.stability, rating);
            let difficulty = fsrs::next_difficulty(state.difficulty, rating);
            match rating {
                Rating::Again => {
                    let step = params.learn_again_minutes / MINUTES_PER_DAY;
                    (state.phase, stability, difficulty, step)
                }
                Rating::Hard => {
                    let step = params.learn_hard_minutes / MINUTES_PER_DAY;
                    (state.phase, stability, difficulty, step)
                }
                Rating::Good | Rating::Easy => {
                    let interval = review_interval(stability, params);
                    (Phase::Review, stability, difficulty, interval)
                }
            }
        }
        Phase::Review => {
            let retrievability = fsrs::retrievability(elapsed, state.stability);
            let stability =
                fsrs::next_stability(state.difficulty, state.stability, retrievability, rating);
            let difficulty = fsrs::next_difficulty(state.difficulty, rating);
            match rating {
                Rating::Again => {
                    let step = params.relearn_minutes / MINUTES_PER_DAY;
                    (Phase::Relearning, stability, difficulty, step)
                }
                Rating::Hard | Rating::Good | Rating::Easy => {
                    let interval = review_interval(stability, params);
                    (Phase::Review, stability, difficulty, interval)
                }
            }
        }
    };

    let lapsed = state.phase == Phase::Review && rating == Rating::Again;
    CardState {
        stability,
        difficulty,
        elapsed_days: elapsed,
        scheduled_days: scheduled,
        reps: state.reps + 1,
        lapses: if lapsed { state.lapses + 1 } else { state.lapses },
        phase,
        due: now.add_days(scheduled),
        last_review: Some(now),
    }
}

/// The multi-day interval for a card entering or staying in the review
/// phase. Unrounded; clamping aside, it compounds cleanly across reviews.
fn review_interval(stability: fsrs::Stability, params: &SchedulerParams) -> f64 {
    fsrs::interval(params.desired_retention, stability)
        .clamp(params.minimum_interval, params.maximum_interval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::timestamp::Timestamp;

    fn at(s: &str) -> Timestamp {
        Timestamp::from_rfc3339(s).unwrap()
    }

    fn now() -> Timestamp {
        at("2025-06-01T12:00:00+00:00")
    }

    fn params() -> SchedulerParams {
        SchedulerParams::default()
    }

    fn review_state(stability: f64, difficulty: f64, now: Timestamp) -> CardState {
        CardState {
            stability,
            difficulty,
            elapsed_days: 0.0,
            scheduled_days: stability,
            reps: 5,
            lapses: 0,
            phase: Phase::Review,
            due: now,
            last_review: Some(now.add_days(-stability)),
        }
    }

    #[test]
    fn test_deterministic() {
        let state = review_state(30.0, 5.0, now());
        for rating in Rating::all() {
            let a = apply_review(&state, rating, now(), &params());
            let b = apply_review(&state, rating, now(), &params());
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_apply_agrees_with_preview() {
        let state = review_state(30.0, 5.0, now());
        let preview = schedule_preview(&state, now(), &params());
        for rating in Rating::all() {
            let applied = apply_review(&state, rating, now(), &params());
            assert_eq!(applied, *preview.branch(rating));
        }
    }

    #[test]
    fn test_due_never_before_now() {
        let states = [
            CardState::new(now()),
            review_state(0.5, 9.0, now()),
            review_state(100.0, 2.0, now()),
        ];
        for state in states {
            for rating in Rating::all() {
                let next = apply_review(&state, rating, now(), &params());
                assert!(next.due > now());
            }
        }
    }

    #[test]
    fn test_new_card_easy_graduates_immediately() {
        let state = CardState::new(now());
        let preview = schedule_preview(&state, now(), &params());
        let easy = preview.easy;
        assert_eq!(easy.phase, Phase::Review);
        assert_eq!(easy.reps, 1);
        assert_eq!(easy.lapses, 0);
        // Several days out, and the longest of the four branches.
        assert!(easy.scheduled_days > 3.0);
        assert!(easy.scheduled_days > preview.again.scheduled_days);
        assert!(easy.scheduled_days > preview.hard.scheduled_days);
        assert!(easy.scheduled_days > preview.good.scheduled_days);
    }

    #[test]
    fn test_new_card_non_easy_enters_learning() {
        let state = CardState::new(now());
        for rating in [Rating::Again, Rating::Hard, Rating::Good] {
            let next = apply_review(&state, rating, now(), &params());
            assert_eq!(next.phase, Phase::Learning);
            assert_eq!(next.reps, 1);
            // Sub-day re-queue.
            assert!(next.scheduled_days < 1.0);
        }
    }

    #[test]
    fn test_learning_graduates_on_good() {
        let state = CardState::new(now());
        let learning = apply_review(&state, Rating::Good, now(), &params());
        let later = now().add_days(10.0 / 1440.0);
        let graduated = apply_review(&learning, Rating::Good, later, &params());
        assert_eq!(graduated.phase, Phase::Review);
        assert!(graduated.scheduled_days >= 1.0);
    }

    #[test]
    fn test_learning_again_stays_in_learning() {
        let state = CardState::new(now());
        let learning = apply_review(&state, Rating::Hard, now(), &params());
        let later = now().add_days(5.0 / 1440.0);
        let next = apply_review(&learning, Rating::Again, later, &params());
        assert_eq!(next.phase, Phase::Learning);
        assert!(next.scheduled_days < 1.0);
        assert_eq!(next.lapses, 0);
    }

    #[test]
    fn test_review_again_is_a_lapse() {
        let state = review_state(30.0, 5.0, now());
        let next = apply_review(&state, Rating::Again, now(), &params());
        assert_eq!(next.phase, Phase::Relearning);
        assert_eq!(next.lapses, 1);
        assert!(next.stability < 30.0);
        // Back within the hour, not days out.
        assert!(next.scheduled_days < 1.0 / 24.0);
    }

    #[test]
    fn test_lapses_only_count_mature_forgetting() {
        let state = review_state(30.0, 5.0, now());
        for rating in [Rating::Hard, Rating::Good, Rating::Easy] {
            let next = apply_review(&state, rating, now(), &params());
            assert_eq!(next.lapses, state.lapses);
        }
        let relearning = apply_review(&state, Rating::Again, now(), &params());
        let again = apply_review(&relearning, Rating::Again, now(), &params());
        // Forgetting while already relearning is not a second lapse.
        assert_eq!(again.lapses, 1);
    }

    #[test]
    fn test_relearning_graduates_back_to_review() {
        let state = review_state(30.0, 5.0, now());
        let relearning = apply_review(&state, Rating::Again, now(), &params());
        let later = now().add_days(10.0 / 1440.0);
        let back = apply_review(&relearning, Rating::Good, later, &params());
        assert_eq!(back.phase, Phase::Review);
        assert!(back.scheduled_days >= 1.0);
    }

    #[test]
    fn test_review_interval_ordering() {
        let state = review_state(30.0, 5.0, now());
        let preview = schedule_preview(&state, now(), &params());
        assert!(preview.hard.scheduled_days < preview.good.scheduled_days);
        assert!(preview.good.scheduled_days < preview.easy.scheduled_days);
        assert!(preview.again.scheduled_days < preview.hard.scheduled_days);
    }

    #[test]
    fn test_interval_clamped_to_maximum() {
        let state = review_state(500.0, 1.0, now());
        let next = apply_review(&state, Rating::Easy, now(), &params());
        assert!(next.scheduled_days <= params().maximum_interval);
    }

    #[test]
    fn test_clock_skew_clamps_elapsed() {
        // `now` earlier than the last review: elapsed clamps to zero and
        // scheduling proceeds.
        let state = review_state(30.0, 5.0, now());
        let skewed = now().add_days(-60.0);
        let next = apply_review(&state, Rating::Good, skewed, &params());
        assert_eq!(next.elapsed_days, 0.0);
        assert!(next.due > skewed);
    }

    #[test]
    fn test_difficulty_clamped_under_extremes() {
        let mut state = review_state(5.0, 9.9, now());
        let mut t = now();
        for _ in 0..50 {
            state = apply_review(&state, Rating::Again, t, &params());
            t = t.add_days(1.0);
            assert!(state.difficulty <= 10.0);
            assert!(state.difficulty >= 1.0);
        }
    }

    #[test]
    fn test_reps_increment_every_review() {
        let mut state = CardState::new(now());
        let mut t = now();
        for expected in 1..=6 {
            state = apply_review(&state, Rating::Good, t, &params());
            assert_eq!(state.reps, expected);
            t = state.due;
        }
    }

    #[test]
    fn test_stability_compounds_across_good_reviews() {
        let mut state = CardState::new(now());
        let mut t = now();
        state = apply_review(&state, Rating::Easy, t, &params());
        let mut prev_stability = state.stability;
        for _ in 0..5 {
            t = state.due;
            state = apply_review(&state, Rating::Good, t, &params());
            assert!(state.stability > prev_stability);
            prev_stability = state.stability;
        }
    }
}
