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

//! The memory model: stability, difficulty, and retrievability, after the
//! FSRS scheduling algorithm.

use crate::types::rating::Rating;

/// Days until recall probability decays to the reference threshold.
pub type Stability = f64;

/// Intrinsic hardness of a card, in `[1, 10]`.
pub type Difficulty = f64;

/// The model weights. Tunable; only the orderings they induce are contractual.
const W: [f64; 19] = [
    0.40255, 1.18385, 3.173, 15.69105, 7.1949, 0.5345, 1.4604, 0.0046, 1.54575, 0.1192, 1.01925,
    1.9395, 0.11, 0.29605, 2.2698, 0.2315, 2.9898, 0.51655, 0.6621,
];

/// Forgetting curve shape.
const FACTOR: f64 = 19.0 / 81.0;
const DECAY: f64 = -0.5;

pub const STABILITY_MIN: f64 = 0.01;
pub const STABILITY_MAX: f64 = 36500.0;
pub const DIFFICULTY_MIN: f64 = 1.0;
pub const DIFFICULTY_MAX: f64 = 10.0;
pub const DIFFICULTY_MID: f64 = 5.0;

/// Probability of recall after `elapsed` days at the given stability.
pub fn retrievability(elapsed: f64, stability: Stability) -> f64 {
    if stability <= 0.0 {
        return 0.0;
    }
    (1.0 + FACTOR * (elapsed / stability)).powf(DECAY)
}

/// The interval, in days, at which predicted retrievability decays to
/// `desired_retention`. At retention 0.9 this equals the stability itself.
pub fn interval(desired_retention: f64, stability: Stability) -> f64 {
    (stability / FACTOR) * (desired_retention.powf(1.0 / DECAY) - 1.0)
}

/// Stability seeded by the first rating a card ever receives.
pub fn initial_stability(rating: Rating) -> Stability {
    match rating {
        Rating::Again => W[0],
        Rating::Hard => W[1],
        Rating::Good => W[2],
        Rating::Easy => W[3],
    }
}

/// Difficulty seeded by the first rating a card ever receives.
pub fn initial_difficulty(rating: Rating) -> Difficulty {
    let g: f64 = rating.into();
    clamp_difficulty(W[4] - f64::exp(W[5] * (g - 1.0)) + 1.0)
}

fn clamp_difficulty(d: Difficulty) -> Difficulty {
    d.clamp(DIFFICULTY_MIN, DIFFICULTY_MAX)
}

fn clamp_stability(s: Stability) -> Stability {
    s.clamp(STABILITY_MIN, STABILITY_MAX)
}

/// Stability after a successful recall. Growth is larger the lower the
/// retrievability was: recalling a nearly-forgotten card is stronger
/// evidence than recalling a fresh one. Hard grows less than Good, Easy
/// more.
fn stability_on_success(
    difficulty: Difficulty,
    stability: Stability,
    retrievability: f64,
    rating: Rating,
) -> Stability {
    let t_d = 11.0 - difficulty;
    let t_s = stability.powf(-W[9]);
    let t_r = f64::exp(W[10] * (1.0 - retrievability)) - 1.0;
    let hard_penalty = if rating == Rating::Hard { W[15] } else { 1.0 };
    let easy_bonus = if rating == Rating::Easy { W[16] } else { 1.0 };
    let alpha = 1.0 + t_d * t_s * t_r * hard_penalty * easy_bonus * f64::exp(W[8]);
    stability * alpha
}

/// Stability after a lapse. Shrinks in proportion to difficulty, and never
/// exceeds the stability the card had before forgetting.
fn stability_on_lapse(
    difficulty: Difficulty,
    stability: Stability,
    retrievability: f64,
) -> Stability {
    let d_f = difficulty.powf(-W[12]);
    let s_f = (stability + 1.0).powf(W[13]) - 1.0;
    let r_f = f64::exp(W[14] * (1.0 - retrievability));
    f64::min(W[11] * d_f * s_f * r_f, stability)
}

/// Stability after a review at the given retrievability.
pub fn next_stability(
    difficulty: Difficulty,
    stability: Stability,
    retrievability: f64,
    rating: Rating,
) -> Stability {
    let next = if rating == Rating::Again {
        stability_on_lapse(difficulty, stability, retrievability)
    } else {
        stability_on_success(difficulty, stability, retrievability, rating)
    };
    clamp_stability(next)
}

/// Stability after a same-day re-review, used while a card is still in a
/// learning phase. Successful ratings never shrink stability here.
pub fn short_term_stability(stability: Stability, rating: Rating) -> Stability {
    let g: f64 = rating.into();
    let next = stability * f64::exp(W[17] * (g - 3.0 + W[18]));
    let next = if rating == Rating::Again {
        next
    } else {
        f64::max(next, stability)
    };
    clamp_stability(next)
}

/// Difficulty after a review: Again pushes it up, Easy pulls it down, with
/// mean reversion towards the Easy seed.
pub fn next_difficulty(difficulty: Difficulty, rating: Rating) -> Difficulty {
    let g: f64 = rating.into();
    let delta = -W[6] * (g - 3.0);
    let damped = difficulty + delta * ((10.0 - difficulty) / 9.0);
    clamp_difficulty(W[7] * initial_difficulty(Rating::Easy) + (1.0 - W[7]) * damped)
}
