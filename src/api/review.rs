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

use axum::Json;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;

use crate::api::state::ServerState;
use crate::api::state::error_response;
use crate::error::Fallible;
use crate::scheduler::apply_review;
use crate::types::card_id::CardId;
use crate::types::rating::Rating;
use crate::types::review_log::ReviewLogEntry;
use crate::types::state::CardState;
use crate::types::timestamp::Timestamp;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    learner: String,
    /// Raw rating integer; must be 1 (Again) through 4 (Easy).
    rating: u8,
    now: Option<Timestamp>,
    /// How long the learner looked at the card, if the client measured it.
    duration_ms: Option<u64>,
}

/// Apply a rating to a card and persist the outcome.
pub async fn review_handler(
    State(state): State<ServerState>,
    Path(card_id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> Response {
    // The rating is validated here at the boundary; the scheduler only ever
    // sees the typed form.
    let rating = match Rating::from_u8(request.rating) {
        Ok(rating) => rating,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };
    let card_id = CardId::new(card_id);
    match commit_review(&state, &card_id, rating, &request) {
        Ok(Some(next)) => Json(next).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, format!("no such card: {card_id}.")),
        Err(e) => {
            log::error!("{e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Returns None if the card is not registered.
fn commit_review(
    state: &ServerState,
    card_id: &CardId,
    rating: Rating,
    request: &ReviewRequest,
) -> Fallible<Option<CardState>> {
    if !state.db.card_exists(card_id)? {
        return Ok(None);
    }
    let now = request.now.unwrap_or_else(Timestamp::now);
    let current = state
        .db
        .get_card_state(card_id, &request.learner)?
        .unwrap_or_else(|| CardState::new(now));
    let next = apply_review(&current, rating, now, &state.config.scheduler);

    let diff_percent = ((next.difficulty - 1.0) / 9.0) * 100.0;
    log::debug!(
        "{} {} S={:.2}d D={:.2}% due={}",
        card_id,
        rating.as_str(),
        next.stability,
        diff_percent,
        next.due.to_rfc3339()
    );

    let entry = ReviewLogEntry {
        card_id: card_id.clone(),
        learner: request.learner.clone(),
        rating,
        phase: next.phase,
        elapsed_days: next.elapsed_days,
        scheduled_days: next.scheduled_days,
        duration_ms: request.duration_ms,
        reviewed_at: now,
    };
    state.db.record_review(&next, &entry)?;
    Ok(Some(next))
}
