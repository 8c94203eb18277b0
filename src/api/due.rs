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
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;
use serde::Serialize;

use crate::api::state::ServerState;
use crate::api::state::error_response;
use crate::queue::QueueEntry;
use crate::queue::select_due;
use crate::types::timestamp::Timestamp;

#[derive(Deserialize)]
pub struct DueQuery {
    learner: String,
    deck: Option<String>,
    limit: Option<usize>,
    now: Option<Timestamp>,
}

#[derive(Serialize)]
struct DueResponse {
    cards: Vec<QueueEntry>,
}

/// The ordered study queue for a learner: unseen cards first, then due
/// reviews, soonest first.
pub async fn due_handler(
    State(state): State<ServerState>,
    Query(query): Query<DueQuery>,
) -> Response {
    let now = query.now.unwrap_or_else(Timestamp::now);
    let entries = match state
        .db
        .learner_queue(&query.learner, query.deck.as_deref(), now)
    {
        Ok(entries) => entries,
        Err(e) => {
            log::error!("{e}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };
    let limit = query.limit.unwrap_or(state.config.queue_limit);
    let cards = select_due(&entries, now, limit);
    Json(DueResponse { cards }).into_response()
}
