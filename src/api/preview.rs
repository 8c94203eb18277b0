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
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;
use serde::Serialize;

use crate::api::state::ServerState;
use crate::api::state::error_response;
use crate::helper::format_interval;
use crate::scheduler::schedule_preview;
use crate::types::card_id::CardId;
use crate::types::state::CardState;
use crate::types::timestamp::Timestamp;

#[derive(Deserialize)]
pub struct PreviewQuery {
    learner: String,
    now: Option<Timestamp>,
}

#[derive(Serialize)]
struct PreviewBranch {
    state: CardState,
    /// Rounded, human-readable interval for display.
    interval: String,
}

#[derive(Serialize)]
struct PreviewResponse {
    again: PreviewBranch,
    hard: PreviewBranch,
    good: PreviewBranch,
    easy: PreviewBranch,
}

fn branch(state: CardState) -> PreviewBranch {
    PreviewBranch {
        interval: format_interval(state.scheduled_days),
        state,
    }
}

/// Show what each of the four ratings would do to a card. Read-only: the
/// same computation a committed review would use, with nothing persisted.
pub async fn preview_handler(
    State(state): State<ServerState>,
    Path(card_id): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> Response {
    let card_id = CardId::new(card_id);
    let exists = match state.db.card_exists(&card_id) {
        Ok(exists) => exists,
        Err(e) => {
            log::error!("{e}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };
    if !exists {
        return error_response(StatusCode::NOT_FOUND, format!("no such card: {card_id}."));
    }
    let now = query.now.unwrap_or_else(Timestamp::now);
    let card_state = match state.db.get_card_state(&card_id, &query.learner) {
        Ok(card_state) => card_state.unwrap_or_else(|| CardState::new(now)),
        Err(e) => {
            log::error!("{e}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };
    let preview = schedule_preview(&card_state, now, &state.config.scheduler);
    let response = PreviewResponse {
        again: branch(preview.again),
        hard: branch(preview.hard),
        good: branch(preview.good),
        easy: branch(preview.easy),
    };
    Json(response).into_response()
}
