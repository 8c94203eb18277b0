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

use std::path::PathBuf;

use axum::Router;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use tokio::net::TcpListener;

use crate::api::due::due_handler;
use crate::api::preview::preview_handler;
use crate::api::review::review_handler;
use crate::api::state::ServerState;
use crate::api::state::error_response;
use crate::config::Config;
use crate::db::DB_FILE;
use crate::db::Database;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;

pub async fn start_server(directory: PathBuf, port: Option<u16>) -> Fallible<()> {
    if !directory.exists() {
        return fail("directory does not exist.");
    }
    let config = Config::load(&directory)?;
    let port = port.unwrap_or(config.port);

    let db_path = directory.join(DB_FILE);
    let db_path = db_path
        .to_str()
        .ok_or_else(|| ErrorReport::new("invalid path"))?;
    let db = Database::new(db_path)?;

    let state = ServerState { db, config };
    let app = Router::new();
    let app = app.route("/cards/{card_id}/preview", get(preview_handler));
    let app = app.route("/cards/{card_id}/review", post(review_handler));
    let app = app.route("/due", get(due_handler));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(state);

    let bind = format!("0.0.0.0:{port}");
    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(&bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "not found.")
}
