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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;
use serde::Serialize;

use crate::error::Fallible;
use crate::queue::QueueEntry;
use crate::types::card_id::CardId;
use crate::types::review_log::ReviewLogEntry;
use crate::types::state::CardState;
use crate::types::state::Phase;
use crate::types::timestamp::Timestamp;

/// Name of the database file inside a deck directory.
pub const DB_FILE: &str = "cardbox.db";

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    /// Register a card with the scheduler. Registration order is queue
    /// tie-break order. Card content lives elsewhere; only the id and deck
    /// name are recorded here.
    pub fn add_card(&self, card_id: &CardId, deck: &str, added_at: Timestamp) -> Fallible<()> {
        log::debug!("Registering card {card_id} in deck {deck}.");
        let conn = self.acquire();
        let sql = "insert into cards (card_id, deck, added_at) values (?, ?, ?);";
        conn.execute(sql, (card_id, deck, added_at))?;
        Ok(())
    }

    pub fn card_exists(&self, card_id: &CardId) -> Fallible<bool> {
        let conn = self.acquire();
        let sql = "select count(*) from cards where card_id = ?;";
        let count: i64 = conn.query_row(sql, [card_id], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Get a learner's scheduling state for a card. None means the card has
    /// never been reviewed by this learner.
    pub fn get_card_state(&self, card_id: &CardId, learner: &str) -> Fallible<Option<CardState>> {
        let conn = self.acquire();
        let sql = "select stability, difficulty, elapsed_days, scheduled_days, reps, lapses, phase, due, last_review from card_states where card_id = ? and learner = ?;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query((card_id, learner))?;
        if let Some(row) = rows.next()? {
            let state = CardState {
                stability: row.get(0)?,
                difficulty: row.get(1)?,
                elapsed_days: row.get(2)?,
                scheduled_days: row.get(3)?,
                reps: row.get(4)?,
                lapses: row.get(5)?,
                phase: row.get(6)?,
                due: row.get(7)?,
                last_review: row.get(8)?,
            };
            // Out-of-range values from a damaged database are clamped, not
            // rejected.
            Ok(Some(state.sanitize()))
        } else {
            Ok(None)
        }
    }

    /// Persist the outcome of one review: replace the card's state and
    /// append to the review log, atomically.
    pub fn record_review(&self, state: &CardState, entry: &ReviewLogEntry) -> Fallible<()> {
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        upsert_state(&tx, &entry.card_id, &entry.learner, state)?;
        append_log(&tx, entry)?;
        tx.commit()?;
        Ok(())
    }

    /// All of a learner's cards with their states, in registration order.
    /// Cards the learner has never reviewed get a synthesized new state.
    pub fn learner_queue(
        &self,
        learner: &str,
        deck: Option<&str>,
        now: Timestamp,
    ) -> Fallible<Vec<QueueEntry>> {
        let mut entries = Vec::new();
        let conn = self.acquire();
        let sql = "select c.card_id, c.deck, s.stability, s.difficulty, s.elapsed_days, s.scheduled_days, s.reps, s.lapses, s.phase, s.due, s.last_review from cards c left outer join card_states s on s.card_id = c.card_id and s.learner = ?1 where ?2 is null or c.deck = ?2 order by c.rowid;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query((learner, deck))?;
        while let Some(row) = rows.next()? {
            let card_id: CardId = row.get(0)?;
            let deck: String = row.get(1)?;
            let stability: Option<f64> = row.get(2)?;
            let state = match stability {
                None => CardState::new(now),
                Some(stability) => CardState {
                    stability,
                    difficulty: row.get(3)?,
                    elapsed_days: row.get(4)?,
                    scheduled_days: row.get(5)?,
                    reps: row.get(6)?,
                    lapses: row.get(7)?,
                    phase: row.get(8)?,
                    due: row.get(9)?,
                    last_review: row.get(10)?,
                }
                .sanitize(),
            };
            entries.push(QueueEntry {
                card_id,
                deck,
                state,
            });
        }
        Ok(entries)
    }

    /// Aggregate counts for the stats command.
    pub fn deck_stats(&self, learner: &str, now: Timestamp) -> Fallible<DeckStats> {
        let conn = self.acquire();
        let card_count: i64 = conn.query_row("select count(*) from cards;", [], |row| row.get(0))?;
        let phase_count = |phase: Phase| -> Fallible<i64> {
            let sql = "select count(*) from card_states where learner = ? and phase = ?;";
            let count: i64 = conn.query_row(sql, (learner, phase), |row| row.get(0))?;
            Ok(count)
        };
        let learning_count = phase_count(Phase::Learning)?;
        let review_count = phase_count(Phase::Review)?;
        let relearning_count = phase_count(Phase::Relearning)?;
        let seen_count: i64 = conn.query_row(
            "select count(*) from card_states where learner = ?;",
            [learner],
            |row| row.get(0),
        )?;
        let overdue_count: i64 = conn.query_row(
            "select count(*) from card_states where learner = ? and due <= ?;",
            (learner, now),
            |row| row.get(0),
        )?;
        let logged_review_count: i64 = conn.query_row(
            "select count(*) from review_log where learner = ?;",
            [learner],
            |row| row.get(0),
        )?;
        let new_count = card_count - seen_count;
        Ok(DeckStats {
            card_count: card_count as usize,
            new_count: new_count as usize,
            learning_count: learning_count as usize,
            review_count: review_count as usize,
            relearning_count: relearning_count as usize,
            due_count: (new_count + overdue_count) as usize,
            logged_review_count: logged_review_count as usize,
        })
    }

    fn acquire(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStats {
    pub card_count: usize,
    pub new_count: usize,
    pub learning_count: usize,
    pub review_count: usize,
    pub relearning_count: usize,
    pub due_count: usize,
    pub logged_review_count: usize,
}

fn upsert_state(
    tx: &Transaction,
    card_id: &CardId,
    learner: &str,
    state: &CardState,
) -> Fallible<()> {
    let sql = "insert into card_states (card_id, learner, stability, difficulty, elapsed_days, scheduled_days, reps, lapses, phase, due, last_review) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) on conflict (card_id, learner) do update set stability = excluded.stability, difficulty = excluded.difficulty, elapsed_days = excluded.elapsed_days, scheduled_days = excluded.scheduled_days, reps = excluded.reps, lapses = excluded.lapses, phase = excluded.phase, due = excluded.due, last_review = excluded.last_review;";
    tx.execute(
        sql,
        (
            card_id,
            learner,
            state.stability,
            state.difficulty,
            state.elapsed_days,
            state.scheduled_days,
            state.reps,
            state.lapses,
            state.phase,
            state.due,
            state.last_review,
        ),
    )?;
    Ok(())
}

fn append_log(tx: &Transaction, entry: &ReviewLogEntry) -> Fallible<()> {
    let sql = "insert into review_log (card_id, learner, rating, phase, elapsed_days, scheduled_days, duration_ms, reviewed_at) values (?, ?, ?, ?, ?, ?, ?, ?);";
    tx.execute(
        sql,
        (
            &entry.card_id,
            &entry.learner,
            entry.rating,
            entry.phase,
            entry.elapsed_days,
            entry.scheduled_days,
            entry.duration_ms,
            entry.reviewed_at,
        ),
    )?;
    Ok(())
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["cards"], |row| row.get(0))?;
    Ok(count > 0)
}
