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

use crate::error::Fallible;
use crate::error::fail;

/// How well the learner remembered a card.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    /// Validate a raw rating integer from a request payload. Anything
    /// outside 1..=4 is rejected before any scheduling computation.
    pub fn from_u8(n: u8) -> Fallible<Self> {
        match n {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            _ => fail(format!("invalid rating: {n}.")),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Rating::Again => 1,
            Rating::Hard => 2,
            Rating::Good => 3,
            Rating::Easy => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rating::Again => "Again",
            Rating::Hard => "Hard",
            Rating::Good => "Good",
            Rating::Easy => "Easy",
        }
    }

    pub fn all() -> [Rating; 4] {
        [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy]
    }
}

impl From<Rating> for f64 {
    fn from(rating: Rating) -> f64 {
        rating.as_u8() as f64
    }
}

impl ToSql for Rating {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Rating {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        match string.as_str() {
            "Again" => Ok(Rating::Again),
            "Hard" => Ok(Rating::Hard),
            "Good" => Ok(Rating::Good),
            "Easy" => Ok(Rating::Easy),
            _ => Err(FromSqlError::Other(
                format!("invalid rating in database: {string}").into(),
            )),
        }
    }
}
