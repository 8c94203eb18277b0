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

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_rfc3339(s: &str) -> Fallible<Self> {
        let ts = DateTime::parse_from_rfc3339(s)?;
        Ok(Self(ts.with_timezone(&Utc)))
    }

    pub fn to_rfc3339(self) -> String {
        self.0.to_rfc3339()
    }

    /// This timestamp plus a possibly-fractional number of days, at
    /// millisecond granularity.
    pub fn add_days(self, days: f64) -> Self {
        let millis = (days * MILLIS_PER_DAY).round() as i64;
        Self(self.0 + Duration::milliseconds(millis))
    }

    /// Days elapsed since `earlier`, as a fraction. Negative when `earlier`
    /// is in the future.
    pub fn days_since(self, earlier: Timestamp) -> f64 {
        let millis = (self.0 - earlier.0).num_milliseconds();
        millis as f64 / MILLIS_PER_DAY
    }
}

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let str = self.0.to_rfc3339();
        Ok(ToSqlOutput::from(str))
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        let ts =
            DateTime::parse_from_rfc3339(&string).map_err(|e| FromSqlError::Other(Box::new(e)))?;
        let ts = ts.with_timezone(&Utc);
        Ok(Timestamp(ts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_days_round_trip() -> Fallible<()> {
        let ts = Timestamp::from_rfc3339("2025-06-01T12:00:00+00:00")?;
        let later = ts.add_days(2.5);
        assert_eq!(later.days_since(ts), 2.5);
        Ok(())
    }

    #[test]
    fn test_sub_day_precision() -> Fallible<()> {
        let ts = Timestamp::from_rfc3339("2025-06-01T12:00:00+00:00")?;
        // Ten minutes as a fraction of a day.
        let later = ts.add_days(10.0 / 1440.0);
        let elapsed_minutes = later.days_since(ts) * 1440.0;
        assert!((elapsed_minutes - 10.0).abs() < 0.001);
        Ok(())
    }

    #[test]
    fn test_ordering() -> Fallible<()> {
        let a = Timestamp::from_rfc3339("2025-06-01T12:00:00+00:00")?;
        let b = a.add_days(1.0);
        assert!(a < b);
        Ok(())
    }

    #[test]
    fn test_days_since_negative_for_future() -> Fallible<()> {
        let a = Timestamp::from_rfc3339("2025-06-01T12:00:00+00:00")?;
        let b = a.add_days(3.0);
        assert_eq!(a.days_since(b), -3.0);
        Ok(())
    }
}
