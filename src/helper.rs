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

/// Render an interval for display: whole minutes below an hour, whole hours
/// below a day, then days, weeks, months, years. The stored interval is
/// never rounded; only this projection is.
pub fn format_interval(days: f64) -> String {
    let minutes = (days * 1440.0).round() as i64;
    if minutes < 1 {
        "<1m".to_string()
    } else if minutes < 60 {
        format!("{minutes}m")
    } else if minutes < 1440 {
        let hours = (minutes as f64 / 60.0).round() as i64;
        format!("{hours}h")
    } else {
        let whole_days = days.round() as i64;
        if whole_days < 7 {
            format!("{whole_days}d")
        } else if whole_days < 30 {
            format!("{}w", whole_days / 7)
        } else if whole_days < 365 {
            format!("{}mo", whole_days / 30)
        } else {
            format!("{}y", whole_days / 365)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(0.0001), "<1m");
        assert_eq!(format_interval(1.0 / 1440.0), "1m");
        assert_eq!(format_interval(10.0 / 1440.0), "10m");
        assert_eq!(format_interval(90.0 / 1440.0), "2h");
        assert_eq!(format_interval(0.5), "12h");
        assert_eq!(format_interval(1.0), "1d");
        assert_eq!(format_interval(3.4), "3d");
        assert_eq!(format_interval(14.0), "2w");
        assert_eq!(format_interval(45.0), "1mo");
        assert_eq!(format_interval(400.0), "1y");
    }
}
