//! Date context for relative-time resolution in generated queries.

use chrono::{Datelike, NaiveDate};

/// Build the temporal context block for a prompt.
///
/// The date is supplied by the caller rather than read from a clock, so
/// prompt assembly stays a pure function.
pub fn date_context(today: NaiveDate) -> String {
    let quarter = (today.month0() / 3) + 1;
    let week = today.iso_week().week();

    format!(
        "Current date: {} ({})\n\
         Current year: {}, Quarter: Q{}, Week: {}\n\
         Use this context to interpret relative time references like 'today', \
         'yesterday', 'this week', 'last month', 'this quarter', 'year to date', \
         'last 7 days', etc.",
        today.format("%Y-%m-%d"),
        today.format("%A, %B %d, %Y"),
        today.year(),
        quarter,
        week,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_context_fields() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 21).unwrap();
        let ctx = date_context(day);
        assert!(ctx.contains("2025-06-21"));
        assert!(ctx.contains("Saturday, June 21, 2025"));
        assert!(ctx.contains("Quarter: Q2"));
        assert!(ctx.contains("Week: 25"));
    }

    #[test]
    fn test_quarter_boundaries() {
        let q1 = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let q4 = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        assert!(date_context(q1).contains("Quarter: Q1"));
        assert!(date_context(q4).contains("Quarter: Q4"));
    }
}
