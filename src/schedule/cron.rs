//! Quartz cron sanity check
//!
//! The service evaluates the expression itself; this only rejects input
//! that could never be a Quartz expression before a request is sent.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Characters allowed in a single Quartz cron field
static FIELD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z*?,/#\-]+$").expect("Invalid cron field regex"));

/// Seconds, minutes, hours, day-of-month, month, day-of-week, optional year
const MIN_FIELDS: usize = 6;
const MAX_FIELDS: usize = 7;

/// Check that an expression has the shape of a Quartz cron expression
pub fn validate_cron(expression: &str) -> Result<()> {
    let fields: Vec<&str> = expression.split_whitespace().collect();

    if !(MIN_FIELDS..=MAX_FIELDS).contains(&fields.len()) {
        return Err(Error::invalid_cron(
            expression,
            format!(
                "expected {MIN_FIELDS} or {MAX_FIELDS} fields, found {}",
                fields.len()
            ),
        ));
    }

    if let Some(field) = fields.iter().find(|f| !FIELD_REGEX.is_match(f)) {
        return Err(Error::invalid_cron(
            expression,
            format!("field '{field}' contains unsupported characters"),
        ));
    }

    // Day-of-month / day-of-week exclusivity is enforced by the service
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("0 0 0 * * ?" ; "disabled default")]
    #[test_case("0 30 2 * * ?" ; "daily")]
    #[test_case("0 0/15 * * * ?" ; "every quarter hour")]
    #[test_case("0 0 12 ? * MON-FRI" ; "weekdays")]
    #[test_case("0 15 10 L * ? 2030" ; "with year")]
    #[test_case("0 0 1 ? * 6#3" ; "nth weekday")]
    fn test_valid_expressions(expression: &str) {
        assert!(validate_cron(expression).is_ok());
    }

    #[test_case("" ; "empty")]
    #[test_case("* * * * *" ; "unix five fields")]
    #[test_case("0 0 0 * * ? 2030 extra" ; "eight fields")]
    #[test_case("0 0 0 * * ;" ; "bad character")]
    fn test_invalid_expressions(expression: &str) {
        let err = validate_cron(expression).unwrap_err();
        assert!(matches!(err, Error::InvalidCron { .. }));
    }
}
