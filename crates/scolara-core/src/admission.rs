//! Admission number parsing, formatting, and sequencing.
//!
//! Admission numbers are school-assigned student identifiers of the form
//! `PREFIX/YEAR/NNNNN` with a 5-digit zero-padded sequence, unique and
//! monotonically increasing per school per year.
//!
//! The functions here are deterministic and pure. Allocation under
//! concurrency goes through an atomic per-school-per-year sequence row in
//! the database; [`next_sequence`] computes the seed for that row from the
//! numbers already on record, so legacy data can never collide with newly
//! allocated numbers.

/// Width of the zero-padded sequence component.
pub const SEQUENCE_WIDTH: usize = 5;

/// Format an admission number, e.g. `format_admission_number("HALL", 2024, 4)`
/// yields `"HALL/2024/00004"`.
pub fn format_admission_number(prefix: &str, year: i32, sequence: u32) -> String {
    format!("{}/{}/{:0width$}", prefix, year, sequence, width = SEQUENCE_WIDTH)
}

/// Parse `PREFIX/YEAR/NNNNN` into its components. Returns `None` for
/// anything that does not match the pattern exactly.
pub fn parse_admission_number(value: &str) -> Option<(&str, i32, u32)> {
    let mut parts = value.splitn(3, '/');
    let prefix = parts.next()?;
    let year = parts.next()?;
    let sequence = parts.next()?;

    if prefix.is_empty() || year.len() != 4 || sequence.len() != SEQUENCE_WIDTH {
        return None;
    }

    let year: i32 = year.parse().ok()?;
    let sequence: u32 = sequence.parse().ok()?;
    Some((prefix, year, sequence))
}

/// The next sequence number for `(prefix, year)` given the numbers already
/// issued: one past the maximum matching sequence, starting at 1 when none
/// match. Numbers under other prefixes or years are ignored, as is anything
/// that fails to parse.
pub fn next_sequence(existing: &[String], prefix: &str, year: i32) -> u32 {
    existing
        .iter()
        .filter_map(|value| parse_admission_number(value))
        .filter(|(p, y, _)| *p == prefix && *y == year)
        .map(|(_, _, seq)| seq)
        .max()
        .map_or(1, |max| max + 1)
}

/// Convenience: the next full admission number for `(prefix, year)`.
pub fn next_admission_number(existing: &[String], prefix: &str, year: i32) -> String {
    format_admission_number(prefix, year, next_sequence(existing, prefix, year))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_zero_pads_to_five_digits() {
        assert_eq!(format_admission_number("HALL", 2024, 4), "HALL/2024/00004");
        assert_eq!(format_admission_number("SCH", 2025, 12345), "SCH/2025/12345");
    }

    #[test]
    fn test_parse_round_trip() {
        let value = format_admission_number("HALL", 2024, 17);
        assert_eq!(parse_admission_number(&value), Some(("HALL", 2024, 17)));
    }

    #[test]
    fn test_parse_rejects_malformed_values() {
        assert_eq!(parse_admission_number(""), None);
        assert_eq!(parse_admission_number("HALL/2024"), None);
        assert_eq!(parse_admission_number("HALL/24/00001"), None);
        assert_eq!(parse_admission_number("HALL/2024/001"), None);
        assert_eq!(parse_admission_number("HALL/2024/abcde"), None);
        assert_eq!(parse_admission_number("/2024/00001"), None);
    }

    #[test]
    fn test_next_sequence_takes_max_plus_one() {
        let existing = vec![
            "HALL/2024/00001".to_string(),
            "HALL/2024/00003".to_string(),
        ];
        assert_eq!(next_sequence(&existing, "HALL", 2024), 4);
        assert_eq!(
            next_admission_number(&existing, "HALL", 2024),
            "HALL/2024/00004"
        );
    }

    #[test]
    fn test_next_sequence_starts_at_one() {
        assert_eq!(next_sequence(&[], "HALL", 2024), 1);
        let other_year = vec!["HALL/2023/00009".to_string()];
        assert_eq!(next_sequence(&other_year, "HALL", 2024), 1);
    }

    #[test]
    fn test_next_sequence_ignores_other_prefixes_and_garbage() {
        let existing = vec![
            "HALL/2024/00002".to_string(),
            "WEST/2024/00050".to_string(),
            "not-a-number".to_string(),
        ];
        assert_eq!(next_sequence(&existing, "HALL", 2024), 3);
    }

    #[test]
    fn test_monotonic_across_repeated_allocations() {
        let mut existing: Vec<String> = Vec::new();
        let mut last = 0;
        for _ in 0..5 {
            let seq = next_sequence(&existing, "HALL", 2024);
            assert!(seq > last);
            existing.push(format_admission_number("HALL", 2024, seq));
            last = seq;
        }
        assert_eq!(existing.last().unwrap(), "HALL/2024/00005");
    }
}
