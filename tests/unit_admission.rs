use scolara_core::admission::{
    format_admission_number, next_admission_number, next_sequence, parse_admission_number,
};

#[test]
fn test_format_is_zero_padded() {
    assert_eq!(format_admission_number("HALL", 2024, 1), "HALL/2024/00001");
    assert_eq!(
        format_admission_number("WEST", 2025, 99999),
        "WEST/2025/99999"
    );
}

#[test]
fn test_parse_accepts_only_exact_pattern() {
    assert_eq!(
        parse_admission_number("HALL/2024/00017"),
        Some(("HALL", 2024, 17))
    );
    assert_eq!(parse_admission_number("HALL-2024-00017"), None);
    assert_eq!(parse_admission_number("HALL/2024/17"), None);
    assert_eq!(parse_admission_number("HALL/202/00017"), None);
}

#[test]
fn test_next_number_skips_gaps() {
    let existing = vec![
        "HALL/2024/00001".to_string(),
        "HALL/2024/00003".to_string(),
    ];
    assert_eq!(
        next_admission_number(&existing, "HALL", 2024),
        "HALL/2024/00004"
    );
}

#[test]
fn test_sequences_are_independent_per_prefix_and_year() {
    let existing = vec![
        "HALL/2024/00009".to_string(),
        "WEST/2024/00002".to_string(),
        "HALL/2023/00100".to_string(),
    ];
    assert_eq!(next_sequence(&existing, "HALL", 2024), 10);
    assert_eq!(next_sequence(&existing, "WEST", 2024), 3);
    assert_eq!(next_sequence(&existing, "HALL", 2025), 1);
}

#[test]
fn test_allocation_is_monotonic() {
    let mut existing: Vec<String> = Vec::new();
    for expected in 1..=10u32 {
        let seq = next_sequence(&existing, "SCH", 2026);
        assert_eq!(seq, expected);
        existing.push(format_admission_number("SCH", 2026, seq));
    }
}
