use super::*;

#[test]
fn test_coerce_numbers_and_text() {
    assert_eq!(CellValue::coerce("12"), CellValue::Number(12.0));
    assert_eq!(CellValue::coerce(" 0.25 "), CellValue::Number(0.25));
    assert_eq!(CellValue::coerce("-3e2"), CellValue::Number(-300.0));
    assert_eq!(CellValue::coerce("abc"), CellValue::Text("abc".to_string()));
    assert_eq!(CellValue::coerce("12abc"), CellValue::Text("12abc".to_string()));
    assert_eq!(CellValue::coerce(""), CellValue::Empty);
    assert_eq!(CellValue::coerce("   "), CellValue::Empty);
}

#[test]
fn test_coerce_keeps_non_finite_words_as_text() {
    assert_eq!(CellValue::coerce("inf"), CellValue::Text("inf".to_string()));
    assert_eq!(CellValue::coerce("NaN"), CellValue::Text("NaN".to_string()));
}

#[test]
fn test_formula_strips_equals() {
    assert_eq!(
        CellValue::formula("=AVERAGE(B5:D5)"),
        CellValue::Formula {
            expr: "AVERAGE(B5:D5)".to_string(),
            cached: None
        }
    );
}

#[test]
fn test_resolved_and_pending() {
    let pending = CellValue::formula("A1*2");
    assert!(pending.is_pending());
    assert!(pending.is_blank());
    assert_eq!(pending.resolved(), &CellValue::Empty);

    let known = CellValue::formula_with_cached("A1*2", CellValue::Number(8.0));
    assert!(!known.is_pending());
    assert_eq!(known.resolved(), &CellValue::Number(8.0));
    assert_eq!(known.display_text(), "8");

    let cleared = known.without_cache();
    assert!(cleared.is_pending());
}

#[test]
fn test_formula_with_empty_cache_is_pending() {
    assert!(CellValue::formula_with_cached("A1", CellValue::Empty).is_pending());
}

#[test]
fn test_parse_number_accepts_numeric_text() {
    assert_eq!(CellValue::Text(" 20 ".to_string()).parse_number(), Some(20.0));
    assert_eq!(CellValue::Number(1000.0).parse_number(), Some(1000.0));
    assert_eq!(CellValue::Text("n/a".to_string()).parse_number(), None);
    assert_eq!(CellValue::Empty.parse_number(), None);
}

#[test]
fn test_blank_includes_whitespace_text() {
    assert!(CellValue::Text("  ".to_string()).is_blank());
    assert!(!CellValue::Text("x".to_string()).is_blank());
    assert!(!CellValue::Number(0.0).is_blank());
}

#[test]
fn test_format_number() {
    assert_eq!(format_number(44.0), "44");
    assert_eq!(format_number(-2.0), "-2");
    assert_eq!(format_number(43.6), "43.6");
}

#[test]
fn test_round_half_away_from_zero() {
    assert_eq!(round_half_away(43.6), 44.0);
    assert_eq!(round_half_away(2.5), 3.0);
    assert_eq!(round_half_away(-2.5), -3.0);
    assert_eq!(round_half_away(2.4), 2.0);
}

#[test]
fn test_default_format() {
    assert!(CellFormat::default().is_default());
    let centered = CellFormat {
        centered: true,
        ..CellFormat::default()
    };
    assert!(!centered.is_default());
}
