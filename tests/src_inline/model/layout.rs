use super::*;

#[test]
fn test_standard_layout_addresses() {
    let l = STANDARD_LAYOUT;
    assert_eq!(l.title.to_a1(), "B2");
    let pseudo: Vec<String> = l.pseudotype_labels.iter().map(|c| c.to_a1()).collect();
    assert_eq!(pseudo, vec!["B3", "E3", "H3", "K3"]);
    let samples: Vec<String> = l.sample_labels.iter().map(|c| c.to_a1()).collect();
    assert_eq!(samples, vec!["B4", "E4", "H4", "K4"]);
    assert_eq!(l.lower_limit.to_a1(), "A5");
    assert_eq!(l.upper_limit.map(|c| c.to_a1()), Some("A11".to_string()));
}

#[test]
fn test_data_region_spans_b5_to_m12() {
    let l = PlateLayout::default();
    assert_eq!(l.data_cell(0, 0).to_a1(), "B5");
    assert_eq!(l.data_cell(DATA_ROWS - 1, DATA_COLS - 1).to_a1(), "M12");
}

#[test]
fn test_titre_slots() {
    let l = STANDARD_LAYOUT;
    let q1: Vec<String> = l.nt90[0].cells().iter().map(|c| c.to_a1()).collect();
    assert_eq!(q1, vec!["B14", "C14", "D14", "D14"]);
    let q4: Vec<String> = l.nt50[3].cells().iter().map(|c| c.to_a1()).collect();
    assert_eq!(q4, vec!["K16", "L16", "M16", "M16"]);
    let aggregates: Vec<String> = l.nt50.iter().map(|s| s.aggregate.to_a1()).collect();
    assert_eq!(aggregates, vec!["D16", "G16", "J16", "M16"]);
}

#[test]
fn test_partial_layout_json_keeps_defaults() {
    let l: PlateLayout = serde_json::from_str(r#"{"title":"C2","upper_limit":null}"#).unwrap();
    assert_eq!(l.title.to_a1(), "C2");
    assert_eq!(l.upper_limit, None);
    assert_eq!(l.data_origin, STANDARD_LAYOUT.data_origin);
}
