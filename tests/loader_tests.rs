// CSV loader tests: required columns, malformed input, numeric coercion

use equipment_report::error::IngestError;
use equipment_report::loader::load;

const SAMPLE: &str = "Equipment Name,Type,Flowrate,Pressure,Temperature
Pump-1,Pump,10,2,300
Pump-2,Pump,20,4,310
Valve-1,Valve,5,1,290
";

#[test]
fn test_load_sample() {
    let rows = load(SAMPLE.as_bytes()).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].equipment_type, "Pump");
    assert_eq!(rows[1].flowrate, 20.0);
    assert_eq!(rows[2].temperature, 290.0);
}

#[test]
fn test_load_column_order_does_not_matter() {
    let csv = "Temperature,Pressure,Flowrate,Type\n300.5,2.25,10,Pump\n";
    let rows = load(csv.as_bytes()).unwrap();
    assert_eq!(rows[0].temperature, 300.5);
    assert_eq!(rows[0].pressure, 2.25);
}

#[test]
fn test_load_missing_pressure_is_schema_error() {
    let csv = "Type,Flowrate,Temperature\nPump,10,300\n";
    match load(csv.as_bytes()).unwrap_err() {
        IngestError::Schema { missing } => assert_eq!(missing, vec!["Pressure".to_string()]),
        other => panic!("expected schema error, got {:?}", other),
    }
}

#[test]
fn test_load_column_names_are_case_sensitive() {
    let csv = "type,Flowrate,Pressure,Temperature\nPump,10,2,300\n";
    assert!(matches!(
        load(csv.as_bytes()),
        Err(IngestError::Schema { .. })
    ));
}

#[test]
fn test_load_non_numeric_cell_is_parse_error() {
    let csv = "Type,Flowrate,Pressure,Temperature\nPump,10,high,300\n";
    match load(csv.as_bytes()).unwrap_err() {
        IngestError::Parse { line, .. } => assert_eq!(line, 2),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_load_ragged_row_is_parse_error() {
    let csv = "Type,Flowrate,Pressure,Temperature\nPump,10,2\n";
    assert!(matches!(
        load(csv.as_bytes()),
        Err(IngestError::Parse { .. })
    ));
}

#[test]
fn test_load_unterminated_quote_is_parse_error() {
    let csv = "Type,Flowrate,Pressure,Temperature\n\"Pump,10,2,300\nValve,5,1,290\n";
    assert!(matches!(
        load(csv.as_bytes()),
        Err(IngestError::Parse { .. })
    ));
}

#[test]
fn test_load_invalid_utf8_is_parse_error() {
    let mut bytes = b"Type,Flowrate,Pressure,Temperature\n".to_vec();
    bytes.extend_from_slice(&[0xff, 0xfe, b',', b'1', b',', b'2', b',', b'3', b'\n']);
    assert!(matches!(load(&bytes), Err(IngestError::Parse { .. })));
}

#[test]
fn test_load_header_only_yields_no_rows() {
    let rows = load(b"Type,Flowrate,Pressure,Temperature\n").unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_load_quoted_type_with_comma() {
    let csv = "Type,Flowrate,Pressure,Temperature\n\"Pump, centrifugal\",1,2,3\n";
    let rows = load(csv.as_bytes()).unwrap();
    assert_eq!(rows[0].equipment_type, "Pump, centrifugal");
}

#[test]
fn test_load_nan_cell_is_parse_error() {
    let csv = "Type,Flowrate,Pressure,Temperature\nPump,10,2,300\nPump,NaN,2,300\n";
    match load(csv.as_bytes()).unwrap_err() {
        IngestError::Parse { line, message } => {
            assert_eq!(line, 3);
            assert!(message.contains("Flowrate"));
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_load_infinite_cells_are_parse_errors() {
    for cell in ["inf", "-inf", "infinity", "1e400"] {
        let csv = format!("Type,Flowrate,Pressure,Temperature\nPump,1,2,{}\n", cell);
        match load(csv.as_bytes()) {
            Err(IngestError::Parse { message, .. }) => assert!(message.contains("Temperature")),
            other => panic!("expected parse error for {}, got {:?}", cell, other),
        }
    }
}

#[test]
fn test_load_accepts_huge_finite_values() {
    let csv = "Type,Flowrate,Pressure,Temperature\nPump,1e308,1,1\nPump,1e308,1,1\n";
    let rows = load(csv.as_bytes()).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].flowrate, 1e308);
}
