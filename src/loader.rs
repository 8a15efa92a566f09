// CSV loader: bytes -> equipment readings. Pure; the whole payload is materialized.

use crate::error::IngestError;
use crate::models::EquipmentReading;
use csv::{ReaderBuilder, StringRecord, Trim};

/// Header names every upload must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Type", "Flowrate", "Pressure", "Temperature"];

/// Parses a comma-separated payload with a header row.
///
/// Fails with [`IngestError::Schema`] when a required column is missing and with
/// [`IngestError::Parse`] on ragged rows, invalid UTF-8, non-numeric cells and `NaN`/`inf`.
pub fn load(input: &[u8]) -> Result<Vec<EquipmentReading>, IngestError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(Trim::All)
        .from_reader(input);

    let headers = reader.headers().map_err(parse_error)?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|&&col| !headers.iter().any(|h| h == col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::Schema { missing });
    }

    let mut record = StringRecord::new();
    let mut rows = Vec::new();
    while reader.read_record(&mut record).map_err(parse_error)? {
        let row: EquipmentReading = record.deserialize(Some(&headers)).map_err(parse_error)?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        ensure_finite(&row, line)?;
        rows.push(row);
    }
    Ok(rows)
}

/// `f64::from_str` accepts `NaN` and `inf`; neither is a reading.
fn ensure_finite(row: &EquipmentReading, line: u64) -> Result<(), IngestError> {
    let cells = [
        ("Flowrate", row.flowrate),
        ("Pressure", row.pressure),
        ("Temperature", row.temperature),
    ];
    match cells.iter().find(|(_, v)| !v.is_finite()) {
        Some((column, value)) => Err(IngestError::Parse {
            line,
            message: format!("{} must be a finite number, got {}", column, value),
        }),
        None => Ok(()),
    }
}

fn parse_error(e: csv::Error) -> IngestError {
    let line = e.position().map(|p| p.line()).unwrap_or(0);
    let message = match e.kind() {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {} fields, found {}", expected_len, len),
        csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
        _ => e.to_string(),
    };
    IngestError::Parse { line, message }
}
