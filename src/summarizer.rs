// Summarizer: readings -> count, rounded means, per-type distribution. Pure.

use crate::error::IngestError;
use crate::models::{Distribution, EquipmentReading, Summary};

/// Decimal places kept on every average.
pub const AVERAGE_DECIMALS: i32 = 3;

/// Reduces a batch of readings to a [`Summary`].
///
/// Empty batches are rejected with [`IngestError::EmptyDataset`]: a mean over zero rows is
/// undefined and a zero-valued summary would be indistinguishable from real readings.
pub fn summarize(rows: &[EquipmentReading]) -> Result<Summary, IngestError> {
    if rows.is_empty() {
        return Err(IngestError::EmptyDataset);
    }

    let mut distribution = Distribution::new();
    for r in rows {
        *distribution.entry(r.equipment_type.clone()).or_insert(0) += 1;
    }

    Ok(Summary {
        total_count: rows.len() as u64,
        average_flowrate: column_mean("Flowrate", rows, |r| r.flowrate)?,
        average_pressure: column_mean("Pressure", rows, |r| r.pressure)?,
        average_temperature: column_mean("Temperature", rows, |r| r.temperature)?,
        equipment_type_distribution: distribution,
    })
}

/// Rounded mean of one column. Falls back to summing `x / n` when the plain sum overflows, so
/// finite readings always give a finite mean; a non-finite reading is a parse error.
fn column_mean(
    column: &str,
    rows: &[EquipmentReading],
    value: impl Fn(&EquipmentReading) -> f64,
) -> Result<f64, IngestError> {
    let n = rows.len() as f64;
    let mut mean = rows.iter().map(&value).sum::<f64>() / n;
    if !mean.is_finite() {
        mean = rows.iter().map(|r| value(r) / n).sum();
    }
    if !mean.is_finite() {
        return Err(IngestError::Parse {
            line: 0,
            message: format!("{} average is not a finite number", column),
        });
    }
    Ok(round_half_away(mean))
}

/// Rounds to [`AVERAGE_DECIMALS`] places, ties away from zero (`f64::round`).
/// Magnitudes too large to scale carry no fractional digits and are returned as is.
pub fn round_half_away(value: f64) -> f64 {
    let scale = 10f64.powi(AVERAGE_DECIMALS);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / scale
}
