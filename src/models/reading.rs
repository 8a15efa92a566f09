// One equipment reading (one CSV row). Lives only for a single summarization pass.

use serde::Deserialize;

/// CSV header names are matched exactly (`Type`, `Flowrate`, `Pressure`, `Temperature`);
/// any extra columns are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EquipmentReading {
    #[serde(rename = "Type")]
    pub equipment_type: String,
    #[serde(rename = "Flowrate")]
    pub flowrate: f64,
    #[serde(rename = "Pressure")]
    pub pressure: f64,
    #[serde(rename = "Temperature")]
    pub temperature: f64,
}
