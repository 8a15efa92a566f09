// equipment_type_distribution column codec: JSON object text, keys sorted, integer counts.
// Same text the original Instruments table held, so existing rows stay readable.

use crate::models::Distribution;

pub(super) fn encode(distribution: &Distribution) -> Result<String, serde_json::Error> {
    serde_json::to_string(distribution)
}

/// Rejects non-object text and non-integer or negative counts.
pub(super) fn decode(text: &str) -> Result<Distribution, serde_json::Error> {
    serde_json::from_str(text)
}
