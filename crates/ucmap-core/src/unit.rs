//! The retail unit record as served by `GET /unidades/all`.

use serde::{Deserialize, Deserializer, Serialize};

/// One physical retail location.
///
/// Every field is optional on the wire; missing text degrades to placeholder
/// display and missing coordinates keep the unit off the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(rename = "rede", default)]
    pub network: Option<String>,
    #[serde(rename = "endereco_original", default)]
    pub original_address: Option<String>,
    #[serde(rename = "estado", default)]
    pub state: Option<String>,
    #[serde(rename = "cnpj", default, deserialize_with = "lenient_text")]
    pub tax_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub longitude: Option<f64>,
}

impl Unit {
    /// Returns `(latitude, longitude)` when both are present and finite.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_mappable(&self) -> bool {
        self.coordinates().is_some()
    }
}

// Coordinates occasionally arrive as numeric strings; anything unparsable is
// treated as absent rather than failing the whole catalog.
fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64))
}

// Tax IDs exported from spreadsheets sometimes come through as bare numbers.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn value_as_f64(value: &serde_json::Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
        .filter(|v| v.is_finite())
}
