//! POI records as they move through a discovery cycle.

use serde::{Deserialize, Deserializer, Serialize};

use crate::geo::GeoPoint;

/// Visibility flag as sent by the geo search backend.
///
/// The backend has been observed sending both a JSON boolean and the literal
/// string `"true"`. Both forms are kept as received; only [`is_public`]
/// interprets them.
///
/// [`is_public`]: PublicFlag::is_public
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublicFlag {
    Bool(bool),
    Text(String),
    Other(serde_json::Value),
}

impl PublicFlag {
    #[must_use]
    pub fn is_public(&self) -> bool {
        match self {
            PublicFlag::Bool(b) => *b,
            PublicFlag::Text(s) => s == "true",
            PublicFlag::Other(_) => false,
        }
    }
}

impl Default for PublicFlag {
    fn default() -> Self {
        PublicFlag::Bool(false)
    }
}

/// Coordinate pair reference, either serialized (`"[lng, lat]"`) or a bare array.
///
/// Any other shape lands in `Other` so a single malformed hit cannot fail
/// decoding of the whole search response; it is rejected later, and only if
/// that candidate's raw geometry is actually needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeometryRef {
    Serialized(String),
    Pair(Vec<f64>),
    Other(serde_json::Value),
}

/// Unenriched hit from the geo index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCandidate {
    /// Normalised to a string; `None` when the backend sent null, empty, or no id.
    #[serde(default, deserialize_with = "deserialize_candidate_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub public: PublicFlag,
    #[serde(default)]
    pub geometry: Option<GeometryRef>,
}

impl RawCandidate {
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.public.is_public()
    }
}

fn deserialize_candidate_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// A candidate after its descriptive metadata has been attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedPoi {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_ref: Option<String>,
    pub coordinates: GeoPoint,
}
