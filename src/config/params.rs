//! Raw task parameters.
//!
//! Parameters arrive as a flat key/value set, either as a URL query string
//! or as a JSON object. Values are kept as strings until validation.

use serde::{Deserialize, Deserializer, Serialize};

/// Unvalidated partitioner parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskParameters {
    /// Scope layer, or the root layer for the whole graph.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub boundary_layer_id: Option<String>,
    /// Counting layer; unset means the axis is continuous.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub token_layer_id: Option<String>,
    /// Target window size.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub partition_size: Option<String>,
    /// Cap on windows per scope.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub max_partitions: Option<String>,
    /// start / middle / end.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
    /// Graph attribute layer used to skip whole graphs.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub exclude_on_attribute: Option<String>,
    /// Comma-separated attribute values that cause a skip.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub exclude_on_attribute_values: Option<String>,
    /// Output layer.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub destination_layer_id: Option<String>,
    /// Whether partial edge windows are kept.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub left_overs: Option<String>,
    /// size (default) or serial.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Accept strings, numbers and booleans; treat null and "" as unset.
fn lenient<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let text = match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        other => return Err(serde::de::Error::custom(format!("expected a scalar, got {}", other))),
    };
    Ok(text.filter(|s| !s.is_empty()))
}

impl TaskParameters {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `key=value&key=value` form.
    ///
    /// Values are percent-decoded with `+` as space. Unknown keys are ignored.
    pub fn from_query_string(query: &str) -> Self {
        let mut params = Self::new();
        for pair in query.trim_start_matches('?').split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            params.assign(&percent_decode(key), percent_decode(value));
        }
        params
    }

    /// Builder-style setter by parameter name.
    pub fn set(mut self, key: &str, value: impl Into<String>) -> Self {
        self.assign(key, value.into());
        self
    }

    /// Whether leftover windows were requested.
    pub fn leftovers_requested(&self) -> bool {
        self.left_overs
            .as_deref()
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "on" | "true" | "yes" | "1"))
            .unwrap_or(false)
    }

    fn assign(&mut self, key: &str, value: String) {
        let value = if value.is_empty() { None } else { Some(value) };
        let slot = match key {
            "boundaryLayerId" => &mut self.boundary_layer_id,
            "tokenLayerId" => &mut self.token_layer_id,
            "partitionSize" => &mut self.partition_size,
            "maxPartitions" => &mut self.max_partitions,
            "alignment" => &mut self.alignment,
            "excludeOnAttribute" => &mut self.exclude_on_attribute,
            "excludeOnAttributeValues" => &mut self.exclude_on_attribute_values,
            "destinationLayerId" => &mut self.destination_layer_id,
            "leftOvers" => &mut self.left_overs,
            "label" => &mut self.label,
            other => {
                tracing::debug!(parameter = other, "Ignoring unknown task parameter");
                return;
            }
        };
        *slot = value;
    }
}

/// Decode `%XX` escapes and `+`. Malformed escapes are kept literally.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                        continue;
                    }
                    _ => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
