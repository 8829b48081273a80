use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A typed descriptor of the environment a log entry originated from.
///
/// Serialized the way Cloud Logging expects it:
/// `{"type": "cloud_function", "labels": {"function_name": "..."}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredResource {
    /// Resource type, e.g. `cloud_function`
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Labels identifying the resource instance
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl MonitoredResource {
    /// Creates a resource with no labels.
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            labels: BTreeMap::new(),
        }
    }

    /// Adds a label to the resource.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Looks up a label value.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_type_and_labels() {
        let resource = MonitoredResource::new("cloud_function")
            .with_label("function_name", "greet")
            .with_label("region", "us-central1");

        let json = serde_json::to_value(&resource).expect("serializes");
        assert_eq!(
            json,
            serde_json::json!({
                "type": "cloud_function",
                "labels": {"function_name": "greet", "region": "us-central1"}
            })
        );
    }

    #[test]
    fn omits_empty_labels() {
        let json = serde_json::to_value(MonitoredResource::new("global")).expect("serializes");
        assert_eq!(json, serde_json::json!({"type": "global"}));
    }
}
