//! Typed views over the Azure CLI's JSON listings.

use serde::Deserialize;
use serde_json::Value;

/// One entry from `az account list`.
#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Subscription state as reported by Azure, informational only.
    #[serde(default)]
    pub state: String,
}

/// One entry from `az aks list`.
#[derive(Debug, Clone, Deserialize)]
pub struct Cluster {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "resourceGroup")]
    pub resource_group: String,
    /// Region the cluster lives in, informational only.
    #[serde(default)]
    pub location: String,
}

/// Decode a listing that should be a JSON array. Anything else - including
/// the empty object an empty stdout decodes to - means no entries.
pub fn decode_listing<T: serde::de::DeserializeOwned>(value: Value) -> Vec<T> {
    match value {
        Value::Array(_) => serde_json::from_value(value).unwrap_or_default(),
        _ => Vec::new(),
    }
}
