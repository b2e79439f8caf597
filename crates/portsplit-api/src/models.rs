// CVP response types
//
// Models for the provisioning and configlet endpoints. Fields use
// `#[serde(default)]` liberally because CVP is inconsistent about field
// presence across releases; undocumented fields land in `extra`.

use serde::{Deserialize, Serialize};

// ── Error envelope ───────────────────────────────────────────────────

/// CVP reports failures as `{"errorCode": "...", "errorMessage": "..."}`,
/// frequently with HTTP 200.
#[derive(Debug, Deserialize)]
pub(crate) struct CvpErrorBody {
    #[serde(rename = "errorCode", default)]
    pub error_code: Option<serde_json::Value>,
    #[serde(rename = "errorMessage", default)]
    pub error_message: Option<String>,
}

impl CvpErrorBody {
    /// `Some((code, message))` when the body actually carries an error.
    pub(crate) fn into_parts(self) -> Option<(Option<String>, Option<String>)> {
        if self.error_code.is_none() && self.error_message.is_none() {
            return None;
        }
        let code = self.error_code.map(|c| match c {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });
        Some((code, self.error_message))
    }
}

// ── Server ───────────────────────────────────────────────────────────

/// Payload of `cvpInfo/getCvpInfo.do`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvpInfo {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Inventory ────────────────────────────────────────────────────────

/// A provisioned network element from `provisioning/searchTopology.do`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub fqdn: String,
    /// Primary key for every per-device provisioning call.
    pub system_mac_address: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TopologySearch {
    #[serde(default)]
    pub net_element_list: Vec<Device>,
}

// ── Configlets ───────────────────────────────────────────────────────

/// A named configuration-text template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configlet {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub config: String,
    /// Set on the per-device configlet CVP maintains for settings found
    /// on the device but absent from its assigned configlets.
    #[serde(default)]
    pub reconciled: bool,
    #[serde(default, rename = "type")]
    pub configlet_type: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigletList {
    #[serde(default)]
    pub configlet_list: Vec<Configlet>,
}

/// Body of `configlet/updateConfiglet.do`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateConfigletRequest<'a> {
    pub config: &'a str,
    pub key: &'a str,
    pub name: &'a str,
    pub wait_for_task_ids: bool,
    pub reconciled: bool,
}

/// Body of `provisioning/updateReconcileConfiglet.do`.
#[derive(Debug, Serialize)]
pub(crate) struct ReconcileConfigletRequest<'a> {
    pub name: &'a str,
    pub config: &'a str,
    pub key: &'a str,
    pub reconciled: bool,
}

/// Acknowledgement returned by configlet update endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub task_ids: Vec<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
