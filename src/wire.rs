use std::collections::BTreeMap;

use serde::Deserialize;

use crate::Link;

/// Error body returned by the API for statuses `>= 400`.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub status: u16,
    pub title: String,
    pub detail: String,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: BTreeMap<String, Link>,
}
