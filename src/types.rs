use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Production job accepted by `production/produce`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProduceJob {
    pub job_id: String,
    #[serde(default)]
    pub order_id: Option<String>,
}

/// Full status of a production job (`production/status/get`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub job_id: String,
    #[serde(default)]
    pub is_final_status: bool,
    #[serde(default)]
    pub is_success: bool,
    #[serde(default)]
    pub enqueued_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub processing_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub failed_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error_details: Option<JsonValue>,
    #[serde(default)]
    pub result: Option<JobResult>,
}

/// Output of a finished job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    /// Document name to download URL.
    #[serde(rename = "r", default)]
    pub urls: Option<BTreeMap<String, String>>,
    /// Document name to output file name.
    #[serde(rename = "d", default)]
    pub files: Option<BTreeMap<String, String>>,
    /// Processing timings reported by the renderer.
    #[serde(rename = "s", default)]
    pub timings: Option<JsonValue>,
    #[serde(default)]
    pub meta: Option<JsonValue>,
    #[serde(default)]
    pub zip: Option<String>,
}

impl JobResult {
    /// Download URL of a rendered document, e.g. `"preview"`.
    pub fn url(&self, document: &str) -> Option<&str> {
        self.urls.as_ref()?.get(document).map(String::as_str)
    }
}

/// Lightweight status of a job (`production/status/pdf/get`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleJobStatus {
    #[serde(default)]
    pub is_final_status: bool,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default)]
    pub error_details: Option<JsonValue>,
    #[serde(default)]
    pub pdfs: Vec<PdfOutput>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfOutput {
    pub document_name: String,
    pub url: String,
}

/// Node of the user's directory tree (`directories/load`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    pub id: u64,
    #[serde(rename = "pid", default)]
    pub parent_id: Option<u64>,
    #[serde(rename = "n", default)]
    pub name: String,
    #[serde(rename = "c", default)]
    pub children: Vec<Directory>,
}

impl Directory {
    /// Depth-first search for a directory by name.
    pub fn find(&self, name: &str) -> Option<&Directory> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }
}

/// Templates stored in one of the user's directories (`templates/user/load`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserTemplates {
    #[serde(rename = "uid")]
    pub user_id: String,
    #[serde(rename = "e", default)]
    pub email: Option<String>,
    #[serde(rename = "ts", default)]
    pub templates: Vec<TemplateSummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: u64,
    #[serde(rename = "n")]
    pub name: String,
    #[serde(rename = "turl", default)]
    pub thumbnail_url: Option<String>,
    #[serde(rename = "bg", default)]
    pub background: Option<String>,
    #[serde(rename = "ls", default)]
    pub last_saved: Option<DateTime<Utc>>,
    #[serde(rename = "lp", default)]
    pub last_published: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Directory, JobStatus, SimpleJobStatus};

    #[test]
    fn job_status_parses_timestamps_and_result() {
        let status: JobStatus = serde_json::from_value(json!({
            "jobId": "job-1",
            "isFinalStatus": true,
            "isSuccess": true,
            "enqueuedOn": "2021-08-25T11:48:39.5037687Z",
            "finishedOn": "2021-08-25T11:48:40.0226477Z",
            "failedOn": null,
            "errorDetails": null,
            "result": {
                "s": { "t": 0, "p": 63.6652 },
                "r": { "preview": "https://example.com/out_1.pdf" },
                "d": { "preview": "out_1.pdf" },
                "p": null,
                "meta": null,
                "zip": null
            }
        }))
        .expect("status must parse");

        assert!(status.is_final_status);
        assert!(status.failed_on.is_none());
        assert!(status.enqueued_on.is_some());
        let result = status.result.expect("result present");
        assert_eq!(result.url("preview"), Some("https://example.com/out_1.pdf"));
        assert_eq!(result.url("print"), None);
    }

    #[test]
    fn simple_status_lists_pdfs() {
        let status: SimpleJobStatus = serde_json::from_value(json!({
            "isFinalStatus": true,
            "isError": false,
            "errorDetails": null,
            "pdfs": [{ "documentName": "print", "url": "https://example.com/print.pdf" }]
        }))
        .expect("status must parse");
        assert_eq!(status.pdfs.len(), 1);
        assert_eq!(status.pdfs[0].document_name, "print");
    }

    #[test]
    fn directory_tree_is_searchable() {
        let root: Directory = serde_json::from_value(json!({
            "id": 43, "pid": null, "n": "",
            "c": [{ "id": 46, "pid": 43, "n": "Designs",
                    "c": [{ "id": 211, "pid": 46, "n": "ls_Namensmotive", "c": [] }] }]
        }))
        .expect("tree must parse");
        assert_eq!(root.parent_id, None);
        assert_eq!(root.find("ls_Namensmotive").map(|dir| dir.id), Some(211));
        assert!(root.find("missing").is_none());
    }
}
