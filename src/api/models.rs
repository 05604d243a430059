//! Wire models shared by the client and the mock print API.

use serde::{Deserialize, Serialize};

/// Query string of the credential request: `?fileName=..&fileType=..`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CredentialQuery {
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "fileType")]
    pub file_type: String,
}

/// Response to the credential request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UploadCredentials {
    /// Pre-signed URL the document is PUT to.
    #[serde(rename = "uploadURL")]
    pub upload_url: String,
    /// Object key inside the bucket.
    pub key: String,
}

/// Body of the job-log POST.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct JobLogRequest {
    pub file_url: String,
    pub file_name: String,
    pub copies: u32,
    /// Only sent by the color-capable form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_color: Option<bool>,
}

/// Response to the job-log POST. Anything besides `jobId` is ignored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct JobLogResponse {
    #[serde(rename = "jobId", default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn job_log_request_field_names() {
        let req = JobLogRequest {
            file_url: "https://store.example/abc".into(),
            file_name: "a.pdf".into(),
            copies: 2,
            is_color: Some(true),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"FileUrl": "https://store.example/abc", "FileName": "a.pdf", "Copies": 2, "IsColor": true})
        );
    }

    #[test]
    fn color_flag_omitted_when_absent() {
        let req = JobLogRequest {
            file_url: "u".into(),
            file_name: "n".into(),
            copies: 1,
            is_color: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("IsColor").is_none());
    }

    #[test]
    fn job_log_response_ignores_extra_fields() {
        let resp: JobLogResponse =
            serde_json::from_str(r#"{"jobId":"J-100","queuePosition":4}"#).unwrap();
        assert_eq!(resp.job_id.as_deref(), Some("J-100"));
        let resp: JobLogResponse = serde_json::from_str(r#"{"message":"ok"}"#).unwrap();
        assert_eq!(resp.job_id, None);
    }

    #[test]
    fn credentials_use_upload_url_casing() {
        let creds: UploadCredentials =
            serde_json::from_str(r#"{"uploadURL":"https://store.example/bucket/abc","key":"abc"}"#).unwrap();
        assert_eq!(creds.upload_url, "https://store.example/bucket/abc");
        assert_eq!(creds.key, "abc");
    }
}
