use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::scale::ScaleTransform;

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Warning,
    Error,
}

/// JSON body returned by the processing endpoint.
#[derive(Deserialize, Clone, Debug)]
pub struct ProcessResponse {
    pub status: ResponseStatus,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default)]
    pub result_image_data: Option<String>,
    #[serde(default)]
    pub result_video_url: Option<String>,
    #[serde(default)]
    pub result_filename: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessOutcome<'a> {
    Image(&'a str),
    Video(&'a str),
    /// `status == "success"` with no result media is a valid no-output
    /// success, distinct from an error.
    NoOutput,
    Failed(&'a str),
}

impl ProcessResponse {
    /// Message to surface when the request failed; the `error` field wins
    /// over `message` when present.
    pub fn failure_message(&self) -> &str {
        self.error
            .as_deref()
            .filter(|text| !text.is_empty())
            .unwrap_or(&self.message)
    }

    /// Classification including the HTTP level: a non-2xx reply is a failure
    /// regardless of what the body claims.
    pub fn outcome_for(&self, http_ok: bool) -> ProcessOutcome<'_> {
        if !http_ok {
            return ProcessOutcome::Failed(self.failure_message());
        }
        self.outcome()
    }

    pub fn outcome(&self) -> ProcessOutcome<'_> {
        if self.status == ResponseStatus::Error {
            return ProcessOutcome::Failed(self.failure_message());
        }
        if let Some(data) = self.result_image_data.as_deref() {
            return ProcessOutcome::Image(data);
        }
        if let Some(url) = self.result_video_url.as_deref() {
            return ProcessOutcome::Video(url);
        }
        ProcessOutcome::NoOutput
    }

    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.as_ref()?.get(key)?.as_str()
    }

    /// `key: value` lines for the details panel.
    pub fn details_text(&self) -> Option<String> {
        let details = self.details.as_ref()?;
        let mut text = String::new();
        for (key, value) in details {
            text.push_str(key);
            text.push_str(": ");
            text.push_str(&value.to_string());
            text.push('\n');
        }
        Some(text.trim_end().to_string())
    }
}

/// Local, synchronous submit validation. Failures block the action without
/// touching the network or the session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitRejection {
    #[error("Select a file first.")]
    NoFile,
    #[error("Mark the object(s) to remove first.")]
    NoShapes,
    #[error("Cannot get original media dimensions. Wait for the preview or reload the file.")]
    GeometryUnavailable,
}

pub fn check_submittable(
    has_file: bool,
    shape_count: usize,
    scale: Option<&ScaleTransform>,
) -> Result<(), SubmitRejection> {
    if !has_file {
        return Err(SubmitRejection::NoFile);
    }
    if shape_count == 0 {
        return Err(SubmitRejection::NoShapes);
    }
    if scale.is_none() {
        return Err(SubmitRejection::GeometryUnavailable);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_image_success_response() {
        let body = r#"{
            "status": "success",
            "message": "Image inpainting complete.",
            "details": {"processing_method": "Inpainting (TELEA, R5)", "is_video": false},
            "result_image_data": "data:image/png;base64,AAAA"
        }"#;
        let response: ProcessResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.status, ResponseStatus::Success);
        assert_eq!(
            response.outcome(),
            ProcessOutcome::Image("data:image/png;base64,AAAA")
        );
        let details = response.details_text().unwrap();
        assert!(details.contains("is_video: false"));
        assert!(details.contains("processing_method: \"Inpainting (TELEA, R5)\""));
    }

    #[test]
    fn parses_video_warning_response() {
        let body = r#"{
            "status": "warning",
            "message": "No valid mask provided; inpainting skipped.",
            "result_video_url": "/output/abc.mp4",
            "result_filename": "abc.mp4"
        }"#;
        let response: ProcessResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.status, ResponseStatus::Warning);
        assert_eq!(response.outcome(), ProcessOutcome::Video("/output/abc.mp4"));
    }

    #[test]
    fn success_without_media_is_no_output() {
        let body = r#"{"status": "success", "message": "Nothing to output."}"#;
        let response: ProcessResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.outcome(), ProcessOutcome::NoOutput);
    }

    #[test]
    fn error_status_fails_regardless_of_payload() {
        let body = r#"{
            "status": "error",
            "message": "Server Error: boom",
            "result_image_data": "data:image/png;base64,AAAA"
        }"#;
        let response: ProcessResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.outcome(), ProcessOutcome::Failed("Server Error: boom"));
    }

    #[test]
    fn non_2xx_fails_even_when_body_claims_success() {
        let body = r#"{
            "status": "success",
            "message": "Image inpainting complete.",
            "result_image_data": "data:image/png;base64,AAAA"
        }"#;
        let response: ProcessResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            response.outcome_for(true),
            ProcessOutcome::Image("data:image/png;base64,AAAA")
        );
        assert_eq!(
            response.outcome_for(false),
            ProcessOutcome::Failed("Image inpainting complete.")
        );
    }

    #[test]
    fn error_field_takes_precedence_over_message() {
        let body = r#"{"status": "error", "error": "Forbidden path", "message": "ignored"}"#;
        let response: ProcessResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.outcome(), ProcessOutcome::Failed("Forbidden path"));
    }

    #[test]
    fn submit_checks_run_in_order() {
        let scale = ScaleTransform::compute(10, 10, 10.0, 10.0);
        assert_eq!(
            check_submittable(false, 0, None),
            Err(SubmitRejection::NoFile)
        );
        assert_eq!(
            check_submittable(true, 0, scale.as_ref()),
            Err(SubmitRejection::NoShapes)
        );
        assert_eq!(
            check_submittable(true, 2, None),
            Err(SubmitRejection::GeometryUnavailable)
        );
        assert_eq!(check_submittable(true, 2, scale.as_ref()), Ok(()));
    }
}
