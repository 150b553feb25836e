use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Body of `POST /api/submit`. `student` is optional and only cross-checked
/// against the token; `detail_id` picks one enrollment when several match.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(default)]
    pub student: Option<String>,
    #[serde(default)]
    pub course_id: Option<i32>,
    #[serde(default)]
    pub detail_id: Option<i32>,
    #[serde(default)]
    pub answers: AnswersPayload,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct AnswersPayload {
    #[serde(default)]
    pub p1: Option<i32>,
    #[serde(default)]
    pub p2: Option<i32>,
    #[serde(default)]
    pub p3: Option<i32>,
    #[serde(default)]
    pub p4: Option<i32>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionView {
    pub detail_id: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
    pub answers: AnswersView,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct AnswersView {
    pub p1: Option<i32>,
    pub p2: Option<i32>,
    pub p3: Option<i32>,
    pub p4: Option<i32>,
    pub comment: String,
}
