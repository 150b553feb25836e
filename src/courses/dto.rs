use serde::Serialize;

/// One enrolled course instance as the student dashboard shows it.
/// `id` is the course id, `detail_id` the enrollment detail being evaluated.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CourseItem {
    pub id: i32,
    pub detail_id: i32,
    pub name: String,
    pub code: String,
    pub teacher: String,
    pub period: String,
    pub group: String,
    pub responded: bool,
    pub is_survey_active: bool,
}
