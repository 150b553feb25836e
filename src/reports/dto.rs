use serde::Serialize;

/// Aggregated results of one taught course instance.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportItem {
    pub course_id: i32,
    pub course_code: String,
    pub course_name: String,
    pub teacher: String,
    pub period: String,
    pub group: String,
    pub enrolled: usize,
    pub count: usize,
    pub participation_rate: f64,
    #[serde(rename = "avg_p1")]
    pub avg_p1: f64,
    #[serde(rename = "avg_p2")]
    pub avg_p2: f64,
    #[serde(rename = "avg_p3")]
    pub avg_p3: f64,
    #[serde(rename = "avg_p4")]
    pub avg_p4: f64,
    #[serde(rename = "avg_general")]
    pub avg_general: f64,
    pub comments: Vec<String>,
}
