use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodResponse {
    pub start_date: String,
    pub end_date: String,
    pub is_active: bool,
}
