//! Reduction of evaluation answers into per-assignment report rows.

use crate::{
    reports::dto::ReportItem,
    repo::{AssignmentSnapshot, COMMENT_QUESTION, LIKERT_QUESTIONS},
};

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Averages over evaluated details only; a detail without an evaluation
/// counts towards `enrolled` and nothing else.
/// `enrolled` counts every detail of the assignment, withdrawn ones included.
pub fn summarize(snapshot: &AssignmentSnapshot) -> ReportItem {
    let enrolled = snapshot.details.len();
    let mut count = 0usize;
    let mut sums = [0i64; 4];
    let mut comments = Vec::new();

    for answers in snapshot.details.iter().filter_map(|d| d.evaluation.as_ref()) {
        count += 1;
        for answer in answers {
            if let Some(slot) = LIKERT_QUESTIONS.iter().position(|&q| q == answer.question_id) {
                sums[slot] += i64::from(answer.numeric_value.unwrap_or(0));
            } else if answer.question_id == COMMENT_QUESTION {
                if let Some(text) = answer.text_value.as_deref().map(str::trim) {
                    if !text.is_empty() {
                        comments.push(text.to_string());
                    }
                }
            }
        }
    }

    let averages = sums.map(|sum| if count == 0 { 0.0 } else { sum as f64 / count as f64 });
    let avg_general = averages.iter().sum::<f64>() / averages.len() as f64;
    let participation_rate = if enrolled == 0 {
        0.0
    } else {
        100.0 * count as f64 / enrolled as f64
    };

    ReportItem {
        course_id: snapshot.course_id,
        course_code: snapshot.course_code.clone(),
        course_name: snapshot.course_name.clone(),
        teacher: snapshot.teacher_name.clone(),
        period: snapshot.period.clone(),
        group: snapshot.group_name.clone(),
        enrolled,
        count,
        participation_rate: round2(participation_rate),
        avg_p1: round2(averages[0]),
        avg_p2: round2(averages[1]),
        avg_p3: round2(averages[2]),
        avg_p4: round2(averages[3]),
        avg_general: round2(avg_general),
        comments,
    }
}
