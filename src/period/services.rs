use anyhow::Context;
use time::{macros::format_description, Date};
use tracing::debug;

use crate::{config::PeriodConfig, period::dto::PeriodResponse, repo::Repository};

/// The evaluation window in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub start_date: Date,
    pub end_date: Date,
    pub is_active: bool,
}

impl PeriodWindow {
    /// Surveys are open when the window is active and `today` lies inside it, both ends included.
    pub fn is_open(&self, today: Date) -> bool {
        self.is_active && self.start_date <= today && today <= self.end_date
    }
}

impl From<&PeriodConfig> for PeriodWindow {
    fn from(cfg: &PeriodConfig) -> Self {
        Self {
            start_date: cfg.start_date,
            end_date: cfg.end_date,
            is_active: cfg.is_active,
        }
    }
}

/// Most recent stored period, or the configured window when the table is empty.
pub async fn current(repo: &dyn Repository, fallback: &PeriodConfig) -> anyhow::Result<PeriodWindow> {
    match repo.current_period().await? {
        Some(p) => {
            debug!(period_id = p.id, name = %p.name, "evaluation period from database");
            Ok(PeriodWindow {
                start_date: p.start_date,
                end_date: p.end_date,
                is_active: p.is_active,
            })
        }
        None => Ok(PeriodWindow::from(fallback)),
    }
}

pub(crate) fn format_date(date: Date) -> anyhow::Result<String> {
    date.format(format_description!("[year]-[month]-[day]"))
        .context("format date")
}

pub fn to_response(window: &PeriodWindow) -> anyhow::Result<PeriodResponse> {
    Ok(PeriodResponse {
        start_date: format_date(window.start_date)?,
        end_date: format_date(window.end_date)?,
        is_active: window.is_active,
    })
}
