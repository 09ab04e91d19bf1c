use crate::config::PeriodLabelStyle;
use crate::types::CourseRecord;
use std::collections::BTreeSet;

/// A maximal run of consecutive 0-based period indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodRun {
    pub first: u32,
    pub last: u32,
}

impl PeriodRun {
    pub fn periods(&self) -> impl Iterator<Item = u32> {
        self.first..=self.last
    }

    /// 1-based label: `4` for a single period, `4-5` for a run.
    pub fn label(&self) -> String {
        if self.first == self.last {
            format!("{}", self.first + 1)
        } else {
            format!("{}-{}", self.first + 1, self.last + 1)
        }
    }
}

pub fn group_consecutive(periods: &BTreeSet<u32>) -> Vec<PeriodRun> {
    let mut runs: Vec<PeriodRun> = Vec::new();
    for &period in periods {
        match runs.last_mut() {
            Some(run) if run.last + 1 == period => run.last = period,
            _ => runs.push(PeriodRun {
                first: period,
                last: period,
            }),
        }
    }
    runs
}

/// Run labels joined by the style's separator, without prefix or suffix.
pub fn format_runs(runs: &[PeriodRun], separator: &str) -> String {
    runs.iter()
        .map(PeriodRun::label)
        .collect::<Vec<_>>()
        .join(separator)
}

pub fn render_label(periods: &BTreeSet<u32>, style: &PeriodLabelStyle) -> String {
    let runs = group_consecutive(periods);
    if runs.is_empty() {
        return String::new();
    }
    format!(
        "{}{}{}",
        style.prefix,
        format_runs(&runs, &style.separator),
        style.suffix
    )
}

/// Fills `start_period`, `end_period` and `formatted_periods` on every record.
pub fn apply_period_display(records: &mut [CourseRecord], style: &PeriodLabelStyle) {
    for record in records.iter_mut() {
        match (record.periods.first(), record.periods.last()) {
            (Some(&first), Some(&last)) => {
                record.start_period = first + 1;
                record.end_period = last + 1;
                record.formatted_periods = render_label(&record.periods, style);
                tracing::debug!(
                    "[Schedule] {} (day {}): periods {:?} -> {}",
                    record.name,
                    record.day_of_week,
                    record.periods,
                    record.formatted_periods
                );
            }
            _ => {
                record.start_period = 0;
                record.end_period = 0;
                record.formatted_periods = String::new();
                tracing::warn!("[Schedule] {} has no period information", record.name);
            }
        }
    }
}
