//! Schedule page parsing: extraction strategies, enrichment and reconciliation.

pub mod common;
pub mod credits;
pub mod fallback;
pub mod periods;
pub mod reconcile;
pub mod script;
pub mod table;
pub mod teachers;
pub mod weeks;

use crate::context::ParserContext;
use crate::schedule::common::parse_dom;
use crate::schedule::credits::{attach_credits, extract_credits, CreditMap};
use crate::schedule::periods::apply_period_display;
use crate::schedule::reconcile::{merge_duplicates, merge_or_add};
use crate::schedule::table::{scan_cells, CellSelection};
use crate::schedule::teachers::{extract_teacher_correlation, extract_teacher_ids, resolve_teachers};
use crate::types::{CourseRecord, ExtractionSource, ParsedSchedule, SemesterInfo};
use std::collections::HashMap;
use tl::VDom;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StrategyError {
    #[error("no courses found")]
    Empty,
    #[error("could not parse document: {0}")]
    Document(String),
}

/// One schedule page, parsed once and shared by every strategy.
pub struct SchedulePage<'a> {
    pub html: &'a str,
    pub periods_per_day: u32,
    dom: Result<VDom<'a>, String>,
}

impl<'a> SchedulePage<'a> {
    pub fn new(html: &'a str, periods_per_day: u32) -> Self {
        Self {
            html,
            periods_per_day,
            dom: parse_dom(html),
        }
    }

    pub fn dom(&self) -> Result<&VDom<'a>, StrategyError> {
        self.dom
            .as_ref()
            .map_err(|message| StrategyError::Document(message.clone()))
    }
}

pub trait ScheduleStrategy: Send + Sync {
    fn source(&self) -> ExtractionSource;

    fn extract(
        &self,
        page: &SchedulePage<'_>,
        context: &ParserContext,
    ) -> Result<Vec<CourseRecord>, StrategyError>;
}

fn non_empty(records: Vec<CourseRecord>) -> Result<Vec<CourseRecord>, StrategyError> {
    if records.is_empty() {
        Err(StrategyError::Empty)
    } else {
        Ok(records)
    }
}

pub struct ScriptStrategy;

impl ScheduleStrategy for ScriptStrategy {
    fn source(&self) -> ExtractionSource {
        ExtractionSource::Script
    }

    fn extract(
        &self,
        page: &SchedulePage<'_>,
        context: &ParserContext,
    ) -> Result<Vec<CourseRecord>, StrategyError> {
        let statements = script::find_statements(page.html, context);
        tracing::info!("[Schedule] Found {} activity statements", statements.len());
        let mut records = Vec::new();
        for record in script::records_from_statements(&statements, context) {
            merge_or_add(&mut records, record, context.config.trace_merges);
        }
        non_empty(records)
    }
}

pub struct RowSpanTableStrategy;

impl ScheduleStrategy for RowSpanTableStrategy {
    fn source(&self) -> ExtractionSource {
        ExtractionSource::Table
    }

    fn extract(
        &self,
        page: &SchedulePage<'_>,
        context: &ParserContext,
    ) -> Result<Vec<CourseRecord>, StrategyError> {
        let records = scan_cells(
            page.dom()?,
            page.periods_per_day,
            CellSelection::RowSpan,
            context,
        );
        tracing::info!("[Schedule] Found {} row-span cells", records.len());
        non_empty(records)
    }
}

pub struct FallbackStrategy;

impl ScheduleStrategy for FallbackStrategy {
    fn source(&self) -> ExtractionSource {
        ExtractionSource::Fallback
    }

    fn extract(
        &self,
        page: &SchedulePage<'_>,
        context: &ParserContext,
    ) -> Result<Vec<CourseRecord>, StrategyError> {
        non_empty(fallback::scan_fallback(
            page.html,
            page.dom()?,
            page.periods_per_day,
            context,
        ))
    }
}

/// Strategies grouped by tier. Results within a tier are merged; the first
/// tier producing any record wins.
pub static STRATEGY_TIERS: [&[&dyn ScheduleStrategy]; 2] = [
    &[&ScriptStrategy, &RowSpanTableStrategy],
    &[&FallbackStrategy],
];

fn combine_sources(current: Option<ExtractionSource>, next: ExtractionSource) -> ExtractionSource {
    match (current, next) {
        (None, next) => next,
        (Some(ExtractionSource::Script), ExtractionSource::Table)
        | (Some(ExtractionSource::Table), ExtractionSource::Script) => {
            ExtractionSource::ScriptAndTable
        }
        (Some(current), _) => current,
    }
}

/// Runs the strategy tiers and returns the merged partial records of the
/// first productive tier.
pub fn run_strategies(
    page: &SchedulePage<'_>,
    context: &ParserContext,
) -> (Vec<CourseRecord>, ExtractionSource) {
    let trace = context.config.trace_merges;

    for (tier_index, tier) in STRATEGY_TIERS.iter().enumerate() {
        let mut records = Vec::new();
        let mut source = None;

        for strategy in tier.iter() {
            match strategy.extract(page, context) {
                Ok(found) => {
                    tracing::info!(
                        "[Schedule] {:?} strategy produced {} records",
                        strategy.source(),
                        found.len()
                    );
                    source = Some(combine_sources(source, strategy.source()));
                    for record in found {
                        merge_or_add(&mut records, record, trace);
                    }
                }
                Err(StrategyError::Empty) => {
                    tracing::debug!("[Schedule] {:?} strategy found nothing", strategy.source());
                }
                Err(e) => {
                    tracing::warn!("[Schedule] {:?} strategy failed: {}", strategy.source(), e);
                }
            }
        }

        if let (false, Some(source)) = (records.is_empty(), source) {
            tracing::info!(
                "[Schedule] Tier {} yielded {} records",
                tier_index + 1,
                records.len()
            );
            return (records, source);
        }
    }

    tracing::warn!("[Schedule] No strategy found any courses");
    (Vec::new(), ExtractionSource::Empty)
}

/// `var unitCount = N;` from the page, or the configured default.
pub fn extract_periods_per_day(html: &str, context: &ParserContext) -> u32 {
    let declared = context
        .patterns
        .unit_count
        .captures(html)
        .and_then(|captures| captures[1].parse::<u32>().ok())
        .filter(|count| *count > 0);
    match declared {
        Some(count) => count,
        None => {
            tracing::debug!(
                "[Schedule] No unitCount declared, using {}",
                context.config.default_periods_per_day
            );
            context.config.default_periods_per_day
        }
    }
}

pub fn extract_semester(html: &str, context: &ParserContext) -> Option<SemesterInfo> {
    let captures = context.patterns.semester.captures(html)?;
    Some(SemesterInfo {
        year: captures[1].to_string(),
        term: captures[2].to_string(),
    })
}

fn first_period(record: &CourseRecord) -> Option<u32> {
    record.periods.first().copied()
}

fn parse_records(
    html: &str,
    periods_per_day: u32,
    context: &ParserContext,
) -> (Vec<CourseRecord>, ExtractionSource) {
    let periods_per_day = if periods_per_day == 0 {
        tracing::warn!(
            "[Schedule] periodsPerDay of 0 replaced by {}",
            context.config.default_periods_per_day
        );
        context.config.default_periods_per_day
    } else {
        periods_per_day
    };

    let page = SchedulePage::new(html, periods_per_day);
    let (mut records, source) = run_strategies(&page, context);
    if records.is_empty() {
        return (records, source);
    }

    let (credits, correlation) = match page.dom() {
        Ok(dom) => (
            extract_credits(html, dom, context),
            extract_teacher_correlation(dom, context),
        ),
        Err(e) => {
            tracing::warn!("[Schedule] Skipping table enrichment: {}", e);
            (CreditMap::new(), HashMap::new())
        }
    };
    attach_credits(&mut records, &credits);
    let directory = extract_teacher_ids(html, context);
    resolve_teachers(&mut records, &directory, &correlation);

    let mut courses = merge_duplicates(records, context.config.trace_merges);
    apply_period_display(&mut courses, &context.config.period_label);
    courses.sort_by(|left, right| {
        left.day_of_week
            .cmp(&right.day_of_week)
            .then_with(|| first_period(left).cmp(&first_period(right)))
            .then_with(|| left.name.cmp(&right.name))
    });

    (courses, source)
}

/// Parses one schedule page into its canonical, deduplicated course list.
pub fn parse_schedule(
    html: &str,
    periods_per_day: u32,
    context: &ParserContext,
) -> Vec<CourseRecord> {
    parse_records(html, periods_per_day, context).0
}

/// Like [`parse_schedule`], reading `periodsPerDay` and the semester banner
/// from the page itself.
pub fn parse_schedule_page(html: &str, context: &ParserContext) -> ParsedSchedule {
    let periods_per_day = extract_periods_per_day(html, context);
    let semester = extract_semester(html, context);
    let (courses, source) = parse_records(html, periods_per_day, context);
    tracing::info!(
        "[Schedule] Parsed {} courses ({:?}, {} periods per day)",
        courses.len(),
        source,
        periods_per_day
    );
    ParsedSchedule {
        semester,
        periods_per_day,
        source,
        courses,
    }
}
