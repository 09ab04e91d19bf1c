use crate::context::ParserContext;
use crate::schedule::common::{
    attribute, cell_lines, decode_slot, descendant_tags, has_class, is_schedule_table,
    split_bracketed_teacher, strip_qualifier, tables,
};
use crate::types::{CourseRecord, PLACEHOLDER_ID};
use std::collections::BTreeSet;
use tl::{HTMLTag, Parser, VDom};

/// Which cells of the timetable grid a scan looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellSelection {
    /// Cells with a `rowspan`; each covers that many contiguous periods.
    RowSpan,
    /// Cells painted with a `background-color`; each is a single period.
    Highlighted,
}

/// Walks the timetable grid and emits one record per occupied cell.
pub fn scan_cells(
    dom: &VDom,
    periods_per_day: u32,
    selection: CellSelection,
    context: &ParserContext,
) -> Vec<CourseRecord> {
    let parser = dom.parser();
    let mut records = Vec::new();

    for table in tables(dom, is_schedule_table) {
        let mut matched = 0usize;
        for cell in descendant_tags(table, parser, "td") {
            let span = match selection {
                CellSelection::RowSpan => {
                    let Some(raw) = attribute(cell, "rowspan").or_else(|| attribute(cell, "rowSpan"))
                    else {
                        continue;
                    };
                    match raw.parse::<u32>() {
                        Ok(span) => span.max(1),
                        Err(_) => {
                            tracing::warn!("[Schedule] Skipping cell with rowspan {:?}", raw);
                            continue;
                        }
                    }
                }
                CellSelection::Highlighted => {
                    if !is_highlighted(cell) {
                        continue;
                    }
                    1
                }
            };
            matched += 1;
            if let Some(record) = record_from_cell(cell, parser, periods_per_day, span, context) {
                records.push(record);
            }
        }
        tracing::debug!(
            "[Schedule] {:?} scan matched {} cells in one table",
            selection,
            matched
        );
    }

    records
}

fn is_highlighted(cell: &HTMLTag) -> bool {
    attribute(cell, "style").is_some_and(|style| style.contains("background-color"))
        || has_class(cell, "highlight")
}

fn record_from_cell(
    cell: &HTMLTag,
    parser: &Parser,
    periods_per_day: u32,
    span: u32,
    context: &ParserContext,
) -> Option<CourseRecord> {
    let id = attribute(cell, "id")?;
    let Some((day_of_week, period)) = decode_slot(&id, periods_per_day, &context.patterns) else {
        tracing::debug!("[Schedule] Cell id {:?} is not a slot index", id);
        return None;
    };

    let remaining = periods_per_day.saturating_sub(period);
    let span = if span > remaining {
        tracing::warn!(
            "[Schedule] Cell {} rowspan {} runs past period {}, clamped to {}",
            id,
            span,
            periods_per_day,
            remaining
        );
        remaining
    } else {
        span
    };
    if span == 0 {
        return None;
    }

    let lines = cell_lines(cell, parser);
    let first = lines.first()?;
    let (raw_name, teacher_name) = split_bracketed_teacher(first);
    let name = strip_qualifier(&raw_name);
    if name.is_empty() {
        return None;
    }
    let room = lines
        .get(1)
        .map(|line| {
            line.trim_start_matches(['(', '（'])
                .trim_end_matches([')', '）'])
                .trim()
                .to_string()
        })
        .unwrap_or_default();

    tracing::debug!(
        "[Schedule] Cell {}: {} on day {} from period {} for {} periods",
        id,
        name,
        day_of_week,
        period + 1,
        span
    );

    Some(CourseRecord {
        external_id: PLACEHOLDER_ID.to_string(),
        name,
        teacher_name,
        room,
        day_of_week,
        periods: (period..period + span).collect::<BTreeSet<u32>>(),
        ..CourseRecord::default()
    })
}
