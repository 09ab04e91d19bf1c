use crate::context::ParserContext;
use crate::schedule::reconcile::merge_or_add;
use crate::schedule::script::{find_relaxed_statements, records_from_statements};
use crate::schedule::table::{scan_cells, CellSelection};
use crate::types::CourseRecord;
use tl::VDom;

/// Last-resort scan for pages where neither the script statements nor the
/// row-span grid produced anything.
pub fn scan_fallback(
    html: &str,
    dom: &VDom,
    periods_per_day: u32,
    context: &ParserContext,
) -> Vec<CourseRecord> {
    let statements = find_relaxed_statements(html, context);
    let mut found = records_from_statements(&statements, context);
    tracing::info!(
        "[Schedule] Fallback found {} relaxed activity records",
        found.len()
    );

    if found.is_empty() {
        found = scan_cells(dom, periods_per_day, CellSelection::Highlighted, context);
        tracing::info!(
            "[Schedule] Fallback found {} highlighted cells",
            found.len()
        );
    }

    let trace = context.config.trace_merges;
    let mut records = Vec::new();
    for record in found {
        merge_or_add(&mut records, record, trace);
    }
    records
}
