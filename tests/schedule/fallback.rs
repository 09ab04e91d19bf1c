use crate::common::{default_context, load_fixture};
use schedule_ingest::schedule::common::parse_dom;
use schedule_ingest::schedule::fallback::scan_fallback;
use std::collections::BTreeSet;

#[test]
fn prefers_relaxed_statements_over_highlighted_cells() {
    let context = default_context();
    let html = load_fixture("schedule/relaxed_script.html");
    let dom = parse_dom(&html).expect("fixture should parse");
    let records = scan_fallback(&html, &dom, 10, &context);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Mechanics");
    assert_eq!(records[0].number, "ph110.03");
    assert_eq!(records[0].day_of_week, 1);
    assert_eq!(records[0].periods, BTreeSet::from([6, 7]));
}

#[test]
fn merges_highlighted_cells_of_one_course() {
    let context = default_context();
    let html = load_fixture("schedule/highlighted_fallback.html");
    let dom = parse_dom(&html).expect("fixture should parse");
    let records = scan_fallback(&html, &dom, 10, &context);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Data Structures");
    assert_eq!(records[0].teacher_name, "王芳");
    assert_eq!(records[0].room, "B305");
    assert_eq!(records[0].periods, BTreeSet::from([2, 3]));
    assert_eq!(records[1].name, "Chemistry");
    assert_eq!(records[1].periods, BTreeSet::from([0]));
}
