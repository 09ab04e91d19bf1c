use crate::common::{activity, default_context, find_course, load_fixture, script_page};
use schedule_ingest::config::PeriodLabelStyle;
use schedule_ingest::schedule::{extract_periods_per_day, extract_semester};
use schedule_ingest::{
    parse_schedule, parse_schedule_page, ExtractionSource, ParserConfig, ParserContext, TeacherId,
};
use std::collections::BTreeSet;

const INTRO_ARGS: &str = r#""501","Zhang","101001(cs101.01)","Intro(Lecture)","R101","Room 101","0010100",null,null,"""#;

#[test]
fn end_to_end_merges_statements_of_one_offering() {
    let config = ParserConfig {
        period_label: PeriodLabelStyle {
            prefix: String::new(),
            separator: ",".to_string(),
            suffix: String::new(),
        },
        ..ParserConfig::default()
    };
    let context = ParserContext::new(config).expect("patterns should compile");
    let html = script_page(&[activity(2, 3, INTRO_ARGS), activity(2, 4, INTRO_ARGS)]);

    let courses = parse_schedule(&html, 10, &context);

    assert_eq!(courses.len(), 1);
    let intro = &courses[0];
    assert_eq!(intro.number, "cs101.01");
    assert_eq!(intro.code, "cs101");
    assert_eq!(intro.name, "Intro");
    assert_eq!(intro.external_id, "101001");
    assert_eq!(intro.teacher_name, "Zhang");
    assert_eq!(intro.day_of_week, 2);
    assert_eq!(intro.periods, BTreeSet::from([3, 4]));
    assert_eq!(intro.week_numbers, vec![2, 4]);
    assert_eq!(intro.formatted_periods, "4-5");
    assert_eq!((intro.start_period, intro.end_period), (4, 5));
}

#[test]
fn script_and_table_page_reconciles_and_enriches() {
    let context = default_context();
    let html = load_fixture("schedule/script_and_table.html");
    let schedule = parse_schedule_page(&html, &context);

    assert_eq!(schedule.periods_per_day, 10);
    assert_eq!(schedule.source, ExtractionSource::ScriptAndTable);
    let semester = schedule.semester.as_ref().expect("semester banner");
    assert_eq!(semester.year, "2023-2024");
    assert_eq!(semester.term, "1");

    let names: Vec<_> = schedule.courses.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["线性代数", "Intro", "Physical Education"]);

    let intro = find_course(&schedule.courses, "Intro");
    assert_eq!(intro.periods, BTreeSet::from([3, 4]));
    assert_eq!(intro.formatted_periods, "第4-5节");
    assert_eq!(intro.teacher_name, "张伟");
    assert_eq!(intro.teacher_id, TeacherId::Resolved(501));
    assert_eq!(intro.lesson_id.as_deref(), Some("8801"));
    assert_eq!(intro.credit, Some(3.0));
    assert_eq!(intro.room, "Room 101");
    assert_eq!(intro.week_numbers, vec![1, 2, 3, 4]);
    assert_eq!(intro.week_pattern, "11110");
    assert_eq!(intro.remark.as_deref(), Some("Bring laptop"));

    let algebra = find_course(&schedule.courses, "线性代数");
    assert_eq!(algebra.day_of_week, 0);
    assert_eq!(algebra.periods, BTreeSet::from([0, 1]));
    assert_eq!(algebra.credit, Some(4.5));
    assert_eq!(algebra.teacher_id, TeacherId::Resolved(502));
    assert_eq!(algebra.week_numbers, vec![1, 3, 5]);

    let sport = find_course(&schedule.courses, "Physical Education");
    assert_eq!(sport.external_id, "0");
    assert_eq!(sport.number, "PE100");
    assert_eq!(sport.teacher_id, TeacherId::Unresolved);
    assert_eq!(sport.credit, None);
    assert_eq!(sport.formatted_periods, "第6节");

    assert!(schedule.courses.iter().all(|course| course.name.chars().count() > 1));
}

#[test]
fn table_only_page_reads_declared_unit_count() {
    let context = default_context();
    let html = load_fixture("schedule/rowspan_only.html");
    let schedule = parse_schedule_page(&html, &context);

    assert_eq!(schedule.periods_per_day, 12);
    assert_eq!(schedule.source, ExtractionSource::Table);
    assert!(schedule.semester.is_none());
    assert_eq!(schedule.courses.len(), 2);

    let systems = find_course(&schedule.courses, "Operating Systems");
    assert_eq!(systems.formatted_periods, "第3-5节");
    assert_eq!(systems.teacher_id, TeacherId::Unresolved);
}

#[test]
fn fallback_tier_runs_only_when_first_tier_is_empty() {
    let context = default_context();

    let highlighted = parse_schedule_page(&load_fixture("schedule/highlighted_fallback.html"), &context);
    assert_eq!(highlighted.source, ExtractionSource::Fallback);
    assert_eq!(highlighted.periods_per_day, 10);
    let names: Vec<_> = highlighted.courses.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Data Structures", "Chemistry"]);
    assert_eq!(highlighted.courses[0].formatted_periods, "第3-4节");

    let relaxed = parse_schedule_page(&load_fixture("schedule/relaxed_script.html"), &context);
    assert_eq!(relaxed.source, ExtractionSource::Fallback);
    assert_eq!(relaxed.courses.len(), 1);
    assert_eq!(relaxed.courses[0].name, "Mechanics");
}

#[test]
fn empty_page_yields_no_courses() {
    let context = default_context();
    let schedule = parse_schedule_page("<html><body><p>没有课程</p></body></html>", &context);

    assert_eq!(schedule.source, ExtractionSource::Empty);
    assert!(schedule.courses.is_empty());
    assert!(parse_schedule("", 10, &context).is_empty());
}

#[test]
fn script_and_table_records_for_one_slot_merge() {
    let context = default_context();
    let html = format!(
        "{}<table id=\"kbtable\"><tr><td id=\"TD23_0\" rowspan=\"2\">Intro<br>(Room 101)</td></tr></table>",
        script_page(&[activity(2, 3, INTRO_ARGS)])
    );
    let courses = parse_schedule(&html, 10, &context);

    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].periods, BTreeSet::from([3, 4]));
    assert_eq!(courses[0].external_id, "101001");
}

#[test]
fn reads_page_metadata() {
    let context = default_context();
    assert_eq!(
        extract_periods_per_day("<script>var unitCount = 14;</script>", &context),
        14
    );
    assert_eq!(
        extract_periods_per_day("<script>var unitCount = 0;</script>", &context),
        10
    );
    let semester = extract_semester("<h2>2022-2023学年第2学期 课表</h2>", &context)
        .expect("semester should be found");
    assert_eq!(semester.year, "2022-2023");
    assert_eq!(semester.term, "2");
}

#[test]
fn parsed_schedule_serializes_with_camel_case_fields() {
    let context = default_context();
    let html = load_fixture("schedule/rowspan_only.html");
    let schedule = parse_schedule_page(&html, &context);
    let value = serde_json::to_value(&schedule).expect("schedule should serialize");

    assert_eq!(value["periodsPerDay"], 12);
    assert_eq!(value["source"], "table");
    assert_eq!(value["courses"][0]["dayOfWeek"], 0);
    assert_eq!(value["courses"][0]["formattedPeriods"], "第3-5节");
    assert!(value["courses"][0]["teacherId"].is_null());
}

#[test]
fn first_listed_teacher_lets_script_and_cell_merge() {
    let context = default_context();
    let html = format!(
        "{}<table id=\"kbtable\"><tr><td id=\"TD12_0\" rowspan=\"2\">概率论[王伟]<br>(B101)</td></tr></table>",
        script_page(&[activity(
            1,
            2,
            r#""9","王伟,李明","7001(ma301.01)","概率论","B1","B101","0011",null,null,"""#,
        )])
    );
    let courses = parse_schedule(&html, 10, &context);

    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].teacher_name, "王伟");
    assert_eq!(courses[0].number, "ma301.01");
    assert_eq!(courses[0].periods, BTreeSet::from([2, 3]));
}
