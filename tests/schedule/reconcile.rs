use schedule_ingest::schedule::reconcile::{merge_duplicates, merge_or_add};
use schedule_ingest::{CourseRecord, TeacherId};
use std::collections::BTreeSet;

fn record(day: u8, name: &str, periods: &[u32]) -> CourseRecord {
    CourseRecord {
        name: name.to_string(),
        day_of_week: day,
        periods: periods.iter().copied().collect(),
        ..CourseRecord::default()
    }
}

#[test]
fn merges_same_day_and_name_into_period_union() {
    let mut records = Vec::new();
    merge_or_add(&mut records, record(2, "Intro", &[3]), false);
    merge_or_add(&mut records, record(2, "Intro", &[3, 4]), false);
    merge_or_add(&mut records, record(2, "Intro", &[7]), false);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].periods, BTreeSet::from([3, 4, 7]));
}

#[test]
fn keeps_different_days_and_teachers_apart() {
    let mut records = Vec::new();
    let mut zhang = record(2, "Intro", &[3]);
    zhang.teacher_name = "Zhang".to_string();
    let mut li = record(2, "Intro", &[3]);
    li.teacher_name = "Li".to_string();

    merge_or_add(&mut records, zhang, false);
    merge_or_add(&mut records, li, false);
    merge_or_add(&mut records, record(3, "Intro", &[3]), false);

    assert_eq!(records.len(), 3);
}

#[test]
fn fills_blank_fields_and_keeps_longer_name() {
    let mut records = Vec::new();
    let mut table = record(1, "Compilers", &[2, 3]);
    table.external_id = "0".to_string();
    table.room = "Room 12".to_string();

    let mut script = record(1, "Compilers Lab", &[2]);
    script.external_id = "300200".to_string();
    script.number = "cs410.01".to_string();
    script.code = "cs410".to_string();
    script.room = "Elsewhere".to_string();
    script.credit = Some(4.0);

    merge_or_add(&mut records, table, false);
    merge_or_add(&mut records, script, true);

    assert_eq!(records.len(), 1);
    let merged = &records[0];
    assert_eq!(merged.name, "Compilers Lab");
    assert_eq!(merged.external_id, "300200");
    assert_eq!(merged.number, "cs410.01");
    assert_eq!(merged.code, "cs410");
    assert_eq!(merged.room, "Room 12");
    assert_eq!(merged.credit, Some(4.0));
    assert_eq!(merged.periods, BTreeSet::from([2, 3]));
}

#[test]
fn zero_credit_counts_as_blank() {
    let mut records = Vec::new();
    let mut first = record(0, "Algebra", &[0]);
    first.credit = Some(0.0);
    let mut second = record(0, "Algebra", &[1]);
    second.credit = Some(2.5);

    merge_or_add(&mut records, first, false);
    merge_or_add(&mut records, second, false);

    assert_eq!(records[0].credit, Some(2.5));
}

#[test]
fn final_pass_folds_truncated_names_into_most_complete_record() {
    let mut sparse = record(2, "In", &[3]);
    sparse.external_id = "0".to_string();
    sparse.teacher_name = "Zhang".to_string();
    sparse.teacher_id = TeacherId::Resolved(501);
    sparse.remark = Some("Bring laptop".to_string());

    let mut complete = record(2, "Intro to Programming", &[3, 4]);
    complete.external_id = "101001".to_string();
    complete.number = "cs101.01".to_string();

    let output = merge_duplicates(vec![sparse, complete], false);

    assert_eq!(output.len(), 1);
    let kept = &output[0];
    assert_eq!(kept.external_id, "101001");
    assert_eq!(kept.name, "Intro to Programming");
    assert_eq!(kept.teacher_name, "Zhang");
    assert_eq!(kept.teacher_id, TeacherId::Resolved(501));
    assert_eq!(kept.remark.as_deref(), Some("Bring laptop"));
    assert_eq!(kept.periods, BTreeSet::from([3, 4]));
}

#[test]
fn final_pass_keeps_disjoint_meetings() {
    let morning = record(2, "Intro", &[0, 1]);
    let afternoon = record(2, "Intro", &[6, 7]);

    let output = merge_duplicates(vec![morning, afternoon], false);
    assert_eq!(output.len(), 2);
}

#[test]
fn final_pass_drops_single_character_names() {
    let output = merge_duplicates(
        vec![
            record(3, "X", &[0]),
            record(3, "", &[1]),
            record(3, "史", &[2]),
            record(3, "Art", &[4]),
        ],
        false,
    );

    assert_eq!(output.len(), 1);
    assert_eq!(output[0].name, "Art");
}

#[test]
fn consumed_duplicates_are_not_emitted_twice() {
    let mut anchor = record(4, "Chemistry", &[0, 1]);
    anchor.external_id = "55".to_string();
    let output = merge_duplicates(
        vec![
            record(4, "Chemistry", &[1]),
            anchor,
            record(4, "Ch", &[0]),
            record(4, "Chemistry", &[]),
        ],
        true,
    );

    assert_eq!(output.len(), 1);
    assert_eq!(output[0].external_id, "55");
    assert_eq!(output[0].periods, BTreeSet::from([0, 1]));
}

#[test]
fn final_pass_keeps_distinct_offerings_sharing_a_name_prefix() {
    let mut lecture = record(1, "高等数学", &[2, 3]);
    lecture.external_id = "4101".to_string();
    lecture.number = "ma101.01".to_string();
    lecture.teacher_name = "王伟".to_string();

    let mut lab = record(1, "高等数学实验", &[2, 3]);
    lab.external_id = "4102".to_string();
    lab.number = "ma102.01".to_string();
    lab.teacher_name = "李明".to_string();

    let output = merge_duplicates(vec![lecture, lab], false);

    assert_eq!(output.len(), 2);
    let pairs: Vec<_> = output
        .iter()
        .map(|course| {
            (
                course.name.as_str(),
                course.number.as_str(),
                course.teacher_name.as_str(),
            )
        })
        .collect();
    assert!(pairs.contains(&("高等数学", "ma101.01", "王伟")));
    assert!(pairs.contains(&("高等数学实验", "ma102.01", "李明")));
}
