//! Merging of partial course records coming from the different extractors.

use crate::types::{CourseRecord, PLACEHOLDER_ID};
use std::cmp::Ordering;
use std::collections::BTreeSet;

fn names_compatible(left: &str, right: &str) -> bool {
    left == right
        || (!left.is_empty()
            && !right.is_empty()
            && (left.starts_with(right) || right.starts_with(left)))
}

fn teachers_compatible(left: &str, right: &str) -> bool {
    left.is_empty() || right.is_empty() || left == right
}

fn periods_overlap_or_empty(left: &BTreeSet<u32>, right: &BTreeSet<u32>) -> bool {
    left.is_empty() || right.is_empty() || !left.is_disjoint(right)
}

fn fill_blank(target: &mut String, value: &str) {
    if target.is_empty() && !value.is_empty() {
        *target = value.to_string();
    }
}

/// Fill rule shared by both passes: union periods, take the other side's
/// id, code, number, room, room id and credit where ours is blank, keep the
/// longer name.
fn merge_fields(existing: &mut CourseRecord, other: &CourseRecord) {
    existing.periods.extend(other.periods.iter().copied());

    if !existing.has_external_id() && other.has_external_id() {
        existing.external_id = other.external_id.clone();
    }
    if existing.external_id.is_empty() {
        existing.external_id = other.external_id.clone();
    }
    fill_blank(&mut existing.code, &other.code);
    fill_blank(&mut existing.number, &other.number);
    fill_blank(&mut existing.room, &other.room);
    fill_blank(&mut existing.room_id, &other.room_id);
    if !existing.has_credit() && other.has_credit() {
        existing.credit = other.credit;
    }
    if other.name_len() > existing.name_len() {
        existing.name = other.name.clone();
    }
}

/// Folds `record` into `records`: merged into the first compatible record on
/// the same day, or appended when none matches. Period sets never block a
/// merge: disjoint statements of one offering are unioned.
pub fn merge_or_add(records: &mut Vec<CourseRecord>, record: CourseRecord, trace: bool) {
    let existing = records.iter_mut().find(|candidate| {
        candidate.day_of_week == record.day_of_week
            && names_compatible(&candidate.name, &record.name)
            && teachers_compatible(&candidate.teacher_name, &record.teacher_name)
    });

    match existing {
        Some(existing) => {
            merge_fields(existing, &record);
            if trace {
                tracing::debug!(
                    "[Schedule] Merged {} into day {} record, periods {:?}",
                    record.name,
                    existing.day_of_week,
                    existing.periods
                );
            }
        }
        None => {
            if trace {
                tracing::debug!(
                    "[Schedule] Added {} on day {}, periods {:?}",
                    record.name,
                    record.day_of_week,
                    record.periods
                );
            }
            records.push(record);
        }
    }
}

fn completeness(left: &CourseRecord, right: &CourseRecord) -> Ordering {
    right
        .has_external_id()
        .cmp(&left.has_external_id())
        .then_with(|| (!right.number.is_empty()).cmp(&!left.number.is_empty()))
        .then_with(|| right.periods.len().cmp(&left.periods.len()))
        .then_with(|| right.has_credit().cmp(&left.has_credit()))
}

/// Longest name still treated as a truncated label of a longer one.
const TRUNCATED_NAME_MAX_CHARS: usize = 2;

fn is_truncation_of(short: &str, long: &str) -> bool {
    let length = short.chars().count();
    length > 0 && length <= TRUNCATED_NAME_MAX_CHARS && long.starts_with(short)
}

fn is_duplicate(kept: &CourseRecord, candidate: &CourseRecord) -> bool {
    if kept.day_of_week != candidate.day_of_week {
        return false;
    }
    let same_name = kept.name == candidate.name
        || is_truncation_of(&candidate.name, &kept.name)
        || is_truncation_of(&kept.name, &candidate.name);
    same_name && periods_overlap_or_empty(&kept.periods, &candidate.periods)
}

fn absorb(kept: &mut CourseRecord, duplicate: &CourseRecord) {
    merge_fields(kept, duplicate);
    fill_blank(&mut kept.teacher_name, &duplicate.teacher_name);
    if !kept.teacher_id.is_resolved() {
        kept.teacher_id = duplicate.teacher_id;
    }
    if kept.lesson_id.is_none() {
        kept.lesson_id = duplicate.lesson_id.clone();
    }
    if kept.remark.as_deref().unwrap_or_default().is_empty() && duplicate.remark.is_some() {
        kept.remark = duplicate.remark.clone();
    }
    if kept.week_numbers.is_empty() && !duplicate.week_numbers.is_empty() {
        kept.week_bitmap = duplicate.week_bitmap.clone();
        kept.week_numbers = duplicate.week_numbers.clone();
        kept.week_pattern = duplicate.week_pattern.clone();
    }
}

/// Final pass: walks records from most to least complete, drops garbage names
/// and folds every remaining duplicate into the record that first claims it.
pub fn merge_duplicates(records: Vec<CourseRecord>, trace: bool) -> Vec<CourseRecord> {
    let input_count = records.len();
    let mut ordered = records;
    ordered.sort_by(completeness);

    let mut consumed = vec![false; ordered.len()];
    let mut kept: Vec<CourseRecord> = Vec::new();

    for index in 0..ordered.len() {
        if consumed[index] {
            continue;
        }
        consumed[index] = true;
        if ordered[index].name_len() <= 1 {
            tracing::debug!(
                "[Schedule] Dropping truncated course name {:?}",
                ordered[index].name
            );
            continue;
        }

        let mut record = ordered[index].clone();
        for other in (index + 1)..ordered.len() {
            if consumed[other] || !is_duplicate(&record, &ordered[other]) {
                continue;
            }
            if trace {
                tracing::debug!(
                    "[Schedule] Folding duplicate {} into {}",
                    ordered[other].name,
                    record.name
                );
            }
            absorb(&mut record, &ordered[other]);
            consumed[other] = true;
        }
        kept.push(record);
    }

    tracing::info!(
        "[Schedule] Final merge reduced {} records to {}",
        input_count,
        kept.len()
    );
    kept
}
