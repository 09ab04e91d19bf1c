//! Activity statements embedded in the schedule page script:
//!
//! ```text
//! activity = new TaskActivity(tid,"Zhang","101001(cs101.01)","Intro(cs101.01)","R1","Room 101","0111",null,null,"remark");
//! index =2*unitCount+3;
//! table0.activities[index][table0.activities[index].length]=activity;
//! ```
//!
//! One statement is emitted per occupied period.

use crate::context::{ParserContext, Patterns};
use crate::schedule::common::{
    code_from_number, decode_entities, split_parameters, strip_qualifier, strip_tags, trim_quotes,
};
use crate::schedule::weeks::{display_pattern, week_numbers};
use crate::types::{CourseRecord, PLACEHOLDER_ID};
use regex::Regex;
use std::collections::BTreeSet;

const MIN_PARAMETERS: usize = 7;
const REMARK_POSITION: usize = 9;
const SCRIPT_EXPRESSION_MARKERS: [&str; 4] = ["actTeacherName", "join", "teachers", "TeacherName"];
const TEACHER_SEPARATORS: [char; 3] = [',', '、', ';'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityStatement {
    pub day: u32,
    pub period: u32,
    pub parameters: Vec<String>,
}

/// Statements ending in the `tableN.activities[index]...=activity;` tail.
pub fn find_statements(html: &str, context: &ParserContext) -> Vec<ActivityStatement> {
    collect_statements(html, &context.patterns.activity_strict)
}

/// Whitespace-tolerant statements without the assignment tail. Used by the
/// fallback scanner on legacy pages.
pub fn find_relaxed_statements(html: &str, context: &ParserContext) -> Vec<ActivityStatement> {
    collect_statements(html, &context.patterns.activity_relaxed)
}

fn collect_statements(html: &str, pattern: &Regex) -> Vec<ActivityStatement> {
    let mut statements = Vec::new();
    for captures in pattern.captures_iter(html) {
        let (Ok(day), Ok(period)) = (captures[2].parse::<u32>(), captures[3].parse::<u32>()) else {
            tracing::warn!(
                "[Schedule] Skipping activity with unparsable slot {}*unitCount+{}",
                &captures[2],
                &captures[3]
            );
            continue;
        };
        statements.push(ActivityStatement {
            day,
            period,
            parameters: split_parameters(&captures[1]),
        });
    }
    statements
}

/// Display name of the first listed teacher. Script expressions become blank.
pub fn format_teacher_name(raw: &str, patterns: &Patterns) -> String {
    if raw.is_empty()
        || SCRIPT_EXPRESSION_MARKERS
            .iter()
            .any(|marker| raw.contains(marker))
    {
        return String::new();
    }
    let decoded = decode_entities(&strip_tags(raw));
    let first = decoded
        .split(TEACHER_SEPARATORS)
        .map(str::trim)
        .find(|name| !name.is_empty())
        .unwrap_or_default();
    let without_groups = patterns.teacher_group.replace_all(first, "");
    patterns
        .teacher_stray
        .replace_all(&without_groups, "")
        .trim()
        .to_string()
}

/// Builds the partial record for one statement, or `None` when the statement
/// is malformed.
pub fn record_from_statement(
    statement: &ActivityStatement,
    context: &ParserContext,
) -> Option<CourseRecord> {
    let parameters = &statement.parameters;
    if parameters.len() < MIN_PARAMETERS {
        tracing::warn!(
            "[Schedule] Skipping activity with {} parameters at day {} period {}",
            parameters.len(),
            statement.day,
            statement.period
        );
        return None;
    }
    let Some(day_of_week) = u8::try_from(statement.day).ok().filter(|day| *day <= 6) else {
        tracing::warn!("[Schedule] Skipping activity with day index {}", statement.day);
        return None;
    };

    let composite = trim_quotes(&parameters[2]);
    let (external_id, number) = match context.patterns.composite_id.captures(composite) {
        Some(captures) => (captures[1].to_string(), captures[2].to_string()),
        None => (PLACEHOLDER_ID.to_string(), composite.to_string()),
    };

    let name = strip_qualifier(trim_quotes(&parameters[3]));
    if name.is_empty() {
        tracing::warn!("[Schedule] Skipping activity {} without a name", number);
        return None;
    }

    let week_bitmap = trim_quotes(&parameters[6]).to_string();
    let remark = parameters
        .get(REMARK_POSITION)
        .map(|value| trim_quotes(value).to_string())
        .filter(|value| !value.is_empty() && value != "null");

    Some(CourseRecord {
        external_id,
        code: code_from_number(&number),
        number,
        name,
        teacher_name: format_teacher_name(trim_quotes(&parameters[1]), &context.patterns),
        room_id: trim_quotes(&parameters[4]).to_string(),
        room: trim_quotes(&parameters[5]).to_string(),
        day_of_week,
        periods: BTreeSet::from([statement.period]),
        week_numbers: week_numbers(&week_bitmap),
        week_pattern: display_pattern(&week_bitmap),
        week_bitmap,
        remark,
        ..CourseRecord::default()
    })
}

pub fn records_from_statements(
    statements: &[ActivityStatement],
    context: &ParserContext,
) -> Vec<CourseRecord> {
    statements
        .iter()
        .filter_map(|statement| record_from_statement(statement, context))
        .collect()
}
