use crate::config::{ConfigError, ParserConfig};
use regex::Regex;

const ACTIVITY_STRICT: &str = r"activity\s*=\s*new\s*TaskActivity\(([^;]+)\);\s*index\s*=(\d+)\*unitCount\+(\d+);(?:\s*table\d*\.activities\[index\]\[table\d*\.activities\[index\]\.length\]\s*=\s*activity;)+";
const ACTIVITY_RELAXED: &str = r"activity\s*=\s*new\s*TaskActivity\(([^;]+)\)\s*;\s*index\s*=\s*(\d+)\s*\*\s*unitCount\s*\+\s*(\d+)\s*;";
const COMPOSITE_ID: &str = r"(\d+)\(([^)]+)\)";
const UNIT_COUNT: &str = r"var\s+unitCount\s*=\s*(\d+)\s*;";
const SEMESTER: &str = r"(\d{4}-\d{4})学年第(\d)学期";
const COURSE_NUMBER: &str = r"[A-Za-z]+\d+\.\d+";
const CREDIT_ROW: &str = r"<td[^>]*>([^<]*)</td>\s*<td[^>]*>([^<]*)</td>\s*<td[^>]*>([^<]*)</td>\s*<td[^>]*>(\d+(?:\.\d+)?)</td>\s*<td[^>]*>([^<]*)</td>";
const LESSON_ID: &str = r"lesson\.id=(\d+)";
const TEACHERS_SINGLE: &str = r#"var\s+teachers\s*=\s*\[\s*\{\s*id\s*:\s*(\d+)\s*,\s*name\s*:\s*"([^"]+)"\s*,\s*lab\s*:\s*(?:false|true)\s*\}\s*\];"#;
const TEACHER_GENERIC: &str = r#"id\s*:\s*(\d+)\s*,\s*name\s*:\s*"([^"]+)""#;
const TEACHER_ITEM: &str = r#"\{\s*id\s*:\s*(\d+)\s*,\s*name\s*:\s*"([^"]+)"\s*,\s*lab\s*:\s*(?:false|true)\s*\}"#;
const CELL_ID: &str = r"^TD(\d+)_(\d+)$";
const TEACHER_GROUP: &str = r"\([^)]*\)";
const TEACHER_STRAY: &str = r"[\[\]\(\)\{\}<>\*]";

/// Compiled extraction patterns. Built once per [`ParserContext`].
#[derive(Debug, Clone)]
pub struct Patterns {
    pub activity_strict: Regex,
    pub activity_relaxed: Regex,
    pub composite_id: Regex,
    pub unit_count: Regex,
    pub semester: Regex,
    pub course_number: Regex,
    pub credit_row: Regex,
    pub lesson_id: Regex,
    pub teachers_single: Regex,
    pub teacher_generic: Regex,
    pub teacher_item: Regex,
    pub teacher_arrays: Vec<Regex>,
    pub cell_id: Regex,
    /// Parenthesised annotations after a teacher name.
    pub teacher_group: Regex,
    pub teacher_stray: Regex,
}

impl Patterns {
    pub fn compile(config: &ParserConfig) -> Result<Self, ConfigError> {
        let teacher_arrays = config
            .teacher_array_names
            .iter()
            .map(|name| {
                let pattern = format!(r"(?s)var\s+{}\s*=\s*\[(.*?)\];", regex::escape(name));
                compile(name, &pattern)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            activity_strict: compile("activity_strict", ACTIVITY_STRICT)?,
            activity_relaxed: compile("activity_relaxed", ACTIVITY_RELAXED)?,
            composite_id: compile("composite_id", COMPOSITE_ID)?,
            unit_count: compile("unit_count", UNIT_COUNT)?,
            semester: compile("semester", SEMESTER)?,
            course_number: compile("course_number", COURSE_NUMBER)?,
            credit_row: compile("credit_row", CREDIT_ROW)?,
            lesson_id: compile("lesson_id", LESSON_ID)?,
            teachers_single: compile("teachers_single", TEACHERS_SINGLE)?,
            teacher_generic: compile("teacher_generic", TEACHER_GENERIC)?,
            teacher_item: compile("teacher_item", TEACHER_ITEM)?,
            teacher_arrays,
            cell_id: compile("cell_id", CELL_ID)?,
            teacher_group: compile("teacher_group", TEACHER_GROUP)?,
            teacher_stray: compile("teacher_stray", TEACHER_STRAY)?,
        })
    }
}

fn compile(name: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::Pattern {
        name: name.to_string(),
        message: e.to_string(),
    })
}

/// Everything an extractor needs besides the document: configuration and the
/// compiled patterns. Immutable once built, so one context can serve many
/// concurrent parses.
#[derive(Debug, Clone)]
pub struct ParserContext {
    pub config: ParserConfig,
    pub patterns: Patterns,
}

impl ParserContext {
    pub fn new(config: ParserConfig) -> Result<Self, ConfigError> {
        let patterns = Patterns::compile(&config)?;
        Ok(Self { config, patterns })
    }

    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::new(ParserConfig::default())
    }
}
