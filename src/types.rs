use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Placeholder external id used when a composite id could not be decoded.
pub const PLACEHOLDER_ID: &str = "0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TeacherId {
    Resolved(i64),
    #[default]
    Unresolved,
}

impl TeacherId {
    pub fn is_resolved(self) -> bool {
        matches!(self, TeacherId::Resolved(_))
    }

    pub fn value(self) -> Option<i64> {
        match self {
            TeacherId::Resolved(id) => Some(id),
            TeacherId::Unresolved => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    pub external_id: String,
    pub code: String,
    pub number: String,
    pub name: String,
    pub credit: Option<f64>,
    pub teacher_name: String,
    pub teacher_id: TeacherId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<String>,
    pub room: String,
    pub room_id: String,
    pub day_of_week: u8,
    pub periods: BTreeSet<u32>,
    pub week_bitmap: String,
    pub week_numbers: Vec<u32>,
    pub week_pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    pub start_period: u32,
    pub end_period: u32,
    pub formatted_periods: String,
}

impl CourseRecord {
    pub fn has_external_id(&self) -> bool {
        !self.external_id.is_empty() && self.external_id != PLACEHOLDER_ID
    }

    pub fn has_credit(&self) -> bool {
        self.credit.is_some_and(|credit| credit > 0.0)
    }

    pub fn name_len(&self) -> usize {
        self.name.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterInfo {
    pub year: String,
    pub term: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    Script,
    Table,
    ScriptAndTable,
    Fallback,
    Empty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSchedule {
    pub semester: Option<SemesterInfo>,
    pub periods_per_day: u32,
    pub source: ExtractionSource,
    pub courses: Vec<CourseRecord>,
}
