use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_PATH_ENV: &str = "SCHEDULE_PARSER_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read parser config {path}: {message}")]
    Read { path: String, message: String },
    #[error("Failed to parse parser config: {0}")]
    Parse(String),
    #[error("Invalid pattern for {name}: {message}")]
    Pattern { name: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PeriodLabelStyle {
    pub prefix: String,
    pub separator: String,
    pub suffix: String,
}

impl Default for PeriodLabelStyle {
    fn default() -> Self {
        Self {
            prefix: "第".to_string(),
            separator: "、".to_string(),
            suffix: "节".to_string(),
        }
    }
}

/// Header keywords used to recognise columns of the rendered results tables.
/// A header cell matches a column when it contains any of the keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeaderKeywords {
    pub credit: Vec<String>,
    pub course_number: Vec<String>,
    pub course_name: Vec<String>,
    pub teacher: Vec<String>,
}

impl Default for HeaderKeywords {
    fn default() -> Self {
        Self {
            credit: vec!["学分".to_string(), "credit".to_string()],
            course_number: vec!["课程序号".to_string(), "course number".to_string()],
            course_name: vec!["课程名称".to_string(), "course name".to_string()],
            teacher: vec!["教师".to_string(), "teacher".to_string()],
        }
    }
}

impl HeaderKeywords {
    pub fn is_credit(&self, header: &str) -> bool {
        contains_any(header, &self.credit)
    }

    pub fn is_course_number(&self, header: &str) -> bool {
        contains_any(header, &self.course_number)
    }

    pub fn is_course_name(&self, header: &str) -> bool {
        contains_any(header, &self.course_name)
    }

    pub fn is_teacher(&self, header: &str) -> bool {
        contains_any(header, &self.teacher)
    }
}

fn contains_any(header: &str, keywords: &[String]) -> bool {
    let lowered = header.to_lowercase();
    keywords
        .iter()
        .any(|keyword| lowered.contains(&keyword.to_lowercase()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserConfig {
    /// Used when the page does not declare `var unitCount = N;`.
    pub default_periods_per_day: u32,
    pub period_label: PeriodLabelStyle,
    pub header_keywords: HeaderKeywords,
    /// Script array declarations searched for `{id:N,name:"X",lab:bool}` items.
    pub teacher_array_names: Vec<String>,
    /// Emit a debug event for every merge decision.
    pub trace_merges: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_periods_per_day: 10,
            period_label: PeriodLabelStyle::default(),
            header_keywords: HeaderKeywords::default(),
            teacher_array_names: vec![
                "actTeachers".to_string(),
                "allTeachers".to_string(),
                "teachers".to_string(),
            ],
            trace_merges: false,
        }
    }
}

impl ParserConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: ParserConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if config.default_periods_per_day == 0 {
            return Err(ConfigError::Parse(
                "defaultPeriodsPerDay must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    /// Loads the file named by `SCHEDULE_PARSER_CONFIG`, or the built-in defaults
    /// when the variable is unset.
    pub fn load_default() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::load_from_file(path.trim()),
            _ => Ok(Self::default()),
        }
    }
}
