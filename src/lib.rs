pub mod config;
pub mod context;
pub mod logging;
pub mod schedule;
pub mod types;

pub use config::{ConfigError, ParserConfig};
pub use context::ParserContext;
pub use schedule::{parse_schedule, parse_schedule_page, StrategyError};
pub use types::{CourseRecord, ExtractionSource, ParsedSchedule, SemesterInfo, TeacherId};
