use chrono::{DateTime, Local};

/// Name recorded when a wave arrives without one.
pub const DEFAULT_VISITOR: &str = "Guest";

pub const VISIT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    pub id: u64,
    pub visitor_name: String,
    pub visit_time: DateTime<Local>,
}

impl Visit {
    pub fn formatted_time(&self) -> String {
        self.visit_time.format(VISIT_TIME_FORMAT).to_string()
    }
}

/// Trims the submitted name, falling back to [`DEFAULT_VISITOR`] when absent.
/// Returns `None` for a name that is blank after trimming.
pub fn visitor_name(raw: Option<&str>) -> Option<String> {
    let name = raw.unwrap_or(DEFAULT_VISITOR).trim();
    (!name.is_empty()).then(|| name.to_string())
}

pub fn greeting(name: &str) -> String {
    format!("👋 Hello, {name}!")
}
