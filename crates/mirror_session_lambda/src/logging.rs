use serde_json::{json, Value};

pub const LOG_LEVEL_VAR: &str = "LAMBDA_LOG_LEVEL";

/// Minimum-severity gate for emitted log lines. Variants are ordered from
/// most to least severe so that `level <= min_level` means "emit".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warning,
    Info,
}

impl LogLevel {
    pub fn from_env() -> Self {
        std::env::var(LOG_LEVEL_VAR)
            .ok()
            .as_deref()
            .map(Self::parse)
            .unwrap_or(Self::Warning)
    }

    /// Unknown names fall back to the WARNING default rather than failing
    /// the process.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ERROR" => Self::Error,
            "INFO" | "DEBUG" => Self::Info,
            _ => Self::Warning,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// Emits one JSON object per line on stderr. Constructed once at startup and
/// passed explicitly; there is no global logger.
#[derive(Debug, Clone)]
pub struct Logger {
    component: &'static str,
    min_level: LogLevel,
}

impl Logger {
    pub fn new(component: &'static str, min_level: LogLevel) -> Self {
        Self {
            component,
            min_level,
        }
    }

    pub fn info(&self, event: &str, details: Value) {
        self.emit(LogLevel::Info, event, details);
    }

    pub fn warn(&self, event: &str, details: Value) {
        self.emit(LogLevel::Warning, event, details);
    }

    pub fn error(&self, event: &str, details: Value) {
        self.emit(LogLevel::Error, event, details);
    }

    fn emit(&self, level: LogLevel, event: &str, details: Value) {
        if level > self.min_level {
            return;
        }
        eprintln!(
            "{}",
            json!({
                "component": self.component,
                "level": level.name(),
                "event": event,
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "details": details,
            })
        );
    }
}
