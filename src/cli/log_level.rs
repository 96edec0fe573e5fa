use std::{fmt, str::FromStr};

/// LogLevel
///
/// Represents minimum level of messages that will be logged.
/// `none` silences the log altogether.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLevel {
    level: usize,
}

const LEVEL_STR: [&str; 6] = ["error", "warn", "info", "debug", "trace", "none"];

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        LEVEL_STR
            .iter()
            .position(|l| *l == s)
            .map(|level| LogLevel { level })
            .ok_or_else(|| format!("unknown log level {s:?} (options: {})", LEVEL_STR.join(", ")))
    }
}

impl LogLevel {
    pub fn is_none(&self) -> bool {
        self.level > 4
    }

    /// Verbosity as understood by stderrlog
    pub fn get_level(&self) -> usize {
        if self.is_none() {
            0
        } else {
            self.level
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", LEVEL_STR.get(self.level).unwrap_or(&"unknown"))
    }
}
