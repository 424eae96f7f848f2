use crate::AcdError;
use log::LevelFilter;
use std::str::FromStr;

/// Verbosity levels accepted by [`set_log_level`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    /// Disable all messages.
    Off,
    /// Debug messages and above.
    Debug,
    /// Informational messages and above.
    Info,
    /// Warnings and errors.
    Warn,
    /// Errors only.
    Error,
    /// Critical errors only.
    ///
    /// The `log` facade has no level above `Error` so this behaves like
    /// [`LogLevel::Error`].
    Critical,
}

impl LogLevel {
    /// The `log` filter this level maps to.
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error | LogLevel::Critical => LevelFilter::Error,
        }
    }
}

impl FromStr for LogLevel {
    type Err = AcdError;

    fn from_str(level: &str) -> Result<Self, Self::Err> {
        match level {
            "off" => Ok(LogLevel::Off),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" | "err" => Ok(LogLevel::Error),
            "critical" => Ok(LogLevel::Critical),
            _ => Err(AcdError::InvalidLogLevel(level.to_string())),
        }
    }
}

/// Sets the maximum level of the messages emitted by this crate.
///
/// This only adjusts the global filter of the `log` facade. Installing an
/// actual logger is left to the application.
pub fn set_log_level(level: &str) -> Result<(), AcdError> {
    let level: LogLevel = level.parse()?;
    log::set_max_level(level.to_level_filter());
    Ok(())
}
