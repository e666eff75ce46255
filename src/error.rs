//! Error types for configuration loading and session control
//!
//! Nothing inside a simulation tick returns these; they only surface at
//! load time or when a host asks for something that cannot be honoured.

use std::fmt;

/// Level table failed to load or validate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// JSON could not be parsed into a level table
    Parse(String),
    /// Table contains no levels at all
    NoLevels,
    /// A level has no waves
    EmptyLevel { level: u32 },
    /// A wave has no spawn groups
    EmptyWave { level: u32, wave: usize },
    /// Two levels share the same id
    DuplicateLevel { level: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "failed to parse level table: {msg}"),
            Self::NoLevels => write!(f, "level table is empty"),
            Self::EmptyLevel { level } => write!(f, "level {level} has no waves"),
            Self::EmptyWave { level, wave } => {
                write!(f, "level {level} wave {wave} has no spawn groups")
            }
            Self::DuplicateLevel { level } => write!(f, "level id {level} appears more than once"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// A level could not be started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    UnknownLevel(u32),
    LevelLocked(u32),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLevel(id) => write!(f, "no level with id {id}"),
            Self::LevelLocked(id) => write!(f, "level {id} is locked"),
        }
    }
}

impl std::error::Error for SessionError {}
