use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NewsBriefError {
    #[error("Input file does not exist: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Root directory does not exist: {path}")]
    RootNotFound { path: PathBuf },

    #[error("File is not valid UTF-8: {path}")]
    Encoding { path: PathBuf },

    #[error("No backup found for {path}")]
    BackupNotFound { path: PathBuf },

    #[error("Duplicate category in taxonomy: {name}")]
    DuplicateCategory { name: String },

    #[error("Invalid taxonomy: {message}")]
    InvalidTaxonomy { message: String },

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Config key not found: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("Invalid value for {key}: {value}")]
    ConfigValue { key: String, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Invalid regular expression: {0}")]
    Regex(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, NewsBriefError>;

impl NewsBriefError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InputNotFound { .. } | Self::RootNotFound { .. } => 2,
            Self::Encoding { .. } => 3,
            Self::BackupNotFound { .. } => 4,
            Self::DuplicateCategory { .. } | Self::InvalidTaxonomy { .. } => 5,
            Self::ConfigParse { .. } | Self::ConfigKeyNotFound { .. } | Self::ConfigValue { .. } => 6,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let err = NewsBriefError::InputNotFound {
            path: PathBuf::from("missing.txt"),
        };
        assert_eq!(err.exit_code(), 2);

        let err = NewsBriefError::DuplicateCategory {
            name: "高校".to_string(),
        };
        assert_eq!(err.exit_code(), 5);

        let err = NewsBriefError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_error_messages() {
        let err = NewsBriefError::ConfigKeyNotFound {
            key: "merge.nope".to_string(),
        };
        assert_eq!(err.to_string(), "Config key not found: merge.nope");
    }
}
