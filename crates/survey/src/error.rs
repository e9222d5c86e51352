pub type Result<T, E = SurveyError> = std::result::Result<T, E>;

/// Errors surfaced by the engine's fallible entry points.
///
/// Hierarchy lookups and name resolution never fail; unknown classes are
/// simply `None`. Only class-file ingestion and configuration I/O can error.
#[derive(Debug, thiserror::Error)]
pub enum SurveyError {
    #[error("malformed class file: {0}")]
    ClassFile(#[from] survey_classfile::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write config file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
    #[error("failed to serialize toml config: {0}")]
    Serialize(String),
    #[error("invalid class name format {format:?}: missing `{{id}}` placeholder")]
    InvalidClassFormat { format: String },
    #[error("`{key}` must not be empty")]
    EmptyPrefix { key: &'static str },
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Toml(value.message().to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(value: toml::ser::Error) -> Self {
        Self::Serialize(value.to_string())
    }
}
