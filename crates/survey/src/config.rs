use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::field_rules::FieldNameRule;
use crate::intermediary::Synthesis;

pub const DEFAULT_FIELD_PREFIX: &str = "field_";
pub const DEFAULT_METHOD_PREFIX: &str = "func_";
pub const DEFAULT_CLASS_FORMAT: &str = "Class{id}_{obf}";

/// Settings and persisted counters for intermediary name synthesis.
///
/// The counters make incremental runs stable: after [`crate::synthesize`]
/// returns, store the outcome with [`IntermediaryConfig::record`] and save the
/// file so the next run continues numbering where this one stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntermediaryConfig {
    /// Next member id handed out to a field or method.
    pub next_member: u32,
    /// Last class id handed out; class ids start at 1.
    pub next_class: u32,
    /// Internal-name package prefixes (`com/google/`) left untouched. Binary
    /// form (`com.google.`) is accepted too.
    pub excluded_packages: Vec<String>,
    pub field_prefix: String,
    pub method_prefix: String,
    pub map_fields: bool,
    pub map_methods: bool,
    /// Name an enum's synthetic constant array `$VALUES`.
    pub map_synthetic_values: bool,
    pub recover_enum_constants: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<ClassNamingConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_rules: Vec<FieldNameRule>,
}

impl Default for IntermediaryConfig {
    fn default() -> Self {
        Self {
            next_member: 0,
            next_class: 0,
            excluded_packages: Vec::new(),
            field_prefix: DEFAULT_FIELD_PREFIX.to_string(),
            method_prefix: DEFAULT_METHOD_PREFIX.to_string(),
            map_fields: true,
            map_methods: true,
            map_synthetic_values: true,
            recover_enum_constants: true,
            classes: None,
            field_rules: Vec::new(),
        }
    }
}

/// Synthetic class names. `format` must contain `{id}`; `{obf}` is replaced
/// with the obfuscated simple name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassNamingConfig {
    pub format: String,
    /// Internal-name package prefix for top-level classes, e.g. `net/minecraft/src/`.
    pub package: String,
}

impl Default for ClassNamingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_CLASS_FORMAT.to_string(),
            package: String::new(),
        }
    }
}

impl ClassNamingConfig {
    pub fn format_name(&self, id: u32, obfuscated: &str) -> String {
        self.format
            .replace("{id}", &id.to_string())
            .replace("{obf}", obfuscated)
    }
}

impl IntermediaryConfig {
    /// Load a config file from TOML.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: IntermediaryConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = self.to_toml_string()?;
        std::fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, prefix) in [
            ("field_prefix", &self.field_prefix),
            ("method_prefix", &self.method_prefix),
        ] {
            if prefix.is_empty() {
                return Err(ConfigError::EmptyPrefix { key });
            }
        }
        if let Some(classes) = &self.classes {
            if !classes.format.contains("{id}") {
                return Err(ConfigError::InvalidClassFormat {
                    format: classes.format.clone(),
                });
            }
        }
        Ok(())
    }

    /// Stores the counters of a finished run.
    pub fn record(&mut self, outcome: &Synthesis) {
        self.next_member = outcome.next_member;
        self.next_class = outcome.next_class;
    }

    pub fn is_excluded(&self, class_name: &str) -> bool {
        self.excluded_packages.iter().any(|prefix| {
            if prefix.contains('.') {
                class_name.starts_with(&prefix.replace('.', "/"))
            } else {
                class_name.starts_with(prefix.as_str())
            }
        })
    }
}
