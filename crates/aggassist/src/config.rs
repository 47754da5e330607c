use crate::{
    DEFAULT_SCRIPT_LANG,
    error::{ConfigError, InternalError},
    fragment::Script,
};
use serde::Deserialize;

///
/// MissingChildPolicy
///
/// What a list node does when a bucket carries no nested result for one of
/// its children.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum MissingChildPolicy {
    /// Leave the child's key out of the row context.
    #[default]
    Absent,
    /// Fail the whole collect call.
    Reject,
}

///
/// AssistantConfig
///
/// Settings applied to assistant trees, loadable from TOML:
///
/// ```toml
/// missing_child = "reject"
/// script_lang = "painless"
/// trace_rows = true
/// ```
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AssistantConfig {
    pub missing_child: MissingChildPolicy,
    pub script_lang: String,
    pub trace_rows: bool,
}

impl AssistantConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, InternalError> {
        toml::from_str(source)
            .map_err(ConfigError::from)
            .map_err(InternalError::from)
    }

    /// Inline script in the configured language.
    #[must_use]
    pub fn inline_script(&self, source: impl Into<String>) -> Script {
        Script::inline_with_lang(source, self.script_lang.clone())
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            missing_child: MissingChildPolicy::default(),
            script_lang: DEFAULT_SCRIPT_LANG.to_string(),
            trace_rows: false,
        }
    }
}

///
/// TESTS
///
