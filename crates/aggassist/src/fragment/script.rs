use crate::DEFAULT_SCRIPT_LANG;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

///
/// Script
///
/// A script reference for script-driven aggregations.
///
/// Inline scripts carry their source and language; stored scripts are
/// referenced by the id they were registered under on the server.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Script {
    Inline {
        source: String,
        lang: String,
        #[serde(skip_serializing_if = "Map::is_empty")]
        params: Map<String, JsonValue>,
    },
    Stored {
        id: String,
        params: Map<String, JsonValue>,
    },
}

impl Script {
    /// Inline script in the default language.
    #[must_use]
    pub fn inline(source: impl Into<String>) -> Self {
        Self::inline_with_lang(source, DEFAULT_SCRIPT_LANG)
    }

    #[must_use]
    pub fn inline_with_lang(source: impl Into<String>, lang: impl Into<String>) -> Self {
        Self::Inline {
            source: source.into(),
            lang: lang.into(),
            params: Map::new(),
        }
    }

    /// Server-stored script with empty parameters.
    #[must_use]
    pub fn stored(id: impl Into<String>) -> Self {
        Self::Stored {
            id: id.into(),
            params: Map::new(),
        }
    }

    /// Add one script parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        match &mut self {
            Self::Inline { params, .. } | Self::Stored { params, .. } => {
                params.insert(key.into(), value.into());
            }
        }
        self
    }
}
