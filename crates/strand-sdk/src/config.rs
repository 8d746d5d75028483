use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Message stored when a commit is made with an empty message.
pub const DEFAULT_EMPTY_MESSAGE: &str = "NO COMMIT MESSAGE";

/// Engine settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Committer recorded on new commits. `None` records the author.
    pub committer: Option<String>,
    /// Replacement for an empty commit message.
    pub empty_message: String,
    /// Strip leading and trailing whitespace from commit messages.
    pub trim_message: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            committer: None,
            empty_message: DEFAULT_EMPTY_MESSAGE.to_string(),
            trim_message: true,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> EngineResult<()> {
        if self.empty_message.trim().is_empty() {
            return Err(EngineError::Config("empty_message must not be blank".into()));
        }
        if self.empty_message.contains('\0') {
            return Err(EngineError::Config("empty_message must not contain NUL".into()));
        }
        if let Some(committer) = &self.committer {
            if committer.is_empty() || committer.contains(['\n', '\0']) {
                return Err(EngineError::Config(format!("invalid committer {committer:?}")));
            }
        }
        Ok(())
    }

    /// The message actually stored for `message`.
    pub fn commit_message(&self, message: &str) -> String {
        let message = if self.trim_message {
            message.trim()
        } else {
            message
        };
        if message.is_empty() {
            self.empty_message.clone()
        } else {
            message.to_string()
        }
    }

    /// The committer recorded for a commit by `author`.
    pub fn committer_for<'a>(&'a self, author: &'a str) -> &'a str {
        self.committer.as_deref().unwrap_or(author)
    }
}
