use anyhow::Result;
use reqgate::config::{expandenv, CommonConfig};
use serde::{Deserialize, Serialize};

/// Session related configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    /// Name of the signed-in user. Empty means no session.
    /// Defaults to empty.
    #[serde(default = "SessionConfig::default_user")]
    pub user: String,
}

impl CommonConfig for SessionConfig {
    fn default() -> Self {
        Self {
            user: Self::default_user(),
        }
    }

    fn complete(&mut self) -> Result<()> {
        self.user = expandenv("user", &self.user)?;
        self.user = self.user.trim().to_string();
        Ok(())
    }
}

impl SessionConfig {
    pub fn default_user() -> String {
        String::new()
    }
}

/// Holds the user of the current session, if any.
pub struct SessionStore {
    user: Option<String>,
}

impl SessionStore {
    pub fn new(user: impl Into<String>) -> Self {
        let user = user.into();
        let user = if user.is_empty() { None } else { Some(user) };
        Self { user }
    }

    pub fn current_user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}
