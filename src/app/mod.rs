pub mod authorization;
pub mod session;
pub mod video;

use anyhow::Result;
use reqgate::config::{CommonConfig, EvaluatorConfig};
use reqgate::logs::LogConfig;
use serde::{Deserialize, Serialize};

use session::SessionConfig;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "LogConfig::default")]
    pub log: LogConfig,

    #[serde(default = "EvaluatorConfig::default")]
    pub evaluator: EvaluatorConfig,

    #[serde(default = "SessionConfig::default")]
    pub session: SessionConfig,
}

impl CommonConfig for AppConfig {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            evaluator: EvaluatorConfig::default(),
            session: SessionConfig::default(),
        }
    }

    fn complete(&mut self) -> Result<()> {
        self.log.complete()?;
        self.evaluator.complete()?;
        self.session.complete()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqgate::config::EvaluationMode;

    use super::*;

    #[test]
    fn test_app_config() {
        let mut cfg: AppConfig = toml::from_str(
            r#"
            [log]
            level = "debug"

            [evaluator]
            mode = "sequential"
            handler_timeout = "2s"

            [session]
            user = "alice"
            "#,
        )
        .unwrap();
        cfg.complete().unwrap();

        assert_eq!(cfg.log.level, "debug");
        assert_eq!(cfg.evaluator.mode, EvaluationMode::Sequential);
        assert_eq!(cfg.evaluator.timeout, Some(Duration::from_secs(2)));
        assert_eq!(cfg.session.user, "alice");

        let mut cfg: AppConfig = toml::from_str("").unwrap();
        cfg.complete().unwrap();
        assert_eq!(cfg.log.level, "info");
        assert!(cfg.session.user.is_empty());
    }
}
