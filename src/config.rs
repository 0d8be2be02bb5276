use std::path::PathBuf;
use std::time::Duration;
use std::{fs, io};

use anyhow::{bail, Context, Result};
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub trait CommonConfig {
    fn default() -> Self;
    fn complete(&mut self) -> Result<()>;
}

/// See: [`shellexpand::full`].
pub fn expandenv(name: &str, s: impl AsRef<str>) -> Result<String> {
    let s =
        shellexpand::full(s.as_ref()).with_context(|| format!("expand env value for '{name}'"))?;
    Ok(s.to_string())
}

/// Reads and completes the TOML config at `path`. Returns `None` when the file
/// does not exist, leaving the fallback to the caller.
pub fn read_config<T>(path: &str) -> Result<Option<T>>
where
    T: CommonConfig + DeserializeOwned,
{
    let path = PathBuf::from(expandenv("config_path", path)?);
    let mut cfg: T = match fs::read_to_string(&path) {
        Ok(s) => toml::from_str(&s)
            .with_context(|| format!("parse config toml: {}", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).context(format!("read config file: {}", path.display()));
        }
    };

    cfg.complete().context("validate config")?;
    Ok(Some(cfg))
}

/// Completed defaults of `T`.
pub fn default_config<T: CommonConfig>() -> Result<T> {
    let mut cfg = T::default();
    cfg.complete().context("validate default config")?;
    Ok(cfg)
}

/// Loads a TOML config from `path`, falling back to defaults when the file
/// does not exist. The result is always completed.
pub fn load_config<T>(path: &str) -> Result<T>
where
    T: CommonConfig + DeserializeOwned,
{
    match read_config(path)? {
        Some(cfg) => Ok(cfg),
        None => {
            warn!("Config file {path} not found, using defaults");
            default_config()
        }
    }
}

/// How the handlers of one evaluation are scheduled.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationMode {
    /// All handlers are polled together, the run ends when the last one does
    #[serde(rename = "concurrent")]
    Concurrent,
    /// Handlers run one after another in requirement set order
    #[serde(rename = "sequential")]
    Sequential,
}

/// Evaluator related configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EvaluatorConfig {
    /// Scheduling of requirement handlers. Defaults to "concurrent".
    #[serde(default = "EvaluatorConfig::default_mode")]
    pub mode: EvaluationMode,

    /// Maximum time a single handler may take, in humantime format (for
    /// example "500ms" or "5s"). Empty means no limit. Defaults to empty.
    #[serde(default = "EvaluatorConfig::default_handler_timeout")]
    pub handler_timeout: String,

    #[serde(skip)]
    pub timeout: Option<Duration>,
}

impl CommonConfig for EvaluatorConfig {
    fn default() -> Self {
        Self {
            mode: Self::default_mode(),
            handler_timeout: Self::default_handler_timeout(),
            timeout: None,
        }
    }

    fn complete(&mut self) -> Result<()> {
        self.handler_timeout = expandenv("handler_timeout", &self.handler_timeout)?;
        if self.handler_timeout.is_empty() {
            self.timeout = None;
            return Ok(());
        }

        let timeout = humantime::parse_duration(&self.handler_timeout)
            .with_context(|| format!("parse handler_timeout '{}'", self.handler_timeout))?;
        if timeout.is_zero() {
            bail!("handler_timeout should not be 0");
        }
        self.timeout = Some(timeout);

        Ok(())
    }
}

impl EvaluatorConfig {
    pub fn default_mode() -> EvaluationMode {
        EvaluationMode::Concurrent
    }

    pub fn default_handler_timeout() -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let mut cfg = <EvaluatorConfig as CommonConfig>::default();
        cfg.complete().unwrap();
        assert_eq!(cfg.mode, EvaluationMode::Concurrent);
        assert!(cfg.timeout.is_none());
    }

    #[test]
    fn test_parse() {
        let mut cfg: EvaluatorConfig = toml::from_str(
            r#"
            mode = "sequential"
            handler_timeout = "1s 500ms"
            "#,
        )
        .unwrap();
        cfg.complete().unwrap();
        assert_eq!(cfg.mode, EvaluationMode::Sequential);
        assert_eq!(cfg.timeout, Some(Duration::from_millis(1500)));

        let mut cfg: EvaluatorConfig = toml::from_str("").unwrap();
        cfg.complete().unwrap();
        assert_eq!(cfg.mode, EvaluationMode::Concurrent);
        assert!(cfg.timeout.is_none());
    }

    #[test]
    fn test_invalid() {
        let mut cfg: EvaluatorConfig = toml::from_str(r#"handler_timeout = "0s""#).unwrap();
        assert!(cfg.complete().is_err());

        let mut cfg: EvaluatorConfig = toml::from_str(r#"handler_timeout = "soon""#).unwrap();
        assert!(cfg.complete().is_err());

        let result: Result<EvaluatorConfig, _> = toml::from_str(r#"mode = "parallel""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing() {
        let path = "/nonexistent/reqgate/evaluator.toml";
        let cfg: Option<EvaluatorConfig> = read_config(path).unwrap();
        assert!(cfg.is_none());

        let cfg: EvaluatorConfig = load_config(path).unwrap();
        assert_eq!(cfg.mode, EvaluationMode::Concurrent);
    }

    #[test]
    fn test_read_existing() {
        let path = std::env::temp_dir().join(format!("reqgate-{}.toml", std::process::id()));
        fs::write(&path, "mode = \"sequential\"\nhandler_timeout = \"3s\"\n").unwrap();

        let cfg: Option<EvaluatorConfig> = read_config(&path.display().to_string()).unwrap();
        fs::remove_file(&path).unwrap();

        let cfg = cfg.unwrap();
        assert_eq!(cfg.mode, EvaluationMode::Sequential);
        assert_eq!(cfg.timeout, Some(Duration::from_secs(3)));
    }
}
