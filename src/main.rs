mod app;

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use reqgate::config::{default_config, read_config};
use reqgate::{logs, CancellationToken, Error, Evaluator, Gate, HandlerRegistry};

use crate::app::authorization::{
    GlobalAuthorizer, MustBeAuthenticated, MustBeAuthenticatedHandler,
};
use crate::app::session::SessionStore;
use crate::app::video::{get_course_video_details, GetCourseVideoDetails};
use crate::app::AppConfig;

/// Look up a course video behind an authentication requirement
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to the config file
    #[clap(short, long, default_value = "~/.config/reqgate.toml")]
    config: String,

    /// The signed-in user, overrides the session in the config file
    #[clap(short, long)]
    user: Option<String>,

    /// Id of the course video
    video_id: u64,
}

async fn run() -> Result<ExitCode> {
    let args = Args::parse();

    let loaded: Option<AppConfig> = read_config(&args.config)?;
    let config_found = loaded.is_some();
    let mut cfg = match loaded {
        Some(cfg) => cfg,
        None => default_config()?,
    };
    if let Some(user) = args.user {
        cfg.session.user = user.trim().to_string();
    }
    logs::init(&cfg.log)?;
    if !config_found {
        warn!("Config file {} not found, using defaults", args.config);
    }
    debug!("Use config: {:?}", cfg);

    let session = Arc::new(SessionStore::new(cfg.session.user.clone()));
    let mut registry = HandlerRegistry::new();
    registry.register::<MustBeAuthenticated, _>(MustBeAuthenticatedHandler::new(session.clone()));
    match session.current_user() {
        Some(user) => info!("Session user: {user}"),
        None => info!("No session user"),
    }

    let evaluator = Arc::new(Evaluator::with_config(Arc::new(registry), &cfg.evaluator));
    let gate: Gate<GetCourseVideoDetails> =
        Gate::new(evaluator).with_authorizer(GlobalAuthorizer::new());

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received ctrl-c, cancelling");
            ctrl_c.cancel();
        }
    });

    let request = GetCourseVideoDetails {
        video_id: args.video_id,
    };
    let req = &request;
    let result = gate
        .run(&request, &cancel, move || async move {
            get_course_video_details(req)
        })
        .await;

    let details = match result {
        Ok(details) => details,
        Err(err) => {
            let (code, message) = rejection(err).context("authorize request")?;
            _ = writeln!(io::stderr(), "{message}");
            return Ok(ExitCode::from(code));
        }
    };

    let json = serde_json::to_string_pretty(&details).context("encode video details")?;
    println!("{json}");
    Ok(ExitCode::SUCCESS)
}

/// Translates an authorization error into an exit code and message. Errors
/// that are neither a denial nor a wiring defect are returned as fatal.
fn rejection(err: Error) -> Result<(u8, String), Error> {
    match err {
        Error::Unauthorized(reason) => Ok((1, format!("Forbidden: {reason}"))),
        err if err.is_configuration() => Ok((2, format!("Server misconfigured: {err}"))),
        err => Err(err),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            _ = writeln!(io::stderr(), "Fatal: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn test_rejection() {
        let (code, message) =
            rejection(Error::Unauthorized("You must be logged in.".to_string())).unwrap();
        assert_eq!(code, 1);
        assert_eq!(message, "Forbidden: You must be logged in.");

        let (code, message) = rejection(Error::NoHandler {
            requirement: "MustBeAuthenticated",
        })
        .unwrap();
        assert_eq!(code, 2);
        assert!(message.starts_with("Server misconfigured: "));
        assert!(message.contains("MustBeAuthenticated"));

        let (code, _) = rejection(Error::MultipleHandlers {
            requirement: "MustBeAuthenticated",
            count: 2,
        })
        .unwrap();
        assert_eq!(code, 2);

        let err = rejection(Error::Handler {
            requirement: "MustBeAuthenticated",
            source: anyhow!("session store unavailable"),
        })
        .unwrap_err();
        assert!(matches!(err, Error::Handler { .. }));

        let err = rejection(Error::Cancelled).unwrap_err();
        assert!(err.is_cancelled());
    }
}
