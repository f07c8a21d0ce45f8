use super::config_model::{Database, Dispatch, DotEnvyConfig, MailingApi, WorkerServer};
use anyhow::{Context, Result, bail};
use std::time::Duration;
use url::Url;

const DEFAULT_MAILING_API_URL: &str = "https://probe.fbrq.cloud/v1/send";

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let worker_server = WorkerServer {
        port: std::env::var("SERVER_PORT_WORKER")
            .unwrap_or_else(|_| "8090".to_string())
            .parse()
            .context("SERVER_PORT_WORKER is invalid")?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").context("DATABASE_URL is invalid")?,
        pool_max_size: std::env::var("DATABASE_POOL_MAX_SIZE")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_POOL_MAX_SIZE is invalid")?,
    };

    let mailing_api = MailingApi {
        url: Url::parse(
            &std::env::var("MAILING_API_URL")
                .unwrap_or_else(|_| DEFAULT_MAILING_API_URL.to_string()),
        )
        .context("MAILING_API_URL is invalid")?,
        token: std::env::var("MAILING_API_TOKEN").context("MAILING_API_TOKEN is invalid")?,
        timeout: positive_secs(
            "MAILING_API_TIMEOUT_SECS",
            std::env::var("MAILING_API_TIMEOUT_SECS").unwrap_or_else(|_| "20".to_string()),
        )?,
    };

    let dispatch = Dispatch {
        internal_token: non_blank(std::env::var("INTERNAL_DISPATCH_TOKEN").ok()),
        waiting_time_cap: positive_secs(
            "MAILING_WAITING_TIME_SECS",
            std::env::var("MAILING_WAITING_TIME_SECS").unwrap_or_else(|_| "5".to_string()),
        )?,
    };

    Ok(DotEnvyConfig {
        worker_server,
        database,
        mailing_api,
        dispatch,
    })
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.and_then(|v| {
        let trimmed = v.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}

// A zero wait cap would turn the versioned wait into a busy loop.
fn positive_secs(key: &str, raw: String) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} is invalid"))?;
    if secs == 0 {
        bail!("{key} must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}
