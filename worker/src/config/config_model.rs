use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub worker_server: WorkerServer,
    pub database: Database,
    pub mailing_api: MailingApi,
    pub dispatch: Dispatch,
}

#[derive(Debug, Clone)]
pub struct WorkerServer {
    pub port: u16,
    pub timeout: u64,
    pub body_limit: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub pool_max_size: u32,
}

#[derive(Debug, Clone)]
pub struct MailingApi {
    pub url: Url,
    pub token: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Dispatch {
    /// Bearer token for the internal routes; `None` disables them.
    pub internal_token: Option<String>,
    pub waiting_time_cap: Duration,
}
