use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::time::Duration;

use crate::scores::FilterTag;

/// Cricket live-score proxy and polling client
#[derive(Parser, Debug, Clone)]
#[command(name = "cricket-live", version, about)]
pub struct Config {
    /// Cricket data API key (required by `serve`)
    #[arg(long, env = "CRICAPI_KEY", global = true)]
    pub cricapi_key: Option<String>,

    /// Cricket data API base URL
    #[arg(
        long,
        env = "CRICAPI_HOST",
        default_value = "https://cricapi.com/api/v1",
        global = true
    )]
    pub cricapi_host: String,

    /// Interface the proxy binds to
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0", global = true)]
    pub bind_host: String,

    /// Port the proxy listens on
    #[arg(long, env = "PORT", default_value = "5000", global = true)]
    pub port: u16,

    /// Proxy base URL used by the client side
    #[arg(
        long,
        env = "API_BASE_URL",
        default_value = "http://localhost:5000/api",
        global = true
    )]
    pub api_base_url: String,

    /// Timeout for every outbound HTTP call, in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value = "10", global = true)]
    pub upstream_timeout_secs: u64,

    /// Match list refresh period in seconds
    #[arg(long, env = "MATCH_LIST_REFRESH_SECS", default_value = "60", global = true)]
    pub match_list_refresh_secs: u64,

    /// Live score refresh period in seconds
    #[arg(long, env = "LIVE_SCORE_REFRESH_SECS", default_value = "30", global = true)]
    pub live_score_refresh_secs: u64,

    /// Answer 404 / 400 / 502 for not-found, bad query and malformed upstream
    /// data instead of HTTP 500 for every failure
    #[arg(long, env = "DISTINCT_ERROR_STATUS", default_value = "false", global = true)]
    pub distinct_error_status: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP proxy in front of the cricket data API
    Serve,
    /// Poll a running proxy and print match list / live score updates
    Watch {
        /// Which matches to show
        #[arg(long, value_enum, default_value = "all")]
        filter: FilterTag,

        /// Also follow match info and live score for this match id
        #[arg(long = "match")]
        match_id: Option<String>,
    },
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if matches!(self.command, Command::Serve) {
            match self.cricapi_key.as_deref() {
                Some(key) if !key.trim().is_empty() => {}
                _ => anyhow::bail!("CRICAPI_KEY is required to run the proxy"),
            }
            url::Url::parse(&self.cricapi_host)
                .map_err(|e| anyhow::anyhow!("invalid CRICAPI_HOST '{}': {}", self.cricapi_host, e))?;
        }
        url::Url::parse(&self.api_base_url)
            .map_err(|e| anyhow::anyhow!("invalid API_BASE_URL '{}': {}", self.api_base_url, e))?;
        if self.upstream_timeout_secs == 0 {
            anyhow::bail!("upstream_timeout_secs must be positive");
        }
        if self.match_list_refresh_secs == 0 || self.live_score_refresh_secs == 0 {
            anyhow::bail!("refresh periods must be positive");
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port).parse()?;
        Ok(addr)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn match_list_period(&self) -> Duration {
        Duration::from_secs(self.match_list_refresh_secs)
    }

    pub fn live_score_period(&self) -> Duration {
        Duration::from_secs(self.live_score_refresh_secs)
    }
}
