//! Server configuration via CLI args and environment variables.

use clap::Parser;

/// HTTP server for the Marquee movie catalog.
#[derive(Parser, Debug, Clone)]
#[command(name = "marquee-server", version, about)]
pub struct Config {
    /// Bind address.
    #[arg(long, default_value = "0.0.0.0", env = "MARQUEE_HOST")]
    pub host: String,

    /// Bind port.
    #[arg(long, default_value_t = 8080, env = "MARQUEE_PORT")]
    pub port: u16,

    /// API version stamped on every error response.
    #[arg(long, default_value = marquee_http::state::DEFAULT_API_VERSION, env = "MARQUEE_API_VERSION")]
    pub api_version: String,

    /// CORS allowed origins (comma-separated). Empty for no CORS.
    #[arg(long, env = "MARQUEE_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Log level.
    #[arg(long, default_value = "info", env = "MARQUEE_LOG_LEVEL")]
    pub log_level: String,

    /// Log format: "pretty" or "json".
    #[arg(long, default_value = "pretty", env = "MARQUEE_LOG_FORMAT")]
    pub log_format: String,
}

impl Config {
    /// Parses configuration from CLI args and env vars.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
