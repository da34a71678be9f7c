//! Serve Command
//!
//! Run the HTTP service.
//!
//! Usage:
//!   clubguide serve [--host 0.0.0.0] [--port 8080]

use crate::cli::util::apply_server_overrides;
use crate::config::Config;
use crate::server;
use crate::types::Result;

pub async fn run(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    apply_server_overrides(&mut config, host, port);
    server::run(&config).await
}
