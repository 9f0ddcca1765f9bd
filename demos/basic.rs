//! Basic usage example

use envcfg::{EnvCfg, Load};
use std::time::Duration;

#[derive(Debug, Default, EnvCfg)]
struct Config {
    // Required field: loaded from DATABASE_URL
    #[env(name = "DATABASE_URL")]
    pub database_url: String,

    // With default value
    #[env(name = "SERVER_ADDR", default = "127.0.0.1:8080")]
    pub server_addr: std::net::SocketAddr,

    // Go-style duration
    #[env(name = "REQUEST_TIMEOUT", default = "30s")]
    pub request_timeout: Duration,

    // Boolean type
    #[env(name = "DEBUG_MODE", default = "false")]
    pub debug_mode: bool,
}

fn main() -> anyhow::Result<()> {
    // Set environment variables for demonstration
    std::env::set_var("DATABASE_URL", "postgres://localhost/mydb");
    std::env::set_var("SERVER_ADDR", "0.0.0.0:3000");

    let config = Config::from_env()?;

    println!("Configuration loaded:");
    println!("  Database URL: {}", config.database_url);
    println!("  Server Address: {}", config.server_addr);
    println!("  Request Timeout: {:?}", config.request_timeout);
    println!("  Debug Mode: {}", config.debug_mode);

    Ok(())
}
