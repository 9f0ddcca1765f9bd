//! Example demonstrating a custom converter on the default registry

use envcfg::{EnvCfg, Load};
use std::fmt;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        f.write_str(name)
    }
}

fn parse_log_level(s: &str) -> Result<LogLevel, String> {
    match s.to_ascii_lowercase().as_str() {
        "error" => Ok(LogLevel::Error),
        "warn" | "warning" => Ok(LogLevel::Warn),
        "info" => Ok(LogLevel::Info),
        "debug" => Ok(LogLevel::Debug),
        other => Err(format!("unknown log level {other:?}")),
    }
}

#[derive(Debug, Default, EnvCfg)]
struct Config {
    #[env(name = "LOG_LEVEL", default = "info")]
    pub log_level: LogLevel,

    #[env(name = "SERVICE_NAME")]
    pub service_name: String,
}

fn main() -> anyhow::Result<()> {
    // Register once during startup, before the first load
    envcfg::register(parse_log_level)?;

    std::env::set_var("LOG_LEVEL", "WARNING");
    std::env::set_var("SERVICE_NAME", "billing");

    let config = Config::from_env()?;

    println!("Configuration loaded:");
    println!("  Log Level: {}", config.log_level);
    println!("  Service Name: {}", config.service_name);

    // Every bad field is reported at once
    std::env::set_var("LOG_LEVEL", "loud");
    std::env::remove_var("SERVICE_NAME");
    if let Err(e) = Config::from_env() {
        println!("\nExpected failure:\n{e}");
    }

    Ok(())
}
