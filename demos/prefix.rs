//! Example demonstrating the prefix attribute and bare `#[env]`

use envcfg::{EnvCfg, Load};

#[derive(Debug, Default, EnvCfg)]
#[env(prefix = "MYAPP_")]
struct Config {
    // Bare #[env] reads the upper-cased field name: MYAPP_DATABASE_URL
    #[env]
    pub database_url: String,

    #[env]
    pub api_key: String,

    #[env(name = "PORT", default = "8080")]
    pub port: u16,

    // Not tagged, so never read from the environment
    pub started_by: String,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("MYAPP_DATABASE_URL", "postgres://localhost/db");
    std::env::set_var("MYAPP_API_KEY", "secret-key-123");
    std::env::set_var("MYAPP_PORT", "3000");

    let config = Config::from_env()?;

    println!("Configuration with prefix 'MYAPP_':");
    println!("  Database URL: {}", config.database_url);
    println!("  API Key: {}", config.api_key);
    println!("  Port: {}", config.port);
    println!("  Started by: {:?}", config.started_by);

    Ok(())
}
