//! Example demonstrating JSON values through serde

use envcfg::{EnvCfg, Load};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct Limits {
    cpu: u32,
    memory_mb: u32,
}

#[derive(Debug, Default, EnvCfg)]
struct Config {
    // Defaults are split on commas, so JSON values come from the environment
    #[env(name = "LIMITS")]
    pub limits: Limits,

    // Vec<String> is built in: comma separated
    #[env(name = "FEATURES", default = "")]
    pub features: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    envcfg::register_json::<Limits>()?;

    std::env::set_var("LIMITS", r#"{"cpu": 4, "memory_mb": 2048}"#);
    std::env::set_var("FEATURES", "search, export");

    let config = Config::from_env()?;

    println!("Configuration loaded:");
    println!("  CPU: {}", config.limits.cpu);
    println!("  Memory: {} MB", config.limits.memory_mb);
    println!("  Features: {:?}", config.features);

    Ok(())
}
