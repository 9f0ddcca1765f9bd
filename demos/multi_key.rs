//! Example demonstrating a converter that combines several variables

use envcfg::{EnvCfg, Registry};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Credentials {
    user: String,
    password: String,
}

// One argument per key listed in the field's `name`
fn parse_credentials(user: &str, password: &str) -> Result<Credentials, String> {
    if user.is_empty() {
        return Err("user must not be empty".to_string());
    }
    Ok(Credentials {
        user: user.to_string(),
        password: password.to_string(),
    })
}

#[derive(Debug, Default, EnvCfg)]
struct Config {
    #[env(name = "DB_USER, DB_PASSWORD", default = "postgres, postgres")]
    pub credentials: Credentials,

    #[env(name = "DB_HOST", default = "localhost")]
    pub host: String,
}

fn main() -> anyhow::Result<()> {
    let mut registry = Registry::new();
    registry.register(parse_credentials)?;

    std::env::set_var("DB_USER", "app");

    let mut config = Config::default();
    registry.populate_from_env(&mut config)?;

    println!("Configuration loaded:");
    println!("  User: {}", config.credentials.user);
    println!("  Password: {}", "*".repeat(config.credentials.password.len()));
    println!("  Host: {}", config.host);

    Ok(())
}
