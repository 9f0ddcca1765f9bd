#![allow(dead_code)]

use envcfg::EnvCfg;

#[derive(EnvCfg)]
struct Config {
    #[env(name = "DB_HOST,DB_PORT", default = "localhost")]
    pub database: (String, u16),
}

fn main() {}
