#![allow(dead_code)]

use envcfg::EnvCfg;

#[derive(EnvCfg)]
struct Config {
    #[env(name = "TOKEN", from_file)]
    pub token: String,
}

fn main() {}
