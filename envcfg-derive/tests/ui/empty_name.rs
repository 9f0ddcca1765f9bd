#![allow(dead_code)]

use envcfg::EnvCfg;

#[derive(EnvCfg)]
struct Config {
    #[env(name = "")]
    pub value: String,
}

fn main() {}
