#![allow(dead_code)]

use envcfg::EnvCfg;

#[derive(EnvCfg)]
struct Config {
    #[env(name = "A", name = "B")]
    pub value: String,
}

fn main() {}
