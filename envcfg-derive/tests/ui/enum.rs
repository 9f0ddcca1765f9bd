#![allow(dead_code)]

use envcfg::EnvCfg;

#[derive(EnvCfg)]
enum Mode {
    Fast,
    Safe,
}

fn main() {}
