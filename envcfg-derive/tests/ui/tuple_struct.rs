#![allow(dead_code)]

use envcfg::EnvCfg;

#[derive(EnvCfg)]
struct Pair(String, u16);

fn main() {}
