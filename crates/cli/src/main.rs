// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::Parser;
use remcol::{env, Cli};
use tracing_subscriber::EnvFilter;

fn main() {
    let filter =
        EnvFilter::try_from_env(env::vars::RUST_LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = remcol::run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
