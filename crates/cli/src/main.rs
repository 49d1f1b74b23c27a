// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! statlens binary entry point.

use clap::Parser;

use statlens::cli::Cli;
use statlens::logging::init_logging;
use statlens::output::print_error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = statlens::run(cli).await {
        print_error(e);
        std::process::exit(1);
    }
}
