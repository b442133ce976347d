//! `rbtree-demo`: exercise a tombstoning red-black tree on random keys.
//!
//! Usage:
//!   rbtree-demo [--seed <u64>] [--keys <n>] [--range <n>] [--verbose]
//!
//! The transcript goes to stdout, logs to stderr.

use std::io;

use lazy_rbtree_demo::{run, DemoConfig, USAGE};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

fn main() {
    let config = match DemoConfig::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    let level = if config.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(e) = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("{e}");
    }

    let stdout = io::stdout();
    if let Err(e) = run(&config, &mut stdout.lock()) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
