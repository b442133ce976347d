//! Scripted walkthrough of [`lazy_rbtree::RbTree`].
//!
//! The demo fills a tree with random keys, tombstones some, hard-deletes
//! more, compacts it and finishes with two bounded scans, printing the
//! counters after every phase. The tree is validated after each phase.

use std::io::{self, Write};

use lazy_rbtree::{InvariantError, RbTree, TraverseOptions};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

pub const USAGE: &str = "Usage: rbtree-demo [--seed <u64>] [--keys <n>] [--range <n>] [--verbose]";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing value for {0}")]
    MissingValue(String),
    #[error("invalid value {value:?} for {flag}")]
    InvalidValue { flag: String, value: String },
    #[error("unknown argument {0:?}")]
    UnknownArgument(String),
    #[error("--range must be at least 1")]
    EmptyRange,
}

#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("tree invariant violated: {0}")]
    Invariant(#[from] InvariantError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DemoConfig {
    /// Seed for the key generator; equal seeds replay the same run.
    pub seed: u64,
    /// Random operations per phase. Hard deletes run two and a half times
    /// as many.
    pub keys: usize,
    /// Keys are drawn from `0..range`.
    pub range: u32,
    pub verbose: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            keys: 100,
            range: 1000,
            verbose: false,
        }
    }
}

impl DemoConfig {
    /// Parses command-line arguments, without the program name.
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--seed" => config.seed = parse_value(&arg, args.next())?,
                "--keys" => config.keys = parse_value(&arg, args.next())?,
                "--range" => config.range = parse_value(&arg, args.next())?,
                "--verbose" | "-v" => config.verbose = true,
                _ => return Err(ConfigError::UnknownArgument(arg)),
            }
        }
        if config.range == 0 {
            return Err(ConfigError::EmptyRange);
        }
        Ok(config)
    }
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T, ConfigError> {
    let value = value.ok_or_else(|| ConfigError::MissingValue(flag.to_string()))?;
    value.parse().map_err(|_| ConfigError::InvalidValue {
        flag: flag.to_string(),
        value,
    })
}

fn report<W: Write>(out: &mut W, tree: &RbTree<u32, usize>) -> Result<(), DemoError> {
    tree.validate()?;
    writeln!(out, "size: {}", tree.size())?;
    writeln!(out, "totalSize: {}", tree.total_size())?;
    Ok(())
}

/// `range * num / den`, computed wide so large ranges cannot overflow.
fn share(range: u32, num: u64, den: u64) -> u32 {
    (u64::from(range) * num / den) as u32
}

fn collect_keys(tree: &RbTree<u32, usize>, options: TraverseOptions<u32>) -> Vec<u32> {
    tree.keys(options).copied().collect()
}

/// Runs every phase of the walkthrough, writing its transcript to `out`.
pub fn run<W: Write>(config: &DemoConfig, out: &mut W) -> Result<(), DemoError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut tree = RbTree::new();
    info!("seed {}, {} keys per phase, key range {}", config.seed, config.keys, config.range);

    writeln!(out, "Adding random keys")?;
    for round in 0..config.keys {
        let key = rng.gen_range(0..config.range);
        tree.insert(key, round);
    }
    let entries: Vec<(u32, usize)> = tree.iter().map(|(k, v)| (*k, *v)).collect();
    writeln!(out, "entries: {entries:?}")?;
    report(out, &tree)?;

    writeln!(out, "Deleting some nodes")?;
    let mut tombstoned = 0;
    for _ in 0..config.keys {
        if tree.delete(&rng.gen_range(0..config.range), false) {
            tombstoned += 1;
        }
    }
    debug!("{tombstoned} keys tombstoned");
    writeln!(out, "keys: {:?}", collect_keys(&tree, TraverseOptions::default()))?;
    report(out, &tree)?;

    writeln!(out, "Hard deleting some nodes")?;
    let mut removed = 0;
    for _ in 0..config.keys.saturating_mul(5) / 2 {
        if tree.delete(&rng.gen_range(0..config.range), true) {
            removed += 1;
        }
    }
    debug!("{removed} nodes unlinked");
    let values: Vec<usize> = tree.values(TraverseOptions::default()).copied().collect();
    writeln!(out, "values: {values:?}")?;
    report(out, &tree)?;

    writeln!(out, "Rebuilding tree")?;
    tree.rebuild();
    writeln!(out, "keys: {:?}", collect_keys(&tree, TraverseOptions::default()))?;
    report(out, &tree)?;

    let (low, high) = (share(config.range, 3, 20), share(config.range, 3, 10));
    writeln!(out, "keys in ascending order in interval ({low}, {high}]")?;
    let window = TraverseOptions::new().low(low).high(high).exclude_low();
    writeln!(out, "{:?}", collect_keys(&tree, window))?;

    let from = share(config.range, 4, 5);
    writeln!(out, "keys in descending order in interval [{from}, inf)")?;
    let tail = TraverseOptions::new().low(from).reverse();
    writeln!(out, "{:?}", collect_keys(&tree, tail))?;

    out.flush()?;
    Ok(())
}
