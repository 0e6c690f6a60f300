//! Cache replacement simulator CLI.
//!
//! This binary feeds a memory-access trace through a set-associative cache
//! driven by the LRU-IPV replacement policy. It performs:
//! 1. **Config:** Loads a JSON configuration file or falls back to defaults.
//! 2. **Trace run:** Parses `r <addr>` / `w <addr>` lines and simulates each access.
//! 3. **Report:** Prints cache statistics and total simulated cycles.

use clap::{Parser, Subcommand};
use std::{fs, process};

use ipvsim_core::cache::Cache;
use ipvsim_core::config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "ipvsim",
    version,
    about = "Insertion/promotion-vector cache replacement simulator",
    long_about = "Feed a memory-access trace through a set-associative cache driven by the LRU-IPV replacement policy.\n\nTrace format: one access per line, `r <hex-addr>` or `w <hex-addr>`. Bare addresses are reads; `#` starts a comment.\n\nExamples:\n  ipvsim run -t traces/qsort.trace\n  ipvsim run -t traces/qsort.trace -c config.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a memory-access trace through the simulated cache.
    Run {
        /// Trace file to execute.
        #[arg(short, long)]
        trace: String,

        /// JSON configuration file (defaults used when omitted).
        #[arg(short, long)]
        config: Option<String>,

        /// Next-level latency in cycles, charged on misses and write-backs.
        #[arg(long, default_value_t = 10)]
        next_level_latency: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run {
            trace,
            config,
            next_level_latency,
        }) => cmd_run(&trace, config, next_level_latency),
        None => {
            eprintln!("ipvsim — pass a subcommand");
            eprintln!();
            eprintln!("  ipvsim run -t <trace>            Simulate a trace with defaults");
            eprintln!("  ipvsim run -t <trace> -c <json>  Simulate with a configuration file");
            eprintln!();
            eprintln!("  ipvsim --help  for full options");
            process::exit(1);
        }
    }
}

/// Runs the simulator: loads the configuration, replays the trace through
/// the cache, then prints statistics and total cycles.
///
/// Malformed trace lines and policy contract violations are fatal: the run
/// stops with a diagnostic and exit code 1.
fn cmd_run(trace_path: &str, config_path: Option<String>, next_level_latency: u64) {
    let config = match config_path {
        Some(path) => {
            let text = fs::read_to_string(&path).unwrap_or_else(|e| {
                eprintln!("Error reading config {path}: {e}");
                process::exit(1);
            });
            Config::from_json(&text).unwrap_or_else(|e| {
                eprintln!("Error parsing config {path}: {e}");
                process::exit(1);
            })
        }
        None => Config::default(),
    };

    let trace_text = fs::read_to_string(trace_path).unwrap_or_else(|e| {
        eprintln!("Error reading trace {trace_path}: {e}");
        process::exit(1);
    });

    let mut cache = Cache::new(&config);
    let mut cycles: u64 = 0;

    for (lineno, line) in trace_text.lines().enumerate() {
        let access = parse_access(line).unwrap_or_else(|e| {
            eprintln!("{trace_path}:{}: {e}", lineno + 1);
            process::exit(1);
        });
        let Some((addr, is_write)) = access else {
            continue;
        };

        match cache.access(addr, is_write, next_level_latency) {
            Ok((hit, penalty)) => {
                cycles += cache.latency + penalty;
                if !hit {
                    cycles += next_level_latency;
                }
            }
            Err(e) => {
                eprintln!("\n[!] FATAL: {e}");
                cache.stats.print();
                process::exit(1);
            }
        }
    }

    cache.stats.print();
    println!("  Cycles:        {cycles}");
}

/// Parses one trace line: `r <hex>`, `w <hex>`, or a bare hex address
/// (treated as a read). Blank lines and `#` comments yield `Ok(None)`.
fn parse_access(line: &str) -> Result<Option<(u64, bool)>, String> {
    let text = line.split('#').next().unwrap_or("").trim();
    if text.is_empty() {
        return Ok(None);
    }

    let (is_write, addr_text) = match text.split_once(char::is_whitespace) {
        Some((op, rest)) => match op {
            "r" | "R" => (false, rest.trim()),
            "w" | "W" => (true, rest.trim()),
            _ => return Err(format!("unknown operation `{op}`")),
        },
        None => (false, text),
    };

    let digits = addr_text.trim_start_matches("0x");
    let addr = u64::from_str_radix(digits, 16)
        .map_err(|e| format!("bad address `{addr_text}`: {e}"))?;
    Ok(Some((addr, is_write)))
}
