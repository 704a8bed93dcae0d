// Main benchmark runner for all prefix sum variants
// Allows running individual benchmarks or all benchmarks

use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use psum::bench;
use tracing::{error, info};

const SCHEDULES: [&str; 3] = ["tree", "barrier", "blocked"];

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Prefix sum benchmark suite: sequential vs message passing vs shared memory"
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Sequential baseline
    Seq {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Message-passing model
    Distributed {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Shared-memory model, every schedule unless one is given
    Shared {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Run all benchmarks with their defaults
    All,
}

fn run_binary(bin: &str, args: &[String]) -> Result<()> {
    info!(bin, ?args, "running benchmark");
    let status = Command::new("cargo")
        .args(["run", "--release", "--bin", bin, "--"])
        .args(args)
        .status()
        .with_context(|| format!("failed to run {bin} benchmark"))?;

    if !status.success() {
        bail!("{bin} benchmark failed with {status}");
    }
    Ok(())
}

fn run_shared(args: &[String]) -> Result<()> {
    let has_schedule = args.iter().any(|a| a == "-s" || a.starts_with("--schedule"));
    if has_schedule {
        return run_binary("psum_shared", args);
    }
    for schedule in SCHEDULES {
        let mut with_schedule = vec!["--schedule".to_string(), schedule.to_string()];
        with_schedule.extend_from_slice(args);
        run_binary("psum_shared", &with_schedule)?;
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    bench::init_tracing(false);

    let result = match &cli.command {
        Cmd::Seq { args } => run_binary("psum_seq", args),
        Cmd::Distributed { args } => run_binary("psum_distributed", args),
        Cmd::Shared { args } => run_shared(args),
        Cmd::All => run_binary("psum_seq", &[])
            .and_then(|_| run_binary("psum_distributed", &[]))
            .and_then(|_| run_shared(&[])),
    };

    if let Err(e) = result {
        error!("{e:#}");
        std::process::exit(1);
    }
}
