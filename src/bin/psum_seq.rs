// Sequential prefix sum baseline.
//
// Usage:
//   ./psum_seq [-n N] [-i ITERS] [--pattern sequential|random|ones] [--json] [--print]

use anyhow::Result;
use clap::Parser;
use psum::bench::{self, Record};
use psum::config::checked_len;
use psum::input::{self, Pattern};
use psum::{local_scan, oracle};
use tracing::{error, info};

const DEFAULT_NUM_INTS: i64 = 10_000_000;
const DEFAULT_NUM_ITERS: usize = 1;

#[derive(Parser)]
#[command(author, version, about = "Sequential prefix sum baseline", long_about = None)]
struct Cli {
    /// Number of integers to scan.
    #[arg(short = 'n', long, default_value_t = DEFAULT_NUM_INTS, allow_negative_numbers = true)]
    num_ints: i64,

    /// Timed trials; the average is reported.
    #[arg(short, long, default_value_t = DEFAULT_NUM_ITERS, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    iterations: usize,

    #[arg(short, long, value_enum, default_value_t = Pattern::Random)]
    pattern: Pattern,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Print input and result arrays.
    #[arg(long)]
    print: bool,

    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    bench::init_tracing(cli.verbose);

    let n = match checked_len(cli.num_ints) {
        Ok(n) => n,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let data = input::generate(cli.pattern, 0..n, cli.seed)?;
    info!(n, iterations = cli.iterations, "calculating prefix sum");

    let (scan, trials) = bench::time_trials(cli.iterations, &data, |nums| {
        local_scan::prefix_sum(nums);
        Ok(())
    })?;

    if cli.print {
        bench::print_array("Data", &data);
        bench::print_array("Prefix sums", &scan);
    }

    let check = oracle::verify(&data, &scan);
    if let Err(mismatch) = &check {
        error!("{mismatch}");
    }

    Record {
        model: "seq",
        schedule: None,
        num_ints: n,
        workers: 1,
        iterations: cli.iterations,
        avg_usec: trials.average_usec(),
        correct: check.is_ok(),
    }
    .print(cli.json)?;

    if check.is_err() {
        std::process::exit(3);
    }
    Ok(())
}
