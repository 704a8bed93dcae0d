// Shared-memory prefix sum benchmark.
//
// Usage:
//   ./psum_shared [-n N] [-t T] [-s tree|barrier|blocked] [-i ITERS] [--pin] [--json] [--print]
//
// Output (CSV-style):
//   psum,rust,model=shared,schedule=tree,N=10000000,T=8,time,1234.500,usec
//   psum,rust,model=shared,schedule=tree,N=10000000,T=8,correct,1,boolean

use anyhow::Result;
use clap::Parser;
use psum::bench::{self, Record};
use psum::config::{checked_len, Schedule, SharedConfig};
use psum::input::{self, Pattern};
use psum::oracle;
use psum::shared::SharedScanner;
use tracing::{error, info};

const DEFAULT_NUM_INTS: i64 = 10_000_000;
const DEFAULT_NUM_ITERS: usize = 1;
const DEFAULT_THREADS: i64 = 8;

#[derive(Parser)]
#[command(author, version, about = "Shared-memory prefix sum", long_about = None)]
struct Cli {
    #[arg(short = 'n', long, default_value_t = DEFAULT_NUM_INTS, allow_negative_numbers = true)]
    num_ints: i64,

    /// Worker pool size.
    #[arg(short, long, default_value_t = DEFAULT_THREADS, allow_negative_numbers = true)]
    threads: i64,

    #[arg(short, long, value_enum, default_value_t = Schedule::Tree)]
    schedule: Schedule,

    #[arg(short, long, default_value_t = DEFAULT_NUM_ITERS, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    iterations: usize,

    #[arg(short, long, value_enum, default_value_t = Pattern::Sequential)]
    pattern: Pattern,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Pin pool workers to cores.
    #[arg(long)]
    pin: bool,

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

    let setup = checked_len(cli.num_ints).and_then(|n| {
        let config = SharedConfig::try_new(cli.threads, cli.schedule)?.pinned(cli.pin);
        Ok((n, config))
    });
    let (n, config) = match setup {
        Ok(setup) => setup,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    info!(
        n,
        threads = config.threads,
        schedule = config.schedule.name(),
        iterations = cli.iterations,
        "executing shared-memory scan"
    );

    let data = input::generate(cli.pattern, 0..n, cli.seed)?;
    let scanner = SharedScanner::new(config)?;

    // warm-up
    let mut warm = data[..n.min(1000)].to_vec();
    scanner.scan(&mut warm)?;

    let (scan, trials) = bench::time_trials(cli.iterations, &data, |nums| scanner.scan(nums))?;

    if cli.print {
        bench::print_array("Data", &data);
        bench::print_array("Prefix sums", &scan);
    }

    let check = oracle::verify(&data, &scan);
    if let Err(mismatch) = &check {
        error!("{mismatch}");
    }

    Record {
        model: "shared",
        schedule: Some(config.schedule.name()),
        num_ints: n,
        workers: config.threads,
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
