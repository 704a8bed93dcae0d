// Message-passing prefix sum benchmark.
//
// Each node generates only its own partition, then all nodes run the carry
// chain together once per trial. The slowest node's average is reported.
//
// Usage:
//   ./psum_distributed [-n N] [-p NODES] [-i ITERS] [--json] [--print]

use anyhow::Result;
use clap::Parser;
use psum::bench::{self, Record, Trials};
use psum::config::{checked_len, DistributedConfig};
use psum::distributed::{self, Carry, Communicator, MessageStats};
use psum::input::{self, Pattern};
use psum::oracle;
use psum::partition::Partition;
use tracing::{debug, error, info};

const DEFAULT_NUM_INTS: i64 = 10_000_000;
const DEFAULT_NUM_ITERS: usize = 1;
const DEFAULT_NODES: i64 = 4;

#[derive(Parser)]
#[command(author, version, about = "Message-passing prefix sum", long_about = None)]
struct Cli {
    #[arg(short = 'n', long, default_value_t = DEFAULT_NUM_INTS, allow_negative_numbers = true)]
    num_ints: i64,

    /// Number of nodes.
    #[arg(short = 'p', long, default_value_t = DEFAULT_NODES, allow_negative_numbers = true)]
    nodes: i64,

    #[arg(short, long, default_value_t = DEFAULT_NUM_ITERS, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    iterations: usize,

    #[arg(long, value_enum, default_value_t = Pattern::Sequential)]
    pattern: Pattern,

    /// Node k seeds its generator with `seed + k`.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Print every node's data and prefix sums.
    #[arg(long)]
    print: bool,

    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,
}

struct NodeReport {
    data: Vec<i64>,
    scan: Vec<i64>,
    trials: Trials,
    total: i64,
    stats: MessageStats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    bench::init_tracing(cli.verbose);

    let setup = checked_len(cli.num_ints)
        .and_then(|n| Ok((n, DistributedConfig::try_new(cli.nodes)?)));
    let (n, config) = match setup {
        Ok(setup) => setup,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };
    let nodes = config.nodes;
    info!(n, nodes, iterations = cli.iterations, "executing distributed scan");

    let reports = distributed::launch(nodes, |comm| {
        let rank = comm.rank();
        let partition = Partition::of(rank, nodes, n);
        debug!(rank, start = partition.start, len = partition.len, "allocating partition");
        let data = input::generate(cli.pattern, partition.range(), cli.seed + rank as u64)?;

        let mut carry = Carry::default();
        let (scan, trials) = bench::time_trials(cli.iterations, &data, |nums| {
            comm.barrier()?;
            carry = distributed::prefix_sum(comm, nums)?;
            Ok(())
        })?;
        let total = distributed::global_total(comm, carry)?;

        if cli.print {
            bench::print_array(&format!("Node {rank} Data"), &data);
            bench::print_array(&format!("Node {rank} Psums"), &scan);
        }

        Ok(NodeReport {
            data,
            scan,
            trials,
            total,
            stats: comm.stats(),
        })
    })?;

    let data: Vec<i64> = reports.iter().flat_map(|r| r.data.iter().copied()).collect();
    let scan: Vec<i64> = reports.iter().flat_map(|r| r.scan.iter().copied()).collect();
    let check = oracle::verify(&data, &scan);
    if let Err(mismatch) = &check {
        error!("{mismatch}");
    }

    let messages: usize = reports.iter().map(|r| r.stats.sent).sum();
    info!(total = reports[0].total, messages, "all nodes finished");

    let avg_usec = reports
        .iter()
        .map(|r| r.trials.average_usec())
        .fold(0.0, f64::max);

    Record {
        model: "distributed",
        schedule: None,
        num_ints: n,
        workers: nodes,
        iterations: cli.iterations,
        avg_usec,
        correct: check.is_ok(),
    }
    .print(cli.json)?;

    if check.is_err() {
        std::process::exit(3);
    }
    Ok(())
}
