//! Timing and reporting shared by the benchmark binaries.
//!
//! Records are printed one per line on stdout, either CSV-style:
//!   psum,rust,model=shared,schedule=tree,N=10000000,T=8,time,1234.500,usec
//!   psum,rust,model=shared,schedule=tree,N=10000000,T=8,correct,1,boolean
//! or as JSON. Logs go to stderr.

use std::time::Instant;

use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::error::{try_to_vec, Result};

/// Installs the global `tracing` subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Wall-clock time of each trial, in microseconds.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Trials {
    pub usec: Vec<u128>,
}

impl Trials {
    pub fn average_usec(&self) -> f64 {
        if self.usec.is_empty() {
            return 0.0;
        }
        self.usec.iter().sum::<u128>() as f64 / self.usec.len() as f64
    }
}

/// Runs `scan` `iterations` times, each on a fresh copy of `input`, and
/// returns the last result. Only `scan` itself is timed.
pub fn time_trials<F>(iterations: usize, input: &[i64], mut scan: F) -> Result<(Vec<i64>, Trials)>
where
    F: FnMut(&mut [i64]) -> Result<()>,
{
    let mut trials = Trials::default();
    let mut last = Vec::new();
    for iteration in 0..iterations {
        let mut nums = try_to_vec(input)?;
        let start = Instant::now();
        scan(&mut nums)?;
        let usec = start.elapsed().as_micros();
        debug!(iteration, usec, "trial done");
        trials.usec.push(usec);
        last = nums;
    }
    Ok((last, trials))
}

/// One benchmark outcome.
#[derive(Clone, Debug, Serialize)]
pub struct Record {
    pub model: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<&'static str>,
    #[serde(rename = "N")]
    pub num_ints: usize,
    /// Nodes or threads; 1 for the sequential baseline.
    pub workers: usize,
    pub iterations: usize,
    pub avg_usec: f64,
    pub correct: bool,
}

impl Record {
    fn prefix(&self) -> String {
        let mut prefix = format!("psum,rust,model={}", self.model);
        if let Some(schedule) = self.schedule {
            prefix.push_str(&format!(",schedule={schedule}"));
        }
        prefix.push_str(&format!(",N={},T={}", self.num_ints, self.workers));
        prefix
    }

    pub fn csv_lines(&self) -> [String; 2] {
        let prefix = self.prefix();
        [
            format!("{prefix},time,{:.3},usec", self.avg_usec),
            format!("{prefix},correct,{},boolean", u8::from(self.correct)),
        ]
    }

    pub fn print(&self, json: bool) -> serde_json::Result<()> {
        if json {
            println!("{}", serde_json::to_string(self)?);
        } else {
            for line in self.csv_lines() {
                println!("{line}");
            }
        }
        Ok(())
    }
}

/// `Data:` / `Prefix sums:` dump of a (small) array.
pub fn print_array(label: &str, nums: &[i64]) {
    let body: Vec<String> = nums.iter().map(i64::to_string).collect();
    println!("{label}: [{}]", body.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_scan;

    #[test]
    fn trials_scan_fresh_copies() {
        let input = vec![1, 1, 1];
        let mut calls = 0;
        let (last, trials) = time_trials(3, &input, |nums| {
            calls += 1;
            // a scan on a reused buffer would drift past [1, 2, 3]
            local_scan::prefix_sum(nums);
            Ok(())
        })
        .unwrap();
        assert_eq!(calls, 3);
        assert_eq!(last, vec![1, 2, 3]);
        assert_eq!(trials.usec.len(), 3);
    }

    #[test]
    fn average_of_no_trials_is_zero() {
        assert_eq!(Trials::default().average_usec(), 0.0);
        let trials = Trials { usec: vec![10, 20] };
        assert_eq!(trials.average_usec(), 15.0);
    }

    #[test]
    fn csv_and_json_shapes() {
        let record = Record {
            model: "shared",
            schedule: Some("tree"),
            num_ints: 10,
            workers: 4,
            iterations: 2,
            avg_usec: 1.5,
            correct: true,
        };
        let [time, correct] = record.csv_lines();
        assert_eq!(time, "psum,rust,model=shared,schedule=tree,N=10,T=4,time,1.500,usec");
        assert_eq!(correct, "psum,rust,model=shared,schedule=tree,N=10,T=4,correct,1,boolean");

        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(json["N"], 10);
        assert_eq!(json["schedule"], "tree");

        let seq = Record { model: "seq", schedule: None, ..record };
        assert!(serde_json::to_value(&seq).unwrap().get("schedule").is_none());
        assert!(!seq.csv_lines()[0].contains("schedule"));
    }
}
