//! Eval command - evaluate recorded trajectories
//!
//! Usage:
//! ```bash
//! # Legacy single-file success rate
//! sabot eval travel_planning results/run.json
//!
//! # Group-mean counterfactual effect
//! sabot eval travel_planning --ref-paths ref.json --int-paths int.json \
//!     --group-by id+target --res-path ase.csv
//!
//! # Seed-paired counterfactual effect
//! sabot eval travel_planning --ref-paths ref.json --int-paths int.json --pairwise
//! ```

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use sabot_core::{Datapoint, EnvironmentKind};
use sabot_eval::{
    estimate_grouped, estimate_pairwise, samples_path, success_rate, write_group_report,
    write_pair_report, write_sample_report, GroupBy,
};
use sabot_runtime::load_datapoints;
use std::path::{Path, PathBuf};

fn parse_group_by(raw: &str) -> Result<GroupBy, String> {
    match raw {
        "id" => Ok(GroupBy::Id),
        "id+target" => Ok(GroupBy::IdTarget),
        other => Err(format!("unknown grouping '{other}' (expected 'id' or 'id+target')")),
    }
}

/// Arguments for the eval command
#[derive(Args)]
pub struct EvalArgs {
    /// Task environment the trajectories came from
    environment: EnvironmentKind,

    /// Single results file (legacy success-rate mode)
    path: Option<PathBuf>,

    /// Summary CSV output path (a *_samples.csv companion is written too)
    #[arg(long)]
    res_path: Option<PathBuf>,

    /// Trajectory files from the reference arm (no intervention)
    #[arg(long, num_args = 1..)]
    ref_paths: Vec<PathBuf>,

    /// Trajectory files from the intervention arm
    #[arg(long, num_args = 1..)]
    int_paths: Vec<PathBuf>,

    /// Grouping granularity: "id" or "id+target"
    #[arg(long, default_value = "id+target", value_parser = parse_group_by)]
    group_by: GroupBy,

    /// Pair samples on (id, run_idx) instead of grouping; overrides --group-by
    #[arg(long)]
    pairwise: bool,
}

fn load_many(paths: &[PathBuf]) -> Result<Vec<Datapoint>> {
    let mut all = Vec::new();
    for path in paths {
        let datapoints = load_datapoints(path)
            .with_context(|| format!("failed to load trajectories from {}", path.display()))?;
        all.extend(datapoints);
    }
    Ok(all)
}

/// Run the eval command
pub fn run(args: EvalArgs) -> Result<()> {
    if args.ref_paths.is_empty() && args.int_paths.is_empty() {
        return legacy(&args);
    }
    if args.ref_paths.is_empty() || args.int_paths.is_empty() {
        bail!("counterfactual mode needs both --ref-paths and --int-paths");
    }

    let ref_data = load_many(&args.ref_paths)?;
    let int_data = load_many(&args.int_paths)?;

    if args.pairwise {
        pairwise(&args, &ref_data, &int_data)
    } else {
        grouped(&args, &ref_data, &int_data)
    }
}

fn legacy(args: &EvalArgs) -> Result<()> {
    let path = args
        .path
        .as_deref()
        .context("provide a results file, or --ref-paths/--int-paths for counterfactual mode")?;
    let data = load_datapoints(path)
        .with_context(|| format!("failed to load trajectories from {}", path.display()))?;

    match success_rate(args.environment, &data)? {
        Some((rate, samples)) => {
            println!("Attack Success Rate: {rate:.4}");
            if let Some(res_path) = &args.res_path {
                write_sample_report(res_path, &samples)?;
                println!("Saved per-sample Y values to {}", res_path.display());
            }
        }
        None => println!("{}", "No datapoints in the results file.".yellow()),
    }
    Ok(())
}

fn grouped(args: &EvalArgs, ref_data: &[Datapoint], int_data: &[Datapoint]) -> Result<()> {
    let report = match estimate_grouped(args.environment, ref_data, int_data, args.group_by)? {
        Some(report) => report,
        None => {
            println!("No overlapping groups between reference and intervention runs.");
            return Ok(());
        }
    };

    if report.any_difference {
        println!("At least one group has different ref vs int expectations.");
    } else {
        println!("No differences found between ref and int Y values (at this granularity).");
    }
    println!("Estimated ASE (averaged over groups): {:.4}", report.effect);
    println!("Number of groups: {}", report.groups.len());

    if let Some(res_path) = &args.res_path {
        write_group_report(res_path, &report)?;
        println!("Saved per-group ASE to {}", res_path.display());
        println!(
            "Saved per-sample Y values to {}",
            samples_path(res_path).display()
        );
    }
    Ok(())
}

fn pairwise(args: &EvalArgs, ref_data: &[Datapoint], int_data: &[Datapoint]) -> Result<()> {
    let report = match estimate_pairwise(args.environment, ref_data, int_data)? {
        Some(report) => report,
        None => {
            println!("No overlapping (id, run_idx) keys between reference and intervention runs.");
            return Ok(());
        }
    };

    println!(
        "Pairwise counterfactual effect (mean Y_int - Y_ref over pairs): {:.4}",
        report.effect
    );
    println!("Number of matched pairs: {}", report.pairs.len());

    match pair_output(args.res_path.as_deref()) {
        PairOutput::Summary(res_path) => {
            write_pair_report(&res_path, &report)?;
            println!("Saved per-pair counterfactual effects to {}", res_path.display());
            println!(
                "Saved per-sample Y values to {}",
                samples_path(&res_path).display()
            );
        }
        PairOutput::SamplesOnly(path) => {
            write_sample_report(&path, &report.samples)?;
            println!("Saved per-sample Y values to {}", path.display());
        }
    }
    Ok(())
}

enum PairOutput {
    Summary(PathBuf),
    SamplesOnly(PathBuf),
}

/// The per-pair summary is written only when a summary path was requested;
/// without one, just the sample table goes to the default file.
fn pair_output(res_path: Option<&Path>) -> PairOutput {
    match res_path {
        Some(path) => PairOutput::Summary(path.to_path_buf()),
        None => PairOutput::SamplesOnly(PathBuf::from("counterfactual_samples.csv")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_summary_is_gated_on_the_requested_path() {
        match pair_output(Some(Path::new("out/pairs.csv"))) {
            PairOutput::Summary(path) => assert_eq!(path, PathBuf::from("out/pairs.csv")),
            PairOutput::SamplesOnly(_) => panic!("expected the pair summary"),
        }
        match pair_output(None) {
            PairOutput::SamplesOnly(path) => {
                assert_eq!(path, PathBuf::from("counterfactual_samples.csv"));
            }
            PairOutput::Summary(_) => panic!("expected the sample table only"),
        }
    }
}
