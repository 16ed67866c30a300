//! Solve the same consumer under a range of discount factors
//!
//! Scenarios run in parallel; the sampled consumption functions are written
//! to one long-format CSV (disc_fac, m, c).

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use cons_saving::{Agent, AgentKind, ParameterSet, Scenario, SweepRunner};

#[derive(Debug, Parser)]
#[command(name = "disc_fac_sweep", about = "Consumption functions across discount factors")]
struct Args {
    /// Solve the shock model instead of perfect foresight
    #[arg(long)]
    ind_shock: bool,

    /// JSON parameter file for the base agent
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 0.90)]
    from: f64,

    #[arg(long, default_value_t = 0.96)]
    to: f64,

    #[arg(long, default_value_t = 7)]
    steps: usize,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    m_min: f64,

    #[arg(long, default_value_t = 10.0)]
    m_max: f64,

    #[arg(long, default_value_t = 41)]
    points: usize,

    #[arg(long, default_value = "disc_fac_sweep.csv")]
    output: PathBuf,
}

#[derive(Debug, Serialize)]
struct SweepRow {
    disc_fac: f64,
    m: f64,
    c: f64,
}

fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => (0..n).map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64).collect(),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    if args.steps == 0 || args.points < 2 {
        bail!("need at least one step and two sample points");
    }

    let kind = if args.ind_shock {
        AgentKind::IndShock
    } else {
        AgentKind::PerfectForesight
    };
    let base = match &args.config {
        Some(path) => Agent::from_config_file(kind, path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => match kind {
            AgentKind::PerfectForesight => {
                Agent::perfect_foresight(ParameterSet::perfect_foresight_example())?
            }
            AgentKind::IndShock => Agent::ind_shock(ParameterSet::ind_shock_example())?,
        },
    };

    let disc_facs = linspace(args.from, args.to, args.steps);
    let scenarios = Scenario::sweep("DiscFac", &disc_facs);
    let grid = linspace(args.m_min, args.m_max, args.points);

    println!("Solving {} scenarios...", scenarios.len());
    let start = Instant::now();
    let runner = SweepRunner::new(base);
    let results = runner.run_scenarios(&scenarios);
    println!("Solved in {:?}", start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut failures = 0;
    for (disc_fac, result) in disc_facs.iter().zip(&results) {
        let agent = match &result.agent {
            Ok(agent) => agent,
            Err(e) => {
                eprintln!("{}: {}", result.label, e);
                failures += 1;
                continue;
            }
        };
        let Some(first) = agent.first_solution() else {
            continue;
        };
        for &m in &grid {
            writer.serialize(SweepRow {
                disc_fac: *disc_fac,
                m,
                c: first.consumption(m),
            })?;
        }
        println!(
            "{:<14} c(1) = {:>10.6}  MPC limit = {:.6}",
            result.label,
            first.consumption(1.0),
            first.mpc_min
        );
    }
    writer.flush()?;

    println!("Wrote {}", args.output.display());
    if failures > 0 {
        bail!("{} of {} scenarios failed", failures, results.len());
    }
    Ok(())
}
