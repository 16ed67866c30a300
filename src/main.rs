//! Consumption-saving solver CLI
//!
//! Solves one agent and prints (or writes) its consumption function sampled
//! on a grid of market resources.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use cons_saving::{Agent, AgentKind, ParameterSet};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Model {
    PerfectForesight,
    IndShock,
}

impl From<Model> for AgentKind {
    fn from(model: Model) -> Self {
        match model {
            Model::PerfectForesight => AgentKind::PerfectForesight,
            Model::IndShock => AgentKind::IndShock,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "cons_saving",
    version,
    about = "Solve a consumption-saving model and sample c(m)"
)]
struct Cli {
    /// Consumer model
    #[arg(long, value_enum, default_value_t = Model::IndShock)]
    model: Model,

    /// JSON parameter file; the notebook calibration when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Lowest resource level to sample; defaults to the period's mNrmMin
    #[arg(long, allow_hyphen_values = true)]
    m_min: Option<f64>,

    /// Highest resource level to sample
    #[arg(long, default_value_t = 10.0)]
    m_max: f64,

    #[arg(long, default_value_t = 21)]
    points: usize,

    /// Index into the solution list
    #[arg(long, default_value_t = 0)]
    period: usize,

    /// Write samples to this CSV file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SampleRow {
    m: f64,
    c: f64,
    mpc: f64,
    value: Option<f64>,
}

fn sample_grid(lo: f64, hi: f64, points: usize) -> Vec<f64> {
    if points < 2 {
        return vec![lo];
    }
    let step = (hi - lo) / (points - 1) as f64;
    (0..points).map(|i| lo + step * i as f64).collect()
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let kind = AgentKind::from(cli.model);

    let mut agent = match &cli.config {
        Some(path) => Agent::from_config_file(kind, path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => match kind {
            AgentKind::PerfectForesight => {
                Agent::perfect_foresight(ParameterSet::perfect_foresight_example())?
            }
            AgentKind::IndShock => Agent::ind_shock(ParameterSet::ind_shock_example())?,
        },
    };

    agent.solve().context("solving the model")?;

    let solution = agent.solution();
    let Some(period) = solution.get(cli.period) else {
        bail!("period {} out of range: solution has {} periods", cli.period, solution.len());
    };

    let lo = cli.m_min.unwrap_or(period.m_nrm_min);
    if !(cli.m_max > lo) {
        bail!("m_max {} must exceed the lower bound {}", cli.m_max, lo);
    }

    let rows: Vec<SampleRow> = sample_grid(lo, cli.m_max, cli.points)
        .into_iter()
        .map(|m| SampleRow {
            m,
            c: period.consumption(m),
            mpc: period.mpc(m),
            value: period.value(m),
        })
        .collect();

    match &cli.output {
        Some(path) => {
            let mut writer = csv::Writer::from_path(path)
                .with_context(|| format!("creating {}", path.display()))?;
            for row in &rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
            println!("Wrote {} rows to {}", rows.len(), path.display());
        }
        None => {
            println!(
                "{:?} period {} of {}: mNrmMin {:.6}, hNrm {:.6}, MPC in [{:.6}, {:.6}]",
                kind,
                cli.period,
                solution.len(),
                period.m_nrm_min,
                period.h_nrm,
                period.mpc_min,
                period.mpc_max
            );
            println!("{:>12} {:>12} {:>10}", "m", "c(m)", "MPC");
            println!("{}", "-".repeat(36));
            for row in &rows {
                println!("{:>12.6} {:>12.6} {:>10.6}", row.m, row.c, row.mpc);
            }
        }
    }

    Ok(())
}
