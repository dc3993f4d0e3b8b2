//! Command line front end for the brewing water optimizer.

mod report;
mod request;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use water_opt::{AdditiveId, OptimizerSettings, WaterOptimizer};

use report::{CatalogTable, Report};
use request::{parse_profile, SolveRequest};

#[derive(Parser, Debug)]
#[command(name = "water-opt", version, about = "Brewing water salt optimizer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find salt additions that bring a base water closest to a target
    Solve {
        /// Water volume in liters
        #[arg(long, required_unless_present = "request")]
        volume: Option<f64>,

        /// Base profile as Ca,Mg,Na,SO4,Cl,HCO3 in ppm
        #[arg(long, required_unless_present = "request")]
        base: Option<String>,

        /// Target profile as Ca,Mg,Na,SO4,Cl,HCO3 in ppm
        #[arg(long, required_unless_present = "request")]
        target: Option<String>,

        /// Read volume, base, and target from a JSON file
        #[arg(long, conflicts_with_all = ["volume", "base", "target"])]
        request: Option<PathBuf>,

        /// Cap each salt at its solubility limit
        #[arg(long)]
        solubility: bool,

        /// Forbid a salt (repeatable), e.g. --disable table_salt
        #[arg(long = "disable", value_name = "ADDITIVE")]
        disabled: Vec<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Log solver progress
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the salts the optimizer can use
    Catalog,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Solve {
            volume,
            base,
            target,
            request,
            solubility,
            disabled,
            json,
            verbose,
        } => {
            let request = match request {
                Some(path) => SolveRequest::load_json(path)?,
                None => from_args(volume, base.as_deref(), target.as_deref())?,
            };

            let mut settings = OptimizerSettings::from_env();
            settings.verbose = verbose;
            if solubility {
                settings = settings.with_solubility(true);
            }
            for name in &disabled {
                let id: AdditiveId = name.parse()?;
                settings = settings.with_disabled(id);
            }

            let optimizer = WaterOptimizer::new(settings);
            let result = optimizer
                .solve(request.volume, &request.base, &request.target)
                .context("Optimization failed")?;

            if json {
                let text = serde_json::to_string_pretty(&result)
                    .context("Failed to serialize result")?;
                println!("{}", text);
            } else {
                print!("{}", Report(&result));
            }
        }
        Command::Catalog => print!("{}", CatalogTable),
    }

    Ok(())
}

fn from_args(volume: Option<f64>, base: Option<&str>, target: Option<&str>) -> Result<SolveRequest> {
    let (Some(volume), Some(base), Some(target)) = (volume, base, target) else {
        bail!("--volume, --base, and --target are required without --request");
    };
    Ok(SolveRequest {
        volume,
        base: parse_profile(base).context("Invalid --base")?,
        target: parse_profile(target).context("Invalid --target")?,
    })
}
