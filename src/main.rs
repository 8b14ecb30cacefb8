// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

use std::collections::BTreeMap;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tiling_factors::numeric::tiling;
use tiling_factors::{Assignment, Factors, GivenFactors, ResidualFactors, Result, SpatialBound};

#[derive(Parser)]
#[command(name = "tilefactors")]
#[command(author, version, about = "Enumerate tilings of a loop bound across nested levels")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Exact ordered factorizations
    Factors {
        /// Loop bound to decompose
        n: u64,

        /// Number of tiling levels
        #[arg(short, long)]
        order: usize,

        /// Pin a factor, as POSITION=VALUE
        #[arg(long, value_name = "P=V")]
        given: Vec<Assignment>,

        /// Drop tuples above a per-position maximum, as POSITION=MAX
        #[arg(long, value_name = "P=MAX")]
        max: Vec<Assignment>,
    },

    /// Factorizations with a partial boundary tile
    Residual {
        /// Loop bound to decompose
        n: u64,

        /// Number of tiling levels
        #[arg(short, long)]
        order: usize,

        /// Spatial capacity of a position (0 = innermost), as POSITION=CAPACITY
        #[arg(long, value_name = "P=CAP")]
        spatial: Vec<Assignment>,

        /// Pin a factor (0 = innermost), as POSITION=VALUE
        #[arg(long, value_name = "P=V")]
        given: Vec<Assignment>,
    },

    /// Near-square height x width layout for a number of elements
    Tiling {
        num_elems: u64,
    },
}

fn given_factors(assignments: &[Assignment]) -> GivenFactors {
    assignments.iter().map(|a| (a.position, a.value)).collect()
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Factors { n, order, given, max } => {
            let mut factors = Factors::try_with_given(n, order, &given_factors(&given))?;
            if !max.is_empty() {
                let max: BTreeMap<usize, u64> = max.iter().map(|a| (a.position, a.value)).collect();
                factors.try_prune_max(&max)?;
            }
            factors.print();
            println!("{} factorizations", factors.len());
        }
        Commands::Residual {
            n,
            order,
            spatial,
            given,
        } => {
            let spatial: Vec<SpatialBound> = spatial
                .iter()
                .map(|a| SpatialBound {
                    position: a.position,
                    capacity: a.value,
                })
                .collect();
            let factors = ResidualFactors::try_with_given(n, order, &spatial, &given_factors(&given))?;
            factors.print();
            println!("{} decompositions", factors.len());
        }
        Commands::Tiling { num_elems } => {
            let (height, width) = tiling(num_elems);
            println!("{} = {} x {}", num_elems, height, width);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
