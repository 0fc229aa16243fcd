//! svm-bench
//!
//! Command-line driver running one experiment per selected model family.

use clap::{Parser, ValueEnum};
use linfa::ParamGuard;
use tracing::info;

use linfa_svm_bench::benchmarks::alloc::CountingAllocator;
use linfa_svm_bench::prelude::*;

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

#[derive(Parser)]
#[command(name = "svm-bench")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Benchmark least-squares against classical kernel SVMs", long_about = None)]
struct Cli {
    /// Dataset to benchmark on
    #[arg(long, value_enum, default_value_t = DatasetArg::Iris)]
    dataset: DatasetArg,

    /// Number of generated samples (two moons only)
    #[arg(long, default_value_t = 200)]
    samples: usize,

    /// Standard deviation of the Gaussian noise (two moons only)
    #[arg(long, default_value_t = 0.1)]
    noise: f64,

    /// Model family to benchmark
    #[arg(long, value_enum, default_value_t = FamilyArg::Both)]
    family: FamilyArg,

    /// Tune hyperparameters with cross-validation instead of using the defaults
    #[arg(long)]
    tuned: bool,

    /// Search strategy of tuned runs
    #[arg(long, value_enum, default_value_t = StrategyArg::Grid)]
    strategy: StrategyArg,

    /// Approximate number of grid points
    #[arg(long, default_value_t = 625)]
    goal: usize,

    /// Number of random search samples
    #[arg(long, default_value_t = 100)]
    budget: usize,

    /// Number of cross-validation folds
    #[arg(long, default_value_t = 5)]
    folds: usize,

    /// Fraction of samples used for training
    #[arg(long, default_value_t = 0.6)]
    train_fraction: f64,

    /// Seed for data generation, splitting and random search
    #[arg(long)]
    seed: Option<u64>,

    /// Repetitions of every timed operation
    #[arg(long, default_value_t = 5)]
    repetitions: usize,

    /// Print one JSON record per line
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DatasetArg {
    Iris,
    Moons,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FamilyArg {
    Lssvm,
    Svm,
    Both,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Grid,
    Random,
}

impl Cli {
    fn source(&self) -> DatasetSource {
        match self.dataset {
            DatasetArg::Iris => DatasetSource::Iris,
            DatasetArg::Moons => DatasetSource::TwoMoons {
                samples: self.samples,
                noise: self.noise,
            },
        }
    }

    fn families(&self) -> Vec<ModelFamily> {
        match self.family {
            FamilyArg::Lssvm => vec![ModelFamily::Lssvm],
            FamilyArg::Svm => vec![ModelFamily::KernelSvm],
            FamilyArg::Both => ModelFamily::ALL.to_vec(),
        }
    }

    fn search(&self) -> SearchParams {
        let search = SearchParams::new().n_folds(self.folds);
        match self.strategy {
            StrategyArg::Grid => search.grid(self.goal),
            StrategyArg::Random => search.random(self.budget),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linfa_svm_bench=info".into()),
        )
        .init();

    let cli = Cli::parse();

    // every family sees the same dataset and split
    let seed = cli.seed.unwrap_or_else(rand::random);
    info!(seed, dataset = %cli.source(), "starting benchmark");

    for family in cli.families() {
        let params = ExperimentParams::new(cli.source(), family)
            .train_fraction(cli.train_fraction)
            .seed(seed)
            .benchmark(BenchmarkParams::new().repetitions(cli.repetitions));
        let params = if cli.tuned {
            params.search(cli.search())
        } else {
            params
        };

        let record = params.check()?.run()?;

        if cli.json {
            println!("{}", serde_json::to_string(&record)?);
        } else {
            println!("{}\n", record);
        }
    }

    Ok(())
}
