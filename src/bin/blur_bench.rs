use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::info;

use blur_partition::bench::{self, BenchReport};
use blur_partition::config::BenchConfig;
use blur_partition::logging::{init_logging, LoggingConfig};
use blur_partition::{Operation, Picture, SpawnPolicy, Strategy};

/// Compares sequential and parallel box-blur partitions.
#[derive(Parser, Debug)]
#[command(name = "blur_bench", version, about)]
struct Cli {
    /// Log filter in env_logger syntax, overrides the config file and RUST_LOG
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Time every strategy on one picture and check they agree
    Bench(BenchArgs),
    /// Apply a chain of operations to a picture and save the result
    Apply(ApplyArgs),
}

#[derive(Parser, Debug)]
struct BenchArgs {
    /// TOML file with benchmark settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Picture to blur; a seeded random picture is used otherwise
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Where to save the output of the last strategy
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Timed passes per strategy
    #[arg(short, long)]
    runs: Option<usize>,

    /// Strategy to run (repeatable); defaults to all of them
    #[arg(short, long = "strategy")]
    strategies: Vec<Strategy>,

    /// Synthetic picture width
    #[arg(long)]
    width: Option<usize>,

    /// Synthetic picture height
    #[arg(long)]
    height: Option<usize>,

    /// Synthetic picture seed
    #[arg(long)]
    seed: Option<u64>,

    /// Cap on live workers per pass (0 = unlimited)
    #[arg(long)]
    max_in_flight: Option<usize>,
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    input: PathBuf,
    output: PathBuf,

    /// invert, grayscale, rotate:<90|180|270>, flip:<H|V>, blur[:<strategy>]
    #[arg(short = 'o', long = "op", required = true)]
    operations: Vec<Operation>,
}

impl BenchArgs {
    fn into_config(self) -> Result<BenchConfig> {
        let mut config = match &self.config {
            Some(path) => BenchConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => BenchConfig::default(),
        };

        if self.input.is_some() {
            config.input = self.input;
        }
        if self.output.is_some() {
            config.output = self.output;
        }
        if let Some(runs) = self.runs {
            config.runs = runs;
        }
        if !self.strategies.is_empty() {
            config.strategies = self.strategies;
        }
        if let Some(width) = self.width {
            config.synthetic.width = width;
        }
        if let Some(height) = self.height {
            config.synthetic.height = height;
        }
        if let Some(seed) = self.seed {
            config.synthetic.seed = seed;
        }
        if let Some(limit) = self.max_in_flight {
            config.spawn.max_in_flight = limit;
        }
        Ok(config)
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Command::Bench(args) => {
            let config = args.into_config()?;
            init_logging(LoggingConfig::new(cli.log, &config.logging));
            run_bench(&config)
        }
        Command::Apply(args) => {
            init_logging(LoggingConfig {
                cli_filter: cli.log,
                ..LoggingConfig::default()
            });
            run_apply(args)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_bench(config: &BenchConfig) -> Result<ExitCode> {
    let source = match &config.input {
        Some(path) => Picture::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?,
        None => {
            let s = &config.synthetic;
            info!("no input, using {}x{} noise (seed {})", s.width, s.height, s.seed);
            bench::synthetic_picture(s.width, s.height, s.seed)
        }
    };
    let policy = SpawnPolicy::from(&config.spawn);

    println!(
        "{} {}x{} picture, {} runs per strategy, {} cores",
        "Blurring".bold(),
        source.width(),
        source.height(),
        config.runs.max(1),
        num_cpus::get()
    );

    let report = bench::run(&source, &config.strategies, &policy, config.runs)
        .context("benchmark failed")?;
    print_report(&report);

    if let (Some(path), Some(picture)) = (&config.output, &report.output) {
        picture
            .save(path)
            .with_context(|| format!("failed to save {}", path.display()))?;
        println!("Saved {}", path.display());
    }

    if report.consistent {
        println!("{}", "All strategies agree".green());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{}", "Strategies produced different pictures".bold().red());
        Ok(ExitCode::FAILURE)
    }
}

fn print_report(report: &BenchReport) {
    let baseline = report
        .timings
        .iter()
        .find(|t| t.strategy == Strategy::Sequential)
        .map(|t| t.mean_millis());

    println!(
        "\n{:<12} {:>10} {:>10} {:>10} {:>9} {:>9}",
        "strategy", "mean ms", "min ms", "max ms", "units", "speedup"
    );
    println!("{}", "-".repeat(65));

    for timing in &report.timings {
        let speedup = match baseline {
            Some(base) if timing.mean_millis() > 0.0 => {
                format!("{:.2}x", base / timing.mean_millis())
            }
            _ => "-".to_string(),
        };
        let row = format!(
            "{:<12} {:>10.3} {:>10.3} {:>10.3} {:>9} {:>9}",
            timing.strategy.name(),
            timing.mean_millis(),
            timing.min.as_secs_f64() * 1000.0,
            timing.max.as_secs_f64() * 1000.0,
            timing.last.units,
            speedup
        );
        if timing.last.spawn.failures > 0 {
            println!(
                "{}  ({} spawn failures, {} forced joins)",
                row.yellow(),
                timing.last.spawn.failures,
                timing.last.spawn.forced_joins
            );
        } else {
            println!("{row}");
        }
    }
    println!();
}

fn run_apply(args: ApplyArgs) -> Result<()> {
    let mut picture = Picture::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let policy = SpawnPolicy::default();

    for op in &args.operations {
        op.apply(&mut picture, &policy)
            .with_context(|| format!("operation {op} failed"))?;
        info!("applied {op}");
    }

    picture
        .save(&args.output)
        .with_context(|| format!("failed to save {}", args.output.display()))?;
    println!(
        "{} {} -> {}",
        "Done".green(),
        args.input.display(),
        args.output.display()
    );
    Ok(())
}
