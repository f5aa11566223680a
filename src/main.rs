use bigram_reduce::aggregation::{BigramCounts, DistinctBigrams};
use bigram_reduce::config::{load_config, BigramConfig};
use bigram_reduce::error::{AppResult, BigramError};
use bigram_reduce::execution::{
    read_lines, share, split_records, AggregationDriver, FilePartition, SharedPartition, Topology,
};
use bigram_reduce::finalize::{
    finalize, finalize_distinct, AggregationReport, FinalizeMode, FormatType, OutputFormatter,
};
use bigram_reduce::DEMO_CORPUS;
use clap::{Args, Parser, Subcommand};
use std::io::BufReader;
use std::path::PathBuf;
use tracing::{debug, error, trace};

/// Count token bigrams across a partitioned corpus
#[derive(Parser)]
#[command(name = "bigram-reduce", version)]
#[command(about = "Count token bigrams across a partitioned corpus", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file (default: ./bigram-reduce.toml if present)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count bigrams in files, or stdin when no files are given
    Count(CountArgs),
    /// Run the built-in toy corpus and print the count histogram
    Demo {
        /// Output format
        #[arg(long, value_enum)]
        format: Option<FormatType>,
    },
}

#[derive(Args)]
struct CountArgs {
    /// Input files, one record per line
    files: Vec<PathBuf>,

    /// Split the input into N partitions (default: one partition per file)
    #[arg(short = 'p', long)]
    partitions: Option<usize>,

    /// Reduce topology
    #[arg(long, value_enum)]
    topology: Option<Topology>,

    /// Maximum partitions mapped at once
    #[arg(long)]
    max_parallel: Option<usize>,

    /// Extra attempts for a partition that fails transiently
    #[arg(long)]
    max_retries: Option<u32>,

    /// Keep token case instead of lowercasing
    #[arg(long)]
    keep_case: bool,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<FormatType>,

    #[command(flatten)]
    mode: ModeArgs,
}

#[derive(Args)]
#[group(required = false, multiple = false)]
struct ModeArgs {
    /// Emit the K most frequent bigrams
    #[arg(short = 'k', long)]
    top: Option<usize>,

    /// Emit the full frequency table
    #[arg(long)]
    full: bool,

    /// Emit how many bigrams share each count
    #[arg(long)]
    histogram: bool,

    /// Emit the sorted list of distinct bigrams
    #[arg(long)]
    distinct: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match std::env::current_dir()
        .map_err(|e| BigramError::config("cannot determine working directory").with_source(e))
        .and_then(|cwd| load_config(cli.config.as_deref(), &cwd))
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    };

    init_tracing(cli.verbose, config.log_level.as_deref());

    debug!("bigram-reduce started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    let result = match cli.command {
        Commands::Count(args) => run_count(args, config).await,
        Commands::Demo { format } => run_demo(format, config).await,
    };

    if let Err(e) = result {
        error!("Fatal error: {:#}", e);
        let exit_code = match e.downcast_ref::<BigramError>() {
            Some(err) => {
                eprintln!("Error: {}", err.user_message());
                err.exit_code()
            }
            None => {
                eprintln!("Error: {e:#}");
                1
            }
        };
        std::process::exit(exit_code);
    }
}

fn init_tracing(verbose: u8, configured: Option<&str>) {
    let log_level = match verbose {
        0 => configured.unwrap_or("info"),
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_line_number(verbose >= 2)
        .init();
}

async fn run_count(args: CountArgs, mut config: BigramConfig) -> AppResult<()> {
    if let Some(partitions) = args.partitions {
        config.partitions = partitions;
    }
    if let Some(topology) = args.topology {
        config.topology = topology;
    }
    if let Some(max_parallel) = args.max_parallel {
        config.max_parallel = max_parallel;
    }
    if let Some(max_retries) = args.max_retries {
        config.max_retries = max_retries;
    }
    if let Some(top) = args.mode.top {
        config.top_k = top;
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    if args.keep_case {
        config.lowercase = false;
    }
    config.validate()?;

    let partitions = build_partitions(&args.files, args.partitions.is_some(), &config)?;

    let mode = if args.mode.full {
        Some(FinalizeMode::Full)
    } else if args.mode.histogram {
        Some(FinalizeMode::Histogram)
    } else if args.mode.distinct {
        None
    } else {
        Some(FinalizeMode::TopK(config.top_k))
    };

    let report = aggregate(&partitions, mode, &config).await?;
    print!("{}", OutputFormatter::new(config.format).format(&report)?);
    Ok(())
}

async fn run_demo(format: Option<FormatType>, mut config: BigramConfig) -> AppResult<()> {
    if let Some(format) = format {
        config.format = format;
    }

    let records = DEMO_CORPUS.iter().map(|l| l.as_bytes().to_vec()).collect();
    let partitions = share(split_records(records, config.partitions));

    let report = aggregate(&partitions, Some(FinalizeMode::Histogram), &config).await?;
    print!("{}", OutputFormatter::new(config.format).format(&report)?);
    Ok(())
}

/// `None` selects the distinct-bigram accumulator
async fn aggregate(
    partitions: &[SharedPartition],
    mode: Option<FinalizeMode>,
    config: &BigramConfig,
) -> AppResult<AggregationReport> {
    let driver = AggregationDriver::new(config.tokenizer(), config.driver_config());

    let report = match mode {
        Some(mode) => finalize(driver.execute::<BigramCounts>(partitions).await?, mode)?,
        None => finalize_distinct(driver.execute::<DistinctBigrams>(partitions).await?)?,
    };
    Ok(report)
}

/// One partition per file, unless an explicit partition count asks for an
/// even split of all records
fn build_partitions(
    files: &[PathBuf],
    explicit_split: bool,
    config: &BigramConfig,
) -> AppResult<Vec<SharedPartition>> {
    if !files.is_empty() && !explicit_split {
        let partitions = files
            .iter()
            .enumerate()
            .map(|(id, path)| FilePartition::new(id, path))
            .collect();
        return Ok(share(partitions));
    }

    let mut records = Vec::new();
    if files.is_empty() {
        for line in read_lines(BufReader::new(std::io::stdin())) {
            records.push(line.map_err(|e| BigramError::from(e).with_context("stdin"))?);
        }
    } else {
        for path in files {
            let file = std::fs::File::open(path)
                .map_err(|e| BigramError::from(e).with_context(path.display()))?;
            for line in read_lines(BufReader::new(file)) {
                records.push(line.map_err(|e| BigramError::from(e).with_context(path.display()))?);
            }
        }
    }

    debug!(
        "Loaded {} record(s) into {} partition(s)",
        records.len(),
        config.partitions
    );
    Ok(share(split_records(records, config.partitions)))
}
