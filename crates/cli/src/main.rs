use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use specaudit_cli::{pipeline, AppConfig, DEFAULT_CONFIG_FILE};
use specaudit_index::{PreferencePath, Resolver};
use specaudit_oracle::{OpenAiOracle, RetryingOracle};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "specaudit")]
#[command(about = "Check C/C++ code against the specification it implements", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the project and print statistics
    Index,

    /// Look up a function, type or macro in the project index
    Query(QueryArgs),

    /// Build the summary tree of the preferred path with the oracle
    Summarize,

    /// Clean and segment the specification document
    Segment,

    /// Retrieve and verify code for every specification section
    Run,
}

#[derive(Args)]
struct QueryArgs {
    /// Symbol name, e.g. `tcp_input` or `struct tcp_hdr`
    name: String,

    /// Print the functions calling `name` instead of its definition
    #[arg(long)]
    callers: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    init_logging(&cli, &config)?;

    match cli.command {
        Commands::Index => run_index(&config)?,
        Commands::Query(args) => run_query(&config, args)?,
        Commands::Summarize => run_summarize(&config).await?,
        Commands::Segment => run_segment(&config)?,
        Commands::Run => run_pipeline(&config).await?,
    }

    Ok(())
}

fn init_logging(cli: &Cli, config: &AppConfig) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }

    match &config.project.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.target(env_logger::Target::Stderr);
        }
    }
    builder.init();
    Ok(())
}

fn make_oracle(config: &AppConfig) -> Result<RetryingOracle<OpenAiOracle>> {
    let openai = config.oracle.openai_config();
    if openai.api_key.is_none() {
        log::warn!("No oracle API key configured (oracle.api_key or OPENAI_API_KEY)");
    }
    let backend = OpenAiOracle::new(openai).context("Failed to set up the oracle client")?;
    Ok(RetryingOracle::new(backend, config.oracle.retry_policy()))
}

fn run_index(config: &AppConfig) -> Result<()> {
    let index = pipeline::build_index(config)?;
    println!("{}", serde_json::to_string_pretty(index.stats())?);
    Ok(())
}

fn run_query(config: &AppConfig, args: QueryArgs) -> Result<()> {
    let index = pipeline::build_index(config)?;
    let prefer = PreferencePath::new(config.prefer_path());
    let resolver = Resolver::new(&index, &prefer);

    if args.callers {
        let callers = resolver.resolve_caller(&args.name);
        if callers.is_empty() {
            println!("No callers found for `{}`", args.name);
        } else {
            print!("{callers}");
        }
    } else {
        match resolver.query_name(&args.name) {
            Some(text) => println!("{text}"),
            None => println!("No definition found for `{}`", args.name),
        }
    }
    Ok(())
}

async fn run_summarize(config: &AppConfig) -> Result<()> {
    let oracle = make_oracle(config)?;
    let tree = pipeline::summarize(config, &oracle).await?;
    println!(
        "Summarized {} files into {}",
        tree.file_count(),
        config.project.summary_json.display()
    );
    Ok(())
}

fn run_segment(config: &AppConfig) -> Result<()> {
    let sections = pipeline::load_sections(config)?;
    println!("{} sections", sections.len());
    for section in &sections {
        println!("  {}", section.lines().next().unwrap_or_default());
    }
    Ok(())
}

async fn run_pipeline(config: &AppConfig) -> Result<()> {
    let oracle = make_oracle(config)?;
    let summary = pipeline::run(config, &oracle).await?;

    log::info!(
        "Run finished: {} sections, {} verified, {} confirmed, {} skipped, {} failed",
        summary.chunks,
        summary.verified,
        summary.confirmed,
        summary.skipped,
        summary.failed
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);
    println!("Findings written to {}", config.findings_path().display());
    Ok(())
}
