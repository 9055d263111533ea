//! EPM CLI - runs a package of deployment and test jobs

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;

use epm::backend::Backend;
use epm::config::Endpoints;
use epm::{
    ChainHandler, EpmError, FileSink, FixSuggestion, OutputFormat, Package, RpcBackend, RunConfig,
    Runner,
};

#[derive(Parser)]
#[command(name = "epm")]
#[command(about = "The Eris Package Manager Deploys and Tests Smart Contract Systems")]
#[command(version)]
struct Cli {
    /// Path to package file which EPM should use
    #[arg(short, long, default_value = "./epm.yaml")]
    file: PathBuf,

    /// Path to the contracts EPM should use
    #[arg(short = 'p', long, default_value = "./contracts")]
    contracts_path: PathBuf,

    /// Path to the abi directory EPM should use
    #[arg(short, long, default_value = "./abi")]
    abi_path: PathBuf,

    /// <ip:port> of chain which EPM should use
    #[arg(short, long, default_value = "localhost:46657")]
    chain: String,

    /// <ip:port> of signer daemon which EPM should use
    #[arg(short, long, default_value = "localhost:4767")]
    sign: String,

    /// <ip:port> of compiler which EPM should use
    #[arg(short = 'm', long, default_value = "compilers.eris.industries:8091")]
    compiler: String,

    /// Identifier of the chain to work against (asked from the chain if empty)
    #[arg(short = 'i', long, default_value = "")]
    chain_id: String,

    /// Default gas to use; can be overridden for a single job
    #[arg(short, long, default_value_t = 1_111_111_111)]
    gas: u64,

    /// Default fee to use
    #[arg(long, default_value_t = 1234)]
    fee: u64,

    /// Default amount to use
    #[arg(long, default_value_t = 9999)]
    amount: u64,

    /// Default address to sign with
    #[arg(short = 'u', long, default_value = "")]
    address: String,

    /// Default sets to use; name=value, repeatable or comma separated
    #[arg(short = 'e', long = "set", value_delimiter = ',')]
    sets: Vec<String>,

    /// Output format which EPM should use [csv, json]
    #[arg(short, long, default_value = "csv")]
    output: String,

    /// Print a summary table of job results
    #[arg(long)]
    summary: bool,

    /// Directory epm.csv / epm.json are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Debug level output
    #[arg(short, long)]
    debug: bool,
}

impl Cli {
    fn run_config(&self) -> Result<RunConfig, EpmError> {
        Ok(RunConfig {
            contracts_path: self.contracts_path.clone(),
            abi_path: self.abi_path.clone(),
            endpoints: Endpoints::new(&self.chain, &self.sign, &self.compiler)?,
            chain_id: self.chain_id.clone(),
            default_gas: self.gas,
            default_fee: self.fee,
            default_amount: self.amount,
            default_addr: self.address.clone(),
            default_sets: self.sets.clone(),
            output: OutputFormat::from(self.output.as_str()),
            summary_table: self.summary,
        })
    }

    fn log_level(&self) -> tracing::Level {
        if self.debug {
            tracing::Level::TRACE
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(cli.log_level().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run_package(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        if let Some(suggestion) = e
            .downcast_ref::<EpmError>()
            .and_then(|e| e.fix_suggestion())
        {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn run_package(cli: &Cli) -> anyhow::Result<()> {
    println!("{} Hello! I'm EPM.", "→".cyan());

    let sink = FileSink::new(&cli.output_dir);
    sink.clear()?;

    let mut config = cli.run_config()?;
    let package = Package::load(&cli.file)
        .with_context(|| format!("loading package {}", cli.file.display()))?;

    let mut backend = RpcBackend::new(config.endpoints.clone(), config.chain_id.as_str())?;
    if config.chain_id.is_empty() {
        let chain_id = backend
            .chain_id()
            .with_context(|| format!("asking {} for its chain ID", config.endpoints.chain))?;
        backend.set_chain_id(chain_id.as_str());
        config.chain_id = chain_id;
    }

    println!(
        "{} Chain: {} | id: {} | output: {}",
        "→".cyan(),
        config.endpoints.chain.as_str().cyan(),
        config.chain_id.cyan().bold(),
        cli.output.cyan()
    );

    let mut jobs = package.into_jobs();
    let mut runner = Runner::new(&config, ChainHandler::new(backend), sink);
    runner.run(&mut jobs)?;

    println!("{} {} jobs complete", "✓".green(), jobs.len());
    Ok(())
}
