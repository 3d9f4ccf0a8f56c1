//! assetlab CLI: download, assemble, analyze and sample commands.
//!
//! Commands:
//! - `download`: fetch monthly bars from Yahoo Finance, one CSV per asset
//! - `assemble`: derive the combined `Assets.csv` from the per-asset files
//! - `analyze`: run the exploratory pipeline and print a report
//! - `sample`: write a deterministic synthetic combined dataset

use anyhow::{bail, Context, Result};
use assetlab_core::config::PipelineConfig;
use assetlab_core::data::assemble::{assemble_from_dir, write_assembled_csv};
use assetlab_core::data::{
    download_assets, AssetSpec, CircuitBreaker, DownloadRequest, StdoutProgress, YahooProvider,
};
use assetlab_core::data::validate::BalancePolicy;
use assetlab_core::report::{render, ReportFormat};
use assetlab_core::run_pipeline;
use assetlab_core::sample::SampleGenerator;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "assetlab",
    about = "assetlab CLI: monthly multi-asset exploratory analysis"
)]
struct Cli {
    /// Path to a TOML config file. Defaults reproduce the reference layout.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download monthly bars from Yahoo Finance, one CSV per asset.
    Download {
        /// Assets as NAME=SYMBOL (e.g. Gold=GC=F). Defaults to SP500, Gold and BTC.
        #[arg(long = "assets", num_args = 1..)]
        assets: Vec<String>,

        /// Years of history to request.
        #[arg(long)]
        years: Option<u32>,

        /// Directory for the bar files.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Build the combined semicolon-delimited dataset from per-asset bar files.
    Assemble {
        /// Directory holding `<Name>_60meses.csv` files.
        #[arg(long, default_value = ".")]
        in_dir: PathBuf,

        #[arg(long, default_value = "Assets.csv")]
        output: PathBuf,
    },
    /// Run ingestion, normalization, validation and summarization.
    Analyze {
        /// Combined dataset (e.g. Assets.csv).
        input: PathBuf,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Write the report here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Truncate every asset to the shortest history instead of failing.
        #[arg(long, default_value_t = false)]
        truncate: bool,
    },
    /// Write a deterministic synthetic combined dataset.
    Sample {
        /// Rows per asset.
        #[arg(long, default_value_t = 60)]
        months: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long, default_value = "Assets.csv")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Markdown,
    Json,
}

impl From<Format> for ReportFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => ReportFormat::Text,
            Format::Markdown => ReportFormat::Markdown,
            Format::Json => ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,assetlab=info,assetlab_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Download {
            assets,
            years,
            out_dir,
        } => run_download(config, assets, years, out_dir),
        Commands::Assemble { in_dir, output } => run_assemble(&config, &in_dir, &output),
        Commands::Analyze {
            input,
            format,
            output,
            truncate,
        } => run_analyze(config, &input, format.into(), output.as_deref(), truncate),
        Commands::Sample {
            months,
            seed,
            output,
        } => run_sample(months, seed, &output),
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(p) => PipelineConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn run_download(
    mut config: PipelineConfig,
    assets: Vec<String>,
    years: Option<u32>,
    out_dir: Option<PathBuf>,
) -> Result<()> {
    if !assets.is_empty() {
        config.download.assets = assets
            .iter()
            .map(|s| AssetSpec::parse(s))
            .collect::<std::result::Result<_, _>>()
            .map_err(anyhow::Error::msg)?;
    }
    if let Some(years) = years {
        if years == 0 {
            bail!("--years must be at least 1");
        }
        config.download.years = years;
    }
    if let Some(dir) = out_dir {
        config.download.out_dir = dir;
    }
    let dl = &config.download;

    let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
    let provider = YahooProvider::new(circuit_breaker, dl.http_settings())?;
    let request = DownloadRequest {
        assets: &dl.assets,
        years: dl.years,
        interval: dl.interval,
        out_dir: &dl.out_dir,
        file_suffix: &dl.file_suffix,
    };

    let summary = download_assets(&provider, &request, &StdoutProgress);

    for (asset, path) in &summary.written {
        println!("CSV saved: {asset} -> {}", path.display());
    }
    if !summary.all_succeeded() {
        for (asset, err) in &summary.errors {
            eprintln!("Error for {asset}: {err}");
        }
        std::process::exit(1);
    }

    Ok(())
}

fn run_assemble(config: &PipelineConfig, in_dir: &Path, output: &Path) -> Result<()> {
    let dl = &config.download;
    let rows = assemble_from_dir(in_dir, &dl.assets, &dl.file_suffix)
        .with_context(|| format!("failed to assemble bar files in {}", in_dir.display()))?;
    write_assembled_csv(output, &rows)?;
    println!("Wrote {} rows to {}", rows.len(), output.display());
    Ok(())
}

fn run_analyze(
    mut config: PipelineConfig,
    input: &Path,
    format: ReportFormat,
    output: Option<&Path>,
    truncate: bool,
) -> Result<()> {
    if truncate {
        config.balance_policy = BalancePolicy::TruncateToShortest;
    }

    let run = run_pipeline(input, &config)?;
    let source = input.display().to_string();
    let report = render(&run.summary, format, Some(&source))?;

    match output {
        Some(path) => {
            std::fs::write(path, &report)
                .with_context(|| format!("failed to write report {}", path.display()))?;
            println!("Report saved to: {}", path.display());
        }
        None => print!("{report}"),
    }
    Ok(())
}

fn run_sample(months: usize, seed: u64, output: &Path) -> Result<()> {
    if months == 0 {
        bail!("--months must be at least 1");
    }
    let rows = SampleGenerator::new(seed).assembled(months);
    write_assembled_csv(output, &rows)?;
    println!(
        "Wrote {} synthetic rows ({months} per asset, seed {seed}) to {}",
        rows.len(),
        output.display()
    );
    Ok(())
}
