//! canonical-celltype: pick the canonical neuron of a cell type.
//!
//! Reads the connectivity rows of one cell type (JSON exported from
//! neuPrint), runs the analysis and prints the JSON report on stdout.
//! Logs go to stderr; set `RUST_LOG=celltype_rs=debug` for stage details.
//!
//! Run with: cargo run --features cli --bin canonical-celltype -- hemibrain MBON14 --rows rows.json

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use celltype_rs::{export, storage, Analyzer, AnalysisConfig, CellTypeReport, SourceConfig};

#[derive(Parser, Debug)]
#[command(name = "canonical-celltype", version, long_about = None)]
struct Args {
    /// Dataset name, e.g. "hemibrain"
    dataset: String,

    /// Cell type to analyze. Only logged: the rows file must already hold
    /// the connections of this type
    cell_type: String,

    /// JSON array of connection rows for the cell type
    #[arg(long)]
    rows: PathBuf,

    /// JSON file overriding analysis thresholds
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum weight for a connection to become a feature
    #[arg(long)]
    min_weight: Option<u64>,

    /// Drop reference neurons smaller than this fraction of the largest
    #[arg(long)]
    reference_size_fraction: Option<f64>,
}

impl Args {
    /// Thresholds from `--config`, then the individual flags on top.
    fn analysis_config(&self) -> celltype_rs::Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::load(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(min_weight) = self.min_weight {
            config.min_weight = min_weight;
        }
        if self.reference_size_fraction.is_some() {
            config.reference_size_fraction = self.reference_size_fraction;
        }
        Ok(config)
    }
}

async fn run(args: &Args) -> celltype_rs::Result<CellTypeReport> {
    let source = storage::open(&SourceConfig::RowsFile { path: args.rows.clone() });
    let analyzer = Analyzer::with_source(source).with_config(args.analysis_config()?);
    analyzer.analyze(&args.dataset, &args.cell_type).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let report = run(&args).await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    export::write_report(&report, &mut out)?;
    out.flush()?;
    Ok(())
}
