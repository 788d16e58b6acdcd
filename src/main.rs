use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::{info, Instrument};

use provenance_charts::app::ports::ChartOutputPort;
use provenance_charts::app::{ChartKind, ChartUseCase, LoadUseCase, NormalizeUseCase};
use provenance_charts::config::Config;
use provenance_charts::infra::{AssetLoader, DirectoryChartOutput, FileChartOutput, StdoutChartOutput};
use provenance_charts::pipeline::filter::FilterCriteria;
use provenance_charts::pipeline::normalize::DefaultNormalizer;
use provenance_charts::{logging, observability};

#[derive(Parser)]
#[command(name = "provenance-charts")]
#[command(about = "Chart-ready aggregations over a dataset-provenance data summary")]
#[command(version = "0.1.0")]
struct Cli {
    /// Config file (defaults to PROVENANCE_CHARTS_CONFIG, then config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Data summary path or URL, overriding the config
    #[arg(long, global = true)]
    data: Option<String>,
    /// Write a Prometheus text snapshot of the run's metrics here
    #[arg(long, global = true)]
    metrics_file: Option<PathBuf>,
    /// Write the chart to this file instead of stdout
    #[arg(long, global = true)]
    output: Option<PathBuf>,
    #[command(flatten)]
    filters: FilterArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FilterArgs {
    /// Keep a single collection
    #[arg(long, global = true)]
    collection: Option<String>,
    /// Most restrictive license use to keep (Commercial, Unspecified, Non-Commercial, Unclear, Academic-Only)
    #[arg(long, global = true)]
    license_use: Option<String>,
    #[arg(long, global = true)]
    max_attribution: Option<u64>,
    #[arg(long, global = true)]
    max_share_alike: Option<u64>,
    /// Language groups (comma-separated, "All" disables)
    #[arg(long, global = true, value_delimiter = ',')]
    languages: Vec<String>,
    /// Task groups (comma-separated, "All" disables)
    #[arg(long, global = true, value_delimiter = ',')]
    tasks: Vec<String>,
    /// Domain groups (comma-separated, "All" disables)
    #[arg(long, global = true, value_delimiter = ',')]
    domains: Vec<String>,
    /// Earliest estimated creation date (YYYY-MM-DD)
    #[arg(long, global = true)]
    start: Option<NaiveDate>,
    /// Latest estimated creation date (YYYY-MM-DD)
    #[arg(long, global = true)]
    end: Option<NaiveDate>,
}

impl FilterArgs {
    fn into_criteria(self) -> FilterCriteria {
        FilterCriteria {
            collection: self.collection,
            license_use: self.license_use,
            max_attribution: self.max_attribution,
            max_share_alike: self.max_share_alike,
            languages: self.languages,
            task_categories: self.tasks,
            domains: self.domains,
            start: self.start,
            end: self.end,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the normalized records
    Normalize,
    /// Build a single chart by kind
    Chart {
        /// One of: normalized, tasks-sunburst, creator-sunburst, license-topics, language-map,
        /// creator-map, source-tree, text-metrics-licenses, text-metrics-synthetic,
        /// summary-metrics, collection-table
        kind: String,
    },
    /// Sunburst of a record field bucketed by a group table
    Sunburst {
        /// Group table path or URL
        #[arg(long)]
        groups: String,
        /// Record field to count (e.g. tasks, creators, languages)
        #[arg(long)]
        field: String,
    },
    /// Two-level counts of one record field under another
    Nested {
        #[arg(long)]
        parent: String,
        #[arg(long)]
        child: String,
    },
    /// Write every chart whose inputs are configured
    Export {
        /// Output directory (defaults to the configured one)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Per-dataset license resolution under every aggregator
    Licenses,
    /// Summary counts and distinct field values for one dataset
    Inspect {
        /// Unique dataset identifier (falls back to the registry key)
        uid: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    logging::init_logging(&config.logging.dir, &config.logging.file_name);
    if cli.metrics_file.is_some() {
        observability::init()?;
    }

    let loader = LoadUseCase::new(Box::new(AssetLoader::default()));
    let data = cli.data.clone().unwrap_or_else(|| config.data.summary.clone());
    let raw = loader
        .load_registry(&data)
        .await
        .with_context(|| format!("loading data summary from {}", data))?;
    let inputs = loader
        .load_inputs(&config.constants, &config.geography)
        .await
        .context("loading reference tables")?;

    let normalize = NormalizeUseCase::new(Box::new(DefaultNormalizer::new(
        config.normalize.known_generators.clone(),
    )));
    let criteria = cli.filters.into_criteria();
    let raw = normalize.prepare(
        raw,
        inputs.license_classifier.as_ref(),
        &criteria,
        inputs.filter_tables(),
    )?;

    let output: Box<dyn ChartOutputPort> = match (&cli.command, &cli.output) {
        (Commands::Export { dir }, _) => Box::new(DirectoryChartOutput::new(
            dir.clone().unwrap_or_else(|| config.output.dir.clone()),
        )?),
        (_, Some(path)) => Box::new(FileChartOutput::new(path)),
        (_, None) => Box::new(StdoutChartOutput),
    };
    let charts = ChartUseCase::new(normalize, output);

    match cli.command {
        Commands::Normalize => {
            charts.render(ChartKind::Normalized, &raw, &inputs).await?;
        }
        Commands::Chart { kind } => {
            let kind: ChartKind = kind.parse()?;
            let span = tracing::info_span!("chart", kind = %kind);
            charts.render(kind, &raw, &inputs).instrument(span).await?;
        }
        Commands::Sunburst { groups, field } => {
            let table = loader.load_group_table(&groups).await?;
            charts.sunburst(&raw, &table, field.parse()?).await?;
        }
        Commands::Nested { parent, child } => {
            charts.nested(&raw, parent.parse()?, child.parse()?).await?;
        }
        Commands::Export { .. } => {
            let summary = charts
                .export(&raw, &inputs)
                .instrument(tracing::info_span!("export"))
                .await?;
            println!("\n📊 Export Results:");
            println!("   Written: {}", summary.written.len());
            for (kind, missing) in &summary.skipped {
                println!("   Skipped {} (missing {})", kind, missing);
            }
        }
        Commands::Licenses => {
            charts.licenses(&raw, &inputs).await?;
        }
        Commands::Inspect { uid } => {
            charts.inspect(&raw, &uid).await?;
        }
    }

    if let Some(path) = &cli.metrics_file {
        if let Some(snapshot) = observability::render() {
            std::fs::write(path, snapshot)
                .with_context(|| format!("writing metrics to {}", path.display()))?;
            info!(path = %path.display(), "Wrote metrics snapshot");
        }
    }

    Ok(())
}
