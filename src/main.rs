use anyhow::{Context, Result};
use article_enricher::{
    config::Config,
    pipeline::{HttpPageSource, Pipeline},
    snapshot,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Append correspondent credits and read counts to an article spreadsheet.
///
/// Flags override the corresponding ENRICH_* environment variables.
#[derive(Parser, Debug)]
#[command(name = "enrich", version)]
struct Cli {
    /// Source spreadsheet (CSV)
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Augmented spreadsheet to write (CSV, UTF-8 with BOM)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Saved publish history page holding the read counts
    #[arg(short, long)]
    snapshot: Option<PathBuf>,
    /// Zero-based column holding the article URL
    #[arg(long)]
    url_column: Option<usize>,
    /// Zero-based column holding the article title
    #[arg(long)]
    title_column: Option<usize>,
    /// Encoding label of the source spreadsheet (e.g. gbk, utf-8)
    #[arg(long)]
    input_encoding: Option<String>,
    /// Pause after every page fetch, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
    /// Start marker, end marker and separator of the credit line (e.g. 文图：)
    #[arg(long)]
    markers: Option<String>,
}

impl Cli {
    fn apply(self, mut config: Config) -> Result<Config> {
        if let Some(path) = self.input {
            config = config.with_input_csv(path);
        }
        if let Some(path) = self.output {
            config = config.with_output_csv(path);
        }
        if let Some(path) = self.snapshot {
            config = config.with_snapshot_html(path);
        }
        config = config.with_columns(self.url_column, self.title_column);
        if let Some(label) = self.input_encoding {
            config = config.with_input_encoding(&label)?;
        }
        if let Some(delay_ms) = self.delay_ms {
            config = config.with_fetch_delay(Duration::from_millis(delay_ms));
        }
        if let Some(markers) = self.markers {
            config = config.with_markers(&markers)?;
        }
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Cli::parse().apply(Config::from_env()?)?;

    info!(
        input = %config.input_csv().display(),
        output = %config.output_csv().display(),
        snapshot = %config.snapshot_html().display(),
        url_column = config.url_column(),
        title_column = config.title_column(),
        input_encoding = config.input_encoding().name(),
        "starting run"
    );

    let index = snapshot::load_index(config.snapshot_html());
    if index.is_empty() {
        info!("no read counts available; every row will be reported as not matched");
    }

    let pipeline = Pipeline::new(HttpPageSource, config.pipeline_settings());
    let summary = pipeline
        .run(config.input_csv(), config.output_csv(), &index)
        .await
        .with_context(|| format!("run over {} failed", config.input_csv().display()))?;

    info!(
        rows = summary.rows,
        output = %config.output_csv().display(),
        "done"
    );
    Ok(())
}
