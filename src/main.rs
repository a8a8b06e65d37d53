// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use threat_ingest::utils::logging::{
    format_error, format_info, format_observable, format_status, format_success, format_warning,
};
use threat_ingest::{
    Collaborators, Config, ConfigRuleSource, ContentExtractor, Document, DocumentAnalyzer,
    DocumentMetadata, FileClassifier, FileProcessor, FileScanner, InMemoryDocumentStore,
    InMemoryGraphStore, InMemoryTagStore, JsonExporter, PipelineOrchestrator, PlainTextExtractor,
    ResolutionCache, TagResolver,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "threat_ingest")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Defanged IOC extraction and tag resolution for threat reports", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the observables found in a single file
    Extract {
        file: PathBuf,

        /// Emit JSON instead of a listing
        #[arg(long)]
        json: bool,
    },

    /// Analyze every file under a directory as one document
    Analyze {
        dir: PathBuf,

        #[arg(short, long, default_value = "./exports")]
        output: PathBuf,

        #[arg(short, long)]
        pretty: bool,

        /// Register the document in the graph once analysis completes
        #[arg(long)]
        auto_register: bool,

        #[arg(long)]
        title: Option<String>,
    },

    /// Show what labels rewrite and resolve to
    Resolve {
        #[arg(required = true)]
        labels: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    threat_ingest::utils::logging::init_logger(cli.color, cli.verbose);
    colored::control::set_override(cli.color);

    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::default_config()
    };
    config.validate().context("Invalid configuration")?;

    match cli.command {
        Commands::Extract { file, json } => {
            cmd_extract(&config, &file, json).await?;
        }
        Commands::Analyze {
            dir,
            output,
            pretty,
            auto_register,
            title,
        } => {
            cmd_analyze(&config, &dir, output, pretty, auto_register, title, cli.color).await?;
        }
        Commands::Resolve { labels } => {
            cmd_resolve(&config, &labels).await?;
        }
    }

    Ok(())
}

async fn cmd_extract(config: &Config, file: &Path, json: bool) -> Result<()> {
    let bytes = std::fs::read(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let mime_type = FileClassifier::new().mime_type(file);

    let content = PlainTextExtractor::new()
        .extract(&bytes, mime_type)
        .await
        .context("Failed to extract text")?;

    let processor = FileProcessor::new(
        config.clone(),
        Arc::new(PlainTextExtractor::new()),
        Arc::new(InMemoryTagStore::new()),
        Arc::new(InMemoryGraphStore::new()),
    )?;
    let observables = processor.extract_observables(&content.text);

    if json {
        println!("{}", serde_json::to_string_pretty(observables.observables())?);
        return Ok(());
    }

    if observables.is_empty() {
        println!("{}", format_warning("No observables found"));
        return Ok(());
    }

    println!(
        "{}",
        format_info(&format!(
            "{} observables in {}",
            observables.len(),
            file.display()
        ))
    );
    for observable in observables.observables() {
        println!("{}", format_observable(observable));
    }

    Ok(())
}

async fn cmd_analyze(
    config: &Config,
    dir: &Path,
    output: PathBuf,
    pretty: bool,
    auto_register: bool,
    title: Option<String>,
    colored: bool,
) -> Result<()> {
    info!("Starting analysis of {}", dir.display());
    let start_time = Instant::now();

    let scanner = FileScanner::new(config.pipeline.clone());
    let files = scanner
        .load_directory(dir)
        .context("Failed to scan directory")?;

    if files.is_empty() {
        println!("{}", format_warning("No eligible files found"));
        return Ok(());
    }
    info!("Found {} files to analyze", files.len());

    let mut document = Document::new(files);
    if auto_register {
        document = document.with_metadata(DocumentMetadata::auto_register());
    }
    if let Some(title) = title {
        document = document.with_title(title);
    }
    let document_id = document.id;

    let documents = Arc::new(InMemoryDocumentStore::new());
    documents.insert(document);

    let collaborators = Collaborators {
        documents: documents.clone(),
        ..Collaborators::in_memory(config)
    };
    let analyzer = DocumentAnalyzer::new(config.clone(), collaborators)?;
    let run = PipelineOrchestrator::new(config, analyzer)
        .with_progress(true, colored)
        .run(vec![document_id])
        .await;

    let Some(report) = run.reports.first() else {
        println!("{}", format_error("Analysis failed, see log for details"));
        return Err(anyhow::anyhow!("Analysis of {} failed", dir.display()));
    };

    let exporter = JsonExporter::new(output)?;
    let manifest = exporter.export_all(&run.reports, &run.stats, pretty)?;

    println!(
        "{}",
        format_success(&format!(
            "Document {} is {} ({} files, {} observables, {} tags)",
            report.document_id,
            format_status(report.status),
            report.files.len(),
            report.observables.len(),
            report.tags.len()
        ))
    );
    for tag in &report.tags {
        println!("  {}", tag);
    }
    if report.files_failed() > 0 {
        println!(
            "{}",
            format_warning(&format!("{} files failed", report.files_failed()))
        );
    }

    info!(
        "Analysis complete in {:.2}s, {} files exported to {}",
        start_time.elapsed().as_secs_f64(),
        manifest.files.len(),
        exporter.output_dir().display()
    );

    Ok(())
}

async fn cmd_resolve(config: &Config, labels: &[String]) -> Result<()> {
    let store = InMemoryTagStore::new();
    let resolver = TagResolver::load(&ConfigRuleSource::from_config(&config.tagging)).await?;
    let mut cache = ResolutionCache::new();

    for label in labels {
        let rewritten = resolver.rewrite(label);
        if rewritten.is_empty() {
            println!("{}", format_warning(&format!("{} rewrites to nothing", label)));
            continue;
        }

        let tags = resolver
            .resolve_labels(std::slice::from_ref(label), &mut cache, &store)
            .await;
        if tags.is_empty() {
            println!("{}", format_warning(&format!("{} is not a valid label", label)));
            continue;
        }

        let resolved: Vec<String> = tags.iter().map(|t| cache.display_label(t)).collect();
        println!("{} → {}", label, resolved.join(", "));
    }

    Ok(())
}
