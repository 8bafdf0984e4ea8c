//! Tabula CLI - run pipelines, previews and widget queries over JSON datasets.

#![allow(
    clippy::needless_pass_by_value,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::doc_markdown
)]

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use tabula::etl::TransformStep;
use tabula::manifest::{load_dataset, Manifest, PipelineDocument, Settings};
use tabula::{detect_column_types_with, Dataset, Formula};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "tabula")]
#[command(about = "Tabular transformation and aggregation engine")]
#[command(version)]
struct Cli {
    /// Engine settings (TOML)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer column types of a dataset
    Types {
        /// Dataset (JSON array of objects)
        data: PathBuf,

        /// Dashboard manifest whose pipeline and settings apply first
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// Run a pipeline over a dataset
    Apply {
        /// Dataset (JSON array of objects)
        data: PathBuf,

        /// Pipeline file (YAML or JSON)
        #[arg(short, long)]
        pipeline: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Run a pipeline and print the first rows
    Preview {
        /// Dataset (JSON array of objects)
        data: PathBuf,

        /// Pipeline file (YAML or JSON); overrides the manifest pipeline
        #[arg(short, long, required_unless_present = "manifest")]
        pipeline: Option<PathBuf>,

        /// Dashboard manifest providing the pipeline and settings
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Rows to print (default: previewRows setting)
        #[arg(short, long)]
        rows: Option<usize>,
    },

    /// List the steps of a pipeline
    Describe {
        /// Pipeline file (YAML or JSON)
        pipeline: PathBuf,
    },

    /// Run a widget's query chain from a dashboard manifest
    Query {
        /// Dataset (JSON array of objects)
        data: PathBuf,

        /// Dashboard manifest (YAML or JSON)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Widget id
        #[arg(short, long)]
        widget: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = cli
        .settings
        .as_deref()
        .map(|path| or_exit(Settings::from_path(path), "Failed to load settings"));

    match cli.command {
        Commands::Types { data, manifest } => {
            infer_types(&data, manifest.as_deref(), settings);
        }
        Commands::Apply {
            data,
            pipeline,
            out,
        } => {
            apply(&data, &pipeline, out.as_deref());
        }
        Commands::Preview {
            data,
            pipeline,
            manifest,
            rows,
        } => {
            preview(&data, pipeline.as_deref(), manifest.as_deref(), rows, settings);
        }
        Commands::Describe { pipeline } => {
            describe(&pipeline);
        }
        Commands::Query {
            data,
            manifest,
            widget,
        } => {
            query(&data, &manifest, &widget);
        }
    }
}

fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbose: u8) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter(verbose))))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn or_exit<T, E: Display>(result: Result<T, E>, context: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("{context}: {e}");
            std::process::exit(1);
        }
    }
}

fn read_dataset(path: &Path) -> Dataset {
    or_exit(load_dataset(path), "Failed to load dataset")
}

fn read_pipeline(path: &Path) -> PipelineDocument {
    or_exit(PipelineDocument::from_path(path), "Failed to load pipeline")
}

fn read_manifest(path: &Path) -> Manifest {
    or_exit(Manifest::from_path(path), "Failed to load manifest")
}

/// `--settings` wins over the manifest's own settings.
fn resolve_settings(explicit: Option<Settings>, manifest: Option<&Manifest>) -> Settings {
    explicit
        .or_else(|| manifest.map(|m| m.settings))
        .unwrap_or_default()
}

fn to_json<T: Serialize>(value: &T) -> String {
    or_exit(serde_json::to_string_pretty(value), "Failed to serialize output")
}

fn infer_types(data: &Path, manifest: Option<&Path>, settings: Option<Settings>) {
    let mut dataset = read_dataset(data);
    let manifest = manifest.map(read_manifest);
    if let Some(manifest) = &manifest {
        dataset = or_exit(manifest.prepare(&dataset), "Pipeline failed");
    }
    let settings = resolve_settings(settings, manifest.as_ref());
    let types = detect_column_types_with(&dataset, settings.inference_sample);
    println!("{}", to_json(&types));
}

fn apply(data: &Path, pipeline: &Path, out: Option<&Path>) {
    let dataset = read_dataset(data);
    let pipeline = read_pipeline(pipeline).into_pipeline();
    let result = or_exit(pipeline.commit(&dataset), "Pipeline failed");
    let json = to_json(&result);
    match out {
        Some(path) => {
            or_exit(fs::write(path, json), "Failed to write output");
            tracing::info!(path = %path.display(), rows = result.len(), "output written");
        }
        None => println!("{json}"),
    }
}

fn preview(
    data: &Path,
    pipeline: Option<&Path>,
    manifest: Option<&Path>,
    rows: Option<usize>,
    settings: Option<Settings>,
) {
    let dataset = read_dataset(data);
    let manifest = manifest.map(read_manifest);
    let pipeline = match pipeline {
        Some(path) => read_pipeline(path).into_pipeline(),
        None => manifest
            .as_ref()
            .and_then(|m| m.pipeline.clone())
            .unwrap_or_default(),
    };
    let rows = rows.unwrap_or_else(|| resolve_settings(settings, manifest.as_ref()).preview_rows);
    let result = or_exit(pipeline.preview_rows(&dataset, rows), "Pipeline failed");
    println!("{}", to_json(&result));
}

fn describe(pipeline: &Path) {
    let doc = read_pipeline(pipeline);
    if let Some(name) = &doc.name {
        println!("{name}");
    }
    for (index, step) in doc.steps.iter().enumerate() {
        println!("{:>3}. {}", index + 1, step.describe());
        if let TransformStep::Calculated { formula, .. } = step {
            println!("     reads: {}", Formula::new(formula.as_str()).references().join(", "));
        }
    }
}

fn query(data: &Path, manifest: &Path, widget: &str) {
    let dataset = read_dataset(data);
    let manifest = read_manifest(manifest);
    let prepared = or_exit(manifest.prepare(&dataset), "Pipeline failed");
    let result = or_exit(manifest.query(&prepared, widget), "Query failed");
    println!("{}", to_json(&result));
}
