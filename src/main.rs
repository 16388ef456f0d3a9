//! fra-ingest CLI
//!
//! ```bash
//! # Summarise a sweep and show its first rows
//! fra-ingest inspect sweep.csv --rows 10
//!
//! # Produce model-ready vectors, one JSON object per line
//! fra-ingest vectorize a.xml b.bin --config pipeline.json --output vectors.jsonl
//!
//! # Convert any supported input to the canonical Parquet archive
//! fra-ingest export vendor.dat sweep.parquet --format binary
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use arrow::util::pretty::pretty_format_batches;
use clap::{Parser, Subcommand, ValueEnum};

use fra_ingest::data::loader::record_batch;
use fra_ingest::{write_archive, FormatKind, MarkupDialect, Pipeline, PipelineConfig};

#[derive(Parser)]
#[command(name = "fra-ingest")]
#[command(about = "Parse and normalise transformer FRA measurements")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a summary of one measurement file
    Inspect {
        file: PathBuf,

        /// Input format (detected from extension/content when omitted)
        #[arg(short, long)]
        format: Option<FormatArg>,

        /// Also print the first N samples as a table
        #[arg(short, long)]
        rows: Option<usize>,

        /// Print the full canonical record as JSON instead
        #[arg(long)]
        json: bool,

        /// Pipeline config (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Resample, denoise and normalise files into fixed-length vectors
    Vectorize {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(short, long)]
        format: Option<FormatArg>,

        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write JSON lines here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the canonical record of a file as Parquet
    Export {
        file: PathBuf,
        output: PathBuf,

        #[arg(short, long)]
        format: Option<FormatArg>,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Tsv,
    /// Delimited text, delimiter sniffed from the header
    Text,
    Xml,
    Json,
    Binary,
    Parquet,
}

impl From<FormatArg> for FormatKind {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => FormatKind::Delimited(Some(b',')),
            FormatArg::Tsv => FormatKind::Delimited(Some(b'\t')),
            FormatArg::Text => FormatKind::Delimited(None),
            FormatArg::Xml => FormatKind::Markup(MarkupDialect::Xml),
            FormatArg::Json => FormatKind::Markup(MarkupDialect::Json),
            FormatArg::Binary => FormatKind::Binary,
            FormatArg::Parquet => FormatKind::Archive,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect {
            file,
            format,
            rows,
            json,
            config,
        } => inspect(&pipeline(config.as_deref())?, &file, format, rows, json),
        Commands::Vectorize {
            files,
            format,
            config,
            output,
        } => vectorize(&pipeline(config.as_deref())?, &files, format, output.as_deref()),
        Commands::Export {
            file,
            output,
            format,
            config,
        } => {
            let record = pipeline(config.as_deref())?
                .ingest(&file, format.map(Into::into))
                .with_context(|| format!("parsing {}", file.display()))?;
            write_archive(&record, &output).with_context(|| format!("writing {}", output.display()))
        }
    }
}

fn pipeline(config: Option<&Path>) -> Result<Pipeline> {
    let config = match config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    Ok(Pipeline::new(config))
}

fn inspect(pipeline: &Pipeline, file: &Path, format: Option<FormatArg>, rows: Option<usize>, json: bool) -> Result<()> {
    let record = pipeline
        .ingest(file, format.map(Into::into))
        .with_context(|| format!("parsing {}", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    let s = record.summary();
    println!("{}", file.display());
    println!("  samples     {}", s.points);
    println!("  frequency   {:.3} .. {:.3} Hz", s.freq_min, s.freq_max);
    println!("  magnitude   {:.3} .. {:.3} dB (mean {:.3}, std {:.3})", s.mag_min, s.mag_max, s.mag_mean, s.mag_std);
    println!("  phase       {}", if s.has_phase { "present" } else { "absent" });
    for (key, value) in record.metadata() {
        println!("  {key:<11} {value}");
    }

    if let Some(n) = rows {
        let batch = record_batch(&record)?;
        let n = n.min(batch.num_rows());
        println!("{}", pretty_format_batches(&[batch.slice(0, n)])?);
    }
    Ok(())
}

fn vectorize(pipeline: &Pipeline, files: &[PathBuf], format: Option<FormatArg>, output: Option<&Path>) -> Result<()> {
    let mut out: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    log::info!(
        "vectorizing {} file(s) onto {} points",
        files.len(),
        pipeline.config().resample.n_points
    );

    for file in files {
        let prepared = pipeline
            .run(file, format.map(Into::into))
            .with_context(|| format!("processing {}", file.display()))?;
        serde_json::to_writer(
            &mut out,
            &serde_json::json!({
                "file": file.display().to_string(),
                "metadata": prepared.metadata,
                "vector": prepared.vector,
            }),
        )?;
        writeln!(out)?;
        log::info!("vectorized {}", file.display());
    }
    out.flush()?;
    Ok(())
}
