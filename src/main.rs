use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::{info, warn};

use seqindex::index::{scan_lookup, DuplicateKeys, IndexOptions, RecordIndex};
use seqindex::io::Format;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "seqindex", author, version, about = "Indexed random access to FASTQ/FASTA records", arg_required_else_help = true)]
struct Cli {
    /// Verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build an index and print a summary
    Index {
        /// FASTQ or FASTA file
        file: String,
        /// Record format (guessed from the extension if omitted)
        #[arg(short, long)]
        format: Option<Format>,
        /// Let later records replace earlier ones with the same key
        #[arg(long = "keep-last")]
        keep_last: bool,
    },
    /// Fetch records by key through an index
    Get {
        file: String,
        #[arg(required = true)]
        keys: Vec<String>,
        #[arg(short, long)]
        format: Option<Format>,
        #[arg(long = "keep-last")]
        keep_last: bool,
        /// Emit the records exactly as stored in the file
        #[arg(long)]
        raw: bool,
        /// Output path (stdout if omitted)
        #[arg(short, long)]
        out: Option<String>,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
    },
    /// Fetch one record by scanning the file without an index
    Scan {
        file: String,
        key: String,
        #[arg(short, long)]
        format: Option<Format>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logger(cli.verbose);
    match cli.command {
        Commands::Index { file, format, keep_last } => run_index(&file, format, keep_last),
        Commands::Get { file, keys, format, keep_last, raw, out, threads } => {
            run_get(&file, &keys, format, keep_last, raw, out.as_deref(), threads)
        }
        Commands::Scan { file, key, format } => run_scan(&file, &key, format),
    }
}

fn setup_logger(verbosity: u8) {
    env_logger::Builder::new()
        .filter_level(match verbosity {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();
}

fn resolve_format(file: &str, format: Option<Format>) -> Result<Format> {
    match format.or_else(|| Format::from_path(file)) {
        Some(f) => Ok(f),
        None => anyhow::bail!("cannot guess the format of '{}', pass --format fastq|fasta", file),
    }
}

fn build_index(file: &str, format: Option<Format>, keep_last: bool) -> Result<RecordIndex> {
    let format = resolve_format(file, format)?;
    let opts = IndexOptions {
        duplicates: if keep_last { DuplicateKeys::KeepLast } else { DuplicateKeys::Reject },
    };
    RecordIndex::build_with(file, format, &opts).with_context(|| format!("cannot index '{}'", file))
}

fn run_index(file: &str, format: Option<Format>, keep_last: bool) -> Result<()> {
    let idx = build_index(file, format, keep_last)?;
    let meta = idx.meta();
    println!("file: {}", meta.source.display());
    println!("format: {}", meta.format);
    println!("records: {}", idx.len());
    println!("bytes: {}", meta.source_len);
    println!("built_at: {}", meta.built_at);
    Ok(())
}

fn run_get(
    file: &str,
    keys: &[String],
    format: Option<Format>,
    keep_last: bool,
    raw: bool,
    out_path: Option<&str>,
    threads: usize,
) -> Result<()> {
    let mut idx = build_index(file, format, keep_last)?;
    let format = idx.format();

    let (present, missing): (Vec<&String>, Vec<&String>) = keys.iter().partition(|k| idx.contains(k));
    for k in &missing {
        warn!("key '{}' not found in {}", k, file);
    }

    let mut out: Box<dyn Write> = match out_path {
        Some(p) => Box::new(std::io::BufWriter::new(
            std::fs::File::create(Path::new(p)).with_context(|| format!("cannot create '{}'", p))?,
        )),
        None => Box::new(std::io::BufWriter::new(std::io::stdout())),
    };

    if raw {
        for k in &present {
            out.write_all(&idx.get_raw(k)?)?;
        }
    } else if threads > 1 {
        info!("fetching {} records on {} threads", present.len(), threads);
        for rec in idx.lookup_many(&present, threads)? {
            rec.write_to(&mut out, format)?;
        }
    } else {
        for k in &present {
            idx.lookup(k)?.write_to(&mut out, format)?;
        }
    }
    out.flush()?;

    if !missing.is_empty() {
        anyhow::bail!("{} of {} keys not found", missing.len(), keys.len());
    }
    Ok(())
}

fn run_scan(file: &str, key: &str, format: Option<Format>) -> Result<()> {
    let format = resolve_format(file, format)?;
    match scan_lookup(file, format, key).with_context(|| format!("cannot scan '{}'", file))? {
        Some(rec) => {
            let mut out = std::io::BufWriter::new(std::io::stdout());
            rec.write_to(&mut out, format)?;
            out.flush()?;
            Ok(())
        }
        None => anyhow::bail!("key '{}' not found in {}", key, file),
    }
}
