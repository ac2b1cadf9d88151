//! Command line tools for inspecting LRIT/HRIT files

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use log::{error, info, warn};

use xritlib::print::HeaderPrinter;
use xritlib::session::annotated_path;
use xritlib::LritFile;

#[derive(Parser)]
#[command(name = "xrit", version, about = "Read the headers and data of LRIT/HRIT files")]
struct Cli {
    /// Log more (can be repeated)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the headers of each file
    Parse {
        /// Print the structured header record
        #[arg(short = 's', long)]
        structured: bool,

        /// Print the image data function record
        #[arg(short = 'i', long)]
        image_data: bool,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Write the data section of a file to OUTPUT
    Dump { file: PathBuf, output: PathBuf },
    /// Write the data section of a file to stdout
    Cat { file: PathBuf },
    /// Rename each file to the name in its annotation record
    Rename {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List the transmissions in DCS files
    Dcs {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Sends log messages to stderr
struct StderrLogger {
    level: log::LevelFilter,
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        eprintln!("{} {} {}", record.level(), record.target(), record.args());
    }

    fn flush(&self) {}
}

fn init_logging(verbose: u8, quiet: bool) -> anyhow::Result<()> {
    let level = if quiet {
        log::LevelFilter::Error
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    log::set_boxed_logger(Box::new(StderrLogger { level }))?;
    log::set_max_level(level);
    Ok(())
}

fn parse_file(path: &Path, printer: &HeaderPrinter) -> anyhow::Result<()> {
    let headers = LritFile::read_headers(path)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    printer.write(&mut out, &headers)?;
    Ok(())
}

fn rename_file(path: &Path) -> anyhow::Result<()> {
    let headers = LritFile::read_headers(path)?;
    let new_path = annotated_path(path, &headers)?;
    if new_path == path {
        info!("{} already has its annotated name", path.display());
        return Ok(());
    }
    info!("Renaming {} to {}", path.display(), new_path.display());
    std::fs::rename(path, &new_path)
        .with_context(|| format!("renaming {} to {}", path.display(), new_path.display()))?;
    Ok(())
}

fn list_dcs(path: &Path) -> anyhow::Result<()> {
    let lrit = LritFile::open(path)?;
    let (_base, frames) = match lrit.dcs() {
        Some(result) => result?,
        None => {
            warn!(
                "{} is not a DCS file (file type {})",
                path.display(),
                lrit.filetype_code()
            );
            return Ok(());
        }
    };
    info!("{}: {} transmissions", path.display(), frames.len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for frame in frames {
        writeln!(
            out,
            "{} {} {} {} {} {}{} {} {} {} bytes",
            frame.address,
            frame.timestamp.format("%Y-%m-%dT%H:%M:%SZ"),
            frame.status,
            frame.signal,
            frame.frequency_offset,
            frame.modulation_index,
            frame.data_quality,
            frame.channel,
            frame.source,
            frame.data.len()
        )?;
    }
    Ok(())
}

/// Run `f` on every file, logging failures instead of stopping at the first one
fn for_each_file(
    files: &[PathBuf],
    mut f: impl FnMut(&Path) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let mut failed = 0;
    for path in files {
        if let Err(e) = f(path.as_path()) {
            error!("Error with file {}: {:#}", path.display(), e);
            failed += 1;
        }
    }
    if failed > 0 {
        anyhow::bail!("{} of {} files failed", failed, files.len());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet)?;

    match cli.command {
        Command::Parse {
            structured,
            image_data,
            files,
        } => {
            let printer = HeaderPrinter {
                show_structured_header: structured,
                show_image_data: image_data,
            };
            for_each_file(&files, |path| {
                println!("Parsing file {}", path.display());
                parse_file(path, &printer)
            })
        }
        Command::Dump { file, output } => {
            let lrit = LritFile::open(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let out = File::create(&output)
                .with_context(|| format!("creating {}", output.display()))?;
            lrit.dump_data(BufWriter::new(out))?;
            info!("Wrote {} bytes to {}", lrit.data.len(), output.display());
            Ok(())
        }
        Command::Cat { file } => {
            let lrit = LritFile::open(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let stdout = io::stdout();
            lrit.dump_data(stdout.lock())?;
            Ok(())
        }
        Command::Rename { files } => for_each_file(&files, rename_file),
        Command::Dcs { files } => for_each_file(&files, list_dcs),
    }
}
