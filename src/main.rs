use clap::error::ErrorKind;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use wdedup::config::{parse_memory_size, Config};
use wdedup::error::Result;
use wdedup::plan::SimplePlanner;
use wdedup::stage::{wfindfirst, wmerge, wprof};
use wdedup::workmem::WorkingMemory;

#[derive(Parser)]
#[command(name = "wdedup")]
#[command(about = "Performs word deduplication for large files in an I/O-based and recoverable way")]
struct Cli {
    /// The original file taken to perform word deduplication. Currently
    /// only regular files are accepted.
    file: PathBuf,

    /// Working directory for intermediate runs and the progression log.
    /// A previously interrupted run is resumed when the log is valid.
    workdir: PathBuf,

    /// Working memory size; accepts k/m/g/t suffixes (e.g. 512m)
    #[arg(short = 'm', long, default_value = "1g", value_parser = parse_memory_size)]
    memory_size: usize,

    /// Pin the working memory so it is never swapped out
    #[arg(short = 'p', long)]
    page_pinned: bool,

    /// Exit as soon as profiling (wprof) has completed
    #[arg(long)]
    wprof_only: bool,

    /// Exit as soon as merging (wmerge) has completed
    #[arg(long)]
    wmerge_only: bool,

    /// Keep intermediate runs instead of deleting them after each merge
    #[arg(long)]
    disable_gc: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                // Argument errors exit with -1, like any other hard failure.
                _ => ExitCode::from((-1i32) as u8),
            };
        }
    };

    match run(&cli) {
        Ok(Some(word)) if !word.is_empty() => {
            let mut stdout = std::io::stdout();
            if stdout.write_all(&word).and_then(|()| writeln!(stdout)).is_err() {
                return ExitCode::from((-1i32) as u8);
            }
            ExitCode::SUCCESS
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from((-err.exit_errno()) as u8)
        }
    }
}

/// Drive the stages in order, honoring the stage-limiting debug flags.
/// `Some(word)` is the final answer (possibly empty); `None` means the run
/// stopped early on purpose.
fn run(cli: &Cli) -> Result<Option<Vec<u8>>> {
    let mut cfg = Config::open(&cli.workdir)?;
    let mut workmem = WorkingMemory::allocate(cli.memory_size, cli.page_pinned)?;

    let segments = wprof(&mut cfg, &mut workmem, &cli.file)?;
    if cli.wprof_only {
        return Ok(None);
    }

    // An input with no words at all has no runs to merge and no answer.
    let Some(mut planner) = SimplePlanner::new(&segments) else {
        return Ok(Some(Vec::new()));
    };
    let root = wmerge(&mut cfg, &mut planner, cli.disable_gc)?;
    if cli.wmerge_only {
        return Ok(None);
    }

    Ok(Some(wfindfirst(&mut cfg, root)?))
}
