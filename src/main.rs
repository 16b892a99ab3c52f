use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use lix::index::build::{DEFAULT_SHARD_COUNT, initialize_with_progress};
use lix::index::stats;
use lix::locate::LineLocator;
use lix::utils::layout::IndexLayout;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lix")]
#[command(about = "Sharded line index for O(1) random access to lines of huge text files")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Source file to read from (when no subcommand is given)
    file: Option<PathBuf>,

    /// Zero-based line number to fetch
    line: Option<u64>,

    /// Number of shards to build the index with
    #[arg(short, long, default_value_t = DEFAULT_SHARD_COUNT)]
    shards: usize,

    /// Force a rebuild of the index before the lookup
    #[arg(short, long)]
    force: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build or rebuild the line index for a file
    Index {
        /// Source file to index
        file: PathBuf,

        /// Number of shards to build the index with
        #[arg(short, long, default_value_t = DEFAULT_SHARD_COUNT)]
        shards: usize,

        /// Force full rebuild
        #[arg(short, long)]
        force: bool,
    },
    /// Show index statistics
    Stats {
        /// Indexed source file
        file: PathBuf,
    },
    /// List all indexed files
    List,
    /// Remove the index for a file
    Remove {
        /// Indexed source file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Index {
            file,
            shards,
            force,
        }) => {
            initialize_with_progress(&file, shards, force, false)?;
        }
        Some(Commands::Stats { file }) => {
            stats::show_stats(&file)?;
        }
        Some(Commands::List) => {
            stats::list_indexes()?;
        }
        Some(Commands::Remove { file }) => {
            let layout = IndexLayout::for_source(&file)?;
            layout.remove()?;
            println!("Removed index for: {}", file.display());
        }
        None => match (cli.file, cli.line) {
            (Some(file), Some(line)) => {
                // Builds the index on first use; an up-to-date index makes
                // this a fast no-op.
                initialize_with_progress(&file, cli.shards, cli.force, false)?;

                let locator = LineLocator::open(&file)?;
                match locator.lookup_line(line)? {
                    Some(text) => println!("Result: {text}"),
                    None => println!("Result: <absent>"),
                }
            }
            _ => {
                Cli::command().print_help()?;
            }
        },
    }

    Ok(())
}
