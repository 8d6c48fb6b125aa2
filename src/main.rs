//! ds: command-line front end for dirscout

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use dirscout::config::Config;
use dirscout::errors::{AppError, AppResult};
use dirscout::favorites::{FavoritesFile, FavoritesStore};
use dirscout::fs::{copy_to, delete_path, move_to, read_directory};
use dirscout::state::panel::sort_order;
use dirscout::state::{SortColumn, SortDirection, SortSpec};
use dirscout::utils::{format_time, navigation_roots};

#[derive(Parser, Debug)]
#[command(name = "ds", version, about = "Browse and manage directories", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List a directory
    Ls {
        /// Directory to list (defaults to the current one)
        path: Option<PathBuf>,

        /// Sort column: name, type, size or modified
        #[arg(long, short = 's')]
        sort: Option<SortColumn>,

        /// Sort in descending order
        #[arg(long, short = 'd')]
        desc: bool,
    },
    /// Copy a file or directory into a directory
    Cp { src: PathBuf, dest: PathBuf },
    /// Move a file or directory into a directory
    Mv { src: PathBuf, dest: PathBuf },
    /// Delete a file or directory tree
    Rm {
        path: PathBuf,

        /// Confirm the deletion
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Manage favorite directories
    Fav {
        #[command(subcommand)]
        action: FavAction,
    },
    /// Show the navigation roots (drives on Windows)
    Roots,
}

#[derive(Subcommand, Debug)]
enum FavAction {
    /// Add a directory (defaults to the current one)
    Add { path: Option<PathBuf> },
    /// Remove a directory
    Rm { path: Option<PathBuf> },
    /// List favorites
    Ls,
}

fn current_dir_or(path: Option<PathBuf>) -> PathBuf {
    path.unwrap_or_else(|| PathBuf::from("."))
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn list(config: &Config, path: &Path, sort: Option<SortColumn>, desc: bool) -> AppResult<()> {
    let mut spec = config.sorting.spec();
    if let Some(column) = sort {
        spec = SortSpec::new(column, SortDirection::Ascending);
    }
    if desc {
        spec.direction = SortDirection::Descending;
    }

    let snapshot = read_directory(&absolute(path))?;
    for idx in sort_order(&snapshot, spec) {
        let Some(entry) = snapshot.get(idx) else {
            continue;
        };
        println!(
            "{} {:<40} {:<12} {:>12} {}",
            entry.icon.glyph(),
            entry.name,
            entry.type_label,
            entry.display_size(),
            format_time(entry.modified)
        );
    }
    println!(
        "{} directories, {} files",
        snapshot.dir_count(),
        snapshot.file_count()
    );
    Ok(())
}

fn favorites_store(config: &Config) -> AppResult<FavoritesStore> {
    let path = config
        .favorites_path()
        .ok_or_else(|| AppError::Config("could not determine config directory".to_string()))?;
    Ok(FavoritesStore::open(Box::new(FavoritesFile::new(path))))
}

fn favorites(config: &Config, action: FavAction) -> AppResult<()> {
    let store = favorites_store(config)?;
    match action {
        FavAction::Add { path } => {
            let path = absolute(&current_dir_or(path));
            if store.add(&path)? {
                println!("Added {}", path.display());
            } else {
                println!("{} is already a favorite", path.display());
            }
        }
        FavAction::Rm { path } => {
            let path = absolute(&current_dir_or(path));
            if store.remove(&path)? {
                println!("Removed {}", path.display());
            } else {
                println!("{} is not a favorite", path.display());
            }
        }
        FavAction::Ls => {
            for path in store.list() {
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}

fn run(args: Args) -> AppResult<()> {
    let config = Config::load();
    let opts = config.transfer.copy_options();

    match args.command {
        Command::Ls { path, sort, desc } => list(&config, &current_dir_or(path), sort, desc)?,
        Command::Cp { src, dest } => {
            let out = copy_to(&src, &dest, &opts)?;
            println!("{}", out.display());
        }
        Command::Mv { src, dest } => {
            let out = move_to(&src, &dest, &opts)?;
            println!("{}", out.display());
        }
        Command::Rm { path, yes } => {
            if !yes {
                return Err(AppError::NotConfirmed);
            }
            delete_path(&path)?;
        }
        Command::Fav { action } => favorites(&config, action)?,
        Command::Roots => {
            for root in navigation_roots() {
                println!("{}", root.display());
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ds: {}", e);
            ExitCode::FAILURE
        }
    }
}
