//! Command-line interface for taskstash
//!
//! This module defines the CLI structure using clap derive macros.
//! Command groups live in their own submodules.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::book::TaskBook;
use crate::config::default_data_dir;
use crate::error::Result;
use crate::output::OutputOptions;

mod category;
mod completed;
mod task;

/// taskstash - a local personal task list
///
/// Create, prioritize, schedule, complete and restore tasks. State lives in
/// JSON files under a data directory.
#[derive(Parser, Debug)]
#[command(name = "taskstash")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to the platform data directory)
    #[arg(long, global = true, env = "TASKSTASH_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a task
    Add {
        /// What needs doing (may be empty)
        #[arg(default_value = "")]
        description: String,

        /// Category label (defaults to none selected)
        #[arg(short, long)]
        category: Option<String>,

        /// Priority: high, medium, low (or 1, 2, 3)
        #[arg(short, long)]
        priority: Option<String>,

        /// Deadline date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        date: Option<String>,

        /// Deadline time (HH:MM, 24h)
        #[arg(long)]
        time: Option<String>,
    },

    /// List active tasks
    List,

    /// Show one active task
    Show {
        /// Task id or unique id prefix
        id: String,
    },

    /// Mark a task as completed
    Done {
        /// Task id or unique id prefix
        id: String,
    },

    /// Delete an active task
    Rm {
        /// Task id or unique id prefix
        id: String,
    },

    /// Reorder active tasks and save the order
    Sort {
        #[arg(value_enum)]
        by: SortKey,
    },

    /// Delete every active task
    Clear {
        /// Confirm deleting all active tasks
        #[arg(long)]
        yes: bool,
    },

    /// Completed task management
    #[command(subcommand)]
    Completed(CompletedCommands),

    /// Category management
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Finish interrupted moves and re-key duplicate task ids
    Repair,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    /// Earliest deadline first; undated tasks last
    Deadline,
    /// High priority first
    Priority,
}

/// Completed task subcommands
#[derive(Subcommand, Debug)]
pub enum CompletedCommands {
    /// List completed tasks
    List,

    /// Move a completed task back to the top of the active list
    Restore {
        /// Task id or unique id prefix
        id: String,
    },

    /// Delete a completed task
    Rm {
        /// Task id or unique id prefix
        id: String,
    },

    /// Delete every completed task
    Clear {
        /// Confirm deleting all completed tasks
        #[arg(long)]
        yes: bool,
    },
}

/// Category subcommands
#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// List categories
    List,

    /// Add a category
    Add {
        /// Category name
        name: String,
    },

    /// Delete a category (tasks keep their label)
    Rm {
        /// Category name
        name: String,
    },
}

/// Everything a command handler needs.
pub(crate) struct Context {
    pub book: TaskBook,
    pub output: OutputOptions,
}

impl Context {
    fn open(data_dir: Option<PathBuf>, output: OutputOptions) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        tracing::debug!(data_dir = %data_dir.display(), "opening task book");
        let book = TaskBook::open_dir(&data_dir)?;
        Ok(Self { book, output })
    }

    pub fn width(&self) -> usize {
        self.book.config().display.description_width
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        let ctx = Context::open(self.data_dir, output)?;

        match self.command {
            Commands::Add {
                description,
                category,
                priority,
                date,
                time,
            } => task::run_add(
                &ctx,
                task::AddOptions {
                    description,
                    category,
                    priority,
                    date,
                    time,
                },
            ),
            Commands::List => task::run_list(&ctx),
            Commands::Show { id } => task::run_show(&ctx, &id),
            Commands::Done { id } => task::run_done(&ctx, &id),
            Commands::Rm { id } => task::run_rm(&ctx, &id),
            Commands::Sort { by } => task::run_sort(&ctx, by),
            Commands::Clear { yes } => task::run_clear(&ctx, yes),
            Commands::Repair => task::run_repair(&ctx),
            Commands::Completed(cmd) => match cmd {
                CompletedCommands::List => completed::run_list(&ctx),
                CompletedCommands::Restore { id } => completed::run_restore(&ctx, &id),
                CompletedCommands::Rm { id } => completed::run_rm(&ctx, &id),
                CompletedCommands::Clear { yes } => completed::run_clear(&ctx, yes),
            },
            Commands::Category(cmd) => match cmd {
                CategoryCommands::List => category::run_list(&ctx),
                CategoryCommands::Add { name } => category::run_add(&ctx, &name),
                CategoryCommands::Rm { name } => category::run_rm(&ctx, &name),
            },
        }
    }
}
