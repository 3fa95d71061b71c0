use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod file_store;

#[derive(Parser)]
#[command(name = "kg-explorer")]
#[command(about = "Knowledge-graph build, layout, and pathfinding toolkit", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the node/edge graph from a JSON assertion list
    Build {
        /// JSON file holding an array of assertion objects
        file: PathBuf,

        /// One edge per assertion instead of grouping by (subject, object)
        #[arg(long)]
        ungrouped: bool,

        /// Predicates shown per edge label before the +K suffix
        #[arg(long, default_value_t = 3)]
        max_label_predicates: usize,

        /// Drop structural predicates (rdf:type, schema:name, ...) first
        #[arg(long)]
        hide_structural: bool,
    },

    /// Compute a deterministic layout for the graph
    Layout {
        file: PathBuf,

        /// Layout strategy: grid | circle | radial | force
        #[arg(long, default_value = "grid")]
        kind: String,

        /// Explicit layout seed; defaults to hashing the view key
        #[arg(long)]
        seed: Option<u32>,

        /// View key the default seed is derived from
        #[arg(long, default_value = "")]
        view_key: String,
    },

    /// Shortest path between two terms
    Path {
        file: PathBuf,
        start: String,
        end: String,

        /// Traverse edges source->target only
        #[arg(long)]
        directed: bool,
    },

    /// Run the force simulation until it settles
    Simulate {
        file: PathBuf,

        #[arg(long)]
        seed: Option<u32>,

        /// Spread multiplier scaling spring length and repulsion
        #[arg(long, default_value_t = 1.0)]
        spread: f64,

        /// Hard cap on accumulated integration steps
        #[arg(long, default_value_t = 1600)]
        max_steps: usize,
    },

    /// Manage saved layout snapshots in a JSON-file-backed store
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },
}

#[derive(Subcommand)]
enum SnapshotAction {
    /// Compute a layout and save it under a view key
    Save {
        file: PathBuf,
        #[arg(long)]
        view_key: String,
        #[arg(long, default_value = "grid")]
        kind: String,
        #[arg(long)]
        seed: Option<u32>,
        #[arg(long, default_value = "kg-layouts.json")]
        store: PathBuf,
    },

    /// Print the snapshot saved under a view key (null when absent)
    Show {
        #[arg(long)]
        view_key: String,
        #[arg(long, default_value = "kg-layouts.json")]
        store: PathBuf,
    },

    /// Delete the snapshot saved under a view key
    Delete {
        #[arg(long)]
        view_key: String,
        #[arg(long, default_value = "kg-layouts.json")]
        store: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Build {
            file,
            ungrouped,
            max_label_predicates,
            hide_structural,
        } => commands::run_build(&file, ungrouped, max_label_predicates, hide_structural)?,
        Commands::Layout {
            file,
            kind,
            seed,
            view_key,
        } => commands::run_layout(&file, &kind, seed, &view_key)?,
        Commands::Path {
            file,
            start,
            end,
            directed,
        } => commands::run_path(&file, &start, &end, directed)?,
        Commands::Simulate {
            file,
            seed,
            spread,
            max_steps,
        } => commands::run_simulate(&file, seed, spread, max_steps)?,
        Commands::Snapshot { action } => match action {
            SnapshotAction::Save {
                file,
                view_key,
                kind,
                seed,
                store,
            } => commands::run_snapshot_save(&file, &view_key, &kind, seed, &store)?,
            SnapshotAction::Show { view_key, store } => {
                commands::run_snapshot_show(&view_key, &store)?
            }
            SnapshotAction::Delete { view_key, store } => {
                commands::run_snapshot_delete(&view_key, &store)?
            }
        },
    }

    Ok(())
}
