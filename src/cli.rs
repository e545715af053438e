// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "imgdrop")]
#[command(about = "Upload images and keep a local list of shareable links")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only essential results
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to a config file (default: discover imgdrop.yml in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write an imgdrop.yml template in the current directory
    Init {
        /// Image server base URL
        #[arg(long)]
        server: Option<String>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Upload an image and print its shareable URL
    Upload {
        /// Image file (.jpg, .png or .gif, at most 5MB)
        file: PathBuf,

        /// Use the simulated transport instead of the server
        #[arg(long)]
        simulate: bool,
    },

    /// List uploaded images
    List {
        /// Skip merging the server's image list
        #[arg(long)]
        no_refresh: bool,
    },

    /// Print ids of images whose name contains PATTERN
    #[command(group(ArgGroup::new("selection").required(true).args(["pattern", "all"])))]
    Select {
        /// Name filter
        pattern: Option<String>,

        /// Select every image
        #[arg(long)]
        all: bool,

        /// Skip merging the server's image list
        #[arg(long)]
        no_refresh: bool,
    },

    /// Delete images by id
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,

        /// Skip merging the server's image list
        #[arg(long)]
        no_refresh: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete all images
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}
