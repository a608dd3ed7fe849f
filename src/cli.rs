use clap::{Parser, Subcommand};

/// spex - RSpec test-structure discovery and run-command resolution
#[derive(Parser, Debug)]
#[command(name = "spex", version, about)]
pub struct Cli {
    /// Output results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Workspace root (defaults to the current directory)
    #[arg(long, global = true)]
    pub root: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Discover the test structure of spec files
    Map(MapArgs),

    /// Show the document outline of Ruby files
    Outline(OutlineArgs),

    /// List run affordances for spec files
    Lens(LensArgs),

    /// Reduce a test-item selection to runner commands
    Resolve(ResolveArgs),

    /// List let/subject helper declarations in spec files
    Defs(DefsArgs),

    /// Forward execution events to the reporter socket
    Report(ReportArgs),
}

#[derive(clap::Args, Debug)]
pub struct MapArgs {
    /// Spec files or directories to discover (directories are walked)
    #[arg(default_value = ".")]
    pub paths: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct OutlineArgs {
    /// Ruby files or directories to outline (directories are walked)
    #[arg(default_value = ".")]
    pub paths: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct LensArgs {
    /// Spec files or directories to collect affordances for
    #[arg(default_value = ".")]
    pub paths: Vec<String>,

    /// Override the runner command (e.g. "bin/rspec")
    #[arg(long)]
    pub runner: Option<String>,

    /// Log each resolved command to stderr
    #[arg(long)]
    pub debug: bool,
}

#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    /// Read the selection from a file instead of stdin
    #[arg(long)]
    pub input: Option<String>,

    /// Override the runner command (e.g. "bin/rspec")
    #[arg(long)]
    pub runner: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DefsArgs {
    /// Spec files or directories to scan (directories are walked)
    #[arg(default_value = ".")]
    pub paths: Vec<String>,

    /// Only show declarations introducing this name
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// Read events from a file instead of stdin
    #[arg(long)]
    pub input: Option<String>,
}

pub fn parse() -> Cli {
    Cli::parse()
}
