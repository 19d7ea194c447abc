use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use edc_format::ContainerLimits;
use tracing_subscriber::EnvFilter;

mod commands;
mod utils;

#[derive(Parser)]
#[command(name = "edc-cmd")]
#[command(about = "Command-line utility for EDC mesh containers")]
#[command(version)]
struct Cli {
    /// Content size ceiling in bytes (defaults to 2^31 - 1)
    #[arg(long, global = true)]
    max_content_size: Option<u64>,

    /// Increase verbosity (-v for debug, -vv for trace); EDC_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect a container and print its header and mesh layout as JSON
    Inspect {
        /// Container file to inspect
        path: String,
    },

    /// Fully decode a container and report whether it is valid
    Verify {
        /// Container file(s) to verify
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Write a primitive mesh container
    Generate {
        /// Primitive to generate
        primitive: Primitive,

        /// Output container file
        path: String,

        /// Vertex type of the generated mesh
        #[arg(long, value_enum, default_value_t = VertexKind::Full)]
        vertex: VertexKind,

        /// Overwrite an existing output file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Primitive {
    Plane,
    Cube,
    Sphere,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum VertexKind {
    /// Position only
    Pos,
    /// Position and texture coordinates
    Slim,
    /// Position, normal and texture coordinates
    Full,
    /// Full vertex with bone influences
    Skinned,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let limits = match cli.max_content_size {
        Some(size) => ContainerLimits::default().with_max_content_size(size)?,
        None => ContainerLimits::default(),
    };

    match cli.command {
        Commands::Inspect { path } => commands::inspect::run(&path, limits),
        Commands::Verify { paths } => commands::verify::run(&paths, limits),
        Commands::Generate {
            primitive,
            path,
            vertex,
            force,
        } => commands::generate::run(primitive, vertex, &path, force, limits),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("EDC_LOG").unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}
