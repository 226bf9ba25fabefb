use clap::{Parser, Subcommand};
use std::path::PathBuf;

use splatgen_core::models::MeshMethod;

/// splatgen - turn a photo into a Gaussian splat point cloud
#[derive(Parser, Debug)]
#[command(name = "splatgen")]
#[command(about = "Client for the image-to-splat generation service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Base URL of the generation service
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Path to a TOML config file (defaults to ./splatgen.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Status poll cadence in milliseconds
    #[arg(long, global = true)]
    pub poll_interval_ms: Option<u64>,

    /// Per-request HTTP timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload an image, generate a splat, and download the result
    Generate(GenerateArgs),

    /// Convert a local splat PLY file to another format
    Convert(ConvertArgs),

    /// Inspect a PLY file's header and contents
    Inspect(InspectArgs),

    /// Show (and optionally watch) the status of a job
    Status(StatusArgs),

    /// Ask the service to rebuild a finished splat as a triangle mesh
    Mesh(MeshArgs),

    /// Run connectivity and configuration checks
    Doctor(DoctorArgs),
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Path to the source image
    pub image: PathBuf,

    /// Output file path (defaults to the image name with the export extension)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Export format: ply, obj, or glb (defaults to the configured format)
    #[arg(long)]
    pub format: Option<String>,

    /// Keep the raw artifact next to the converted output
    #[arg(long)]
    pub keep_raw: bool,
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Path to a binary or ASCII splat PLY file
    pub input: PathBuf,

    /// Output file path (defaults to the input name with the export extension)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Export format: ply, obj, or glb (defaults to the configured format)
    #[arg(long)]
    pub format: Option<String>,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Path to a PLY file
    pub input: PathBuf,

    /// Only parse the header; skip decoding the body
    #[arg(long)]
    pub header_only: bool,
}

#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Job identifier returned by generate
    pub job_id: String,

    /// Keep polling until the job reaches a terminal state
    #[arg(long)]
    pub watch: bool,
}

#[derive(Parser, Debug)]
pub struct MeshArgs {
    /// Server-side path of the finished splat (from the job snapshot)
    pub splat_path: String,

    /// Surface reconstruction method
    #[arg(long, value_enum, default_value = "poisson")]
    pub method: MeshMethodArg,

    /// Mesh output format on the server (obj, glb, ...)
    #[arg(long, default_value = "obj")]
    pub format: String,

    /// Octree depth for Poisson reconstruction
    #[arg(long)]
    pub depth: Option<u32>,

    /// Alpha radius for alpha-shape reconstruction
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Download the converted mesh to this path
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// CLI-facing mirror of [`MeshMethod`].
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum MeshMethodArg {
    /// Poisson surface reconstruction
    Poisson,
    /// Ball-pivoting reconstruction
    BallPivoting,
    /// Alpha-shape reconstruction
    AlphaShape,
}

impl From<MeshMethodArg> for MeshMethod {
    fn from(arg: MeshMethodArg) -> Self {
        match arg {
            MeshMethodArg::Poisson => MeshMethod::Poisson,
            MeshMethodArg::BallPivoting => MeshMethod::BallPivoting,
            MeshMethodArg::AlphaShape => MeshMethod::AlphaShape,
        }
    }
}

#[derive(Parser, Debug)]
pub struct DoctorArgs {
    /// Show detailed diagnostic information
    #[arg(long)]
    pub verbose: bool,
}
