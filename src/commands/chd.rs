use clap::Parser;
use std::path::PathBuf;

/// Converts a GD-ROM CHD into a disc.gdi manifest plus track files.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct GdiCommand {
    /// Input CHD file
    #[arg(value_name = "INPUT_CHD")]
    pub input: PathBuf,

    /// Output directory for disc.gdi and its track files
    #[arg(value_name = "OUTPUT_DIR")]
    pub output: PathBuf,
}

/// Converts a CHD into a cue sheet plus per-track binaries.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct CueCommand {
    /// Input CHD file
    #[arg(value_name = "INPUT_CHD")]
    pub input: PathBuf,

    /// Output directory for the cue sheet and its track binaries
    #[arg(value_name = "OUTPUT_DIR")]
    pub output: PathBuf,
}

/// Reports whether a CHD contains a GD-ROM image.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct ProbeCommand {
    /// Input CHD file
    pub input: PathBuf,
}

/// Prints the header and track table of a CHD.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct InfoCommand {
    /// Input CHD file
    pub input: PathBuf,
}
