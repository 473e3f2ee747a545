use crate::commands::chd::{CueCommand, GdiCommand, InfoCommand, ProbeCommand};
use clap::{Parser, Subcommand};

pub mod chd;

/// CLI for converting CHD disc images into GDI or CUE/BIN track layouts.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Gdi(GdiCommand),
    Cue(CueCommand),
    Probe(ProbeCommand),
    Info(InfoCommand),
}
