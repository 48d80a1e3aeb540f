use std::path::PathBuf;

use clap::Parser;

/// Mentor: chat with "The Senior", an exam-prep mentor, from the terminal.
#[derive(Parser, Debug)]
#[command(name = "mentor", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter directive override (e.g. `mentor=debug`).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Keep sessions in memory only; nothing is read from or written to disk.
    #[arg(long)]
    pub ephemeral: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
