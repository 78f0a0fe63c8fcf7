mod batch;
mod framing;
mod input;
mod objects;
mod output;
mod records;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::bootstrap::state::AppState;
use framer_application::error::AppResult;

/// Overlays frames onto images while keeping their format, palette and metadata.
#[derive(Debug, Parser)]
#[command(name = "framer", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Composite a frame over each input and store the results.
    Frame(FrameArgs),
    /// Center each input on an enlarged white canvas and store the results as JPEG.
    WhiteBg(WhiteBgArgs),
    /// List available frames.
    Frames,
    /// Manage processed image records.
    #[command(subcommand)]
    Records(RecordsCommand),
    /// Inspect and upload raw objects.
    #[command(subcommand)]
    Objects(ObjectsCommand),
}

#[derive(Debug, Args)]
pub struct FrameArgs {
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    /// Frame file name inside the frames directory.
    #[arg(long)]
    pub frame: Option<String>,
    /// JPEG quality, clamped to 1..=100.
    #[arg(long, allow_negative_numbers = true)]
    pub quality: Option<i64>,
}

#[derive(Debug, Args)]
pub struct WhiteBgArgs {
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    /// Canvas size relative to the image.
    #[arg(long)]
    pub coefficient: Option<f64>,
}

#[derive(Debug, Subcommand)]
pub enum RecordsCommand {
    List,
    Delete { id: i64 },
    /// Assign positions in the given order.
    Reorder {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ObjectsCommand {
    List,
    Get {
        key: String,
        #[arg(long, short)]
        output: PathBuf,
    },
    Upload {
        file: PathBuf,
    },
}

pub async fn run(state: &AppState, command: Command) -> AppResult<()> {
    match command {
        Command::Frame(args) => framing::frame(state, args).await,
        Command::WhiteBg(args) => framing::white_background(state, args).await,
        Command::Frames => framing::list_frames(state).await,
        Command::Records(command) => records::run(state, command).await,
        Command::Objects(command) => objects::run(state, command).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_frame_with_negative_quality() {
        let cli = Cli::try_parse_from([
            "framer", "frame", "a.png", "b.jpg", "--frame", "gold.png", "--quality", "-5",
        ])
        .unwrap();

        let Command::Frame(args) = cli.command else {
            panic!("expected frame command");
        };
        assert_eq!(args.inputs.len(), 2);
        assert_eq!(args.frame.as_deref(), Some("gold.png"));
        assert_eq!(args.quality, Some(-5));
    }

    #[test]
    fn parses_nested_subcommands() {
        let cli = Cli::try_parse_from(["framer", "records", "reorder", "3", "1", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Records(RecordsCommand::Reorder { ref ids }) if ids == &[3, 1, 2]
        ));

        let cli = Cli::try_parse_from(["framer", "objects", "get", "k.png", "-o", "out.png"])
            .unwrap();
        assert!(matches!(cli.command, Command::Objects(ObjectsCommand::Get { .. })));
    }

    #[test]
    fn frame_requires_an_input() {
        assert!(Cli::try_parse_from(["framer", "frame"]).is_err());
        assert!(Cli::try_parse_from(["framer", "white-bg"]).is_err());
    }
}
