use std::ffi::OsString;

use clap::{Parser, Subcommand, error::ErrorKind};

use self::{play::PlayArg, train::TrainArg};

mod play;
mod train;

const USAGE_HINT: &str = "Please provide either the `train` or `play` positional arguments.";

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve controllers with the genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Replay a stored controller
    Play(#[clap(flatten)] PlayArg),
}

/// Result of reading the command line.
#[derive(Debug)]
enum Invocation {
    Run(Mode),
    /// No usable mode; print the usage hint and stop.
    Usage,
    /// Help, version or a malformed mode invocation, reported by clap.
    Clap(clap::Error),
}

pub fn run() -> anyhow::Result<()> {
    match parse(std::env::args_os()) {
        Invocation::Run(Mode::Train(arg)) => train::run(&arg)?,
        Invocation::Run(Mode::Play(arg)) => play::run(&arg)?,
        Invocation::Usage => println!("{USAGE_HINT}"),
        Invocation::Clap(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.print()?,
            _ => e.exit(),
        },
    }
    Ok(())
}

/// Parses `args`, whose first element is the program name.
fn parse<I, T>(args: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = args.into_iter().map(Into::into).collect::<Vec<OsString>>();
    let mode_given = args
        .get(1)
        .is_some_and(|arg| arg == "train" || arg == "play");

    match CommandArgs::try_parse_from(&args) {
        Ok(CommandArgs { mode: Some(mode) }) => Invocation::Run(mode),
        Ok(CommandArgs { mode: None }) => Invocation::Usage,
        Err(e)
            if !mode_given
                && matches!(
                    e.kind(),
                    ErrorKind::InvalidSubcommand | ErrorKind::UnknownArgument
                ) =>
        {
            Invocation::Usage
        }
        Err(e) => Invocation::Clap(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(args: &[&str]) -> Invocation {
        parse(std::iter::once("evosnake").chain(args.iter().copied()))
    }

    #[test]
    fn test_missing_mode_prints_usage() {
        assert!(matches!(parse_args(&[]), Invocation::Usage));
    }

    #[test]
    fn test_unknown_mode_prints_usage() {
        assert!(matches!(parse_args(&["foo"]), Invocation::Usage));
        assert!(matches!(parse_args(&["tarin"]), Invocation::Usage));
        assert!(matches!(parse_args(&["--bogus"]), Invocation::Usage));
    }

    #[test]
    fn test_bad_flag_in_mode_is_a_clap_error() {
        let Invocation::Clap(e) = parse_args(&["play", "--bogus"]) else {
            panic!("expected a clap error");
        };
        assert_eq!(e.kind(), ErrorKind::UnknownArgument);

        let Invocation::Clap(e) = parse_args(&["train", "--population", "many"]) else {
            panic!("expected a clap error");
        };
        assert_eq!(e.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_help_is_reported_by_clap() {
        let Invocation::Clap(e) = parse_args(&["--help"]) else {
            panic!("expected help output");
        };
        assert_eq!(e.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_modes_are_recognized() {
        assert!(matches!(
            parse_args(&["train", "--generations", "5", "--seed", "3"]),
            Invocation::Run(Mode::Train(_))
        ));
        assert!(matches!(
            parse_args(&["play", "latest", "--tick-ms", "0"]),
            Invocation::Run(Mode::Play(_))
        ));
        assert!(matches!(
            parse_args(&["play"]),
            Invocation::Run(Mode::Play(_))
        ));
    }
}
