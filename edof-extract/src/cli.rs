use std::{ffi::OsString, path::PathBuf};

use clap::{ArgAction, Command, CommandFactory, Parser, builder::ValueHint};
use edof::{DEFAULT_DRIFT_TOLERANCE, DEFAULT_PREAMBLE_LEN, ScanConfig};

/// Command-line arguments for edof-extract.
#[derive(Parser, Debug)]
#[command(
    name = "edof-extract",
    about = "Extract the unaltered image and the depth map from photos taken in bokeh mode on Huawei phones.",
    author,
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Bokeh-mode JPEGs to process
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath, required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory for the extracted files (defaults to each input's directory)
    #[arg(long, short = 'o', value_hint = ValueHint::DirPath, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Also write every other embedded JPEG as <name>-<index>.JPG
    #[arg(long)]
    pub all_segments: bool,

    /// Largest padding, in bytes, skipped between embedded JPEGs
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_DRIFT_TOLERANCE)]
    pub drift_tolerance: usize,

    /// Bytes between the depth record header and its samples
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_PREAMBLE_LEN)]
    pub preamble_len: usize,

    /// More output (-v debug, -vv trace)
    #[arg(long, short = 'v', action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only print warnings and errors
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl Cli {
    /// Parse the process arguments; exits with usage on error.
    ///
    /// Dash-prefixed arguments that name no known flag are not errors: they
    /// are returned separately so the caller can report and ignore them.
    pub fn parse_lenient() -> (Self, Vec<OsString>) {
        Self::try_parse_lenient(std::env::args_os()).unwrap_or_else(|err| err.exit())
    }

    pub fn try_parse_lenient<I, T>(args: I) -> Result<(Self, Vec<OsString>), clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut command = Self::command();
        command.build();
        let (kept, ignored) = split_unknown_flags(&command, args);
        Ok((Self::try_parse_from(kept)?, ignored))
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::default()
            .with_drift_tolerance(self.drift_tolerance)
            .with_preamble_len(self.preamble_len)
    }

    /// Default filter directive when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}

/// Separate dash-prefixed arguments unknown to `command` from the rest.
///
/// Values of known options and everything after `--` are kept as-is.
fn split_unknown_flags<I, T>(command: &Command, args: I) -> (Vec<OsString>, Vec<OsString>)
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut kept: Vec<OsString> = args.next().into_iter().collect();
    let mut ignored = Vec::new();
    let mut pending_value = false;
    let mut after_separator = false;

    for arg in args {
        if after_separator || pending_value {
            pending_value = false;
            kept.push(arg);
            continue;
        }
        let flag = match arg.to_str() {
            Some("--") => {
                after_separator = true;
                None
            }
            Some(text) if text.len() > 1 && text.starts_with('-') => Some(text),
            _ => None,
        };
        match flag.map(|text| known_flag(command, text)) {
            None => kept.push(arg),
            Some(Some(takes_value)) => {
                pending_value = takes_value;
                kept.push(arg);
            }
            Some(None) => ignored.push(arg),
        }
    }
    (kept, ignored)
}

/// Whether `text` is a flag of `command`, and if so whether its value is the next argument.
fn known_flag(command: &Command, text: &str) -> Option<bool> {
    if let Some(long) = text.strip_prefix("--") {
        let (name, inline) = match long.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (long, None),
        };
        let arg = command.get_arguments().find(|arg| {
            arg.get_long() == Some(name)
                || arg
                    .get_all_aliases()
                    .is_some_and(|aliases| aliases.contains(&name))
        })?;
        return Some(arg.get_action().takes_values() && inline.is_none());
    }

    let shorts = text.strip_prefix('-')?;
    for (pos, c) in shorts.char_indices() {
        let arg = command
            .get_arguments()
            .find(|arg| arg.get_short() == Some(c))?;
        if arg.get_action().takes_values() {
            // rest of the cluster is the value
            return Some(pos + c.len_utf8() == shorts.len());
        }
    }
    Some(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_inputs_and_options() {
        let cli = Cli::try_parse_from([
            "edof-extract",
            "-vv",
            "--drift-tolerance",
            "20000",
            "a.jpg",
            "b.jpg",
        ])
        .unwrap();
        assert_eq!(cli.inputs, vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")]);
        assert_eq!(cli.log_level(), "trace");
        assert_eq!(cli.scan_config().drift_tolerance, 20_000);
        assert_eq!(cli.scan_config().preamble_len, DEFAULT_PREAMBLE_LEN);
    }

    fn lenient(args: &[&str]) -> (Cli, Vec<OsString>) {
        Cli::try_parse_lenient(args.iter().copied()).unwrap()
    }

    #[test]
    fn unknown_flags_are_set_aside() {
        let (cli, ignored) = lenient(&["edof-extract", "-x", "a.jpg", "--frobnicate=3", "b.jpg"]);
        assert_eq!(cli.inputs, vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")]);
        assert_eq!(ignored, vec![OsString::from("-x"), OsString::from("--frobnicate=3")]);

        // one unknown letter taints the whole cluster
        let (cli, ignored) = lenient(&["edof-extract", "-vx", "a.jpg"]);
        assert_eq!(cli.verbose, 0);
        assert_eq!(ignored, vec![OsString::from("-vx")]);
    }

    #[test]
    fn known_flags_and_values_still_parse() {
        let (cli, ignored) = lenient(&[
            "edof-extract",
            "-vv",
            "-o",
            "out",
            "--drift-tolerance=20000",
            "--preamble-len",
            "72",
            "a.jpg",
            "--",
            "-b.jpg",
        ]);
        assert!(ignored.is_empty());
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.out_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.drift_tolerance, 20_000);
        assert_eq!(cli.preamble_len, 72);
        assert_eq!(cli.inputs, vec![PathBuf::from("a.jpg"), PathBuf::from("-b.jpg")]);

        let (cli, _) = lenient(&["edof-extract", "-odir", "a.jpg"]);
        assert_eq!(cli.out_dir, Some(PathBuf::from("dir")));
    }

    #[test]
    fn only_unknown_flags_is_a_usage_error() {
        assert!(Cli::try_parse_lenient(["edof-extract", "-x"]).is_err());
    }

    #[test]
    fn requires_an_input() {
        assert!(Cli::try_parse_from(["edof-extract"]).is_err());
        assert!(Cli::try_parse_from(["edof-extract", "-q", "-v", "a.jpg"]).is_err());
    }
}
