//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! ckpt-average -m run1/model.npz run2/model.npz -o model.avg.npz
//! ckpt-average -m run1/model.npz -m run2/model.npz --output model.avg.npz
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Average the parameters of several .npz model checkpoints
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "ckpt-average")]
#[command(version)]
#[command(about = "Average the parameters of several .npz model checkpoints into one")]
pub struct Cli {
    /// Checkpoints to average; takes several values and may be repeated
    #[arg(
        short = 'm',
        long = "model",
        value_name = "MODEL",
        num_args = 1..,
        required = true
    )]
    pub models: Vec<PathBuf>,

    /// Output path for the averaged checkpoint (`.npz` is appended if missing)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: PathBuf,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_parse_single_model() {
        let cli = parse_args(["ckpt-average", "-m", "a.npz", "-o", "avg.npz"]).unwrap();
        assert_eq!(cli.models, vec![PathBuf::from("a.npz")]);
        assert_eq!(cli.output, PathBuf::from("avg.npz"));
    }

    #[test]
    fn test_parse_multiple_values() {
        let cli = parse_args([
            "ckpt-average",
            "-m",
            "a.npz",
            "b.npz",
            "c.npz",
            "-o",
            "avg.npz",
        ])
        .unwrap();
        assert_eq!(
            cli.models,
            vec![
                PathBuf::from("a.npz"),
                PathBuf::from("b.npz"),
                PathBuf::from("c.npz")
            ]
        );
    }

    #[test]
    fn test_parse_repeated_flag_appends_in_order() {
        let cli = parse_args([
            "ckpt-average",
            "--model",
            "a.npz",
            "b.npz",
            "-o",
            "avg",
            "-m",
            "c.npz",
        ])
        .unwrap();
        assert_eq!(
            cli.models,
            vec![
                PathBuf::from("a.npz"),
                PathBuf::from("b.npz"),
                PathBuf::from("c.npz")
            ]
        );
        assert_eq!(cli.output, PathBuf::from("avg"));
    }

    #[test]
    fn test_same_model_twice_is_kept() {
        let cli = parse_args(["ckpt-average", "-m", "a.npz", "a.npz", "--output", "o.npz"])
            .unwrap();
        assert_eq!(cli.models.len(), 2);
    }

    #[test]
    fn test_missing_model_rejected() {
        let err = parse_args(["ckpt-average", "-o", "avg.npz"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_model_flag_without_values_rejected() {
        let result = parse_args(["ckpt-average", "-o", "avg.npz", "-m"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_output_rejected() {
        let err = parse_args(["ckpt-average", "-m", "a.npz"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_unknown_flag_rejected() {
        let err = parse_args(["ckpt-average", "-m", "a.npz", "-o", "x", "--weights", "1,2"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }
}
