//! Unit tests for CLI argument parsing and validation

use clap::Parser;
use snapdiff::cli::{Cli, Commands};
use std::path::PathBuf;

#[test]
fn test_cli_init_command() {
    let cli = Cli::try_parse_from(["snapdiff", "init"]).unwrap();
    match cli.command {
        Commands::Init { force } => assert!(!force),
        _ => panic!("Expected Init command"),
    }
}

#[test]
fn test_cli_run_defaults() {
    let cli = Cli::try_parse_from(["snapdiff", "run", "archives"]).unwrap();
    match cli.command {
        Commands::Run {
            input,
            output,
            tool,
            tool_args,
            pairing,
            jobs,
            timeout,
            extensions,
            case_insensitive,
            no_skip_identical,
            format,
            ..
        } => {
            assert_eq!(input, PathBuf::from("archives"));
            assert!(output.is_none());
            assert!(tool.is_none());
            assert!(tool_args.is_empty());
            assert!(pairing.is_none());
            assert!(jobs.is_none());
            assert!(timeout.is_none());
            assert!(extensions.is_empty());
            assert!(!case_insensitive);
            assert!(!no_skip_identical);
            assert_eq!(format, "pretty");
        }
        _ => panic!("Expected Run command"),
    }
}

#[test]
fn test_cli_run_with_options() {
    let cli = Cli::try_parse_from([
        "snapdiff", "run", "archives",
        "--tool", "dyff",
        "--tool-arg", "between",
        "--tool-arg", "--omit-header",
        "--pairing", "cyclic",
        "--jobs", "4",
        "--timeout", "30",
        "--ext", ".yml",
        "--ext", ".json",
        "--output", "out/diffs.jsonl",
    ])
    .unwrap();

    match cli.command {
        Commands::Run { tool, tool_args, pairing, jobs, timeout, extensions, output, .. } => {
            assert_eq!(tool.as_deref(), Some("dyff"));
            assert_eq!(tool_args, vec!["between", "--omit-header"]);
            assert_eq!(pairing.as_deref(), Some("cyclic"));
            assert_eq!(jobs, Some(4));
            assert_eq!(timeout, Some(30));
            assert_eq!(extensions, vec![".yml", ".json"]);
            assert_eq!(output, Some(PathBuf::from("out/diffs.jsonl")));
        }
        _ => panic!("Expected Run command"),
    }
}

#[test]
fn test_cli_rejects_zero_jobs_and_timeout() {
    assert!(Cli::try_parse_from(["snapdiff", "run", "archives", "--jobs", "0"]).is_err());
    assert!(Cli::try_parse_from(["snapdiff", "run", "archives", "--timeout", "0"]).is_err());
    assert!(Cli::try_parse_from(["snapdiff", "run", "archives", "--jobs", "many"]).is_err());
}

#[test]
fn test_cli_parse_command() {
    let cli = Cli::try_parse_from([
        "snapdiff", "parse", "saved.diff", "--file", "a.yaml", "--snapshot", "s2.tar",
    ])
    .unwrap();

    match cli.command {
        Commands::Parse { diff_file, file, snapshot, separator } => {
            assert_eq!(diff_file, PathBuf::from("saved.diff"));
            assert_eq!(file, "a.yaml");
            assert_eq!(snapshot, "s2.tar");
            assert!(separator.is_none());
        }
        _ => panic!("Expected Parse command"),
    }
}

#[test]
fn test_cli_global_flags() {
    let cli = Cli::try_parse_from(["snapdiff", "pairs", "archives", "--workspace", "/tmp/ws", "-v"]).unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.workspace, Some(PathBuf::from("/tmp/ws")));
}

#[test]
fn test_cli_missing_required_args() {
    assert!(Cli::try_parse_from(["snapdiff", "run"]).is_err());
    assert!(Cli::try_parse_from(["snapdiff", "parse", "saved.diff", "--file", "a.yaml"]).is_err());
}
