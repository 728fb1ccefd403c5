//! Integration tests for the command-line front end.

use clap::Parser;
use querydesk::cli::{handle_logs, Cli, Command};
use tempfile::tempdir;

#[test]
fn test_logs_export_keeps_previous_session() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("querydesk.log");
    let previous = "ERROR querydesk: API error (500): relation \"userz\" does not exist\n";
    std::fs::write(&log_path, previous).unwrap();

    let dest = dir.path().join("out.log");
    let cli = Cli::try_parse_from([
        "querydesk",
        "--log-file",
        "logs",
        "export",
        dest.to_str().unwrap(),
    ])
    .unwrap();

    // The log file must not be reopened for writing before the export.
    assert!(!cli.log_to_file());

    let Command::Logs(cmd) = &cli.command else {
        panic!("expected logs command");
    };
    let output = handle_logs(cmd, &log_path).unwrap().render();

    assert_eq!(
        output,
        format!("Exported {} bytes of logs to {}", previous.len(), dest.display())
    );
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), previous);
    assert_eq!(std::fs::read_to_string(&log_path).unwrap(), previous);
}

#[test]
fn test_logs_export_without_log_file() {
    let dir = tempdir().unwrap();
    let cli = Cli::try_parse_from(["querydesk", "logs", "export", "out.log"]).unwrap();
    let Command::Logs(cmd) = &cli.command else {
        panic!("expected logs command");
    };

    let err = handle_logs(cmd, &dir.path().join("missing.log")).unwrap_err();
    assert!(err.to_string().contains("--log-file"));
}
