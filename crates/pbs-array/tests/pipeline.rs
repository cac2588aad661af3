//! End-to-end generation tests against real files.

use std::fs;
use std::path::Path;

use pbs_array::{ArrayError, BatchConfig, CommandsPerNode, GenerateRequest, generate};

fn write_commands(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("cmds.txt");
    fs::write(&path, contents).unwrap();
    path
}

fn per_node(s: &str) -> CommandsPerNode {
    s.parse().unwrap()
}

#[test]
fn test_three_commands_two_per_node() {
    let dir = tempfile::tempdir().unwrap();
    let cmds = write_commands(dir.path(), "echo a\necho b\necho c\n");
    let output = dir.path().join("array.pbs");

    let generated = generate(&GenerateRequest::new(&cmds, per_node("2"), &output)).unwrap();
    assert!(generated.written);
    assert_eq!(generated.plan.array_length(), 2);

    let script = fs::read_to_string(&output).unwrap();
    assert!(script.starts_with("#!/bin/bash\n"));
    assert!(script.contains("#PBS -t 1-2\n"));
    assert!(script.contains("parallel -j2\n"));
    assert!(script.contains("\necho a\necho b\necho c\nEOF\n"));
    assert_eq!(script.as_bytes(), generated.script.as_bytes());
}

#[cfg(unix)]
#[test]
fn test_output_is_owner_executable() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let cmds = write_commands(dir.path(), "echo a\n");
    let output = dir.path().join("array.pbs");

    generate(&GenerateRequest::new(&cmds, per_node("1"), &output)).unwrap();

    let mode = fs::metadata(&output).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o700);
}

#[test]
fn test_custom_config_reaches_script() {
    let dir = tempfile::tempdir().unwrap();
    let cmds = write_commands(dir.path(), "a\nb\n");
    let output = dir.path().join("array.pbs");

    let request = GenerateRequest::new(&cmds, per_node("1"), &output)
        .with_config(BatchConfig::default().with_cores_per_node(64));
    generate(&request).unwrap();

    let script = fs::read_to_string(&output).unwrap();
    assert!(script.contains("#PBS -l nodes=1:ppn=64\n"));
    assert!(script.contains("#PBS -t 1-2\n"));
}

#[test]
fn test_empty_input_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let cmds = write_commands(dir.path(), "");
    let output = dir.path().join("array.pbs");

    let err = generate(&GenerateRequest::new(&cmds, per_node("4"), &output)).unwrap_err();
    assert!(matches!(err, ArrayError::EmptyInput(_)));
    assert!(!output.exists());
}

#[test]
fn test_missing_input_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("array.pbs");

    let request = GenerateRequest::new(dir.path().join("nope.txt"), per_node("4"), &output);
    let err = generate(&request).unwrap_err();
    assert!(matches!(err, ArrayError::FileNotFound(_)));
    assert!(!output.exists());
}

#[test]
fn test_failed_run_keeps_existing_output() {
    let dir = tempfile::tempdir().unwrap();
    let cmds = write_commands(dir.path(), "   \n");
    let output = dir.path().join("array.pbs");
    fs::write(&output, "previous").unwrap();

    assert!(generate(&GenerateRequest::new(&cmds, per_node("1"), &output)).is_err());
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous");
}

#[test]
fn test_invalid_config_rejected_before_output() {
    let dir = tempfile::tempdir().unwrap();
    let cmds = write_commands(dir.path(), "echo a\n");
    let output = dir.path().join("array.pbs");

    let request = GenerateRequest::new(&cmds, per_node("1"), &output)
        .with_config(BatchConfig::default().with_nodes_per_job(0));
    let err = generate(&request).unwrap_err();
    assert!(matches!(err, ArrayError::Config(_)));
    assert!(!output.exists());
}

#[test]
fn test_dry_run_does_not_write() {
    let dir = tempfile::tempdir().unwrap();
    let cmds = write_commands(dir.path(), "echo a\necho b\n");
    let output = dir.path().join("array.pbs");

    let request = GenerateRequest::new(&cmds, per_node("1"), &output).with_dry_run(true);
    let generated = generate(&request).unwrap();

    assert!(!generated.written);
    assert!(generated.script.to_text().contains("#PBS -t 1-2\n"));
    assert!(!output.exists());
}

#[test]
fn test_non_utf8_commands_pass_through() {
    let dir = tempfile::tempdir().unwrap();
    let cmds = dir.path().join("cmds.txt");
    fs::write(&cmds, b"echo caf\xe9\ncp r\xe9sum\xe9.pdf /tmp\n").unwrap();
    let output = dir.path().join("array.pbs");

    let generated = generate(&GenerateRequest::new(&cmds, per_node("2"), &output)).unwrap();
    assert_eq!(generated.plan.array_length(), 1);

    let script = fs::read(&output).unwrap();
    assert!(script.ends_with(b"parallel -j2\necho caf\xe9\ncp r\xe9sum\xe9.pdf /tmp\nEOF\n"));
}

#[test]
fn test_heredoc_delimiter_command_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let cmds = write_commands(dir.path(), "echo a\nEOF\necho b\n");
    let output = dir.path().join("array.pbs");

    let err = generate(&GenerateRequest::new(&cmds, per_node("1"), &output)).unwrap_err();
    assert!(matches!(err, ArrayError::ReservedCommand { line: 2, .. }));
    assert!(!output.exists());
}
