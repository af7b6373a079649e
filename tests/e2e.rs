mod common;

use std::process::{Command, Output};

use axum::http::StatusCode;
use common::{HASH, MockNode};

async fn run(node: &MockNode, args: &[&str]) -> (String, String, bool) {
    let mut command = Command::new(env!("CARGO_BIN_EXE_txs-client"));
    command
        .arg("--broadcast-url")
        .arg(node.broadcast_url())
        .arg("--polling-url")
        .arg(node.polling_url())
        .args(["--interval-ms", "20"])
        .args(args)
        .env("RUST_LOG", "warn");

    let output: Output = tokio::task::spawn_blocking(move || command.output())
        .await
        .unwrap()
        .expect("failed to run binary");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[tokio::test(flavor = "multi_thread")]
async fn transaction_is_confirmed() {
    let node = MockNode::spawn(StatusCode::OK, &["PENDING", "CONFIRMED"]).await;
    let (stdout, stderr, success) = run(&node, &["--timestamp", "1709738070", "ETH", "4500"]).await;

    assert!(success, "stderr: {stderr}");
    assert!(stderr.is_empty());

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "ETH 4500 1709738070 - INIT");
    assert_eq!(lines[1], format!("ETH 4500 1709738070 {HASH} PENDING"));
    assert_eq!(lines[2], format!("ETH 4500 1709738070 {HASH} CONFIRMED"));
    assert_eq!(node.polls(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_transaction_is_reported() {
    let node = MockNode::spawn(StatusCode::OK, &["FAILED"]).await;
    let (stdout, _, success) = run(&node, &["--timestamp", "1709738070", "ETH", "4500"]).await;

    assert!(success);
    assert_eq!(
        stdout.lines().last().unwrap(),
        format!("ETH 4500 1709738070 {HASH} FAILED")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_input_fails() {
    let node = MockNode::spawn(StatusCode::OK, &[]).await;
    let (stdout, stderr, success) = run(&node, &["--timestamp", "1709738070", "ETH", "0"]).await;

    assert!(!success);
    assert!(stdout.is_empty());
    assert!(stderr.contains("missing required transaction fields: price"));
    assert!(node.payloads().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_broadcast_fails() {
    let node = MockNode::spawn(StatusCode::BAD_REQUEST, &[]).await;
    let (stdout, stderr, success) = run(&node, &["--timestamp", "1709738070", "ETH", "4500"]).await;

    assert!(!success);
    assert_eq!(stdout.lines().count(), 1);
    assert!(stderr.contains("unexpected response status 400"));
}
