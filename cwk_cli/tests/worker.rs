use std::io::Write;
use std::process::{Command, Stdio};

use serde_json::Value;

fn run(request: &Value) -> (i32, Value) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_cwk_cli"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("worker binary spawns");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(request.to_string().as_bytes())
        .expect("write request");

    let output = child.wait_with_output().expect("worker runs to completion");
    let status = output.status.code().unwrap_or(-1);
    let body = if output.status.success() {
        &output.stdout
    } else {
        &output.stderr
    };
    let value: Value = serde_json::from_slice(body).expect("worker prints valid JSON");
    (status, value)
}

#[test]
fn generate_mnemonic_round_trips_known_entropy() {
    let (status, response) = run(&serde_json::json!({
        "command": "generate_mnemonic",
        "entropy": "00".repeat(16),
    }));
    assert_eq!(status, 0);
    assert_eq!(response["status"], "success");
    assert_eq!(
        response["mnemonic"],
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about"
    );
}

#[test]
fn validate_mnemonic_reports_valid_and_invalid() {
    let (status, response) = run(&serde_json::json!({
        "command": "validate_mnemonic",
        "mnemonic": "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
    }));
    assert_eq!(status, 0);
    assert_eq!(response["isValid"], true);

    let (status, response) = run(&serde_json::json!({
        "command": "validate_mnemonic",
        "mnemonic": "not a real mnemonic",
    }));
    assert_eq!(status, 0);
    assert_eq!(response["isValid"], false);
}

#[test]
fn get_keys_batch_covers_bitcoin() {
    let (status, response) = run(&serde_json::json!({
        "command": "get_keys_batch",
        "mnemonic": "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
        "num": 2,
    }));
    assert_eq!(status, 0);
    let results = response["results"].as_array().expect("results is an array");
    assert!(results
        .iter()
        .any(|r| r.get("coin").and_then(Value::as_str) == Some("bitcoin")));
}

#[test]
fn unknown_command_is_reported_on_stderr_with_nonzero_exit() {
    let (status, response) = run(&serde_json::json!({ "command": "not_a_command" }));
    assert_ne!(status, 0);
    assert_eq!(response["status"], "error");
    assert_eq!(response["stack"], "UnknownCommand");
}

#[test]
fn sign_transaction_rejects_tampered_address() {
    let (status, response) = run(&serde_json::json!({
        "command": "sign_transaction",
        "method": "signTransfer",
        "mnemonic": "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
        "asset": {
            "coin": "ethereum",
            "address": "0x0000000000000000000000000000000000dEaD",
            "derivation_path": "m/44'/60'/0'/0/0",
        },
        "txData": {
            "chainId": "0x01",
            "nonce": "0x00",
            "gasPrice": "0x04a817c800",
            "gasLimit": "0x5208",
            "to": "0x3535353535353535353535353535353535353535",
            "amount": "0x0de0b6b3a7640000",
        },
    }));
    assert_ne!(status, 0);
    assert_eq!(response["status"], "error");
    assert_eq!(response["stack"], "AddressMismatch");
}
