mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use std::process::Command;

#[test]
fn test_cli_prints_eligible_instruments() -> Result<(), Box<dyn std::error::Error>> {
    let manifest = common::write_temp(common::MANIFEST);
    let request = common::write_json(&common::request(&["bitcoin", "bobpay", "visa"], false));

    let mut cmd = Command::new(cargo_bin!("payreq"));
    cmd.arg(request.path()).arg("--instruments").arg(manifest.path());

    // bitcoin is disabled in the manifest
    cmd.assert().success().stdout("bobpay\nvisa\n");

    Ok(())
}

#[test]
fn test_cli_no_available_instruments() {
    let manifest = common::write_temp(common::MANIFEST);
    let request = common::write_json(&common::request(&["bitcoin"], false));

    let mut cmd = Command::new(cargo_bin!("payreq"));
    cmd.arg(request.path()).arg("--instruments").arg(manifest.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""kind":"NoAvailablePaymentInstruments""#))
        .stderr(predicate::str::contains("Error creating request"))
        .stderr(predicate::str::contains("Installed instruments: bobpay, visa"));
}

#[test]
fn test_cli_shipping_checkout() {
    let manifest = common::write_temp(common::MANIFEST);
    let request = common::write_json(&common::request(&["visa"], true));
    let script = common::write_json(&json!([
        { "action": "selectInstrument", "instrument": "visa" },
        { "action": "selectShippingAddress", "address": common::address() },
        { "action": "updateShippingOptions", "options": common::standard_and_express() },
        { "action": "selectShippingOption", "identifier": "express" },
        { "action": "respond", "outcome": {
            "type": "response", "details": { "cardNumber": "4111 1111 1111 1111" } } }
    ]));

    let mut cmd = Command::new(cargo_bin!("payreq"));
    cmd.arg(request.path())
        .arg("--instruments")
        .arg(manifest.path())
        .arg("--script")
        .arg(script.path());

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let events = common::events(&output.stdout);

    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["event"], "shippingAddressChange");
    assert_eq!(events[0]["newAddress"]["city"], "Springfield");
    assert_eq!(events[1], json!({ "event": "shippingOptionChange", "identifier": "express" }));
    assert_eq!(events[2]["event"], "instrumentResponse");
    assert_eq!(events[2]["instrumentName"], "visa");
    assert_eq!(events[2]["responseKind"], "finalize");
    assert!(events[2].get("annotations").is_none());
}

#[test]
fn test_cli_luhn_failure_is_annotated() {
    let manifest = common::write_temp(common::MANIFEST);
    let request = common::write_json(&common::request(&["visa"], false));
    let script = common::write_json(&json!([
        { "action": "selectInstrument", "instrument": "visa" },
        { "action": "respond", "outcome": {
            "type": "response", "details": { "cardNumber": "4111111111111112" } } }
    ]));

    let mut cmd = Command::new(cargo_bin!("payreq"));
    cmd.arg(request.path())
        .arg("--instruments")
        .arg(manifest.path())
        .arg("--script")
        .arg(script.path());

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let events = common::events(&output.stdout);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["details"]["cardNumber"], "4111111111111112");
    assert_eq!(events[0]["annotations"], json!(["luhnCheckFailed"]));
}

#[test]
fn test_cli_user_cancel() {
    let manifest = common::write_temp(common::MANIFEST);
    let request = common::write_json(&common::request(&["visa"], true));
    let script = common::write_json(&json!([
        { "action": "selectInstrument", "instrument": "visa" },
        { "action": "selectShippingAddress", "address": common::address() },
        { "action": "cancel" },
        { "action": "updateShippingOptions", "options": common::standard_and_express() }
    ]));

    let mut cmd = Command::new(cargo_bin!("payreq"));
    cmd.arg(request.path())
        .arg("--instruments")
        .arg(manifest.path())
        .arg("--script")
        .arg(script.path());

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let events = common::events(&output.stdout);

    assert_eq!(events.len(), 2);
    assert_eq!(events[1]["event"], "error");
    assert_eq!(events[1]["kind"], "UserCanceledRequest");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Skipped 1 step(s) after request reached Cancelled"));
}

#[test]
fn test_cli_shipping_never_provided() {
    let manifest = common::write_temp(common::MANIFEST);
    let request = common::write_json(&common::request(&["visa"], true));
    let script = common::write_json(&json!([
        { "action": "selectInstrument", "instrument": "visa" },
        { "action": "respond", "outcome": { "type": "response", "details": {} } }
    ]));

    let mut cmd = Command::new(cargo_bin!("payreq"));
    cmd.arg(request.path())
        .arg("--instruments")
        .arg(manifest.path())
        .arg("--script")
        .arg(script.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""kind":"NoShippingOptionsProvided""#))
        .stdout(predicate::str::contains("instrumentResponse").not())
        .stderr(predicate::str::contains("Error processing step 1 (fatal)"));
}

#[test]
fn test_cli_instrument_failure_surfaced_verbatim() {
    let manifest = common::write_temp(common::MANIFEST);
    let request = common::write_json(&common::request(&["bobpay"], false));
    let script = common::write_json(&json!([
        { "action": "selectInstrument", "instrument": "bobpay" },
        { "action": "respond", "outcome": {
            "type": "failure", "code": "CardFrozen", "message": "card is frozen" } }
    ]));

    let mut cmd = Command::new(cargo_bin!("payreq"));
    cmd.arg(request.path())
        .arg("--instruments")
        .arg(manifest.path())
        .arg("--script")
        .arg(script.path());

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let events = common::events(&output.stdout);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["kind"], "CardFrozen");
    assert!(events[0]["message"].as_str().unwrap().contains("card is frozen"));
}

#[test]
fn test_cli_response_window_timeout() {
    let manifest = common::write_temp(common::MANIFEST);
    let request = common::write_json(&common::request(&["visa"], true));
    let script = common::write_json(&json!([
        { "action": "selectInstrument", "instrument": "visa" },
        { "action": "selectShippingAddress", "address": common::address() },
        { "action": "wait", "ms": 200 },
        { "action": "updateShippingOptions", "options": common::standard_and_express() }
    ]));

    let mut cmd = Command::new(cargo_bin!("payreq"));
    cmd.arg(request.path())
        .arg("--instruments")
        .arg(manifest.path())
        .arg("--script")
        .arg(script.path())
        .arg("--response-window-ms")
        .arg("50");

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let events = common::events(&output.stdout);

    assert_eq!(events.last().unwrap()["kind"], "Timeout");
}

#[test]
fn test_cli_verbose_logs_to_stderr() {
    let manifest = common::write_temp(common::MANIFEST);
    let request = common::write_json(&common::request(&["visa"], false));

    let mut cmd = Command::new(cargo_bin!("payreq"));
    cmd.env_remove("RUST_LOG")
        .arg(request.path())
        .arg("--instruments")
        .arg(manifest.path())
        .arg("-v");

    cmd.assert()
        .success()
        .stdout("visa\n")
        .stderr(predicate::str::contains("payment request created"));
}
