//! Response checks
//!
//! The expected document defines what is checked: every scalar leaf it
//! contains must be present with the same value in the actual response,
//! unless an exception rule says otherwise. Fields only present in the
//! actual response are never looked at.

use serde_json::Value;
use tracing::{debug, error};

use crate::common::config::{ExceptionKind, ExceptionRule};
use crate::keypath;

/// Compare a response body with the expected one
///
/// Every mismatch is logged before returning, not just the first.
pub fn check_content(actual: &Value, expected: &Value, exceptions: &[ExceptionRule]) -> bool {
    debug!("Checking test result content...");

    let mut passed = true;
    let mut actual_keys: Option<Vec<String>> = None;

    for key in keypath::flatten(expected) {
        match exceptions.iter().find(|rule| rule.key == key) {
            None => {
                let actual_value = keypath::get(actual, &key);
                let expected_value = keypath::get(expected, &key);
                if actual_value != expected_value {
                    error!(
                        "Check failed for key {} :: expected: {} - actual: {}",
                        key,
                        describe(expected_value),
                        describe(actual_value)
                    );
                    passed = false;
                }
            }
            Some(rule) => {
                debug!("Key {} found in exceptions list ({:?})", key, rule.kind);
                match rule.kind {
                    ExceptionKind::Ignore => {}
                    ExceptionKind::Exist => {
                        let keys = actual_keys.get_or_insert_with(|| keypath::flatten(actual));
                        if !keys.contains(&key) {
                            error!("Check failed for key {} :: expected to exist", key);
                            passed = false;
                        }
                    }
                }
            }
        }
    }

    if passed {
        debug!("Content check successful");
    } else {
        error!("Content check failed");
    }
    passed
}

/// Compare the response status code with the expected one
pub fn check_status_code(actual: u16, expected: u16) -> bool {
    debug!("Checking test result code...");

    let passed = actual == expected;
    if passed {
        debug!("Code check successful");
    } else {
        error!("Code check failed :: expected: {} - actual: {}", expected, actual);
    }
    passed
}

fn describe(value: Option<&Value>) -> String {
    value.map_or_else(|| "<missing>".to_string(), Value::to_string)
}
