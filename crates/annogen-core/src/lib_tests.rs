#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

// LogLevel tests

#[test]
fn LogLevel___ordering___trace_less_than_debug() {
    assert!(LogLevel::Trace < LogLevel::Debug);
}

#[test]
fn LogLevel___ordering___error_less_than_off() {
    assert!(LogLevel::Error < LogLevel::Off);
}

#[test_case("trace", LogLevel::Trace)]
#[test_case("DEBUG", LogLevel::Debug)]
#[test_case("info", LogLevel::Info)]
#[test_case("warning", LogLevel::Warn)]
#[test_case("error", LogLevel::Error)]
#[test_case("off", LogLevel::Off)]
fn LogLevel___from_str___parses_known_names(input: &str, expected: LogLevel) {
    assert_eq!(input.parse::<LogLevel>().unwrap(), expected);
}

#[test]
fn LogLevel___from_str___rejects_unknown() {
    let result = "loud".parse::<LogLevel>();

    assert_eq!(result.unwrap_err(), "unknown log level: loud");
}

#[test]
fn LogLevel___as_directive___is_lowercase() {
    assert_eq!(LogLevel::Warn.as_directive(), "warn");
}

#[test]
fn LogLevel___display___is_uppercase() {
    assert_eq!(LogLevel::Info.to_string(), "INFO");
}
