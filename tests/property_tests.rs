//! Property-based tests for rust_logger_config using proptest

use proptest::prelude::*;
use rust_logger_config::config::{
    parse_bool, parse_config_from_uri, parse_rotation_target, RotationTargetConfig,
};
use rust_logger_config::encoders::{Facility, Framing, JsonEncoder, SyslogEncoder};
use rust_logger_config::prelude::*;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::DPanic),
        Just(LogLevel::Panic),
        Just(LogLevel::Fatal),
    ]
}

fn any_facility() -> impl Strategy<Value = Facility> {
    (0..Facility::ALL.len()).prop_map(|idx| Facility::ALL[idx])
}

/// Paths drawn from a charset that exercises percent-encoding
fn path_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_./ +%?&=#-]{1,24}"
}

/// Filenames usable inside a rotation spec
fn rotation_filename() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_./ -]{1,24}"
}

/// Filenames that may also contain the spec separators
fn any_rotation_filename() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_./ ,;=-]{1,24}"
}

prop_compose! {
    fn rotation_target()(
        filename in rotation_filename(),
        max_size in 0u32..10_000,
        max_age in 0u32..365,
        max_backups in 0u32..100,
        local_time in any::<bool>(),
        compress in any::<bool>(),
    ) -> RotationTargetConfig {
        RotationTargetConfig { filename, max_size, max_age, max_backups, local_time, compress }
    }
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Test that LogLevel string conversions roundtrip correctly
    #[test]
    fn test_log_level_str_roundtrip(level in any_level()) {
        let parsed: LogLevel = level.as_str().parse().unwrap();
        prop_assert_eq!(level, parsed);

        let upper: LogLevel = level.as_str().to_uppercase().parse().unwrap();
        prop_assert_eq!(level, upper);
    }

    /// Test that ordering follows severity codes
    #[test]
    fn test_log_level_ordering(level1 in any_level(), level2 in any_level()) {
        let val1 = level1 as i8;
        let val2 = level2 as i8;
        prop_assert_eq!(level1 <= level2, val1 <= val2);
        prop_assert_eq!(level1 > level2, val1 > val2);
    }

    /// Test that the gate enables exactly the levels at or above its own
    #[test]
    fn test_atomic_level_gate(threshold in any_level(), level in any_level()) {
        let gate = AtomicLevel::at(threshold);
        prop_assert_eq!(gate.enabled(level), level >= threshold);
    }
}

// ============================================================================
// Configuration URI Tests
// ============================================================================

proptest! {
    /// Test that printing a parsed configuration and parsing it again is stable
    #[test]
    fn test_standard_uri_roundtrip(
        console in any::<bool>(),
        development in any::<bool>(),
        disable_caller in any::<bool>(),
        outputs in prop::collection::vec(path_strategy(), 0..4),
        errors in prop::collection::vec(path_strategy(), 0..3),
        lumberjacks in prop::collection::vec(rotation_target(), 0..3),
    ) {
        let mut config = parse_config_from_uri(if console { "logger:console" } else { "logger:json" })
            .unwrap();
        config.development = development;
        config.disable_caller = disable_caller;
        config.output_paths = outputs;
        config.error_output_paths = errors;
        config.lumberjacks = lumberjacks;

        let uri = config.to_uri().unwrap();
        let reparsed = parse_config_from_uri(&uri).unwrap();
        prop_assert_eq!(&reparsed, &config);
        prop_assert_eq!(reparsed.to_uri().unwrap(), uri);
    }

    /// Test that syslog settings survive a roundtrip
    #[test]
    fn test_syslog_uri_roundtrip(
        addresses in prop::collection::vec("(tcp|udp|unix):[a-z0-9.:/]{1,20}", 1..4),
        octet_counting in any::<bool>(),
        facility in any_facility(),
        hostname in "[a-zA-Z0-9 .&=-]{0,16}",
        pid in any::<u32>(),
        app in "[a-zA-Z0-9_ -]{0,16}",
    ) {
        let mut config = parse_config_from_uri("logger:syslog").unwrap();
        config.output_addresses = addresses;
        config.framing = if octet_counting { Framing::OctetCounting } else { Framing::NonTransparent };
        config.facility = facility;
        config.hostname = hostname;
        config.pid = pid;
        config.app = app;

        let reparsed = parse_config_from_uri(&config.to_uri().unwrap()).unwrap();
        prop_assert_eq!(reparsed, config);
    }

    /// Test that only the documented boolean spellings are accepted
    #[test]
    fn test_parse_bool_rejects_other_text(text in "[a-zA-Z0-9]{0,6}") {
        let accepted = [
            "1", "t", "T", "TRUE", "true", "True",
            "0", "f", "F", "FALSE", "false", "False",
        ];
        prop_assert_eq!(parse_bool(&text).is_some(), accepted.contains(&text.as_str()));
    }

    /// Test that arbitrary text never panics the parser
    #[test]
    fn test_parse_never_panics(uri in "\\PC{0,64}") {
        let _ = parse_config_from_uri(&uri);
    }
}

// ============================================================================
// Rotation Target Tests
// ============================================================================

proptest! {
    /// Test that a rotation target's spec parses back to the same target
    #[test]
    fn test_rotation_spec_roundtrip(target in rotation_target()) {
        let parsed = parse_rotation_target(&target.to_spec().unwrap()).unwrap();
        prop_assert_eq!(parsed, target);
    }

    /// Test that a spec is either refused or parses back to the same target
    #[test]
    fn test_rotation_spec_never_misparses(filename in any_rotation_filename(), max_size in 0u32..10_000) {
        let target = RotationTargetConfig { filename, max_size, ..RotationTargetConfig::default() };
        match target.to_spec() {
            Ok(spec) => {
                prop_assert!(!target.filename.contains([',', ';']));
                prop_assert_eq!(&parse_rotation_target(&spec).unwrap(), &target);
            }
            Err(_) => prop_assert!(target.filename.contains([',', ';'])),
        }

        let mut config = parse_config_from_uri("logger:json").unwrap();
        config.lumberjacks.push(target);
        if let Ok(uri) = config.to_uri() {
            prop_assert_eq!(parse_config_from_uri(&uri).unwrap(), config);
        }
    }

    /// Test that keys are case-insensitive and `,` and `;` both separate
    #[test]
    fn test_rotation_spec_separators(max_size in 1u32..1000, comma in any::<bool>()) {
        let sep = if comma { "," } else { ";" };
        let spec = format!("FileName=app.log{}MAXSIZE={}", sep, max_size);
        let parsed = parse_rotation_target(&spec).unwrap();
        prop_assert_eq!(parsed.filename, "app.log");
        prop_assert_eq!(parsed.max_size, max_size);
    }
}

// ============================================================================
// Encoder Tests
// ============================================================================

proptest! {
    /// Test that JSON output is one parseable line carrying the message
    #[test]
    fn test_json_single_line(message in "\\PC{0,64}", level in any_level()) {
        let entry = LogEntry::new(level, message.clone());
        let bytes = JsonEncoder::new().encode(&entry).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        prop_assert!(text.ends_with('\n'));
        prop_assert_eq!(text.matches('\n').count(), 1);
        let parsed: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        prop_assert_eq!(parsed["msg"].as_str().unwrap(), message.as_str());
        prop_assert_eq!(parsed["level"].as_str().unwrap(), level.as_str());
    }

    /// Test that the octet count matches the framed message length
    #[test]
    fn test_syslog_octet_count(message in "\\PC{0,64}", level in any_level(), facility in any_facility()) {
        let encoder = SyslogEncoder::new(Framing::OctetCounting, facility, "host", 1, "app");
        let bytes = encoder.encode(&LogEntry::new(level, message)).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let (count, rest) = text.split_once(' ').unwrap();
        prop_assert_eq!(count.parse::<usize>().unwrap(), rest.len());
        let expected_prefix = format!("<{}>1 ", encoder.priority(level));
        prop_assert!(rest.starts_with(&expected_prefix));
    }
}
