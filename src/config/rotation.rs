//! Rotation target configuration
//!
//! A rotation target is written as compact `key=value` pairs separated by `,`
//! or `;`, for example `filename=/var/log/app.log;maxsize=10;compress=true`.

use super::uri::parse_bool;
use crate::core::{LoggerError, Result};
use crate::sinks::RotatingFileSink;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const SEPARATORS: [char; 2] = [',', ';'];

/// Declarative parameters for one rotating file destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "lowercase")]
pub struct RotationTargetConfig {
    /// File to write to. Backups are kept in the same directory.
    /// `<tmpdir>/<process>-lumberjack.log` when empty.
    pub filename: String,
    /// Size in megabytes at which the file is rotated
    #[serde(rename = "maxsize")]
    pub max_size: u32,
    /// Days to keep backups, by the timestamp in their name. 0 keeps all.
    #[serde(rename = "maxage")]
    pub max_age: u32,
    /// Number of backups to keep. 0 keeps all.
    #[serde(rename = "maxbackups")]
    pub max_backups: u32,
    /// Name backups using local time instead of UTC
    #[serde(rename = "localtime")]
    pub local_time: bool,
    /// Gzip rotated files
    pub compress: bool,
}

impl RotationTargetConfig {
    pub const DEFAULT_MAX_SIZE: u32 = 100;
    pub const DEFAULT_MAX_BACKUPS: u32 = 50;

    /// Render as a spec string accepted by [`parse_rotation_target`].
    ///
    /// Fails when the filename contains a separator, since the spec form
    /// has no escape for `,` or `;`.
    pub fn to_spec(&self) -> Result<String> {
        if self.filename.contains(SEPARATORS) {
            return Err(LoggerError::invalid_rotation_spec(
                "filename",
                &self.filename,
                "filename must not contain ',' or ';'",
            ));
        }
        Ok(format!(
            "filename={};maxsize={};maxage={};maxbackups={};localtime={};compress={}",
            self.filename,
            self.max_size,
            self.max_age,
            self.max_backups,
            self.local_time,
            self.compress
        ))
    }

    /// Create the sink. The file itself is only opened on the first write.
    pub fn open(&self) -> RotatingFileSink {
        RotatingFileSink::new(self)
    }
}

impl Default for RotationTargetConfig {
    fn default() -> Self {
        Self {
            filename: String::new(),
            max_size: Self::DEFAULT_MAX_SIZE,
            max_age: 0,
            max_backups: Self::DEFAULT_MAX_BACKUPS,
            local_time: false,
            compress: false,
        }
    }
}

/// Parse a single rotation spec
pub fn parse_rotation_target(spec: &str) -> Result<RotationTargetConfig> {
    let mut pairs: HashMap<String, &str> = HashMap::new();
    for segment in spec.split(SEPARATORS) {
        if segment.is_empty() {
            continue;
        }
        let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
        pairs.insert(key.to_ascii_lowercase(), value);
    }

    let number = |key: &str, value: &str| -> Result<u32> {
        value
            .parse::<u32>()
            .map_err(|e| LoggerError::invalid_rotation_spec(key, spec, e))
    };
    let flag = |key: &str, value: &str| -> Result<bool> {
        parse_bool(value).ok_or_else(|| {
            LoggerError::invalid_rotation_spec(key, spec, "invalid boolean syntax")
        })
    };

    let mut config = RotationTargetConfig::default();
    for (key, value) in pairs {
        match key.as_str() {
            "filename" => config.filename = value.to_string(),
            "maxsize" => config.max_size = number(&key, value)?,
            "maxage" => config.max_age = number(&key, value)?,
            "maxbackups" => config.max_backups = number(&key, value)?,
            "localtime" => config.local_time = flag(&key, value)?,
            "compress" => config.compress = flag(&key, value)?,
            _ => {}
        }
    }
    Ok(config)
}

/// Parse every spec, failing on the first invalid one
pub fn parse_rotation_targets<S: AsRef<str>>(specs: &[S]) -> Result<Vec<RotationTargetConfig>> {
    specs
        .iter()
        .map(|spec| parse_rotation_target(spec.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_omitted() {
        let config = parse_rotation_target("filename=/tmp/app.log").unwrap();
        assert_eq!(config.filename, "/tmp/app.log");
        assert_eq!(config.max_size, 100);
        assert_eq!(config.max_backups, 50);
        assert_eq!(config.max_age, 0);
        assert!(!config.local_time);
        assert!(!config.compress);
    }

    #[test]
    fn test_all_keys_mixed_separators() {
        let config = parse_rotation_target(
            "FileName=/var/log/x.log,MaxSize=10;maxage=7,maxBackups=3;localtime=T,compress=1",
        )
        .unwrap();

        assert_eq!(
            config,
            RotationTargetConfig {
                filename: "/var/log/x.log".to_string(),
                max_size: 10,
                max_age: 7,
                max_backups: 3,
                local_time: true,
                compress: true,
            }
        );
    }

    #[test]
    fn test_empty_segments_and_unknown_keys() {
        let config = parse_rotation_target(";;filename=a.log;;colour=blue,,").unwrap();
        assert_eq!(config.filename, "a.log");
        assert_eq!(config.max_size, 100);
    }

    #[test]
    fn test_last_duplicate_wins() {
        let config = parse_rotation_target("maxsize=1;maxsize=2").unwrap();
        assert_eq!(config.max_size, 2);
    }

    #[test]
    fn test_empty_numeric_value_is_error() {
        let err = parse_rotation_target("filename=a.log;maxsize=").unwrap_err();
        match err {
            LoggerError::InvalidRotationSpec { key, spec, .. } => {
                assert_eq!(key, "maxsize");
                assert_eq!(spec, "filename=a.log;maxsize=");
            }
            other => panic!("unexpected error: {}", other),
        }

        // a bare key has an empty value
        assert!(parse_rotation_target("maxage").is_err());
    }

    #[test]
    fn test_invalid_values() {
        assert!(parse_rotation_target("maxbackups=-1").is_err());
        assert!(parse_rotation_target("maxsize=ten").is_err());
        assert!(parse_rotation_target("compress=yes").is_err());
        assert!(parse_rotation_target("localtime=").is_err());
    }

    #[test]
    fn test_parse_many() {
        let configs = parse_rotation_targets(&["filename=a.log", "filename=b.log;compress=true"]).unwrap();
        assert_eq!(configs.len(), 2);
        assert!(configs[1].compress);

        assert!(parse_rotation_targets(&["filename=a.log", "maxsize=x"]).is_err());
        assert!(parse_rotation_targets::<&str>(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_to_spec_roundtrip() {
        let config = RotationTargetConfig {
            filename: "logs/app.log".to_string(),
            max_size: 5,
            max_age: 2,
            max_backups: 0,
            local_time: true,
            compress: false,
        };
        assert_eq!(parse_rotation_target(&config.to_spec().unwrap()).unwrap(), config);
    }

    #[test]
    fn test_to_spec_rejects_separators_in_filename() {
        for filename in ["logs/a;b.log", "x,maxsize=1.log"] {
            let config = RotationTargetConfig {
                filename: filename.to_string(),
                ..RotationTargetConfig::default()
            };
            match config.to_spec().unwrap_err() {
                LoggerError::InvalidRotationSpec { key, spec, .. } => {
                    assert_eq!(key, "filename");
                    assert_eq!(spec, filename);
                }
                other => panic!("unexpected error: {}", other),
            }
        }
    }

    #[test]
    fn test_documented_examples() {
        let config = parse_rotation_target("filename=abc.log,compress=true;maxsize=500").unwrap();
        assert_eq!(
            config,
            RotationTargetConfig {
                filename: "abc.log".to_string(),
                max_size: 500,
                compress: true,
                ..RotationTargetConfig::default()
            }
        );

        let config = parse_rotation_target("filename=stdout.log,MaxAge=3200,localtime=true").unwrap();
        assert_eq!(
            config,
            RotationTargetConfig {
                filename: "stdout.log".to_string(),
                max_age: 3200,
                local_time: true,
                ..RotationTargetConfig::default()
            }
        );
    }

    #[test]
    fn test_serde_keys() {
        let config: RotationTargetConfig =
            serde_json::from_str(r#"{"filename":"x.log","maxsize":7}"#).unwrap();
        assert_eq!(config.max_size, 7);
        assert_eq!(config.max_backups, 50);
    }
}
