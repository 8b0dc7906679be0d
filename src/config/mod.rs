//! Declarative logger configuration
//!
//! A [`Config`] describes an encoder, its destinations and the logger
//! options. It is usually parsed from a configuration URI:
//!
//! ```no_run
//! use rust_logger_config::config::parse_config_from_uri;
//!
//! let config = parse_config_from_uri(
//!     "logger:console?development=true&outputPaths=stdout&lumberjack=filename=app.log;maxsize=10",
//! )?;
//! let logger = config.build([])?;
//! logger.info("configured");
//! # Ok::<(), rust_logger_config::LoggerError>(())
//! ```

pub mod rotation;
pub mod sinks;
pub mod uri;

pub use rotation::{parse_rotation_target, parse_rotation_targets, RotationTargetConfig};
pub use uri::{config_to_uri, parse_bool, parse_config_from_uri};

use crate::core::{AtomicLevel, LogLevel, Logger, LoggerOption, Result, SharedSink};
use crate::encoders::{ConsoleEncoder, Encoder, EncoderKind, Facility, Framing, JsonEncoder, SyslogEncoder};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Configuration the global logger starts with
pub const DEFAULT_URI: &str = "logger:json?outputPaths=stderr";

static BASE_LEVEL: Lazy<AtomicLevel> = Lazy::new(AtomicLevel::new);

/// The process-wide level shared by every configuration created from
/// defaults
pub fn base_level() -> &'static AtomicLevel {
    &BASE_LEVEL
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub encoder: EncoderKind,
    /// Minimum enabled level. Shared: changing it affects every logger built
    /// from this configuration.
    pub level: AtomicLevel,
    /// DPanic panics and stack traces start at `Warn`
    pub development: bool,
    pub disable_caller: bool,
    pub disable_stacktrace: bool,

    pub output_paths: Vec<String>,
    /// Where write failures of the logger itself are reported
    pub error_output_paths: Vec<String>,
    pub lumberjacks: Vec<RotationTargetConfig>,
    pub error_lumberjacks: Vec<RotationTargetConfig>,

    /// `[network:]address` tokens, syslog only
    pub output_addresses: Vec<String>,
    pub framing: Framing,
    pub facility: Facility,
    pub hostname: String,
    pub pid: u32,
    pub app: String,

    #[serde(skip)]
    default_output_paths: Vec<String>,
    #[serde(skip)]
    default_error_output_paths: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            encoder: EncoderKind::Json,
            level: base_level().clone(),
            development: false,
            disable_caller: true,
            disable_stacktrace: false,
            output_paths: Vec::new(),
            error_output_paths: Vec::new(),
            lumberjacks: Vec::new(),
            error_lumberjacks: Vec::new(),
            output_addresses: Vec::new(),
            framing: Framing::default(),
            facility: Facility::default(),
            hostname: String::new(),
            pid: 0,
            app: String::new(),
            default_output_paths: vec!["stderr".to_string()],
            default_error_output_paths: vec!["stderr".to_string()],
        }
    }
}

impl Config {
    /// Output paths, falling back to the defaults when none are listed
    pub fn effective_output_paths(&self) -> &[String] {
        if self.output_paths.is_empty() {
            &self.default_output_paths
        } else {
            &self.output_paths
        }
    }

    pub fn effective_error_output_paths(&self) -> &[String] {
        if self.error_output_paths.is_empty() {
            &self.default_error_output_paths
        } else {
            &self.error_output_paths
        }
    }

    /// The encoder selected by `encoder`, carrying the syslog identity
    pub fn encoder(&self) -> Encoder {
        match self.encoder {
            EncoderKind::Json => JsonEncoder::new().into(),
            EncoderKind::Console => ConsoleEncoder::new().into(),
            EncoderKind::Syslog => SyslogEncoder::new(
                self.framing,
                self.facility,
                &self.hostname,
                self.pid,
                &self.app,
            )
            .into(),
        }
    }

    /// Logger options implied by this configuration
    pub fn build_options(&self, error_sink: SharedSink) -> Vec<LoggerOption> {
        let mut options = vec![LoggerOption::ErrorOutput(error_sink)];

        if self.development {
            options.push(LoggerOption::Development);
        }
        if !self.disable_caller {
            options.push(LoggerOption::AddCaller);
        }
        if !self.disable_stacktrace {
            let stack_level = if self.development {
                LogLevel::Warn
            } else {
                LogLevel::Error
            };
            options.push(LoggerOption::AddStacktrace(stack_level));
        }
        options
    }

    /// Open the destinations and build a logger bound to `level`.
    ///
    /// `options` are applied after the ones derived from the configuration,
    /// so they take precedence.
    pub fn build<I>(&self, options: I) -> Result<Logger>
    where
        I: IntoIterator<Item = LoggerOption>,
    {
        let encoder = self.encoder();
        let (sink, error_sink) = sinks::open_sinks(self)?;

        let mut all = self.build_options(error_sink);
        all.extend(options);
        Ok(Logger::new(encoder, sink, self.level.clone()).with_options(all))
    }

    /// Serialise back into a configuration URI
    pub fn to_uri(&self) -> Result<String> {
        config_to_uri(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::BufferSink;
    use std::fs;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.encoder, EncoderKind::Json);
        assert!(config.disable_caller);
        assert_eq!(config.facility, Facility::Local0);
        assert_eq!(config.framing, Framing::NonTransparent);
        assert_eq!(config.effective_output_paths(), ["stderr"]);
        assert_eq!(config.effective_error_output_paths(), ["stderr"]);
        assert!(config.level.same_as(base_level()));
    }

    #[test]
    fn test_build_options() {
        let errors: SharedSink = Arc::new(BufferSink::new());

        let production = Config {
            disable_caller: false,
            ..Config::default()
        };
        let options = production.build_options(errors.clone());
        assert_eq!(options.len(), 3);
        assert!(matches!(options[1], LoggerOption::AddCaller));
        assert!(matches!(options[2], LoggerOption::AddStacktrace(LogLevel::Error)));

        let development = Config {
            development: true,
            disable_stacktrace: true,
            ..Config::default()
        };
        let options = development.build_options(errors);
        assert_eq!(options.len(), 2);
        assert!(matches!(options[1], LoggerOption::Development));
    }

    #[test]
    fn test_build_writes_to_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("built.log");
        let config = Config {
            level: AtomicLevel::at(LogLevel::Debug),
            output_paths: vec![path.display().to_string()],
            ..Config::default()
        };

        let logger = config.build([])?;
        assert_eq!(logger.encoder_kind(), EncoderKind::Json);
        assert_eq!(logger.stack_level(), Some(LogLevel::Error));
        assert!(!logger.adds_caller());

        logger.debug("from config");
        logger.sync()?;

        let content = fs::read_to_string(&path)?;
        let parsed: serde_json::Value = serde_json::from_str(content.trim_end())?;
        assert_eq!(parsed["msg"], "from config");
        Ok(())
    }

    #[test]
    fn test_extra_options_override() -> Result<()> {
        let config = Config {
            level: AtomicLevel::new(),
            ..Config::default()
        };
        let logger = config.build([LoggerOption::WithCaller(true), LoggerOption::AddCallerSkip(1)])?;
        assert!(logger.adds_caller());
        assert_eq!(logger.caller_skip(), 1);
        Ok(())
    }

    #[test]
    fn test_level_is_shared_with_built_loggers() -> Result<()> {
        let config = Config {
            level: AtomicLevel::at(LogLevel::Info),
            ..Config::default()
        };
        let logger = config.build([])?;
        config.level.set("error")?;
        assert_eq!(logger.level(), LogLevel::Error);
        Ok(())
    }

    #[test]
    fn test_syslog_encoder_identity() {
        let config = Config {
            encoder: EncoderKind::Syslog,
            facility: Facility::Daemon,
            framing: Framing::OctetCounting,
            hostname: "db-1".to_string(),
            pid: 7,
            app: "store".to_string(),
            ..Config::default()
        };
        match config.encoder() {
            Encoder::Syslog(encoder) => {
                assert_eq!(encoder.facility(), Facility::Daemon);
                assert_eq!(encoder.framing(), Framing::OctetCounting);
                assert_eq!(encoder.hostname(), "db-1");
                assert_eq!(encoder.pid(), 7);
                assert_eq!(encoder.app(), "store");
            }
            other => panic!("unexpected encoder {:?}", other.kind()),
        }
    }

    #[test]
    fn test_serde_camel_case() {
        let config: Config = serde_json::from_str(
            r#"{"encoder":"console","level":"warn","disableCaller":false,"outputPaths":["stdout"],"lumberjacks":[{"filename":"a.log"}]}"#,
        )
        .unwrap();
        assert_eq!(config.encoder, EncoderKind::Console);
        assert_eq!(config.level.level(), LogLevel::Warn);
        assert!(!config.disable_caller);
        assert_eq!(config.lumberjacks[0].max_size, 100);
        assert_eq!(config.effective_error_output_paths(), ["stderr"]);
    }
}
