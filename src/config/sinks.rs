//! Opening the sinks a [`Config`] describes
//!
//! Each channel (primary output, error output) ends up as one fan-out sink.

use super::rotation::RotationTargetConfig;
use super::Config;
use crate::core::{LoggerError, Result, SharedSink};
use crate::encoders::EncoderKind;
use crate::sinks::{open_paths, ConnSink, MultiSink};
use std::sync::Arc;

/// Destination used for the error channel of syslog configurations
const SYSLOG_ERROR_OUTPUT: &str = "stderr";

/// Open both channels for `config`: `(primary, error)`
pub fn open_sinks(config: &Config) -> Result<(SharedSink, SharedSink)> {
    match config.encoder {
        EncoderKind::Json | EncoderKind::Console => {
            let (sink, error_sink) = open_standard_sinks(config)?;
            let sink = merge(sink, open_rotation_sinks(&config.lumberjacks));
            let error_sink = merge(error_sink, open_rotation_sinks(&config.error_lumberjacks));
            Ok((sink, error_sink))
        }
        EncoderKind::Syslog => open_syslog_sinks(config),
    }
}

/// Streams and plain files for both channels.
///
/// When the error paths fail to open, files already opened for the primary
/// channel are closed before the error is returned.
pub fn open_standard_sinks(config: &Config) -> Result<(SharedSink, SharedSink)> {
    let (sink, closer) = open_paths(config.effective_output_paths())?;

    match open_paths(config.effective_error_output_paths()) {
        Ok((error_sink, _)) => Ok((sink, error_sink)),
        Err(err) => {
            closer.close();
            Err(err)
        }
    }
}

/// One rotating sink per target. Files are opened on first write, so this
/// cannot fail.
pub fn open_rotation_sinks(targets: &[RotationTargetConfig]) -> Vec<SharedSink> {
    targets
        .iter()
        .map(|target| Arc::new(target.open()) as SharedSink)
        .collect()
}

/// One connection per address, errors to stderr.
///
/// If an address fails to dial, connections made for earlier addresses are
/// not closed here; they are released when dropped with the partial result.
pub fn open_syslog_sinks(config: &Config) -> Result<(SharedSink, SharedSink)> {
    if config.output_addresses.is_empty() {
        return Err(LoggerError::MissingAddress);
    }

    let (error_sink, _) = open_paths(&[SYSLOG_ERROR_OUTPUT])?;

    let mut connections: Vec<SharedSink> = Vec::with_capacity(config.output_addresses.len());
    for token in &config.output_addresses {
        connections.push(Arc::new(ConnSink::dial_token(token)?));
    }

    Ok((MultiSink::shared(connections), error_sink))
}

fn merge(standard: SharedSink, rotating: Vec<SharedSink>) -> SharedSink {
    if rotating.is_empty() {
        return standard;
    }
    let mut members = Vec::with_capacity(rotating.len() + 1);
    members.push(standard);
    members.extend(rotating);
    MultiSink::shared(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config_from_uri;
    use std::fs;
    use std::io::Read;
    use std::net::TcpListener;
    use tempfile::tempdir;

    #[test]
    fn test_standard_channels_and_rotation() -> Result<()> {
        let dir = tempdir()?;
        let plain = dir.path().join("plain.log");
        let rotated = dir.path().join("rotated.log");

        let mut config = Config::default();
        config.output_paths = vec![plain.display().to_string()];
        config.lumberjacks = vec![RotationTargetConfig {
            filename: rotated.display().to_string(),
            ..RotationTargetConfig::default()
        }];

        let (sink, _error_sink) = open_sinks(&config)?;
        sink.write(b"both\n")?;
        sink.sync()?;

        assert_eq!(fs::read_to_string(&plain)?, "both\n");
        assert_eq!(fs::read_to_string(&rotated)?, "both\n");
        Ok(())
    }

    #[test]
    fn test_error_path_failure_closes_primary() -> Result<()> {
        let dir = tempdir()?;
        let primary = dir.path().join("primary.log");

        let mut config = Config::default();
        config.output_paths = vec![primary.display().to_string()];
        config.error_output_paths = vec![dir
            .path()
            .join("missing")
            .join("errors.log")
            .display()
            .to_string()];

        let err = open_standard_sinks(&config).err().expect("error path must fail");
        assert!(matches!(err, LoggerError::OpenSink { .. }));
        assert!(primary.exists());
        Ok(())
    }

    #[test]
    fn test_syslog_requires_address() {
        let config = parse_config_from_uri("logger:syslog").unwrap();
        assert!(matches!(
            open_sinks(&config).err(),
            Some(LoggerError::MissingAddress)
        ));
    }

    #[test]
    fn test_syslog_partial_dial_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let live = listener.local_addr().unwrap();
        let dead = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();

        let mut config = parse_config_from_uri("logger:syslog").unwrap();
        config.output_addresses = vec![live.to_string(), format!("tcp:{}", dead)];

        let err = open_sinks(&config).err().expect("second address must fail");
        assert!(matches!(err, LoggerError::Dial { .. }));

        // the first connection was established and is gone with the result
        let (mut accepted, _) = listener.accept().unwrap();
        let mut rest = Vec::new();
        assert_eq!(accepted.read_to_end(&mut rest).unwrap(), 0);
    }

    #[test]
    fn test_syslog_fan_out() {
        let first = TcpListener::bind("127.0.0.1:0").unwrap();
        let second = TcpListener::bind("127.0.0.1:0").unwrap();

        let mut config = parse_config_from_uri("logger:syslog").unwrap();
        config.output_addresses = vec![
            first.local_addr().unwrap().to_string(),
            format!("tcp:{}", second.local_addr().unwrap()),
        ];

        let (sink, error_sink) = open_sinks(&config).unwrap();
        assert_eq!(error_sink.name(), "multi");
        sink.write(b"to both\n").unwrap();
        drop(sink);

        for listener in [first, second] {
            let (mut stream, _) = listener.accept().unwrap();
            let mut received = String::new();
            stream.read_to_string(&mut received).unwrap();
            assert_eq!(received, "to both\n");
        }
    }
}
