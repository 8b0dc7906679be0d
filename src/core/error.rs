//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Configuration URI does not use the `logger` scheme
    #[error("invalid scheme '{scheme}'")]
    InvalidScheme { scheme: String },

    /// Encoder segment outside console/json/syslog
    #[error("unsupported logger \"{encoder}\"")]
    UnsupportedEncoder { encoder: String },

    /// A configuration field whose value could not be parsed
    #[error("{component}: error parsing {key} from '{value}': {message}")]
    InvalidField {
        component: String,
        key: String,
        value: String,
        message: String,
    },

    /// A rotation target spec with an unparsable value
    #[error("lumberjack: error parsing {key} in '{spec}': {message}")]
    InvalidRotationSpec {
        key: String,
        spec: String,
        message: String,
    },

    #[error("config: unknown framing: {value}")]
    UnknownFraming { value: String },

    #[error("config: unknown facility: {value}")]
    UnknownFacility { value: String },

    #[error("unrecognized level: \"{value}\"")]
    InvalidLevel { value: String },

    /// Syslog output configured without any address
    #[error("config: syslog output requires at least one output address")]
    MissingAddress,

    /// A standard destination (stream or file) could not be opened
    #[error("failed to open sink '{path}': {source}")]
    OpenSink {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A syslog connection could not be established
    #[error("failed to dial {network}:{address}: {source}")]
    Dial {
        network: String,
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported network '{network}'")]
    UnsupportedNetwork { network: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// A single write larger than the rotation size limit
    #[error("write length {len} exceeds maximum file size {max}")]
    WriteTooLarge { len: u64, max: u64 },

    #[error("sink '{name}' is closed")]
    SinkClosed { name: String },

    /// One or more members of a fan-out sink failed
    #[error("{failed} of {total} sinks failed: {summary}")]
    SinkFailures {
        failed: usize,
        total: usize,
        summary: String,
    },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    pub fn invalid_scheme(scheme: impl Into<String>) -> Self {
        LoggerError::InvalidScheme {
            scheme: scheme.into(),
        }
    }

    pub fn unsupported_encoder(encoder: impl Into<String>) -> Self {
        LoggerError::UnsupportedEncoder {
            encoder: encoder.into(),
        }
    }

    pub fn invalid_field(
        component: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        LoggerError::InvalidField {
            component: component.into(),
            key: key.into(),
            value: value.into(),
            message: message.to_string(),
        }
    }

    pub fn invalid_rotation_spec(
        key: impl Into<String>,
        spec: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        LoggerError::InvalidRotationSpec {
            key: key.into(),
            spec: spec.into(),
            message: message.to_string(),
        }
    }

    pub fn open_sink(path: impl Into<String>, source: std::io::Error) -> Self {
        LoggerError::OpenSink {
            path: path.into(),
            source,
        }
    }

    pub fn dial(
        network: impl Into<String>,
        address: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::Dial {
            network: network.into(),
            address: address.into(),
            source,
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn sink_closed(name: impl Into<String>) -> Self {
        LoggerError::SinkClosed { name: name.into() }
    }

    /// Aggregate the failures of a fan-out write
    pub fn sink_failures(errors: Vec<LoggerError>, total: usize) -> Self {
        let summary = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        LoggerError::SinkFailures {
            failed: errors.len(),
            total,
            summary,
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Whether the error stems from malformed configuration rather than I/O
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LoggerError::InvalidScheme { .. }
                | LoggerError::UnsupportedEncoder { .. }
                | LoggerError::InvalidField { .. }
                | LoggerError::InvalidRotationSpec { .. }
                | LoggerError::UnknownFraming { .. }
                | LoggerError::UnknownFacility { .. }
                | LoggerError::InvalidLevel { .. }
                | LoggerError::MissingAddress
                | LoggerError::UnsupportedNetwork { .. }
        )
    }
}
