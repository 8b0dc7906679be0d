//! Configuration URIs
//!
//! `logger:<encoder>?<query>` where the encoder is `console`, `json` or
//! `syslog`. See [`parse_config_from_uri`] for the recognised parameters.

use super::rotation::{parse_rotation_target, RotationTargetConfig};
use super::Config;
use crate::core::{LoggerError, Result};
use crate::encoders::{EncoderKind, Facility, Framing};

pub const SCHEME: &str = "logger";

/// Decoded query parameters in their original order
struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    fn parse(raw: &str) -> Result<Self> {
        let mut pairs = Vec::new();
        for part in raw.split('&') {
            if part.is_empty() {
                continue;
            }
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            pairs.push((decode_component(key)?, decode_component(value)?));
        }
        Ok(Self { pairs })
    }

    fn first(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn decode_component(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| LoggerError::invalid_field("uri", raw, raw, e))
}

fn encode_component(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Boolean spellings: `1 t T TRUE true True 0 f F FALSE false False`
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn bool_field(key: &str, value: &str) -> Result<bool> {
    parse_bool(value)
        .ok_or_else(|| LoggerError::invalid_field("config", key, value, "invalid boolean syntax"))
}

/// Parse a configuration URI into a [`Config`].
///
/// Common parameters (every encoder): `development`, `disableCaller`,
/// `disableStacktrace`. Only their first occurrence counts.
///
/// `console` and `json`: `outputPath` / `errorOutputPath` append their value
/// as is, `outputPaths` / `errorOutputPaths` append each comma-separated
/// token, `lumberjack` / `errorLumberjack` append a rotation target.
///
/// `syslog`: `outputAddress` / `outputAddresses` with the same rule, plus
/// `framing`, `facility`, `hostname`, `pid` and `app`.
///
/// ```
/// use rust_logger_config::config::parse_config_from_uri;
/// use rust_logger_config::encoders::EncoderKind;
///
/// let config = parse_config_from_uri("logger:console?outputPaths=stdout,app.log").unwrap();
/// assert_eq!(config.encoder, EncoderKind::Console);
/// assert_eq!(config.output_paths, ["stdout", "app.log"]);
/// ```
pub fn parse_config_from_uri(uri: &str) -> Result<Config> {
    let (scheme, rest) = uri
        .split_once(':')
        .ok_or_else(|| LoggerError::invalid_scheme(""))?;
    if !scheme.eq_ignore_ascii_case(SCHEME) {
        return Err(LoggerError::invalid_scheme(scheme));
    }

    let rest = rest.split_once('#').map_or(rest, |(before, _)| before);
    let (opaque, raw_query) = rest.split_once('?').unwrap_or((rest, ""));
    let query = Query::parse(raw_query)?;

    let mut config = Config::default();
    populate_common(&mut config, &query)?;

    config.encoder = opaque.parse::<EncoderKind>()?;
    match config.encoder {
        EncoderKind::Json | EncoderKind::Console => populate_standard(&mut config, &query)?,
        EncoderKind::Syslog => populate_syslog(&mut config, &query)?,
    }
    Ok(config)
}

fn populate_common(config: &mut Config, query: &Query) -> Result<()> {
    if let Some(value) = query.first("development") {
        config.development = bool_field("development", value)?;
    }
    if let Some(value) = query.first("disableCaller") {
        config.disable_caller = bool_field("disableCaller", value)?;
    }
    if let Some(value) = query.first("disableStacktrace") {
        config.disable_stacktrace = bool_field("disableStacktrace", value)?;
    }
    Ok(())
}

fn append_split(output: &mut Vec<String>, value: &str) {
    output.extend(value.split(',').map(String::from));
}

fn populate_standard(config: &mut Config, query: &Query) -> Result<()> {
    let mut lumberjacks: Vec<RotationTargetConfig> = Vec::new();
    let mut error_lumberjacks: Vec<RotationTargetConfig> = Vec::new();

    for (key, value) in query.iter() {
        match key {
            "outputPath" => config.output_paths.push(value.to_string()),
            "outputPaths" => append_split(&mut config.output_paths, value),
            "errorOutputPath" => config.error_output_paths.push(value.to_string()),
            "errorOutputPaths" => append_split(&mut config.error_output_paths, value),
            "lumberjack" => lumberjacks.push(parse_rotation_target(value)?),
            "errorLumberjack" => error_lumberjacks.push(parse_rotation_target(value)?),
            _ => {}
        }
    }

    config.lumberjacks = lumberjacks;
    config.error_lumberjacks = error_lumberjacks;
    Ok(())
}

fn populate_syslog(config: &mut Config, query: &Query) -> Result<()> {
    for (key, value) in query.iter() {
        match key {
            "outputAddress" => config.output_addresses.push(value.to_string()),
            "outputAddresses" => append_split(&mut config.output_addresses, value),
            _ => {}
        }
    }

    if let Some(value) = query.first("framing") {
        config.framing = value.parse::<Framing>()?;
    }
    if let Some(value) = query.first("facility") {
        config.facility = value.parse::<Facility>()?;
    }
    if let Some(value) = query.first("hostname") {
        config.hostname = value.to_string();
    }
    if let Some(value) = query.first("pid") {
        config.pid = value
            .parse::<u32>()
            .map_err(|e| LoggerError::invalid_field("config", "pid", value, e))?;
    }
    if let Some(value) = query.first("app") {
        config.app = value.to_string();
    }
    Ok(())
}

/// Render the URI-expressible fields of `config`.
///
/// Parsing the result yields a configuration equal to `config` in every
/// field the URI form carries. Fails for rotation targets that have no spec
/// form, see [`RotationTargetConfig::to_spec`].
pub fn config_to_uri(config: &Config) -> Result<String> {
    let mut params: Vec<(&str, String)> = vec![
        ("development", config.development.to_string()),
        ("disableCaller", config.disable_caller.to_string()),
        ("disableStacktrace", config.disable_stacktrace.to_string()),
    ];

    match config.encoder {
        EncoderKind::Json | EncoderKind::Console => {
            params.extend(config.output_paths.iter().map(|p| ("outputPath", p.clone())));
            params.extend(
                config
                    .error_output_paths
                    .iter()
                    .map(|p| ("errorOutputPath", p.clone())),
            );
            for target in &config.lumberjacks {
                params.push(("lumberjack", target.to_spec()?));
            }
            for target in &config.error_lumberjacks {
                params.push(("errorLumberjack", target.to_spec()?));
            }
        }
        EncoderKind::Syslog => {
            params.extend(
                config
                    .output_addresses
                    .iter()
                    .map(|a| ("outputAddress", a.clone())),
            );
            params.push(("framing", config.framing.to_string()));
            params.push(("facility", config.facility.to_string()));
            params.push(("hostname", config.hostname.clone()));
            params.push(("pid", config.pid.to_string()));
            params.push(("app", config.app.clone()));
        }
    }

    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, encode_component(value)))
        .collect::<Vec<_>>()
        .join("&");
    Ok(format!("{}:{}?{}", SCHEME, config.encoder, query))
}
