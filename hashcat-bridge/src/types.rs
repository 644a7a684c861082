//! Core types for the hashcat bridge library
//!
//! This module defines the identifiers that cross the engine boundary, the
//! decoded payload view handed to host consumers, and the error type shared by
//! the host-side layer. The relay itself never inspects these beyond carrying
//! them through unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Raw event identifier as emitted by the engine
///
/// The relay never validates identifiers; unknown values are carried through
/// unchanged. The named constants cover the events the host layer interprets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u32);

impl EventId {
    pub const CRACKER_FINISHED: EventId = EventId(0x0000_0030);
    pub const CRACKER_HASH_CRACKED: EventId = EventId(0x0000_0031);
    pub const CRACKER_STARTING: EventId = EventId(0x0000_0032);
    pub const LOG_ERROR: EventId = EventId(0x0000_0050);
    pub const LOG_INFO: EventId = EventId(0x0000_0051);
    pub const LOG_WARNING: EventId = EventId(0x0000_0052);
    pub const LOG_ADVICE: EventId = EventId(0x0000_0053);

    /// Log level carried by this event, if it is one of the log events
    pub fn log_level(self) -> Option<LogLevel> {
        match self {
            EventId::LOG_ERROR => Some(LogLevel::Error),
            EventId::LOG_WARNING => Some(LogLevel::Warning),
            EventId::LOG_INFO => Some(LogLevel::Info),
            EventId::LOG_ADVICE => Some(LogLevel::Advice),
            _ => None,
        }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl From<u32> for EventId {
    fn from(id: u32) -> Self {
        EventId(id)
    }
}

/// Opaque token identifying a host-side callback target
///
/// Handles are allocated by the relay table when a context is registered and
/// are never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostHandle(pub u64);

impl fmt::Display for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host#{}", self.0)
    }
}

/// Identity of an engine context (its address)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(pub usize);

impl ContextId {
    /// Identity of a raw context pointer
    pub fn of<T>(context: *const T) -> Self {
        ContextId(context as usize)
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx@0x{:x}", self.0)
    }
}

/// Severity of an engine log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warning,
    Info,
    Advice,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Warning => write!(f, "WARNING"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Advice => write!(f, "ADVICE"),
        }
    }
}

/// Decoded view of an event for host consumers
///
/// Decoding copies out of the engine buffer, so a payload may outlive the
/// event it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    /// A log line emitted by the engine
    Log {
        level: LogLevel,
        message: String,
    },

    /// A cracked hash, split from the engine's outfile line
    Cracked {
        /// Hash as written by the engine (may contain the separator, e.g. salts)
        hash: String,
        /// Recovered plaintext
        plain: String,
    },

    /// Task information reported when the cracker starts
    TaskInformation { info: StatusReport },

    /// Final status reported when the cracker finishes
    FinalStatus { status: StatusReport },

    /// Any other engine event, with its buffer rendered as text if present
    Action {
        id: EventId,
        message: Option<String>,
    },
}

impl Payload {
    /// Default separator between hash and plaintext in cracked lines
    pub const DEFAULT_SEPARATOR: char = ':';

    /// Decode an event buffer using the default separator
    pub fn decode(id: EventId, buffer: &[u8]) -> Self {
        Self::decode_with_separator(id, buffer, Self::DEFAULT_SEPARATOR)
    }

    /// Decode an event buffer
    ///
    /// Cracked lines are split on the last separator, because salted hashes
    /// commonly contain it. A cracked line with no separator is reported as an
    /// action so nothing is lost.
    pub fn decode_with_separator(id: EventId, buffer: &[u8], separator: char) -> Self {
        let text = buffer_text(buffer);

        if let Some(level) = id.log_level() {
            return Payload::Log {
                level,
                message: text.unwrap_or_default(),
            };
        }

        if id == EventId::CRACKER_HASH_CRACKED {
            if let Some((hash, plain)) = text.as_deref().and_then(|t| t.rsplit_once(separator)) {
                return Payload::Cracked {
                    hash: hash.to_string(),
                    plain: plain.to_string(),
                };
            }
        }

        match id {
            EventId::CRACKER_STARTING => Payload::TaskInformation {
                info: StatusReport::parse(text.as_deref().unwrap_or_default()),
            },
            EventId::CRACKER_FINISHED => Payload::FinalStatus {
                status: StatusReport::parse(text.as_deref().unwrap_or_default()),
            },
            _ => Payload::Action { id, message: text },
        }
    }
}

/// Status block reported by the engine, as ordered `key: value` pairs
///
/// The engine pads keys with dots (`Hash.Mode........: 0 (MD5)`); the padding
/// is stripped, the key's own dots are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub fields: Vec<(String, String)>,
}

impl StatusReport {
    /// Parse a status block, skipping lines without a `:`
    pub fn parse(text: &str) -> Self {
        let fields = text
            .lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(key, value)| {
                let key = key.trim().trim_end_matches('.').trim_end();
                (key.to_string(), value.trim().to_string())
            })
            .filter(|(key, _)| !key.is_empty())
            .collect();
        Self { fields }
    }

    /// Value of the first field named `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the engine reported no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Render an engine buffer as text, trimming C string terminators and line endings
fn buffer_text(buffer: &[u8]) -> Option<String> {
    let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
    let text = String::from_utf8_lossy(&buffer[..end]);
    let text = text.trim_end_matches(['\r', '\n']);
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Errors raised by the host-side layer
///
/// The relay and the argument release never return errors; these cover
/// option handling, session control and catalog generation.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Shared path must be set")]
    NoSharedPath,

    #[error("Invalid executable path: {0}")]
    InvalidExecutablePath(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unable to stop at checkpoint: no job is running")]
    UnableToStopAtCheckpoint,

    #[error("No hash mode matches: {0}")]
    UnidentifiedHash(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_payload() {
        let payload = Payload::decode(EventId::LOG_WARNING, b"Device #1: skipped\n\0");
        assert_eq!(
            payload,
            Payload::Log {
                level: LogLevel::Warning,
                message: "Device #1: skipped".to_string(),
            }
        );
    }

    #[test]
    fn test_cracked_payload_splits_on_last_separator() {
        let payload = Payload::decode(EventId::CRACKER_HASH_CRACKED, b"abcdef:salt:hello");
        assert_eq!(
            payload,
            Payload::Cracked {
                hash: "abcdef:salt".to_string(),
                plain: "hello".to_string(),
            }
        );
    }

    #[test]
    fn test_cracked_without_separator_is_action() {
        let payload = Payload::decode(EventId::CRACKER_HASH_CRACKED, b"nosep");
        assert_eq!(
            payload,
            Payload::Action {
                id: EventId::CRACKER_HASH_CRACKED,
                message: Some("nosep".to_string()),
            }
        );
    }

    #[test]
    fn test_unknown_event_is_action() {
        let payload = Payload::decode(EventId(0xDEAD), &[]);
        assert_eq!(
            payload,
            Payload::Action {
                id: EventId(0xDEAD),
                message: None,
            }
        );
    }

    #[test]
    fn test_final_status_payload() {
        let buffer = b"Session..........: test0\n\
Status...........: Cracked\n\
Hash.Mode........: 0 (MD5)\n\
Time.Started.....: Thu Jan  1 00:00:00 2026\n\0";
        let payload = Payload::decode(EventId::CRACKER_FINISHED, buffer);

        let Payload::FinalStatus { status } = payload else {
            panic!("expected final status, got {:?}", payload);
        };
        assert_eq!(status.fields.len(), 4);
        assert_eq!(status.get("Status"), Some("Cracked"));
        assert_eq!(status.get("Hash.Mode"), Some("0 (MD5)"));
        assert_eq!(status.get("Time.Started"), Some("Thu Jan  1 00:00:00 2026"));
        assert_eq!(status.get("Speed"), None);
    }

    #[test]
    fn test_task_information_without_buffer() {
        let payload = Payload::decode(EventId::CRACKER_STARTING, &[]);
        assert_eq!(
            payload,
            Payload::TaskInformation {
                info: StatusReport::default(),
            }
        );
    }

    #[test]
    fn test_event_id_display() {
        assert_eq!(format!("{}", EventId::LOG_INFO), "0x00000051");
        assert_eq!(EventId::from(7), EventId(7));
        assert_eq!(EventId(7).log_level(), None);
    }
}
