//! Server audit log: records written to the destinations configured for a server.

use std::collections::VecDeque;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::OmagError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditLogSeverity {
    Information,
    Event,
    Decision,
    Action,
    Error,
    Exception,
    Security,
    Startup,
    Shutdown,
    Assertion,
    Activity,
    Health,
    Trace,
}

impl AuditLogSeverity {
    pub const ALL: [AuditLogSeverity; 13] = [
        AuditLogSeverity::Information,
        AuditLogSeverity::Event,
        AuditLogSeverity::Decision,
        AuditLogSeverity::Action,
        AuditLogSeverity::Error,
        AuditLogSeverity::Exception,
        AuditLogSeverity::Security,
        AuditLogSeverity::Startup,
        AuditLogSeverity::Shutdown,
        AuditLogSeverity::Assertion,
        AuditLogSeverity::Activity,
        AuditLogSeverity::Health,
        AuditLogSeverity::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditLogSeverity::Information => "information",
            AuditLogSeverity::Event => "event",
            AuditLogSeverity::Decision => "decision",
            AuditLogSeverity::Action => "action",
            AuditLogSeverity::Error => "error",
            AuditLogSeverity::Exception => "exception",
            AuditLogSeverity::Security => "security",
            AuditLogSeverity::Startup => "startup",
            AuditLogSeverity::Shutdown => "shutdown",
            AuditLogSeverity::Assertion => "assertion",
            AuditLogSeverity::Activity => "activity",
            AuditLogSeverity::Health => "health",
            AuditLogSeverity::Trace => "trace",
        }
    }
}

impl fmt::Display for AuditLogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where audit log records are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditLogDestination {
    Console,
    /// One JSON document per line in `<directory>/<server>.auditlog.jsonl`.
    File { directory: PathBuf },
    /// Keeps the most recent `max_records` records for retrieval over REST.
    InMemory { max_records: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogDestinationConfig {
    pub destination: AuditLogDestination,
    /// Empty accepts every severity.
    #[serde(default)]
    pub supported_severities: Vec<AuditLogSeverity>,
}

impl AuditLogDestinationConfig {
    pub fn console() -> Self {
        Self {
            destination: AuditLogDestination::Console,
            supported_severities: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogRecord {
    pub timestamp: DateTime<Utc>,
    pub server_name: String,
    pub component: String,
    pub severity: AuditLogSeverity,
    pub message_id: String,
    pub message: String,
}

enum Sink {
    Console,
    File(PathBuf),
    InMemory {
        max_records: usize,
        records: Mutex<VecDeque<AuditLogRecord>>,
    },
}

struct Destination {
    severities: Vec<AuditLogSeverity>,
    sink: Sink,
}

impl Destination {
    fn accepts(&self, severity: AuditLogSeverity) -> bool {
        self.severities.is_empty() || self.severities.contains(&severity)
    }

    fn write(&self, record: &AuditLogRecord) {
        match &self.sink {
            Sink::Console => match record.severity {
                AuditLogSeverity::Error | AuditLogSeverity::Exception => {
                    tracing::error!(
                        server = %record.server_name,
                        component = %record.component,
                        message_id = %record.message_id,
                        "{}",
                        record.message
                    );
                }
                AuditLogSeverity::Security | AuditLogSeverity::Health => {
                    tracing::warn!(
                        server = %record.server_name,
                        component = %record.component,
                        message_id = %record.message_id,
                        "{}",
                        record.message
                    );
                }
                AuditLogSeverity::Trace => {
                    tracing::trace!(
                        server = %record.server_name,
                        component = %record.component,
                        message_id = %record.message_id,
                        "{}",
                        record.message
                    );
                }
                _ => {
                    tracing::info!(
                        server = %record.server_name,
                        component = %record.component,
                        message_id = %record.message_id,
                        "{}",
                        record.message
                    );
                }
            },
            Sink::File(path) => {
                if let Err(e) = append_line(path, record) {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to write audit log record"
                    );
                }
            }
            Sink::InMemory {
                max_records,
                records,
            } => {
                let mut records = records.lock().unwrap_or_else(|e| e.into_inner());
                records.push_back(record.clone());
                while records.len() > *max_records {
                    records.pop_front();
                }
            }
        }
    }
}

fn append_line(path: &Path, record: &AuditLogRecord) -> std::io::Result<()> {
    let line = serde_json::to_string(record)?;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{line}")
}

/// The audit log of one running server.
pub struct AuditLog {
    server_name: String,
    destinations: Vec<Destination>,
}

impl AuditLog {
    /// Build the log; with no destinations configured, records go to the console.
    pub fn new(
        server_name: &str,
        configs: &[AuditLogDestinationConfig],
    ) -> Result<Self, OmagError> {
        let defaults = [AuditLogDestinationConfig::console()];
        let configs = if configs.is_empty() {
            &defaults[..]
        } else {
            configs
        };

        let mut destinations = Vec::with_capacity(configs.len());
        for config in configs {
            let sink = match &config.destination {
                AuditLogDestination::Console => Sink::Console,
                AuditLogDestination::File { directory } => {
                    std::fs::create_dir_all(directory).map_err(|e| {
                        OmagError::Configuration(format!(
                            "cannot create audit log directory {}: {e}",
                            directory.display()
                        ))
                    })?;
                    Sink::File(directory.join(format!("{server_name}.auditlog.jsonl")))
                }
                AuditLogDestination::InMemory { max_records } => Sink::InMemory {
                    max_records: *max_records,
                    records: Mutex::new(VecDeque::new()),
                },
            };
            destinations.push(Destination {
                severities: config.supported_severities.clone(),
                sink,
            });
        }

        Ok(Self {
            server_name: server_name.to_string(),
            destinations,
        })
    }

    pub fn log(
        &self,
        component: &str,
        severity: AuditLogSeverity,
        message_id: &str,
        message: impl Into<String>,
    ) {
        let record = AuditLogRecord {
            timestamp: Utc::now(),
            server_name: self.server_name.clone(),
            component: component.to_string(),
            severity,
            message_id: message_id.to_string(),
            message: message.into(),
        };
        for destination in self.destinations.iter().filter(|d| d.accepts(severity)) {
            destination.write(&record);
        }
    }

    /// Records retained by in-memory destinations, oldest first.
    pub fn records(&self) -> Vec<AuditLogRecord> {
        let mut all = Vec::new();
        for destination in &self.destinations {
            if let Sink::InMemory { records, .. } = &destination.sink {
                let records = records.lock().unwrap_or_else(|e| e.into_inner());
                all.extend(records.iter().cloned());
            }
        }
        all.sort_by_key(|r| r.timestamp);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_destination_is_bounded() {
        let log = AuditLog::new(
            "cocoMDS1",
            &[AuditLogDestinationConfig {
                destination: AuditLogDestination::InMemory { max_records: 2 },
                supported_severities: vec![],
            }],
        )
        .unwrap();
        for i in 0..3 {
            log.log("test", AuditLogSeverity::Information, "TEST-0001", format!("record {i}"));
        }
        let records = log.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "record 1");
        assert_eq!(records[1].server_name, "cocoMDS1");
    }

    #[test]
    fn test_severity_filter() {
        let log = AuditLog::new(
            "cocoMDS1",
            &[AuditLogDestinationConfig {
                destination: AuditLogDestination::InMemory { max_records: 10 },
                supported_severities: vec![AuditLogSeverity::Startup],
            }],
        )
        .unwrap();
        log.log("admin", AuditLogSeverity::Startup, "OMAG-0001", "starting");
        log.log("admin", AuditLogSeverity::Trace, "OMAG-0099", "noise");
        let records = log.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, AuditLogSeverity::Startup);
    }

    #[test]
    fn test_file_destination_writes_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(
            "cocoMDS2",
            &[AuditLogDestinationConfig {
                destination: AuditLogDestination::File {
                    directory: dir.path().join("audit"),
                },
                supported_severities: vec![],
            }],
        )
        .unwrap();
        log.log("admin", AuditLogSeverity::Startup, "OMAG-0001", "one");
        log.log("admin", AuditLogSeverity::Shutdown, "OMAG-0002", "two");

        let content =
            std::fs::read_to_string(dir.path().join("audit").join("cocoMDS2.auditlog.jsonl"))
                .unwrap();
        let lines: Vec<AuditLogRecord> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].severity, AuditLogSeverity::Shutdown);
        // File destinations keep nothing in memory
        assert!(log.records().is_empty());
    }

    #[test]
    fn test_destination_config_serde() {
        let config: AuditLogDestinationConfig = serde_json::from_str(
            r#"{"destination": {"type": "in_memory", "max_records": 50}, "supported_severities": ["error"]}"#,
        )
        .unwrap();
        assert_eq!(
            config.destination,
            AuditLogDestination::InMemory { max_records: 50 }
        );
        assert_eq!(config.supported_severities, vec![AuditLogSeverity::Error]);
    }
}
