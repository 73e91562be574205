//! Configuration transfer
//!
//! Reads every configuration group from the controller into a
//! [`ConfigStore`], and writes a store back. The exchange is strictly
//! half-duplex: one command is sent, then lines are read until its `r` reply
//! arrives or a read times out. Nothing is retried; a group that times out
//! is reported and the next group is processed.

use crate::communication::LineChannel;
use crate::firmware::tinyg::response_parser::{TinyGReply, TinyGResponseParser};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tinyg_config_core::codec::groups_from_value;
use tinyg_config_core::{
    schema, ConfigGroup, ConfigStore, ConfigValue, Error, ProtocolError, Result,
};

/// Longest command line the controller accepts, including the newline
pub const MAX_COMMAND_LINE: usize = 254;

/// Most settings sent in one write command
pub const MAX_KEYS_PER_WRITE: usize = 10;

/// Default time to wait for each reply line
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(1);

/// Result of writing one group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Nothing to write: the group is absent, empty, or read-only
    Skipped,
    /// Every chunk was acknowledged
    Written {
        /// Number of commands sent
        chunks: usize,
    },
}

/// Per-group result of reading or writing all groups
#[derive(Debug, Default)]
pub struct TransferReport {
    /// Groups transferred successfully
    pub completed: Vec<String>,
    /// Groups with nothing to transfer
    pub skipped: Vec<String>,
    /// Groups that failed, with the reason
    pub failed: Vec<(String, Error)>,
}

impl TransferReport {
    /// True if no group failed
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Ids of the groups that failed
    pub fn failed_groups(&self) -> Vec<&str> {
        self.failed.iter().map(|(group, _)| group.as_str()).collect()
    }
}

/// Drives configuration reads and writes over a [`LineChannel`]
#[derive(Debug)]
pub struct TinyGConfigDriver<C: LineChannel> {
    channel: C,
    timeout: Duration,
    parser: TinyGResponseParser,
}

impl<C: LineChannel> TinyGConfigDriver<C> {
    /// Create a driver waiting up to `timeout` for each reply line
    pub fn new(channel: C, timeout: Duration) -> Self {
        Self {
            channel,
            timeout,
            parser: TinyGResponseParser::new(),
        }
    }

    /// The underlying channel
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Consume the driver, returning the channel
    pub fn into_inner(self) -> C {
        self.channel
    }

    /// Switch the controller to millimeter units.
    ///
    /// Archived values are only comparable when they were read in the same
    /// units, so this is sent once right after the channel opens.
    pub fn ensure_metric_units(&mut self) -> Result<()> {
        self.send(&json!({"gc": "G21"}).to_string())?;
        self.await_response("gc").map(|_| ())
    }

    /// Request one group and merge the reply into `store`.
    ///
    /// On timeout nothing is merged.
    pub fn read_group(&mut self, store: &mut ConfigStore, group_id: &str) -> Result<()> {
        let mut query = Map::new();
        query.insert(group_id.to_string(), Value::Null);
        self.send(&Value::Object(query).to_string())?;

        let payload = self.await_response(group_id)?;
        let groups = groups_from_value(&payload)?;
        store.merge_groups(groups);
        Ok(())
    }

    /// Read every group in mapping order, continuing past failures.
    ///
    /// Only a broken channel stops the loop early.
    pub fn read_all_groups(&mut self, store: &mut ConfigStore) -> Result<TransferReport> {
        let mut report = TransferReport::default();
        for group_id in schema::group_ids() {
            match self.read_group(store, group_id) {
                Ok(()) => report.completed.push(group_id.to_string()),
                Err(e) if e.is_connection_error() => return Err(e),
                Err(e) => {
                    tracing::warn!("Read of group config '{}' failed: {}", group_id, e);
                    report.failed.push((group_id.to_string(), e));
                }
            }
        }
        tracing::info!(
            "Read {} groups, {} failed",
            report.completed.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Write one group from `store` to the controller.
    ///
    /// Read-only keys are dropped and the rest is sent in chunks. If a chunk
    /// is not acknowledged the remaining chunks of the group are not sent.
    pub fn write_group(&mut self, store: &ConfigStore, group_id: &str) -> Result<WriteOutcome> {
        let Some(fields) = store.group_snapshot(group_id) else {
            return Ok(WriteOutcome::Skipped);
        };
        let writable = ConfigStore::filter_read_only(group_id, fields);
        if writable.is_empty() {
            return Ok(WriteOutcome::Skipped);
        }

        let commands = build_write_commands(group_id, &writable)?;
        let total = commands.len();
        for (index, command) in commands.iter().enumerate() {
            self.send(command)?;
            match self.await_response(group_id) {
                Ok(_) => {}
                Err(e) if e.is_timeout() && index > 0 => {
                    return Err(ProtocolError::PartialWriteFailure {
                        group: group_id.to_string(),
                        chunks_written: index,
                        chunks_total: total,
                    }
                    .into());
                }
                Err(e) => return Err(e),
            }
        }
        Ok(WriteOutcome::Written { chunks: total })
    }

    /// Write every group in mapping order, continuing past failures.
    ///
    /// Only a broken channel stops the loop early.
    pub fn write_all_groups(&mut self, store: &ConfigStore) -> Result<TransferReport> {
        let mut report = TransferReport::default();
        for group_id in schema::group_ids() {
            match self.write_group(store, group_id) {
                Ok(WriteOutcome::Written { chunks }) => {
                    tracing::debug!("Wrote group '{}' in {} chunks", group_id, chunks);
                    report.completed.push(group_id.to_string());
                }
                Ok(WriteOutcome::Skipped) => report.skipped.push(group_id.to_string()),
                Err(e) if e.is_connection_error() => return Err(e),
                Err(e) if e.is_partial_write() => {
                    tracing::error!(
                        "Group config '{}' is only partly written to the controller: {}",
                        group_id,
                        e
                    );
                    report.failed.push((group_id.to_string(), e));
                }
                Err(e) => {
                    tracing::warn!("Write of group config '{}' failed: {}", group_id, e);
                    report.failed.push((group_id.to_string(), e));
                }
            }
        }
        tracing::info!(
            "Wrote {} groups, skipped {}, {} failed",
            report.completed.len(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }

    fn send(&mut self, line: &str) -> Result<()> {
        tracing::debug!("Sent: '{}'", line);
        self.channel.send_line(line)
    }

    /// Read lines until an `r` reply arrives; its payload is returned.
    ///
    /// Unsolicited reports and unparseable lines are dropped without ending
    /// the wait. `group_id` is only used to label a timeout.
    fn await_response(&mut self, group_id: &str) -> Result<Value> {
        loop {
            let Some(line) = self.channel.receive_line(self.timeout)? else {
                tracing::warn!("Timed out waiting for a reply to '{}'", group_id);
                return Err(ProtocolError::Timeout {
                    group: group_id.to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                }
                .into());
            };
            tracing::debug!("Rcvd: '{}'", line);

            let reply = match self.parser.parse(&line) {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::debug!("Ignoring unparseable line '{}': {}", line, e);
                    continue;
                }
            };
            if reply.is_rejected() {
                tracing::warn!("Controller rejected command for '{}': {}", group_id, line);
            }
            match reply {
                TinyGReply::Response { payload, .. } => return Ok(payload),
                TinyGReply::Exception { status, message } => {
                    tracing::warn!(
                        "Controller exception (status {:?}): {}",
                        status,
                        message.as_deref().unwrap_or("")
                    );
                }
                other => tracing::trace!("Ignoring unsolicited report: {:?}", other),
            }
        }
    }
}

/// Serialize a write of `fields` into `group_id` as one command line
fn write_command(group_id: &str, fields: &[(&String, &ConfigValue)]) -> String {
    let body: Map<String, Value> = fields
        .iter()
        .map(|(key, value)| ((*key).clone(), value.to_json()))
        .collect();
    let mut command = Map::new();
    command.insert(group_id.to_string(), Value::Object(body));
    Value::Object(command).to_string()
}

/// Split a group into write commands of at most [`MAX_KEYS_PER_WRITE`]
/// settings, each short enough for the controller's line buffer.
///
/// A chunk whose line is still too long is halved until it fits.
pub fn build_write_commands(group_id: &str, fields: &ConfigGroup) -> Result<Vec<String>> {
    let entries: Vec<(&String, &ConfigValue)> = fields.iter().collect();
    let mut commands = Vec::new();
    for chunk in entries.chunks(MAX_KEYS_PER_WRITE) {
        push_fitting(group_id, chunk, &mut commands)?;
    }
    Ok(commands)
}

fn push_fitting(
    group_id: &str,
    chunk: &[(&String, &ConfigValue)],
    commands: &mut Vec<String>,
) -> Result<()> {
    let command = write_command(group_id, chunk);
    if command.len() < MAX_COMMAND_LINE {
        commands.push(command);
        return Ok(());
    }
    if chunk.len() == 1 {
        return Err(ProtocolError::LineTooLong {
            group: group_id.to_string(),
            length: command.len() + 1,
            limit: MAX_COMMAND_LINE,
        }
        .into());
    }
    let (head, tail) = chunk.split_at(chunk.len() / 2);
    push_fitting(group_id, head, commands)?;
    push_fitting(group_id, tail, commands)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_with(count: usize) -> ConfigGroup {
        (0..count)
            .map(|i| (format!("k{:02}", i), ConfigValue::Integer(i as i64)))
            .collect()
    }

    #[test]
    fn test_chunking_by_key_count() {
        let commands = build_write_commands("x", &group_with(23)).unwrap();
        assert_eq!(commands.len(), 3);
        assert!(commands[0].starts_with(r#"{"x":{"k00":0,"#));
        assert_eq!(commands[2], r#"{"x":{"k20":20,"k21":21,"k22":22}}"#);
    }

    #[test]
    fn test_long_chunk_is_split() {
        let mut fields = ConfigGroup::new();
        for i in 0..4 {
            fields.insert(format!("k{}", i), ConfigValue::String("v".repeat(70)));
        }
        let commands = build_write_commands("sys", &fields).unwrap();
        assert!(commands.len() > 1);
        assert!(commands.iter().all(|c| c.len() + 1 <= MAX_COMMAND_LINE));
    }

    #[test]
    fn test_oversized_field_is_an_error() {
        let mut fields = ConfigGroup::new();
        fields.insert("id".to_string(), ConfigValue::String("v".repeat(300)));
        let err = build_write_commands("sys", &fields).unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::LineTooLong { .. })
        ));
    }

    #[test]
    fn test_report_helpers() {
        let mut report = TransferReport::default();
        assert!(report.is_success());
        report.failed.push((
            "x".to_string(),
            ProtocolError::Timeout {
                group: "x".to_string(),
                timeout_ms: 10,
            }
            .into(),
        ));
        assert!(!report.is_success());
        assert_eq!(report.failed_groups(), vec!["x"]);
    }
}
