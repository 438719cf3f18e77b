//! The one-line status record format.
//!
//! ```text
//! <timestamp>|<host>|<pid>|<item>|<task>|<message>\n
//! ```
//!
//! The timestamp is local time at second resolution, `YYYY-MM-DD HH:MM:SS`.

use crate::error::{ClaimError, Result};
use chrono::{Local, NaiveDateTime, SubsecRound};

/// Field delimiter.
pub const DELIMITER: char = '|';

/// `chrono` format of the timestamp field.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const FIELD_COUNT: usize = 6;

/// The content of one status file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    /// When the record was written (local clock, whole seconds).
    pub timestamp: NaiveDateTime,
    /// Host of the writer.
    pub host: String,
    /// Process id of the writer.
    pub pid: u32,
    /// Work item identifier.
    pub item: String,
    /// Task identifier.
    pub task: String,
    /// Free-form progress message, never containing the delimiter or a line break.
    pub message: String,
}

impl StatusRecord {
    /// New record stamped with the current local time.
    ///
    /// The message is passed through [`sanitize_message`].
    pub fn new(host: &str, pid: u32, item: &str, task: &str, message: &str) -> Self {
        Self {
            timestamp: Local::now().naive_local().trunc_subsecs(0),
            host: host.to_string(),
            pid,
            item: item.to_string(),
            task: task.to_string(),
            message: sanitize_message(message),
        }
    }

    /// Encode as a single newline-terminated line.
    pub fn encode(&self) -> String {
        format!(
            "{ts}{d}{host}{d}{pid}{d}{item}{d}{task}{d}{msg}\n",
            ts = self.timestamp.format(TIMESTAMP_FORMAT),
            host = self.host,
            pid = self.pid,
            item = self.item,
            task = self.task,
            msg = self.message,
            d = DELIMITER,
        )
    }

    /// Parse a record line. A trailing line break is ignored.
    ///
    /// The message is the remainder after the fifth delimiter, so a message
    /// written by a foreign tool that contains `|` still parses.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let fields: Vec<&str> = line.splitn(FIELD_COUNT, DELIMITER).collect();

        if fields.len() != FIELD_COUNT {
            return Err(ClaimError::MalformedRecord(format!(
                "expected {} '{}'-separated fields, found {}",
                FIELD_COUNT,
                DELIMITER,
                fields.len()
            )));
        }

        let timestamp = NaiveDateTime::parse_from_str(fields[0], TIMESTAMP_FORMAT).map_err(|e| {
            ClaimError::MalformedRecord(format!("bad timestamp '{}': {}", fields[0], e))
        })?;

        let pid = fields[2].parse::<u32>().map_err(|e| {
            ClaimError::MalformedRecord(format!("bad process id '{}': {}", fields[2], e))
        })?;

        Ok(Self {
            timestamp,
            host: fields[1].to_string(),
            pid,
            item: fields[3].to_string(),
            task: fields[4].to_string(),
            message: fields[5].to_string(),
        })
    }
}

impl std::fmt::Display for StatusRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}  {}  {}:{}  {}",
            self.item,
            self.task,
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.host,
            self.pid,
            self.message
        )
    }
}

/// Replace the delimiter and line breaks with spaces.
pub fn sanitize_message(message: &str) -> String {
    message
        .chars()
        .map(|c| match c {
            DELIMITER | '\n' | '\r' => ' ',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixed_record(message: &str) -> StatusRecord {
        StatusRecord {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(7, 5, 1)
                .unwrap(),
            host: "node1".to_string(),
            pid: 4242,
            item: "report".to_string(),
            task: "ocr".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_encode_wire_format() {
        assert_eq!(
            fixed_record("started").encode(),
            "2024-03-09 07:05:01|node1|4242|report|ocr|started\n"
        );
    }

    #[test]
    fn test_parse_wire_format() {
        let record = StatusRecord::parse("2024-03-09 07:05:01|node1|4242|report|ocr|started\n")
            .unwrap();
        assert_eq!(record, fixed_record("started"));
    }

    #[test]
    fn test_parse_empty_message() {
        let record = StatusRecord::parse("2024-03-09 07:05:01|node1|4242|report|ocr|").unwrap();
        assert_eq!(record.message, "");
    }

    #[test]
    fn test_parse_keeps_delimiters_in_foreign_message() {
        let record =
            StatusRecord::parse("2024-03-09 07:05:01|node1|4242|report|ocr|a|b\r\n").unwrap();
        assert_eq!(record.message, "a|b");
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        for line in [
            "",
            "garbage",
            "2024-03-09 07:05:01|node1|4242|report|ocr",
            "yesterday|node1|4242|report|ocr|msg",
            "2024-03-09 07:05:01|node1|pid|report|ocr|msg",
        ] {
            let err = StatusRecord::parse(line).unwrap_err();
            assert!(
                matches!(err, ClaimError::MalformedRecord(_)),
                "expected malformed record for {:?}",
                line
            );
        }
    }

    #[test]
    fn test_new_sanitizes_and_truncates() {
        let record = StatusRecord::new("node1", 7, "report", "ocr", "page 1|2\ndone\r");
        assert_eq!(record.message, "page 1 2 done ");
        assert_eq!(record.timestamp.and_utc().timestamp_subsec_nanos(), 0);

        let line = record.encode();
        assert_eq!(line.matches('\n').count(), 1);
        assert_eq!(line.matches(DELIMITER).count(), 5);
        assert_eq!(StatusRecord::parse(&line).unwrap(), record);
    }

    #[test]
    fn test_display_is_human_readable() {
        let shown = fixed_record("done").to_string();
        assert!(shown.starts_with("report.ocr"));
        assert!(shown.contains("node1:4242"));
        assert!(shown.ends_with("done"));
    }
}
