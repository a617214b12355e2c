use std::io::Write;

use krxboard_core::UtcDateTime;
use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamEventKind {
    Start,
    /// One visible list row.
    Row,
    /// Pagination summary following the rows.
    Page,
    /// Whole payload of a non-list command.
    Data,
    Error,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamEvent<'a> {
    pub event: StreamEventKind,
    pub seq: u64,
    pub ts: UtcDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'a Value>,
}

/// Writes one JSON event per line, numbering events from 1.
pub struct NdjsonStreamWriter<W: Write> {
    writer: W,
    next_seq: u64,
}

impl<W: Write> NdjsonStreamWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            next_seq: 1,
        }
    }

    pub fn emit(&mut self, event: StreamEventKind, data: Option<&Value>) -> Result<(), CliError> {
        let event = StreamEvent {
            event,
            seq: self.next_seq,
            ts: UtcDateTime::now(),
            data,
        };
        self.next_seq += 1;

        serde_json::to_writer(&mut self.writer, &event)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<(), CliError> {
        self.writer.flush()?;
        Ok(())
    }
}
