pub mod stream_writer;

use std::io::{self, Write};

use krxboard_core::Envelope;
use serde_json::{json, Value};
use unicode_width::UnicodeWidthStr;

use self::stream_writer::{NdjsonStreamWriter, StreamEventKind};
use crate::cli::OutputFormat;
use crate::error::CliError;

const ROW_COLUMNS: [&str; 9] = [
    "code",
    "name",
    "price",
    "change",
    "grade",
    "inst_rank",
    "fore_rank",
    "volume",
    "market",
];

pub fn render(
    envelope: &Envelope<Value>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Json => {
            if pretty {
                serde_json::to_writer_pretty(&mut out, envelope)?;
            } else {
                serde_json::to_writer(&mut out, envelope)?;
            }
            writeln!(out)?;
        }
        OutputFormat::Ndjson => render_stream(&mut out, envelope)?,
        OutputFormat::Table => render_table(&mut out, envelope)?,
    }

    out.flush()?;
    Ok(())
}

/// List payloads stream one `row` event per visible row plus a `page` summary;
/// other payloads go out as a single `data` event.
fn render_stream<W: Write>(out: W, envelope: &Envelope<Value>) -> Result<(), CliError> {
    let mut writer = NdjsonStreamWriter::new(out);

    writer.emit(
        StreamEventKind::Start,
        Some(&json!({
            "request_id": envelope.meta.request_id,
            "schema_version": envelope.meta.schema_version,
            "source_chain": envelope.meta.source_chain,
            "warnings": envelope.meta.warnings,
        })),
    )?;

    match list_rows(&envelope.data) {
        Some(rows) => {
            for row in rows {
                writer.emit(StreamEventKind::Row, Some(row))?;
            }
            let mut summary = envelope.data.clone();
            if let Some(page) = summary.get_mut("page").and_then(Value::as_object_mut) {
                page.remove("rows");
            }
            writer.emit(StreamEventKind::Page, Some(&summary))?;
        }
        None => writer.emit(StreamEventKind::Data, Some(&envelope.data))?,
    }

    for error in &envelope.errors {
        writer.emit(StreamEventKind::Error, Some(&serde_json::to_value(error)?))?;
    }

    writer.emit(
        StreamEventKind::End,
        Some(&json!({
            "status": if envelope.errors.is_empty() { "ok" } else { "error" },
            "latency_ms": envelope.meta.latency_ms,
        })),
    )?;
    writer.finish()
}

fn render_table<W: Write>(mut out: W, envelope: &Envelope<Value>) -> Result<(), CliError> {
    let sources = envelope
        .meta
        .source_chain
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(",");
    writeln!(out, "request_id  : {}", envelope.meta.request_id)?;
    writeln!(out, "sources     : {sources}")?;
    writeln!(out, "latency_ms  : {}", envelope.meta.latency_ms)?;

    for warning in &envelope.meta.warnings {
        writeln!(out, "warning     : {warning}")?;
    }
    for error in &envelope.errors {
        writeln!(out, "error       : {}: {}", error.code, error.message)?;
    }
    writeln!(out)?;

    match list_rows(&envelope.data) {
        Some(rows) => write_list(&mut out, &envelope.data, rows)?,
        None => {
            serde_json::to_writer_pretty(&mut out, &envelope.data)?;
            writeln!(out)?;
        }
    }

    Ok(())
}

fn write_list<W: Write>(out: &mut W, data: &Value, rows: &[Value]) -> Result<(), CliError> {
    if data["empty"].as_bool().unwrap_or(false) {
        writeln!(out, "no results")?;
        return Ok(());
    }

    let cells = rows
        .iter()
        .map(|row| ROW_COLUMNS.map(|column| cell_text(&row[column])))
        .collect::<Vec<_>>();

    // Hangul names take two terminal columns per syllable.
    let widths = ROW_COLUMNS.map(|column| column.width());
    let widths = cells.iter().fold(widths, |mut widths, row| {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
        widths
    });

    write_cells(out, &ROW_COLUMNS.map(str::to_owned), &widths)?;
    for row in &cells {
        write_cells(out, row, &widths)?;
    }

    let page = &data["page"];
    writeln!(
        out,
        "\npage {} of {} ({} rows)",
        page["page"], page["total_pages"], page["total_count"]
    )?;

    if data["show_pager"].as_bool().unwrap_or(false) {
        if let Some(window) = data["window"].as_array() {
            writeln!(out, "{}", pager_line(window))?;
        }
    }

    Ok(())
}

fn write_cells<W: Write>(out: &mut W, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.width());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", line.trim_end())
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn pager_line(window: &[Value]) -> String {
    window
        .iter()
        .map(|item| match item["kind"].as_str() {
            Some("ellipsis") => String::from("…"),
            _ if item["active"].as_bool().unwrap_or(false) => format!("[{}]", item["number"]),
            _ => item["number"].to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn list_rows(data: &Value) -> Option<&[Value]> {
    data.get("page")?.get("rows")?.as_array().map(Vec::as_slice)
}
