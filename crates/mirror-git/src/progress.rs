//! Human-readable progress reporting.

use std::io::Write;
use std::sync::Mutex;

/// Append-only sink for human-readable synchronization progress.
///
/// Implementations must tolerate being called from transport callbacks.
/// Reporting is a pure side effect: sinks never influence control flow, and
/// a caller that configures no sink gets silent operation.
pub trait ProgressSink: Send + Sync {
    /// Append one status line.
    fn line(&self, text: &str);

    /// Append raw sideband output from the transport. The default forwards
    /// non-empty chunks as lossy text.
    fn data(&self, bytes: &[u8]) {
        let text = String::from_utf8_lossy(bytes);
        let text = text.trim_end_matches(['\r', '\n']);
        if !text.is_empty() {
            self.line(text);
        }
    }
}

/// Sink that prints lines to standard output.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl ProgressSink for StdoutSink {
    fn line(&self, text: &str) {
        println!("{text}");
    }
}

/// Sink that appends lines to any writer.
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consume the sink and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<W: Write + Send> ProgressSink for WriterSink<W> {
    fn line(&self, text: &str) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_sink_appends_lines() {
        let sink = WriterSink::new(Vec::new());
        sink.line("Cloning from origin");
        sink.line("Sync completed in 1.2s");
        let written = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(written, "Cloning from origin\nSync completed in 1.2s\n");
    }

    #[test]
    fn test_data_forwards_trimmed_chunks() {
        let sink = WriterSink::new(Vec::new());
        sink.data(b"Counting objects: 42\r\n");
        sink.data(b"\r\n");
        let written = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(written, "Counting objects: 42\n");
    }
}
