use crate::error::{CtxGrepError, Result};
use crate::search::MatchRecord;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const RECORD_SEPARATOR: &str = "----";

/// Writes match records to the report file, replacing whatever was there.
pub struct ReportWriter {
    path: PathBuf,
    buffer_size: usize,
}

impl ReportWriter {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            buffer_size: 64 * 1024, // 64KB buffer
        }
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(4096); // Minimum 4KB buffer
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes every record and returns the number of bytes in the report.
    /// Zero records still produce an (empty) file.
    pub fn write_records(&self, records: &[MatchRecord]) -> Result<u64> {
        self.ensure_parent_dir()?;

        let file = fs::File::create(&self.path)
            .map_err(|e| CtxGrepError::output_write(&self.path, e))?;
        let mut writer = CountingWriter::new(BufWriter::with_capacity(self.buffer_size, file));

        for record in records {
            render_record(&mut writer, record)
                .map_err(|e| CtxGrepError::output_write(&self.path, e))?;
        }

        writer
            .flush()
            .map_err(|e| CtxGrepError::output_write(&self.path, e))?;

        Ok(writer.bytes_written)
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| CtxGrepError::output_write(&self.path, e))?;
            }
        }
        Ok(())
    }
}

/// Renders one record:
///
/// ```text
/// FILE: <path>
/// MATCH LINE: <n>
/// <context lines>
///
/// ----
///
/// ```
pub fn render_record<W: Write>(out: &mut W, record: &MatchRecord) -> std::io::Result<()> {
    writeln!(out, "FILE: {}", record.file_path)?;
    writeln!(out, "MATCH LINE: {}", record.line_number)?;
    for line in &record.context {
        writeln!(out, "{}", line)?;
    }
    writeln!(out)?;
    writeln!(out, "{}", RECORD_SEPARATOR)?;
    writeln!(out)?;
    Ok(())
}

pub fn render_to_string(records: &[MatchRecord]) -> String {
    let mut buffer = Vec::new();
    for record in records {
        // Writing into a Vec cannot fail.
        let _ = render_record(&mut buffer, record);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes_written: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.bytes_written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
