use csv::{QuoteStyle, WriterBuilder};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tempfile::NamedTempFile;

use super::record::LongRow;
use crate::error::Result;

/// Temporary CSV holding melted rows between the reshape and record decoding.
///
/// The file is removed when the value is dropped, whichever way the caller exits.
pub struct SpillFile {
    file: NamedTempFile,
}

impl SpillFile {
    pub fn new(dir: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("export-data-").suffix(".csv");
        let file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn writer(&self) -> SpillWriter<'_> {
        let inner = WriterBuilder::new()
            .quote_style(QuoteStyle::NonNumeric)
            .from_writer(BufWriter::new(self.file.as_file()));
        SpillWriter { inner, written: 0 }
    }

    /// Read the spilled rows back in chunks of at most `chunk_size`.
    pub fn chunks(&self, chunk_size: usize) -> Result<LongRowChunks> {
        let reader = csv::Reader::from_reader(BufReader::new(self.file.reopen()?));
        Ok(LongRowChunks {
            rows: reader.into_deserialize(),
            chunk_size: chunk_size.max(1),
        })
    }
}

pub struct SpillWriter<'a> {
    inner: csv::Writer<BufWriter<&'a File>>,
    written: usize,
}

impl SpillWriter<'_> {
    pub fn write(&mut self, row: &LongRow) -> Result<()> {
        self.inner.serialize(row)?;
        self.written += 1;
        Ok(())
    }

    /// Flush to disk and return the number of rows written.
    pub fn finish(mut self) -> Result<usize> {
        self.inner.flush()?;
        Ok(self.written)
    }
}

pub struct LongRowChunks {
    rows: csv::DeserializeRecordsIntoIter<BufReader<File>, LongRow>,
    chunk_size: usize,
}

impl Iterator for LongRowChunks {
    type Item = Result<Vec<LongRow>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut chunk = Vec::with_capacity(self.chunk_size);
        while chunk.len() < self.chunk_size {
            match self.rows.next() {
                Some(Ok(row)) => chunk.push(row),
                Some(Err(e)) => return Some(Err(e.into())),
                None => break,
            }
        }
        if chunk.is_empty() {
            None
        } else {
            Some(Ok(chunk))
        }
    }
}
