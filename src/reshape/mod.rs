//! Wide-to-long reshaping of export tables.
//!
//! A wide export has one row per entity and one column per reporting period.
//! Every (row, period) pair becomes one [`LongRecord`]. Melted rows are spilled
//! to a temporary CSV and read back in chunks, so the decoded record set never
//! has to be held in memory at once.

pub mod record;
pub mod spill;

use csv::ReaderBuilder;
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::constants::{DEFAULT_CHUNK_SIZE, IDENTITY_COLUMNS};
use crate::error::{Result, SourceError};
use crate::observability::metrics;

pub use record::{normalize_date, record_id, Amount, LongRecord, LongRow};
pub use spill::{LongRowChunks, SpillFile};

/// Column positions of a wide export header.
#[derive(Debug, Clone, PartialEq)]
pub struct WideLayout {
    /// Positions of the identity columns, in `IDENTITY_COLUMNS` order
    pub identity: [usize; 7],
    /// (position, header) of every period column, in header order
    pub periods: Vec<(usize, String)>,
}

impl WideLayout {
    pub fn from_headers(headers: &[String]) -> Result<Self> {
        let mut identity = [0usize; 7];
        for (slot, name) in identity.iter_mut().zip(IDENTITY_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| SourceError::Reshape(format!("missing identity column '{name}'")))?;
        }
        let periods = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !IDENTITY_COLUMNS.contains(&h.as_str()))
            .map(|(i, h)| (i, h.clone()))
            .collect();
        Ok(Self { identity, periods })
    }

    /// Melt one wide row into one long row per period column.
    pub fn melt<'a>(&'a self, row: &'a csv::StringRecord) -> impl Iterator<Item = LongRow> + 'a {
        let cell = move |i: usize| row.get(i).unwrap_or("").to_string();
        self.periods.iter().map(move |(i, header)| LongRow {
            account_name: cell(self.identity[0]),
            account_code: cell(self.identity[1]),
            level_name: cell(self.identity[2]),
            gl_account: cell(self.identity[3]),
            location: cell(self.identity[4]),
            contract: cell(self.identity[5]),
            assignment: cell(self.identity[6]),
            date: header.clone(),
            amount: cell(*i),
        })
    }
}

/// Owns the spill file for one export. A processor melts exactly one wide table.
pub struct ExportDataProcessor {
    spill: SpillFile,
    processed: bool,
    rows_melted: usize,
}

impl ExportDataProcessor {
    pub fn new(spill_dir: Option<&Path>) -> Result<Self> {
        Ok(Self {
            spill: SpillFile::new(spill_dir)?,
            processed: false,
            rows_melted: 0,
        })
    }

    pub fn spill_path(&self) -> &Path {
        self.spill.path()
    }

    pub fn rows_melted(&self) -> usize {
        self.rows_melted
    }

    /// Melt the wide CSV into the spill file. Returns the number of long rows written.
    ///
    /// The spill holds a single table, so a second call is a `Reshape` error.
    #[instrument(skip(self, wide_csv), fields(bytes = wide_csv.len()))]
    pub fn process(&mut self, wide_csv: &str) -> Result<usize> {
        if self.processed {
            return Err(SourceError::Reshape(
                "export already processed into this spill file".into(),
            ));
        }
        self.processed = true;

        if wide_csv.trim().is_empty() {
            return Ok(0);
        }

        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(wide_csv.as_bytes());
        let mut records = rdr.records();

        let headers: Vec<String> = match records.next() {
            Some(header) => header?.iter().map(str::to_string).collect(),
            None => return Ok(0),
        };
        let layout = WideLayout::from_headers(&headers)?;
        debug!("Wide export has {} period columns", layout.periods.len());

        let mut writer = self.spill.writer();
        let mut rows_in = 0usize;
        for record in records {
            let record = record?;
            rows_in += 1;
            for long_row in layout.melt(&record) {
                writer.write(&long_row)?;
            }
        }
        let written = writer.finish()?;

        self.rows_melted = written;
        metrics::reshape::rows_in(rows_in);
        metrics::reshape::rows_melted(written);
        info!(
            "Melted {} rows x {} periods into {} long rows",
            rows_in,
            layout.periods.len(),
            written
        );
        Ok(written)
    }

    pub fn stream(&self, chunk_size: usize) -> Result<LongRowChunks> {
        self.spill.chunks(chunk_size)
    }
}

/// Reshape a wide export and hand every decoded record to `on_record`.
///
/// The spill file is deleted before this returns, including when `on_record`
/// or decoding fails partway through.
pub fn handle_export_data<F>(
    wide_csv: &str,
    spill_dir: Option<&Path>,
    chunk_size: usize,
    mut on_record: F,
) -> Result<usize>
where
    F: FnMut(LongRecord) -> Result<()>,
{
    if wide_csv.trim().is_empty() {
        return Ok(0);
    }

    let mut processor = ExportDataProcessor::new(spill_dir)?;
    processor.process(wide_csv)?;
    debug!(
        "Spilled {} long rows to {}",
        processor.rows_melted(),
        processor.spill_path().display()
    );

    let mut emitted = 0usize;
    for chunk in processor.stream(chunk_size)? {
        for row in chunk? {
            on_record(LongRecord::from(row))?;
            emitted += 1;
        }
    }
    Ok(emitted)
}

/// Collecting form of [`handle_export_data`].
pub fn reshape_export(wide_csv: &str, spill_dir: Option<&Path>) -> Result<Vec<LongRecord>> {
    let mut out = Vec::new();
    handle_export_data(wide_csv, spill_dir, DEFAULT_CHUNK_SIZE, |record| {
        out.push(record);
        Ok(())
    })?;
    Ok(out)
}
