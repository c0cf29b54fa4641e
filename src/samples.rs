//! Sample file reading and result record writing
//!
//! Input is a UTF-8 CSV whose first row is a header; each following row
//! carries a sample id and a free-text description in its last two columns.
//! Files ending in `.gz` are decompressed on the fly. Output is a TSV with
//! one row per input sample, in input order.

use crate::error::MapError;
use crate::status::MacroStatus;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// One input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub id: String,
    pub description: String,
}

/// Iterator over the samples of an input CSV.
pub struct SampleReader {
    records: csv::StringRecordsIntoIter<Box<dyn Read>>,
}

impl SampleReader {
    /// Open a sample file, transparently decompressing `.gz`.
    pub fn from_file(path: &Path) -> Result<Self, MapError> {
        let file = File::open(path)
            .map_err(|e| MapError::Input(format!("{}: {e}", path.display())))?;
        let reader: Box<dyn Read> = if path.extension().is_some_and(|e| e == "gz") {
            Box::new(MultiGzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(Self::from_reader(reader))
    }

    /// Read samples from an in-memory CSV string.
    pub fn from_str(text: &str) -> Self {
        let cursor: Box<dyn Read> = Box::new(std::io::Cursor::new(text.to_string()));
        Self::from_reader(cursor)
    }

    fn from_reader(reader: Box<dyn Read>) -> Self {
        let records = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader)
            .into_records();
        SampleReader { records }
    }
}

impl Iterator for SampleReader {
    type Item = Result<Sample, MapError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e.into())),
            };
            if record.len() == 0 || (record.len() == 1 && record[0].trim().is_empty()) {
                continue;
            }
            if record.len() < 2 {
                return Some(Err(MapError::Input(format!(
                    "row with fewer than two columns: {:?}",
                    record.get(0).unwrap_or("")
                ))));
            }
            // id and description sit in the last two columns, so files with
            // a leading name column still read correctly
            let id = record[record.len() - 2].trim().to_string();
            let description = record[record.len() - 1].trim().to_string();
            return Some(Ok(Sample { id, description }));
        }
    }
}

/// Output verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Full,
    Compact,
}

/// One fully assembled output row.
#[derive(Debug, Clone, Default)]
pub struct Record {
    pub sample_id: String,
    pub sample_desc: String,
    pub cleaned_sample: String,
    pub pos_tagged: String,
    pub candidate_phrase: String,
    pub matched_term: String,
    pub all_matches: String,
    pub retained: String,
    pub component_count: usize,
    pub macro_status: Option<MacroStatus>,
    pub micro_status: String,
    pub remaining_tokens: String,
    pub components: String,
    pub lexmapr_buckets: String,
    pub ifsac_buckets: String,
    pub ifsac_labels: String,
}

/// TSV writer for classification records.
pub struct RecordWriter<W: Write> {
    writer: csv::Writer<W>,
    format: OutputFormat,
    buckets: bool,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W, format: OutputFormat, buckets: bool) -> Result<Self, MapError> {
        let writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(inner);
        let mut rw = RecordWriter {
            writer,
            format,
            buckets,
        };
        rw.write_header()?;
        Ok(rw)
    }

    fn write_header(&mut self) -> Result<(), MapError> {
        let mut header = vec!["Sample_Id", "Sample_Desc", "Cleaned_Sample"];
        if self.format == OutputFormat::Full {
            header.extend([
                "Phrase_POS_Tagged",
                "Probable_Candidate_Terms",
                "Matched_Term",
                "All_matched_Terms_with_Resource_IDs",
                "Retained_Terms_with_Resource_IDs",
                "Number_of_Components",
                "Match_Status(Macro Level)",
                "Match_Status(Micro Level)",
                "Remaining_Tokens",
                "Different_Components",
            ]);
        } else {
            header.extend(["Matched_Term", "Match_Status(Macro Level)"]);
        }
        if self.buckets {
            header.extend(["LexMapr_Buckets", "IFSAC_Buckets", "IFSAC_Labels"]);
        }
        self.writer.write_record(&header)?;
        Ok(())
    }

    pub fn write(&mut self, record: &Record) -> Result<(), MapError> {
        let macro_status = record
            .macro_status
            .map(|s| s.to_string())
            .unwrap_or_default();
        let mut row = vec![
            record.sample_id.clone(),
            record.sample_desc.clone(),
            record.cleaned_sample.clone(),
        ];
        if self.format == OutputFormat::Full {
            row.extend([
                record.pos_tagged.clone(),
                record.candidate_phrase.clone(),
                record.matched_term.clone(),
                record.all_matches.clone(),
                record.retained.clone(),
                record.component_count.to_string(),
                macro_status,
                record.micro_status.clone(),
                record.remaining_tokens.clone(),
                record.components.clone(),
            ]);
        } else {
            row.extend([record.matched_term.clone(), macro_status]);
        }
        if self.buckets {
            row.extend([
                record.lexmapr_buckets.clone(),
                record.ifsac_buckets.clone(),
                record.ifsac_labels.clone(),
            ]);
        }
        self.writer.write_record(&row)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), MapError> {
        self.writer.flush()?;
        Ok(())
    }
}
