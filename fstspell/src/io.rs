//! Readers for training corpora and vocabularies, and cost table persistence.
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;

use crate::align::{CostTable, TrainingPair};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ReadError {
    /// A training record does not hold exactly two tab-separated fields
    #[error("Malformed record on line {line}")]
    MalformedRecord { line: u64 },
    #[error("CSV error")]
    Csv(#[from] csv::Error),
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

/// Reads `misspelling<TAB>correct` records. Blank lines and lines starting
/// with `#` are skipped; any other line without exactly two fields aborts.
pub fn read_training_pairs<R: Read>(reader: R) -> Result<Vec<TrainingPair>, ReadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(reader);

    let mut pairs = vec![];
    for result in rdr.records() {
        let record = result?;
        if record.len() != 2 {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(ReadError::MalformedRecord { line });
        }

        pairs.push(TrainingPair::new(&record[0], &record[1]));
    }

    log::debug!("read {} training pairs", pairs.len());
    Ok(pairs)
}

/// Reads a whitespace-separated word list.
pub fn read_vocabulary<R: Read>(mut reader: R) -> Result<Vec<String>, ReadError> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;

    Ok(buf.split_whitespace().map(str::to_string).collect())
}

pub fn load_training_pairs<P: AsRef<Path>>(path: P) -> Result<Vec<TrainingPair>, ReadError> {
    read_training_pairs(BufReader::new(File::open(path)?))
}

pub fn load_vocabulary<P: AsRef<Path>>(path: P) -> Result<Vec<String>, ReadError> {
    read_vocabulary(BufReader::new(File::open(path)?))
}

pub fn load_cost_table<P: AsRef<Path>>(path: P) -> Result<CostTable, ReadError> {
    CostTable::from_reader(BufReader::new(File::open(path)?))
}

pub fn save_cost_table<P: AsRef<Path>>(path: P, table: &CostTable) -> Result<(), ReadError> {
    table.to_writer(BufWriter::new(File::create(path)?))
}
