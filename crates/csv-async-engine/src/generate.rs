/*!
# Record Generation

Produces random CSV records. [`Generator`] yields the output in chunks sized by
`high_water_mark`; [`generate`] drains it into a single [`GenerateOutput`].
Given a `seed`, the produced records are identical across runs.
*/

use crate::{
    errors::{CsvError, CsvResult},
    options::{ColumnKind, Eof, GenerateOptions},
};
use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, rngs::StdRng, Rng, SeedableRng};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

const SUPPORTED_ENCODINGS: &[&str] = &["utf8", "utf-8", "ascii", "latin1"];

/// Everything one generation run produced
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutput {
    /// Raw output when no `encoding` is configured
    Bytes(Vec<u8>),
    /// Decoded output when an `encoding` is configured
    Text(String),
    /// `object_mode` output, one array per record
    Records(Vec<Value>),
}

impl GenerateOutput {
    /// Number of records, counting row delimiters for byte and text output
    pub fn record_count(&self, row_delimiter: &str) -> usize {
        match self {
            Self::Records(records) => records.len(),
            Self::Text(text) => count_records(text, row_delimiter),
            Self::Bytes(bytes) => count_records(&String::from_utf8_lossy(bytes), row_delimiter),
        }
    }
}

fn count_records(text: &str, row_delimiter: &str) -> usize {
    text.split(row_delimiter).filter(|r| !r.is_empty()).count()
}

/// Chunked record source
pub struct Generator {
    options: GenerateOptions,
    kinds: Vec<ColumnKind>,
    rng: StdRng,
    started: Instant,
    deadline: Option<DateTime<Utc>>,
    produced: u64,
    pending: Vec<u8>,
    exhausted: bool,
}

impl Generator {
    pub fn new(options: GenerateOptions) -> CsvResult<Self> {
        if options.length.is_none() && options.duration.is_none() && options.end.is_none() {
            return Err(CsvError::UnboundedGeneration);
        }
        if options.max_word_length == 0 {
            return Err(CsvError::invalid_option(
                "max_word_length",
                "must be at least 1",
            ));
        }
        if options.high_water_mark == 0 {
            return Err(CsvError::invalid_option(
                "high_water_mark",
                "must be at least 1",
            ));
        }
        if let Some(encoding) = &options.encoding {
            if !SUPPORTED_ENCODINGS.contains(&encoding.to_ascii_lowercase().as_str()) {
                return Err(CsvError::invalid_option(
                    "encoding",
                    format!("unsupported encoding '{}'", encoding),
                ));
            }
        }

        let deadline = match &options.end {
            Some(end) => Some(end.deadline().ok_or_else(|| {
                CsvError::invalid_option("end", "timestamp out of range")
            })?),
            None => None,
        };

        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            kinds: options.columns.kinds(),
            options,
            rng,
            started: Instant::now(),
            deadline,
            produced: 0,
            pending: Vec::new(),
            exhausted: false,
        })
    }

    /// Next record, or `None` once a stop condition is reached
    pub fn next_record(&mut self) -> Option<Vec<Value>> {
        if self.should_stop() {
            return None;
        }
        if self.produced > 0 {
            if let Some(sleep) = self.options.sleep {
                std::thread::sleep(Duration::from_millis(sleep));
            }
            // A long sleep may have crossed the duration or end boundary
            if self.should_stop() {
                return None;
            }
        }

        let record = self
            .kinds
            .clone()
            .into_iter()
            .map(|kind| self.field(kind))
            .collect();
        self.produced += 1;
        Some(record)
    }

    fn should_stop(&self) -> bool {
        if let Some(length) = self.options.length {
            if self.produced >= length {
                return true;
            }
        }
        if let Some(duration) = self.options.duration {
            if self.started.elapsed() >= Duration::from_millis(duration) {
                return true;
            }
        }
        if let Some(deadline) = self.deadline {
            if Utc::now() >= deadline {
                return true;
            }
        }
        false
    }

    fn field(&mut self, kind: ColumnKind) -> Value {
        match kind {
            ColumnKind::Ascii => {
                let len = self.rng.gen_range(1..=self.options.max_word_length);
                let word: String = (&mut self.rng)
                    .sample_iter(&Alphanumeric)
                    .take(len)
                    .map(char::from)
                    .collect();
                Value::String(word)
            }
            ColumnKind::Int => Value::from(self.rng.gen_range(0..(1u64 << 52))),
            ColumnKind::Bool => Value::Bool(self.rng.gen_bool(0.5)),
        }
    }

    fn render(&self, record: &[Value]) -> String {
        let fields: Vec<String> = record
            .iter()
            .map(|field| match field {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        let mut line = fields.join(&self.options.delimiter);
        line.push_str(&self.options.row_delimiter);
        line
    }

    fn eof_marker(&self) -> Option<&str> {
        match &self.options.eof {
            Eof::Flag(true) => Some(&self.options.row_delimiter),
            Eof::Flag(false) => None,
            Eof::Marker(marker) => Some(marker),
        }
    }

    /// Drain every remaining record in object mode
    pub fn records(mut self) -> Vec<Value> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record() {
            records.push(Value::Array(record));
        }
        records
    }
}

impl Iterator for Generator {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        let high_water_mark = self.options.high_water_mark;

        while !self.exhausted && self.pending.len() < high_water_mark {
            match self.next_record() {
                Some(record) => {
                    let line = self.render(&record);
                    self.pending.extend_from_slice(line.as_bytes());
                }
                None => {
                    self.exhausted = true;
                    if let Some(marker) = self.eof_marker().map(str::to_owned) {
                        self.pending.extend_from_slice(marker.as_bytes());
                    }
                }
            }
        }

        if self.pending.is_empty() {
            return None;
        }
        if self.options.fixed_size && self.pending.len() > high_water_mark {
            let rest = self.pending.split_off(high_water_mark);
            return Some(std::mem::replace(&mut self.pending, rest));
        }
        Some(std::mem::take(&mut self.pending))
    }
}

/// Run a generation to completion
pub fn generate(options: GenerateOptions) -> CsvResult<GenerateOutput> {
    let object_mode = options.object_mode;
    let text = options.encoding.is_some();
    let generator = Generator::new(options)?;

    if object_mode {
        let records = generator.records();
        debug!("Generated {} records", records.len());
        return Ok(GenerateOutput::Records(records));
    }

    let mut chunks = 0usize;
    let mut bytes = Vec::new();
    for chunk in generator {
        chunks += 1;
        bytes.extend_from_slice(&chunk);
    }
    debug!("Generated {} bytes in {} chunks", bytes.len(), chunks);

    if text {
        // Generated fields are alphanumeric, so the bytes are always valid UTF-8
        Ok(GenerateOutput::Text(String::from_utf8_lossy(&bytes).into_owned()))
    } else {
        Ok(GenerateOutput::Bytes(bytes))
    }
}

// ================================================================================================
// Tests
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::GenerateColumns;

    fn seeded(length: u64, seed: u64) -> GenerateOptions {
        GenerateOptions {
            length: Some(length),
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let first = generate(seeded(20, 1)).unwrap();
        let second = generate(seeded(20, 1)).unwrap();
        let other = generate(seeded(20, 2)).unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(first.record_count("\n"), 20);
    }

    #[test]
    fn test_object_mode_records_follow_column_kinds() {
        let options = GenerateOptions {
            columns: GenerateColumns::Kinds(vec![
                ColumnKind::Ascii,
                ColumnKind::Int,
                ColumnKind::Bool,
            ]),
            object_mode: true,
            max_word_length: 4,
            ..seeded(5, 9)
        };

        let GenerateOutput::Records(records) = generate(options).unwrap() else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 5);
        for record in records {
            let fields = record.as_array().unwrap();
            assert_eq!(fields.len(), 3);
            let word = fields[0].as_str().unwrap();
            assert!((1..=4).contains(&word.len()));
            assert!(fields[1].is_u64());
            assert!(fields[2].is_boolean());
        }
    }

    #[test]
    fn test_text_output_with_delimiters_and_eof() {
        let options = GenerateOptions {
            columns: GenerateColumns::Count(2),
            delimiter: "|".to_string(),
            row_delimiter: "\r\n".to_string(),
            encoding: Some("utf8".to_string()),
            eof: Eof::Marker("END".to_string()),
            ..seeded(3, 4)
        };

        let GenerateOutput::Text(text) = generate(options).unwrap() else {
            panic!("expected text");
        };
        assert!(text.ends_with("\r\nEND"));
        let body = text.trim_end_matches("END");
        let lines: Vec<&str> = body.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|line| line.split('|').count() == 2));
    }

    #[test]
    fn test_fixed_size_chunks() {
        let options = GenerateOptions {
            fixed_size: true,
            high_water_mark: 10,
            ..seeded(50, 3)
        };

        let chunks: Vec<Vec<u8>> = Generator::new(options.clone()).unwrap().collect();
        let (last, full) = chunks.split_last().unwrap();
        assert!(full.iter().all(|chunk| chunk.len() == 10));
        assert!(!last.is_empty() && last.len() <= 10);

        let GenerateOutput::Bytes(bytes) = generate(options).unwrap() else {
            panic!("expected bytes");
        };
        assert_eq!(chunks.concat(), bytes);
    }

    #[test]
    fn test_generation_requires_a_stop_condition() {
        let err = Generator::new(GenerateOptions::default()).err().unwrap();
        assert!(matches!(err, CsvError::UnboundedGeneration));
    }

    #[test]
    fn test_unsupported_encoding() {
        let options = GenerateOptions {
            encoding: Some("utf16".to_string()),
            ..seeded(1, 1)
        };
        let err = generate(options).unwrap_err();
        assert!(matches!(
            err,
            CsvError::InvalidOption {
                option: "encoding",
                ..
            }
        ));
    }

    #[test]
    fn test_duration_stops_generation() {
        let options = GenerateOptions {
            duration: Some(20),
            sleep: Some(5),
            object_mode: true,
            ..Default::default()
        };
        let GenerateOutput::Records(records) = generate(options).unwrap() else {
            panic!("expected records");
        };
        assert!(!records.is_empty());
        assert!(records.len() < 20);
    }
}
