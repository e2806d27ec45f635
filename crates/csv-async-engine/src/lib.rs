/*!
# CSV Engine

Callback-based CSV toolkit: record generation, parsing, row transformation and
stringification.

## Purpose

Every operation reports its outcome through an error-first completion callback
([`EngineCallback`]) instead of returning it. The [`CsvEngine`] trait is that
callback surface; [`Csv`] implements it on top of:

- the `csv` crate reader for parsing
- `rand` for (optionally seeded) record generation
- `regex` and `chrono` for quoting and date casting rules

Each operation comes in two forms, with and without an options argument, so
that callers can tell "no configuration" apart from "default configuration".

## Records

Records are `serde_json::Value`s: arrays of fields, or objects keyed by column
name when a `columns` option is in play.

## Usage

```rust
use csv_async_engine::{Csv, CsvEngine, CsvResult};
use serde_json::json;
use std::sync::mpsc;

let (tx, rx) = mpsc::channel();
let engine = Csv::inline();
engine.stringify(
    vec![json!(["HK", "Hong Kong Island"])],
    Box::new(move |outcome: CsvResult<String>| {
        let _ = tx.send(outcome);
    }),
);
assert_eq!(rx.recv().unwrap().unwrap(), "HK,Hong Kong Island\n");
```
*/

pub mod engine;
pub mod errors;
pub mod generate;
pub mod options;
pub mod parse;
pub mod stringify;
pub mod transform;

// Re-export main types for convenience
pub use engine::{Csv, CsvEngine, EngineCallback, Handler, Rows};
pub use errors::{CsvError, CsvResult, ErrorCode};
pub use generate::{GenerateOutput, Generator};
pub use options::{
    Cast, ColumnKind, Eof, GenerateColumns, GenerateEnd, GenerateOptions, ParseColumns,
    ParseOptions, RecordDelimiter, StringifyColumn, StringifyOptions, TransformOptions,
};
