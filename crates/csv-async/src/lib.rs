/*!
# CSV Async

Future-returning front end for the callback-based CSV engine in
`csv-async-engine`.

## Quick Start

```rust
use csv_async::{parse, stringify, ParseColumns, ParseOptions};
use serde_json::json;

# async fn example() -> Result<(), csv_async::CsvError> {
let text = stringify(vec![json!(["HK", "Hong Kong Island"])], None).await?;
assert_eq!(text, "HK,Hong Kong Island\n");

let options = ParseOptions {
    columns: Some(ParseColumns::Discover(true)),
    ..Default::default()
};
let records = parse("a,b\n1,2\n", options).await?;
assert_eq!(records, json!([{"a": "1", "b": "2"}]));
# Ok(())
# }
```

## Settlement

Every operation settles exactly once, on the engine's first completion. Later
completions, successful or not, are discarded. Engine errors reach the caller
unchanged.

## Custom Engines

[`CsvAsync`] works with any [`CsvEngine`]:

```rust
use csv_async::{Csv, CsvAsync};

# async fn example() -> Result<(), csv_async::CsvError> {
let csv = CsvAsync::with_engine(Csv::inline());
let text = csv.stringify(vec![serde_json::json!([1, 2])], None).await?;
assert_eq!(text, "1,2\n");
# Ok(())
# }
```
*/

pub mod adapter;
pub mod deferred;
pub mod ops;

pub use adapter::CsvAsync;
pub use deferred::{deferred, Deferred, Resolver};
pub use ops::{generate, parse, stringify, transform};

// Engine types used in the adapter's signatures
pub use csv_async_engine::{
    Cast, ColumnKind, Csv, CsvEngine, CsvError, CsvResult, EngineCallback, Eof, ErrorCode,
    GenerateColumns, GenerateEnd, GenerateOptions, GenerateOutput, Handler, ParseColumns,
    ParseOptions, RecordDelimiter, Rows, StringifyColumn, StringifyOptions, TransformOptions,
};
