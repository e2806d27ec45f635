//! Free functions over a default [`Csv`] engine

use crate::{adapter::CsvAsync, deferred::Deferred};
use csv_async_engine::{
    Csv, CsvError, GenerateOptions, GenerateOutput, Handler, ParseOptions, Rows,
    StringifyOptions, TransformOptions,
};
use serde_json::Value;

pub fn generate(options: impl Into<Option<GenerateOptions>>) -> Deferred<GenerateOutput, CsvError> {
    CsvAsync::<Csv>::new().generate(options)
}

pub fn parse(
    input: impl Into<Vec<u8>>,
    options: impl Into<Option<ParseOptions>>,
) -> Deferred<Value, CsvError> {
    CsvAsync::<Csv>::new().parse(input, options)
}

pub fn transform(
    data: Rows,
    handler: Handler<CsvError>,
    options: impl Into<Option<TransformOptions>>,
) -> Deferred<Rows, CsvError> {
    CsvAsync::<Csv>::new().transform(data, handler, options)
}

pub fn stringify(
    data: Rows,
    options: impl Into<Option<StringifyOptions>>,
) -> Deferred<String, CsvError> {
    CsvAsync::<Csv>::new().stringify(data, options)
}
