#![allow(dead_code)]

use csv_async::{
    CsvEngine, EngineCallback, GenerateOptions, GenerateOutput, Handler, ParseOptions, Rows,
    StringifyOptions, TransformOptions,
};
use serde_json::{json, Value};
use std::{
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeError {
    pub code: &'static str,
    pub message: String,
}

impl FakeError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// How the fake engine completes each operation
#[derive(Debug, Clone)]
pub enum Behavior {
    Succeed,
    Fail(FakeError),
    SucceedThenFail(FakeError),
    FailThenSucceed(FakeError),
    /// Completes from another thread after the delay
    Delayed(Duration),
    /// Drops the callback without invoking it
    Silent,
}

/// Which entry point the adapter hit, and what it passed along
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Generate,
    GenerateWith(GenerateOptions),
    Parse(Vec<u8>),
    ParseWith(Vec<u8>, ParseOptions),
    Transform(Rows),
    TransformWith(Rows, TransformOptions),
    Stringify(Rows),
    /// Stringify options carry closures, so only the delimiter is recorded
    StringifyWith(Rows, String),
}

/// Engine double that records calls and completes them per [`Behavior`]
pub struct FakeEngine {
    behavior: Behavior,
    calls: Mutex<Vec<Call>>,
}

impl FakeEngine {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn complete<T: Send + 'static>(&self, value: T, mut callback: EngineCallback<T, FakeError>) {
        match self.behavior.clone() {
            Behavior::Succeed => callback(Ok(value)),
            Behavior::Fail(err) => callback(Err(err)),
            Behavior::SucceedThenFail(err) => {
                callback(Ok(value));
                callback(Err(err));
            }
            Behavior::FailThenSucceed(err) => {
                callback(Err(err));
                callback(Ok(value));
            }
            Behavior::Delayed(delay) => {
                thread::spawn(move || {
                    thread::sleep(delay);
                    callback(Ok(value));
                });
            }
            Behavior::Silent => drop(callback),
        }
    }
}

pub fn fake_output() -> GenerateOutput {
    GenerateOutput::Text("fake,record\n".to_string())
}

pub fn fake_records() -> Value {
    json!([["fake", "record"]])
}

pub const FAKE_TEXT: &str = "fake,record\n";

impl CsvEngine for FakeEngine {
    type Error = FakeError;

    fn generate(&self, callback: EngineCallback<GenerateOutput, FakeError>) {
        self.record(Call::Generate);
        self.complete(fake_output(), callback);
    }

    fn generate_with(
        &self,
        options: GenerateOptions,
        callback: EngineCallback<GenerateOutput, FakeError>,
    ) {
        self.record(Call::GenerateWith(options));
        self.complete(fake_output(), callback);
    }

    fn parse(&self, input: Vec<u8>, callback: EngineCallback<Value, FakeError>) {
        self.record(Call::Parse(input));
        self.complete(fake_records(), callback);
    }

    fn parse_with(
        &self,
        input: Vec<u8>,
        options: ParseOptions,
        callback: EngineCallback<Value, FakeError>,
    ) {
        self.record(Call::ParseWith(input, options));
        self.complete(fake_records(), callback);
    }

    fn transform(
        &self,
        data: Rows,
        handler: Handler<FakeError>,
        callback: EngineCallback<Rows, FakeError>,
    ) {
        self.record(Call::Transform(data.clone()));
        match apply(data, &handler) {
            Ok(rows) => self.complete(rows, callback),
            Err(err) => {
                let mut callback = callback;
                callback(Err(err));
            }
        }
    }

    fn transform_with(
        &self,
        data: Rows,
        handler: Handler<FakeError>,
        options: TransformOptions,
        callback: EngineCallback<Rows, FakeError>,
    ) {
        self.record(Call::TransformWith(data.clone(), options));
        match apply(data, &handler) {
            Ok(rows) => self.complete(rows, callback),
            Err(err) => {
                let mut callback = callback;
                callback(Err(err));
            }
        }
    }

    fn stringify(&self, data: Rows, callback: EngineCallback<String, FakeError>) {
        self.record(Call::Stringify(data));
        self.complete(FAKE_TEXT.to_string(), callback);
    }

    fn stringify_with(
        &self,
        data: Rows,
        options: StringifyOptions,
        callback: EngineCallback<String, FakeError>,
    ) {
        self.record(Call::StringifyWith(data, options.delimiter));
        self.complete(FAKE_TEXT.to_string(), callback);
    }
}

fn apply(data: Rows, handler: &Handler<FakeError>) -> Result<Rows, FakeError> {
    let mut output = Vec::new();
    for row in data {
        if let Some(row) = handler(row)? {
            output.push(row);
        }
    }
    Ok(output)
}
