use crate::{
    errors::{CsvError, CsvResult},
    generate::{self, GenerateOutput},
    options::{GenerateOptions, ParseOptions, StringifyOptions, TransformOptions},
    parse, stringify, transform,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::debug;

/// Records exchanged with the engine: arrays or objects
pub type Rows = Vec<Value>;

/// Error-first completion callback
///
/// An engine must call it exactly once. It is `FnMut` rather than `FnOnce`
/// because nothing in the type system stops an engine from calling it again;
/// callers have to tolerate that.
pub type EngineCallback<T, E> = Box<dyn FnMut(Result<T, E>) + Send>;

/// Per-row transformation, invoked by the engine; `Ok(None)` drops the row
pub type Handler<E> = Arc<dyn Fn(Value) -> Result<Option<Value>, E> + Send + Sync>;

/// Callback-based CSV toolkit
///
/// Every operation has an options-less entry point and a `_with` entry point.
/// An engine is free to treat "no options" differently from any options value,
/// including the default one.
pub trait CsvEngine: Send + Sync + 'static {
    type Error: Send + 'static;

    fn generate(&self, callback: EngineCallback<GenerateOutput, Self::Error>);

    fn generate_with(
        &self,
        options: GenerateOptions,
        callback: EngineCallback<GenerateOutput, Self::Error>,
    );

    fn parse(&self, input: Vec<u8>, callback: EngineCallback<Value, Self::Error>);

    fn parse_with(
        &self,
        input: Vec<u8>,
        options: ParseOptions,
        callback: EngineCallback<Value, Self::Error>,
    );

    fn transform(
        &self,
        data: Rows,
        handler: Handler<Self::Error>,
        callback: EngineCallback<Rows, Self::Error>,
    );

    fn transform_with(
        &self,
        data: Rows,
        handler: Handler<Self::Error>,
        options: TransformOptions,
        callback: EngineCallback<Rows, Self::Error>,
    );

    fn stringify(&self, data: Rows, callback: EngineCallback<String, Self::Error>);

    fn stringify_with(
        &self,
        data: Rows,
        options: StringifyOptions,
        callback: EngineCallback<String, Self::Error>,
    );
}

/// The CSV engine
///
/// Work runs on the Tokio blocking pool when built inside a runtime, and on the
/// calling thread otherwise. The options-less entry points use the `Default`
/// options of each operation.
#[derive(Debug, Clone)]
pub struct Csv {
    runtime: Option<Handle>,
}

impl Csv {
    /// Engine bound to the current Tokio runtime, if any
    pub fn new() -> Self {
        Self {
            runtime: Handle::try_current().ok(),
        }
    }

    /// Engine that completes every operation before returning
    pub fn inline() -> Self {
        Self { runtime: None }
    }

    pub fn with_runtime(runtime: Handle) -> Self {
        Self {
            runtime: Some(runtime),
        }
    }

    fn run<T, F>(
        &self,
        operation: &'static str,
        job: F,
        mut callback: EngineCallback<T, CsvError>,
    ) where
        T: Send + 'static,
        F: FnOnce() -> CsvResult<T> + Send + 'static,
    {
        match &self.runtime {
            Some(runtime) => {
                runtime.spawn_blocking(move || {
                    let outcome = job();
                    log_outcome(operation, &outcome);
                    callback(outcome);
                });
            }
            None => {
                let outcome = job();
                log_outcome(operation, &outcome);
                callback(outcome);
            }
        }
    }
}

impl Default for Csv {
    fn default() -> Self {
        Self::new()
    }
}

fn log_outcome<T>(operation: &str, outcome: &CsvResult<T>) {
    match outcome {
        Ok(_) => debug!("{} completed", operation),
        Err(err) => debug!("{} failed: {}", operation, err),
    }
}

impl CsvEngine for Csv {
    type Error = CsvError;

    fn generate(&self, callback: EngineCallback<GenerateOutput, CsvError>) {
        self.generate_with(GenerateOptions::default(), callback);
    }

    fn generate_with(
        &self,
        options: GenerateOptions,
        callback: EngineCallback<GenerateOutput, CsvError>,
    ) {
        self.run("generate", move || generate::generate(options), callback);
    }

    fn parse(&self, input: Vec<u8>, callback: EngineCallback<Value, CsvError>) {
        self.parse_with(input, ParseOptions::default(), callback);
    }

    fn parse_with(
        &self,
        input: Vec<u8>,
        options: ParseOptions,
        callback: EngineCallback<Value, CsvError>,
    ) {
        self.run("parse", move || parse::parse(&input, &options), callback);
    }

    fn transform(
        &self,
        data: Rows,
        handler: Handler<CsvError>,
        callback: EngineCallback<Rows, CsvError>,
    ) {
        self.transform_with(data, handler, TransformOptions::default(), callback);
    }

    fn transform_with(
        &self,
        data: Rows,
        handler: Handler<CsvError>,
        options: TransformOptions,
        mut callback: EngineCallback<Rows, CsvError>,
    ) {
        match &self.runtime {
            Some(runtime) => {
                runtime.spawn(async move {
                    let outcome = transform::transform_parallel(data, handler, options).await;
                    log_outcome("transform", &outcome);
                    callback(outcome);
                });
            }
            None => {
                let outcome = transform::transform(data, &handler, &options);
                log_outcome("transform", &outcome);
                callback(outcome);
            }
        }
    }

    fn stringify(&self, data: Rows, callback: EngineCallback<String, CsvError>) {
        self.stringify_with(data, StringifyOptions::default(), callback);
    }

    fn stringify_with(
        &self,
        data: Rows,
        options: StringifyOptions,
        callback: EngineCallback<String, CsvError>,
    ) {
        self.run(
            "stringify",
            move || stringify::stringify(&data, &options),
            callback,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::mpsc;

    fn capture<T: Send + 'static>() -> (EngineCallback<T, CsvError>, mpsc::Receiver<CsvResult<T>>)
    {
        let (tx, rx) = mpsc::channel();
        let callback: EngineCallback<T, CsvError> = Box::new(move |outcome: CsvResult<T>| {
            let _ = tx.send(outcome);
        });
        (callback, rx)
    }

    #[test]
    fn test_inline_engine_calls_back_before_returning() {
        let engine = Csv::inline();
        let (callback, rx) = capture();
        engine.stringify(vec![json!(["a", "b"])], callback);
        assert_eq!(rx.try_recv().unwrap().unwrap(), "a,b\n");
    }

    #[test]
    fn test_inline_engine_reports_errors_through_callback() {
        let engine = Csv::inline();
        let (callback, rx) = capture();
        engine.generate(callback);
        assert!(matches!(
            rx.try_recv().unwrap(),
            Err(CsvError::UnboundedGeneration)
        ));
    }

    #[test]
    fn test_engine_outside_runtime_is_inline() {
        assert!(Csv::new().runtime.is_none());
    }

    #[tokio::test]
    async fn test_runtime_engine_calls_back_once() {
        let engine = Csv::new();
        assert!(engine.runtime.is_some());

        let (callback, rx) = capture();
        engine.parse_with(
            b"a;b\n".to_vec(),
            ParseOptions {
                delimiter: ';',
                ..Default::default()
            },
            callback,
        );
        let outcome = tokio::task::spawn_blocking(move || {
            let first = rx.recv().unwrap();
            (first, rx.recv().is_err())
        })
        .await
        .unwrap();
        assert_eq!(outcome.0.unwrap(), json!([["a", "b"]]));
        assert!(outcome.1, "callback must fire exactly once");
    }

    #[tokio::test]
    async fn test_runtime_engine_transforms() {
        let engine = Csv::new();
        let (callback, rx) = capture();
        let handler: Handler<CsvError> = Arc::new(|row: Value| Ok(Some(json!([row, row]))));
        engine.transform(vec![json!(1), json!(2)], handler, callback);
        let outcome = tokio::task::spawn_blocking(move || rx.recv().unwrap())
            .await
            .unwrap();
        assert_eq!(outcome.unwrap(), vec![json!([1, 1]), json!([2, 2])]);
    }
}
