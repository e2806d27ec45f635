use crate::deferred::{deferred, Deferred};
use csv_async_engine::{
    Csv, CsvEngine, GenerateOptions, GenerateOutput, Handler, ParseOptions, Rows,
    StringifyOptions, TransformOptions,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Future-returning front end for a [`CsvEngine`]
///
/// Each method starts the engine operation immediately and returns a
/// [`Deferred`] that settles on the engine's first completion. Options are
/// forwarded untouched: `None` selects the engine's options-less entry point,
/// any `Some` value (the default one included) its `_with` entry point.
pub struct CsvAsync<E = Csv> {
    engine: Arc<E>,
}

impl CsvAsync<Csv> {
    /// Adapter over a [`Csv`] engine bound to the current Tokio runtime, if any
    pub fn new() -> Self {
        Self::with_engine(Csv::new())
    }
}

impl Default for CsvAsync<Csv> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for CsvAsync<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<E: CsvEngine> CsvAsync<E> {
    pub fn with_engine(engine: E) -> Self {
        Self::from_shared(Arc::new(engine))
    }

    pub fn from_shared(engine: Arc<E>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Generate records
    pub fn generate(
        &self,
        options: impl Into<Option<GenerateOptions>>,
    ) -> Deferred<GenerateOutput, E::Error> {
        let (resolver, result) = deferred();
        match options.into() {
            Some(options) => {
                debug!("generate with options");
                self.engine.generate_with(options, resolver.into_callback());
            }
            None => {
                debug!("generate without options");
                self.engine.generate(resolver.into_callback());
            }
        }
        result
    }

    /// Parse CSV text into records
    pub fn parse(
        &self,
        input: impl Into<Vec<u8>>,
        options: impl Into<Option<ParseOptions>>,
    ) -> Deferred<Value, E::Error> {
        let input = input.into();
        let (resolver, result) = deferred();
        match options.into() {
            Some(options) => {
                debug!("parse {} bytes with options", input.len());
                self.engine
                    .parse_with(input, options, resolver.into_callback());
            }
            None => {
                debug!("parse {} bytes without options", input.len());
                self.engine.parse(input, resolver.into_callback());
            }
        }
        result
    }

    /// Run `handler` over every row
    ///
    /// The handler is only ever invoked by the engine.
    pub fn transform(
        &self,
        data: Rows,
        handler: Handler<E::Error>,
        options: impl Into<Option<TransformOptions>>,
    ) -> Deferred<Rows, E::Error> {
        let (resolver, result) = deferred();
        match options.into() {
            Some(options) => {
                debug!("transform {} rows with options", data.len());
                self.engine
                    .transform_with(data, handler, options, resolver.into_callback());
            }
            None => {
                debug!("transform {} rows without options", data.len());
                self.engine
                    .transform(data, handler, resolver.into_callback());
            }
        }
        result
    }

    /// Format records as CSV text
    pub fn stringify(
        &self,
        data: Rows,
        options: impl Into<Option<StringifyOptions>>,
    ) -> Deferred<String, E::Error> {
        let (resolver, result) = deferred();
        match options.into() {
            Some(options) => {
                debug!("stringify {} rows with options", data.len());
                self.engine
                    .stringify_with(data, options, resolver.into_callback());
            }
            None => {
                debug!("stringify {} rows without options", data.len());
                self.engine.stringify(data, resolver.into_callback());
            }
        }
        result
    }
}
