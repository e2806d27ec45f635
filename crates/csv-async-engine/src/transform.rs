/*!
# Row Transformation

Runs a user handler over every row. Output order always matches input order;
a handler returning `Ok(None)` drops its row.
*/

use crate::{
    engine::{Handler, Rows},
    errors::{CsvError, CsvResult},
    options::TransformOptions,
};
use futures::future::join_all;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

/// Apply `handler` to each row on the current thread
pub fn transform(
    rows: Rows,
    handler: &Handler<CsvError>,
    options: &TransformOptions,
) -> CsvResult<Rows> {
    validate(options)?;
    run_batch(0, rows, handler, options.skip_errors)
}

/// Apply `handler` on the Tokio blocking pool, at most `parallel` calls at once
///
/// Rows are split into at most `parallel` contiguous batches, each handled
/// sequentially on its own blocking task. The first failing row in input order
/// decides the error.
pub async fn transform_parallel(
    rows: Rows,
    handler: Handler<CsvError>,
    options: TransformOptions,
) -> CsvResult<Rows> {
    validate(&options)?;

    let total = rows.len();
    let batch_size = total.div_ceil(options.parallel).max(1);
    let mut batches = Vec::new();
    let mut offset = 0;
    let mut rest = rows;
    while !rest.is_empty() {
        let tail = rest.split_off(batch_size.min(rest.len()));
        batches.push((offset, rest));
        offset += batch_size;
        rest = tail;
    }
    debug!("Transforming {} rows in {} batches", total, batches.len());

    let tasks = batches.into_iter().map(|(offset, batch)| {
        let handler = handler.clone();
        let skip_errors = options.skip_errors;
        let task =
            tokio::task::spawn_blocking(move || run_batch(offset, batch, &handler, skip_errors));
        async move {
            match task.await {
                Ok(result) => result,
                Err(_) => Err(CsvError::HandlerPanicked { row: offset }),
            }
        }
    });

    let mut output = Vec::with_capacity(total);
    for result in join_all(tasks).await {
        output.extend(result?);
    }
    Ok(output)
}

fn validate(options: &TransformOptions) -> CsvResult<()> {
    if options.parallel == 0 {
        return Err(CsvError::invalid_option("parallel", "must be at least 1"));
    }
    Ok(())
}

fn run_batch(
    offset: usize,
    rows: Rows,
    handler: &Handler<CsvError>,
    skip_errors: bool,
) -> CsvResult<Rows> {
    let mut output = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        let index = offset + i;
        let outcome = catch_unwind(AssertUnwindSafe(|| handler(row)))
            .map_err(|_| CsvError::HandlerPanicked { row: index })?;
        match outcome {
            Ok(Some(value)) => output.push(value),
            Ok(None) => {}
            Err(err) if skip_errors => warn!("Dropping row {}: {}", index, err),
            Err(err) => return Err(err),
        }
    }
    Ok(output)
}

// ================================================================================================
// Tests
// ================================================================================================
