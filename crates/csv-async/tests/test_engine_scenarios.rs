use csv_async::{
    generate, parse, stringify, transform, Csv, CsvAsync, CsvError, GenerateOptions,
    GenerateOutput, Handler, ParseColumns, ParseOptions, TransformOptions,
};
use futures::future::join_all;
use serde_json::{json, Value};
use std::sync::Arc;

fn districts() -> Vec<Value> {
    vec![
        json!(["HK", "Hong Kong Island"]),
        json!(["KLN", "Kowloon"]),
        json!(["NT", "New Territories"]),
    ]
}

#[tokio::test]
async fn test_stringify_districts() {
    let text = stringify(districts(), None).await.unwrap();
    assert_eq!(text, "HK,Hong Kong Island\nKLN,Kowloon\nNT,New Territories\n");
}

#[tokio::test]
async fn test_parse_with_discovered_columns() {
    let options = ParseOptions {
        columns: Some(ParseColumns::Discover(true)),
        ..Default::default()
    };
    let records = parse("a,b\n1,2\n", options).await.unwrap();
    assert_eq!(records, json!([{"a": "1", "b": "2"}]));
}

#[tokio::test]
async fn test_parse_without_options() {
    let records = parse("a,b\n1,2\n", None).await.unwrap();
    assert_eq!(records, json!([["a", "b"], ["1", "2"]]));
}

#[tokio::test]
async fn test_seeded_generation_is_single_and_repeatable() {
    let options = GenerateOptions {
        length: Some(1),
        seed: Some(1),
        ..Default::default()
    };

    let first = generate(options.clone()).await.unwrap();
    let second = generate(options.clone()).await.unwrap();

    assert_eq!(first.record_count(&options.row_delimiter), 1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_seeded_generation_in_object_mode() {
    let options = GenerateOptions {
        length: Some(1),
        seed: Some(1),
        object_mode: true,
        ..Default::default()
    };
    let GenerateOutput::Records(records) = generate(options).await.unwrap() else {
        panic!("object mode should produce records");
    };
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_transform_then_stringify() {
    let handler: Handler<CsvError> = Arc::new(|row: Value| {
        let code = row[0].as_str().unwrap_or_default();
        Ok((code != "KLN").then(|| json!([code.to_lowercase(), row[1]])))
    });
    let options = TransformOptions {
        parallel: 2,
        ..Default::default()
    };

    let rows = transform(districts(), handler, options).await.unwrap();
    let text = stringify(rows, None).await.unwrap();
    assert_eq!(text, "hk,Hong Kong Island\nnt,New Territories\n");
}

#[tokio::test]
async fn test_parse_round_trips_stringified_text() {
    let text = stringify(districts(), None).await.unwrap();
    let records = parse(text, None).await.unwrap();
    assert_eq!(records, Value::Array(districts()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_operations_settle_independently() {
    let csv = CsvAsync::new();
    let pending: Vec<_> = (0..16)
        .map(|i| csv.stringify(vec![json!([i, format!("row {}", i)])], None))
        .collect();

    let texts = join_all(pending).await;
    for (i, text) in texts.into_iter().enumerate() {
        assert_eq!(text.unwrap(), format!("{},row {}\n", i, i));
    }
}

#[tokio::test]
async fn test_spawned_operations() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            tokio::spawn(async move {
                let options = ParseOptions {
                    from_line: Some(i + 1),
                    ..Default::default()
                };
                parse("a\nb\nc\nd\n", options).await
            })
        })
        .collect();

    let mut sizes = Vec::new();
    for handle in handles {
        let records = handle.await.unwrap().unwrap();
        sizes.push(records.as_array().map(Vec::len).unwrap_or_default());
    }
    assert_eq!(sizes, vec![4, 3, 2, 1]);
}

#[test]
fn test_inline_engine_without_runtime() {
    let csv = CsvAsync::with_engine(Csv::inline());
    let text = futures::executor::block_on(csv.stringify(districts(), None)).unwrap();
    assert!(text.starts_with("HK,"));
}
