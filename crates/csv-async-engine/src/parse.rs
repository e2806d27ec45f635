/*!
# CSV Parsing

Reads CSV text into JSON records on top of the `csv` crate reader. Records are
arrays of fields unless a `columns` option turns them into objects.
*/

use crate::{
    errors::{CsvError, CsvResult},
    options::{ParseColumns, ParseOptions},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Terminator};
use serde_json::{json, Map, Number, Value};
use tracing::{debug, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse `input` into an array of records, or an object keyed by `objname`
pub fn parse(input: &[u8], options: &ParseOptions) -> CsvResult<Value> {
    let input = if options.bom {
        input.strip_prefix(UTF8_BOM).unwrap_or(input)
    } else {
        input
    };

    let mut discover = matches!(options.columns, Some(ParseColumns::Discover(true)));
    let mut columns = match &options.columns {
        Some(ParseColumns::Names(names)) => Some(names.clone()),
        _ => None,
    };
    if options.objname.is_some() && columns.is_none() && !discover {
        return Err(CsvError::InvalidObjname(
            "objname requires the columns option".to_string(),
        ));
    }

    let mut reader = reader_builder(options)?.from_reader(input);
    let results: Vec<Result<StringRecord, csv::Error>> = reader.records().collect();
    let starts: Vec<Option<u64>> = results
        .iter()
        .map(|result| match result {
            Ok(record) => record.position().map(|p| p.byte()),
            Err(err) => err.position().map(|p| p.byte()),
        })
        .collect();

    let mut expected_len: Option<usize> = None;
    let mut count: u64 = 0;
    let mut records = Vec::new();

    for (index, result) in results.into_iter().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(err) if options.skip_lines_with_error => {
                warn!("Skipping unreadable record: {}", err);
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let (line, byte) = record
            .position()
            .map(|p| (p.line(), p.byte()))
            .unwrap_or((0, 0));
        if options.from_line.is_some_and(|from| line < from) {
            continue;
        }
        if options.to_line.is_some_and(|to| line > to) {
            break;
        }

        let fields: Vec<String> = record.iter().map(|f| trim_field(f, options)).collect();

        if discover {
            columns = Some(fields.into_iter().map(Some).collect());
            discover = false;
            continue;
        }

        let checked = check_record(
            &record,
            &fields,
            columns.as_deref(),
            &mut expected_len,
            line,
            options,
        );
        if let Err(err) = checked {
            if options.skip_lines_with_error && err.is_record_level() {
                warn!("Skipping record on line {}: {}", line, err);
                continue;
            }
            return Err(err);
        }

        if options.skip_lines_with_empty_values && fields.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        count += 1;
        if options.from.is_some_and(|from| count < from) {
            continue;
        }
        if options.to.is_some_and(|to| count > to) {
            break;
        }

        let field_count = fields.len();
        let values: Vec<Value> = fields.into_iter().map(|f| cast_field(f, options)).collect();
        let mut value = match &columns {
            Some(names) => {
                let mut object = Map::new();
                for (name, value) in names.iter().zip(values) {
                    if let Some(name) = name {
                        object.insert(name.clone(), value);
                    }
                }
                Value::Object(object)
            }
            None => Value::Array(values),
        };

        if options.info || options.raw {
            let mut wrapper = Map::new();
            if options.info {
                wrapper.insert(
                    "info".to_string(),
                    json!({
                        "bytes": byte,
                        "columns": field_count,
                        "lines": line,
                        "records": count,
                    }),
                );
            }
            if options.raw {
                let end = starts[index + 1..]
                    .iter()
                    .flatten()
                    .next()
                    .copied()
                    .unwrap_or(input.len() as u64);
                wrapper.insert(
                    "raw".to_string(),
                    Value::String(raw_text(input, byte, end, options)),
                );
            }
            wrapper.insert("record".to_string(), value);
            value = Value::Object(wrapper);
        }

        records.push(value);
    }

    debug!("Parsed {} records", records.len());

    match &options.objname {
        Some(objname) => name_records(records, objname, options),
        None => Ok(Value::Array(records)),
    }
}

fn reader_builder(options: &ParseOptions) -> CsvResult<ReaderBuilder> {
    let mut builder = ReaderBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .delimiter(ascii_byte("delimiter", options.delimiter)?);

    match options.quote {
        Some(quote) => {
            let quote = ascii_byte("quote", quote)?;
            let escape = ascii_byte("escape", options.escape)?;
            builder.quoting(true).quote(quote);
            if escape == quote {
                builder.double_quote(true).escape(None);
            } else {
                builder.double_quote(false).escape(Some(escape));
            }
        }
        None => {
            builder.quoting(false);
        }
    }

    if let Some(comment) = options.comment {
        builder.comment(Some(ascii_byte("comment", comment)?));
    }

    let terminator = match options.record_delimiter.as_deref() {
        None | Some("\r\n") => Terminator::CRLF,
        Some(delimiter) if delimiter.len() == 1 && delimiter.is_ascii() => {
            Terminator::Any(delimiter.as_bytes()[0])
        }
        Some(delimiter) => {
            return Err(CsvError::invalid_option(
                "record_delimiter",
                format!(
                    "'{}' is not a single ASCII character or \\r\\n",
                    delimiter.escape_debug()
                ),
            ))
        }
    };
    builder.terminator(terminator);

    Ok(builder)
}

fn ascii_byte(option: &'static str, c: char) -> CsvResult<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(CsvError::invalid_option(
            option,
            format!("'{}' is not an ASCII character", c),
        ))
    }
}

fn check_record(
    record: &StringRecord,
    fields: &[String],
    columns: Option<&[Option<String>]>,
    expected_len: &mut Option<usize>,
    line: u64,
    options: &ParseOptions,
) -> CsvResult<()> {
    if let Some(max) = options.max_record_size {
        let size = record.as_byte_record().as_slice().len();
        if size > max {
            return Err(CsvError::MaxRecordSize { line, size, max });
        }
    }

    if options.relax_column_count {
        return Ok(());
    }

    match columns {
        Some(columns) if columns.len() != fields.len() => Err(CsvError::RecordDontMatchColumns {
            line,
            expected: columns.len(),
            found: fields.len(),
        }),
        Some(_) => Ok(()),
        None => match *expected_len {
            Some(expected) if expected != fields.len() => {
                Err(CsvError::InconsistentRecordLength {
                    line,
                    expected,
                    found: fields.len(),
                })
            }
            Some(_) => Ok(()),
            None => {
                *expected_len = Some(fields.len());
                Ok(())
            }
        },
    }
}

fn trim_field(field: &str, options: &ParseOptions) -> String {
    let mut field = field;
    if options.trim || options.ltrim {
        field = field.trim_start();
    }
    if options.trim || options.rtrim {
        field = field.trim_end();
    }
    field.to_string()
}

fn cast_field(field: String, options: &ParseOptions) -> Value {
    if options.cast {
        if let Ok(int) = field.parse::<i64>() {
            return Value::from(int);
        }
        if let Some(number) = field.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(number);
        }
    }
    if options.cast_date {
        if let Some(date) = parse_date(&field) {
            return Value::String(date.to_rfc3339());
        }
    }
    Value::String(field)
}

fn parse_date(field: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(field) {
        return Some(date.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(date) = NaiveDateTime::parse_from_str(field, format) {
            return Some(date.and_utc());
        }
    }
    NaiveDate::parse_from_str(field, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
}

fn raw_text(input: &[u8], start: u64, end: u64, options: &ParseOptions) -> String {
    let start = (start as usize).min(input.len());
    let end = (end as usize).clamp(start, input.len());
    let text = String::from_utf8_lossy(&input[start..end]);
    match options.record_delimiter.as_deref() {
        None | Some("\r\n") => text.trim_end_matches(['\r', '\n']).to_string(),
        Some(delimiter) => text.trim_end_matches(delimiter).to_string(),
    }
}

fn name_records(records: Vec<Value>, objname: &str, options: &ParseOptions) -> CsvResult<Value> {
    let wrapped = options.info || options.raw;
    let mut named = Map::new();
    for value in records {
        let record = if wrapped { &value["record"] } else { &value };
        let key = match record.get(objname) {
            Some(Value::String(key)) => key.clone(),
            Some(other) => other.to_string(),
            None => {
                return Err(CsvError::InvalidObjname(format!(
                    "column '{}' is missing from a record",
                    objname
                )))
            }
        };
        named.insert(key, value);
    }
    Ok(Value::Object(named))
}

// ================================================================================================
// Tests
// ================================================================================================
