/*!
# CSV Stringification

Formats JSON records (arrays or objects) as CSV text.

Field quoting is decided per field (`quoted_empty`, `quoted_string`,
`quoted_match` look at the value and its type), which a single writer-wide
quote style cannot express, so records are assembled here rather than through
`csv::Writer`.
*/

use crate::{
    errors::{CsvError, CsvResult},
    options::{StringifyColumn, StringifyOptions},
};
use chrono::DateTime;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

struct Field {
    text: String,
    is_string: bool,
}

/// Format `rows` into a single CSV string
pub fn stringify(rows: &[Value], options: &StringifyOptions) -> CsvResult<String> {
    let quoted_match = match &options.quoted_match {
        Some(pattern) => Some(Regex::new(pattern).map_err(|e| {
            CsvError::invalid_option("quoted_match", e.to_string())
        })?),
        None => None,
    };
    let record_delimiter = options.record_delimiter.as_str();

    let columns: Option<Vec<StringifyColumn>> = match &options.columns {
        Some(columns) => Some(columns.clone()),
        None => match rows.first() {
            Some(Value::Object(first)) => Some(
                first
                    .keys()
                    .map(|key| StringifyColumn::new(key.as_str()))
                    .collect(),
            ),
            _ => None,
        },
    };

    let mut lines: Vec<String> = Vec::with_capacity(rows.len() + 1);

    if options.header {
        let columns = match &columns {
            Some(columns) => columns,
            None if rows.is_empty() => return Ok(String::new()),
            None => return Err(CsvError::UndiscoverableColumns),
        };
        let labels: Vec<Field> = columns
            .iter()
            .map(|column| Field {
                text: column.label().to_string(),
                is_string: true,
            })
            .collect();
        lines.push(join_fields(labels, options, quoted_match.as_ref()));
    }

    for row in rows {
        let values: Vec<Option<&Value>> = match (row, &columns) {
            (Value::Array(fields), None) => fields.iter().map(Some).collect(),
            (Value::Array(_) | Value::Object(_), Some(columns)) => columns
                .iter()
                .map(|column| lookup(row, &column.key))
                .collect(),
            (Value::Object(object), None) => object.values().map(Some).collect(),
            (other, _) => return Err(CsvError::InvalidRecord(type_name(other).to_string())),
        };
        let fields: Vec<Field> = values
            .into_iter()
            .map(|value| format_value(value, options))
            .collect();
        lines.push(join_fields(fields, options, quoted_match.as_ref()));
    }

    if lines.is_empty() {
        return Ok(String::new());
    }

    let mut output = lines.join(record_delimiter);
    if options.eof {
        output.push_str(record_delimiter);
    }
    debug!("Stringified {} records into {} bytes", rows.len(), output.len());
    Ok(output)
}

/// Resolve a column key: array index for arrays, dotted path for objects
fn lookup<'a>(row: &'a Value, key: &str) -> Option<&'a Value> {
    match row {
        Value::Array(fields) => key.parse::<usize>().ok().and_then(|i| fields.get(i)),
        Value::Object(object) => {
            if let Some(value) = object.get(key) {
                return Some(value);
            }
            let mut current = row;
            for segment in key.split('.') {
                current = match current {
                    Value::Object(object) => object.get(segment)?,
                    Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                    _ => return None,
                };
            }
            Some(current)
        }
        _ => None,
    }
}

fn format_value(value: Option<&Value>, options: &StringifyOptions) -> Field {
    let cast = &options.cast;
    let (text, is_string) = match value {
        None | Some(Value::Null) => (String::new(), false),
        Some(Value::Bool(b)) => match &cast.boolean {
            Some(f) => (f(*b), false),
            None if *b => ("1".to_string(), false),
            None => (String::new(), false),
        },
        Some(Value::Number(n)) => match &cast.number {
            Some(f) => (f(n), false),
            None => (n.to_string(), false),
        },
        Some(Value::String(s)) => {
            let date = cast
                .date
                .as_ref()
                .and_then(|f| DateTime::parse_from_rfc3339(s).ok().map(f.as_ref()));
            match (date, &cast.string) {
                (Some(text), _) => (text, false),
                (None, Some(f)) => (f(s.as_str()), true),
                (None, None) => (s.clone(), true),
            }
        }
        Some(nested @ (Value::Array(_) | Value::Object(_))) => match &cast.object {
            Some(f) => (f(nested), false),
            None => (nested.to_string(), false),
        },
    };
    Field { text, is_string }
}

fn join_fields(
    fields: Vec<Field>,
    options: &StringifyOptions,
    quoted_match: Option<&Regex>,
) -> String {
    fields
        .into_iter()
        .map(|field| quote_field(field, options, quoted_match))
        .collect::<Vec<_>>()
        .join(&options.delimiter)
}

fn quote_field(field: Field, options: &StringifyOptions, quoted_match: Option<&Regex>) -> String {
    let Some(quote) = options.quote else {
        return field.text;
    };
    let text = field.text;

    let should_quote = if text.is_empty() {
        options
            .quoted_empty
            .unwrap_or(options.quoted_string && field.is_string)
    } else {
        text.contains(quote)
            || text.contains(options.delimiter.as_str())
            || text.contains(options.record_delimiter.as_str())
            || text.contains(['\r', '\n'])
            || options.quoted
            || (options.quoted_string && field.is_string)
            || quoted_match.is_some_and(|re| re.is_match(&text))
    };
    if !should_quote {
        return text;
    }

    let escape = options.escape;
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push(quote);
    for c in text.chars() {
        if c == quote || (c == escape && escape != quote) {
            escaped.push(escape);
        }
        escaped.push(c);
    }
    escaped.push(quote);
    escaped
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ================================================================================================
// Tests
// ================================================================================================
