/*!
# Operation Options

Configuration accepted by each engine entry point. Field names follow the
snake_case names of the configuration surface (camelCase spellings are accepted
as aliases where one exists), so option files written in YAML or JSON
deserialize directly into these types.

Every struct implements [`Default`]; the options-less entry points of the
engine run with those defaults.
*/

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use std::sync::Arc;

// ================================================================================================
// Generate Options
// ================================================================================================

/// Value kind of a generated column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Ascii,
    Int,
    Bool,
}

/// Number of generated columns, or the explicit kind of each one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenerateColumns {
    Count(usize),
    Kinds(Vec<ColumnKind>),
}

impl GenerateColumns {
    pub fn kinds(&self) -> Vec<ColumnKind> {
        match self {
            Self::Count(count) => vec![ColumnKind::Ascii; *count],
            Self::Kinds(kinds) => kinds.clone(),
        }
    }
}

impl Default for GenerateColumns {
    fn default() -> Self {
        Self::Count(8)
    }
}

/// Point in time after which generation stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenerateEnd {
    /// Milliseconds since the Unix epoch
    Millis(i64),
    At(DateTime<Utc>),
}

impl GenerateEnd {
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Millis(millis) => Utc.timestamp_millis_opt(*millis).single(),
            Self::At(at) => Some(*at),
        }
    }
}

/// Trailing marker written after the last generated record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Eof {
    /// `true` writes the row delimiter
    Flag(bool),
    Marker(String),
}

impl Default for Eof {
    fn default() -> Self {
        Self::Flag(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    pub columns: GenerateColumns,
    pub delimiter: String,
    /// Generation period in milliseconds
    pub duration: Option<u64>,
    /// Output text instead of bytes, decoded with this encoding
    pub encoding: Option<String>,
    pub end: Option<GenerateEnd>,
    pub eof: Eof,
    #[serde(alias = "fixedSize")]
    pub fixed_size: bool,
    #[serde(alias = "highWaterMark")]
    pub high_water_mark: usize,
    /// Number of records to generate
    pub length: Option<u64>,
    #[serde(alias = "maxWordLength")]
    pub max_word_length: usize,
    #[serde(alias = "objectMode")]
    pub object_mode: bool,
    pub row_delimiter: String,
    pub seed: Option<u64>,
    /// Pause between records in milliseconds
    pub sleep: Option<u64>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            columns: GenerateColumns::default(),
            delimiter: ",".to_string(),
            duration: None,
            encoding: None,
            end: None,
            eof: Eof::default(),
            fixed_size: false,
            high_water_mark: 16 * 1024,
            length: None,
            max_word_length: 16,
            object_mode: false,
            row_delimiter: "\n".to_string(),
            seed: None,
            sleep: None,
        }
    }
}

// ================================================================================================
// Parse Options
// ================================================================================================

/// Column naming for parsed records
///
/// `true` takes the names from the first record, a list names each column in
/// order (`null` drops that column). `false` keeps records as arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParseColumns {
    Discover(bool),
    Names(Vec<Option<String>>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Strip a leading UTF-8 byte order mark
    pub bom: bool,
    /// Convert integers and floats into numbers
    pub cast: bool,
    /// Convert date-like values into RFC 3339 timestamps
    pub cast_date: bool,
    pub columns: Option<ParseColumns>,
    pub comment: Option<char>,
    pub delimiter: char,
    pub escape: char,
    /// First record to emit (1-based)
    pub from: Option<u64>,
    pub from_line: Option<u64>,
    /// Wrap each record with its position information
    pub info: bool,
    pub ltrim: bool,
    /// Maximum size of a record's field data in bytes
    pub max_record_size: Option<usize>,
    /// Emit an object keyed by this column instead of an array
    pub objname: Option<String>,
    /// `None` disables quoting
    pub quote: Option<char>,
    /// Wrap each record with its source text
    pub raw: bool,
    /// `None` accepts `\n`, `\r` and `\r\n`
    pub record_delimiter: Option<String>,
    pub relax_column_count: bool,
    pub rtrim: bool,
    pub skip_lines_with_empty_values: bool,
    pub skip_lines_with_error: bool,
    /// Last record to emit (1-based, inclusive)
    pub to: Option<u64>,
    pub to_line: Option<u64>,
    pub trim: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            bom: false,
            cast: false,
            cast_date: false,
            columns: None,
            comment: None,
            delimiter: ',',
            escape: '"',
            from: None,
            from_line: None,
            info: false,
            ltrim: false,
            max_record_size: None,
            objname: None,
            quote: Some('"'),
            raw: false,
            record_delimiter: None,
            relax_column_count: false,
            rtrim: false,
            skip_lines_with_empty_values: false,
            skip_lines_with_error: false,
            to: None,
            to_line: None,
            trim: false,
        }
    }
}

// ================================================================================================
// Transform Options
// ================================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Maximum number of handler invocations running at once
    pub parallel: usize,
    /// Drop rows whose handler fails instead of failing the whole run
    pub skip_errors: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            parallel: 100,
            skip_errors: false,
        }
    }
}

// ================================================================================================
// Stringify Options
// ================================================================================================

/// Custom formatters per value type
///
/// `date` applies to strings holding an RFC 3339 timestamp and takes precedence
/// over `string` for them.
#[derive(Clone, Default)]
#[allow(clippy::type_complexity)]
pub struct Cast {
    pub boolean: Option<Arc<dyn Fn(bool) -> String + Send + Sync>>,
    pub date: Option<Arc<dyn Fn(DateTime<FixedOffset>) -> String + Send + Sync>>,
    pub number: Option<Arc<dyn Fn(&Number) -> String + Send + Sync>>,
    pub object: Option<Arc<dyn Fn(&Value) -> String + Send + Sync>>,
    pub string: Option<Arc<dyn Fn(&str) -> String + Send + Sync>>,
}

impl Cast {
    pub fn boolean(mut self, f: impl Fn(bool) -> String + Send + Sync + 'static) -> Self {
        self.boolean = Some(Arc::new(f));
        self
    }

    pub fn date(
        mut self,
        f: impl Fn(DateTime<FixedOffset>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.date = Some(Arc::new(f));
        self
    }

    pub fn number(mut self, f: impl Fn(&Number) -> String + Send + Sync + 'static) -> Self {
        self.number = Some(Arc::new(f));
        self
    }

    pub fn object(mut self, f: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        self.object = Some(Arc::new(f));
        self
    }

    pub fn string(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.string = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for Cast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cast")
            .field("boolean", &self.boolean.is_some())
            .field("date", &self.date.is_some())
            .field("number", &self.number.is_some())
            .field("object", &self.object.is_some())
            .field("string", &self.string.is_some())
            .finish()
    }
}

/// Selected column: the key to read from each record and its header label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ColumnRepr")]
pub struct StringifyColumn {
    pub key: String,
    pub header: Option<String>,
}

impl StringifyColumn {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: None,
        }
    }

    pub fn with_header(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: Some(header.into()),
        }
    }

    pub fn label(&self) -> &str {
        self.header.as_deref().unwrap_or(&self.key)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColumnRepr {
    Key(String),
    Spec { key: String, header: Option<String> },
}

impl From<ColumnRepr> for StringifyColumn {
    fn from(repr: ColumnRepr) -> Self {
        match repr {
            ColumnRepr::Key(key) => Self::new(key),
            ColumnRepr::Spec { key, header } => Self { key, header },
        }
    }
}

/// Record delimiter by style name or as a literal string
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordDelimiter {
    /// No source to discover from, so this resolves to `unix`
    #[default]
    Auto,
    Unix,
    Mac,
    Windows,
    Ascii,
    Unicode,
    Literal(String),
}

impl RecordDelimiter {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Auto | Self::Unix => "\n",
            Self::Mac => "\r",
            Self::Windows => "\r\n",
            Self::Ascii => "\u{1e}",
            Self::Unicode => "\u{2028}",
            Self::Literal(literal) => literal,
        }
    }
}

impl From<String> for RecordDelimiter {
    fn from(value: String) -> Self {
        match value.as_str() {
            "auto" => Self::Auto,
            "unix" => Self::Unix,
            "mac" => Self::Mac,
            "windows" => Self::Windows,
            "ascii" => Self::Ascii,
            "unicode" => Self::Unicode,
            _ => Self::Literal(value),
        }
    }
}

impl From<RecordDelimiter> for String {
    fn from(value: RecordDelimiter) -> Self {
        match value {
            RecordDelimiter::Auto => "auto".to_string(),
            RecordDelimiter::Unix => "unix".to_string(),
            RecordDelimiter::Mac => "mac".to_string(),
            RecordDelimiter::Windows => "windows".to_string(),
            RecordDelimiter::Ascii => "ascii".to_string(),
            RecordDelimiter::Unicode => "unicode".to_string(),
            RecordDelimiter::Literal(literal) => literal,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StringifyOptions {
    #[serde(skip)]
    pub cast: Cast,
    pub columns: Option<Vec<StringifyColumn>>,
    pub delimiter: String,
    /// Write the record delimiter after the last record
    pub eof: bool,
    pub escape: char,
    pub header: bool,
    /// `None` never quotes
    pub quote: Option<char>,
    /// Quote every non-empty field
    pub quoted: bool,
    pub quoted_empty: Option<bool>,
    /// Quote fields matching this regular expression
    pub quoted_match: Option<String>,
    pub quoted_string: bool,
    pub record_delimiter: RecordDelimiter,
}

impl Default for StringifyOptions {
    fn default() -> Self {
        Self {
            cast: Cast::default(),
            columns: None,
            delimiter: ",".to_string(),
            eof: true,
            escape: '"',
            header: false,
            quote: Some('"'),
            quoted: false,
            quoted_empty: None,
            quoted_match: None,
            quoted_string: false,
            record_delimiter: RecordDelimiter::default(),
        }
    }
}

// ================================================================================================
// Tests
// ================================================================================================
