use std::fmt;

use regex_lite::Regex;

use super::Schema;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("expected {expected} fields, but found {found}")]
    Arity { expected: usize, found: usize },
    #[error("field {index} ({name:?}): expected {expected}, but found {found:?}")]
    Field {
        // 0-based
        index: usize,
        name: String,
        expected: String,
        found: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Integer(i64),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Integer(i) => Some(*i as f64),
            Value::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Integer(i) => write!(f, "{i}"),
        }
    }
}

#[derive(Clone, Debug)]
pub enum ColumnKind {
    Text,
    /// Any finite number, surrounding whitespace allowed.
    Number,
    Integer,
    /// Text that matches the whole pattern.
    Pattern(Regex),
}

#[derive(Clone, Debug)]
pub struct Column {
    name: String,
    kind: ColumnKind,
}

impl Column {
    pub fn new(name: &str, kind: ColumnKind) -> Self {
        Column {
            name: name.to_owned(),
            kind,
        }
    }

    pub fn text(name: &str) -> Self {
        Self::new(name, ColumnKind::Text)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, ColumnKind::Number)
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, ColumnKind::Integer)
    }

    pub fn pattern(name: &str, pattern: &str) -> Result<Self, regex_lite::Error> {
        let re = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self::new(name, ColumnKind::Pattern(re)))
    }

    fn expected(&self) -> String {
        match &self.kind {
            ColumnKind::Text => "text".into(),
            ColumnKind::Number => "a number".into(),
            ColumnKind::Integer => "an integer".into(),
            ColumnKind::Pattern(re) => format!("text matching {:?}", re.as_str()),
        }
    }

    fn coerce(&self, raw: &str) -> Option<Value> {
        match &self.kind {
            ColumnKind::Text => Some(Value::Text(raw.to_owned())),
            ColumnKind::Number => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Value::Number),
            ColumnKind::Integer => raw.trim().parse::<i64>().ok().map(Value::Integer),
            ColumnKind::Pattern(re) => re.is_match(raw).then(|| Value::Text(raw.to_owned())),
        }
    }
}

/// Positional schema: row field `i` has to satisfy column `i`, and the row
/// must have exactly as many fields as there are columns.
#[derive(Clone, Debug, Default)]
pub struct Columns(Vec<Column>);

impl Columns {
    pub fn new(columns: Vec<Column>) -> Self {
        Columns(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.0
    }
}

impl Schema for Columns {
    type Output = Vec<Value>;
    type Error = SchemaError;

    fn try_parse(&self, row: &[String]) -> Result<Vec<Value>, SchemaError> {
        if row.len() != self.0.len() {
            return Err(SchemaError::Arity {
                expected: self.0.len(),
                found: row.len(),
            });
        }

        self.0
            .iter()
            .zip(row)
            .enumerate()
            .map(|(index, (column, raw))| {
                column.coerce(raw).ok_or_else(|| SchemaError::Field {
                    index,
                    name: column.name.clone(),
                    expected: column.expected(),
                    found: raw.clone(),
                })
            })
            .collect()
    }
}
