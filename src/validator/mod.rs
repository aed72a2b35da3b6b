mod columns;

pub use self::columns::*;

use log::debug;

use crate::tokenizer::Row;

/// Turns one raw row into a typed value, or explains why it can't.
///
/// Any `Fn(&[String]) -> Result<T, E>` is a schema, so ad-hoc validation does
/// not need a dedicated type.
pub trait Schema {
    type Output;
    type Error;

    fn try_parse(&self, row: &[String]) -> Result<Self::Output, Self::Error>;
}

impl<F, T, E> Schema for F
where
    F: Fn(&[String]) -> Result<T, E>,
{
    type Output = T;
    type Error = E;

    fn try_parse(&self, row: &[String]) -> Result<T, E> {
        self(row)
    }
}

/// The first row a schema rejected.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("row {row_number} failed validation: {error}")]
pub struct ValidationFailure<E> {
    /// 1-based position of the row in the parsed input
    pub row_number: usize,
    pub row: Row,
    pub error: E,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParseOutcome<T, E> {
    /// No schema was given.
    Rows(Vec<Row>),
    /// Every row passed the schema, in input order.
    Validated(Vec<T>),
    Invalid(ValidationFailure<E>),
}

impl<T, E> ParseOutcome<T, E> {
    pub fn failure(self) -> Option<ValidationFailure<E>> {
        match self {
            ParseOutcome::Invalid(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Runs `schema` over `rows` in order and stops at the first rejected row.
pub fn validate<S: Schema>(
    rows: Vec<Row>,
    schema: &S,
) -> Result<Vec<S::Output>, ValidationFailure<S::Error>> {
    let mut values = Vec::with_capacity(rows.len());

    for (i, row) in rows.into_iter().enumerate() {
        match schema.try_parse(&row) {
            Ok(value) => values.push(value),
            Err(error) => {
                debug!("Row {} failed validation, skipping the rest", i + 1);
                return Err(ValidationFailure {
                    row_number: i + 1,
                    row,
                    error,
                });
            }
        }
    }

    debug!("Validated {} rows", values.len());

    Ok(values)
}

pub fn apply<S: Schema>(rows: Vec<Row>, schema: Option<&S>) -> ParseOutcome<S::Output, S::Error> {
    match schema {
        Some(schema) => match validate(rows, schema) {
            Ok(values) => ParseOutcome::Validated(values),
            Err(failure) => ParseOutcome::Invalid(failure),
        },
        None => ParseOutcome::Rows(rows),
    }
}
