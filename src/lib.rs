//! Streaming CSV row parsing with optional, fail-fast row validation.
//!
//! Input is split into rows by [`Tokenizer`], which understands double-quoted
//! fields (with embedded delimiters, line breaks and `""` escapes) and skips
//! blank lines. Rows can be consumed lazily through [`Rows`], or collected and
//! checked against a [`Schema`] with [`parse`] / [`parse_path`].

pub mod tokenizer;
pub mod validator;

pub use self::tokenizer::{open, read_rows, Error, ParseError, Row, Rows, Tokenizer};
pub use self::validator::{
    apply, validate, Column, ColumnKind, Columns, ParseOutcome, Schema, SchemaError,
    ValidationFailure, Value,
};

use std::io::Read;
use std::path::Path;

/// Reads all rows from `reader` and validates them with `schema`, if any.
///
/// The whole input is tokenized before validation starts, so malformed input
/// is reported as an `Err` even if an earlier row would fail the schema.
/// Without a schema the rows are returned as [`ParseOutcome::Rows`]; see
/// [`parse_rows`] for a shortcut that needs no schema type.
pub fn parse<R: Read, S: Schema>(
    reader: R,
    schema: Option<&S>,
) -> Result<ParseOutcome<S::Output, S::Error>, Error> {
    let rows = parse_rows(reader)?;
    Ok(apply(rows, schema))
}

/// Like [`parse`], reading from the file at `path`. The file is closed before
/// this returns, on success and on error.
pub fn parse_path<P: AsRef<Path>, S: Schema>(
    path: P,
    schema: Option<&S>,
) -> Result<ParseOutcome<S::Output, S::Error>, Error> {
    let rows = parse_rows_path(path)?;
    Ok(apply(rows, schema))
}

pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<Row>, Error> {
    read_rows(reader).collect()
}

pub fn parse_rows_path<P: AsRef<Path>>(path: P) -> Result<Vec<Row>, Error> {
    open(path)?.collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
    }

    fn row(fields: &[&str]) -> Row {
        fields.iter().map(|f| f.to_string()).collect()
    }

    fn people() -> Columns {
        Columns::new(vec![Column::text("name"), Column::number("age")])
    }

    mod parse_rows_path {
        use super::*;

        #[test]
        fn test_people() {
            let rows = parse_rows_path(fixture("people.csv")).unwrap();

            assert_eq!(rows.len(), 5);
            assert_eq!(rows[0], row(&["name", "age"]));
            assert_eq!(rows[1], row(&["Alice", "23"]));
            // no coercion without a schema
            assert_eq!(rows[2], row(&["Bob", "thirty"]));
            assert_eq!(rows[3], row(&["Charlie", "25"]));
            assert_eq!(rows[4], row(&["Nim", "22"]));
        }

        #[test]
        fn test_students_with_spaces_and_emails() {
            let rows = parse_rows_path(fixture("students.csv")).unwrap();

            assert_eq!(
                rows,
                vec![
                    row(&["Name", "Credits", "Email"]),
                    row(&["Tim Nelson", "10", "Tim_Nelson@brown.edu"]),
                    row(&["Nim Telson", "11", "MYAWESOMEEMAIL"]),
                ]
            );
        }

        #[test]
        fn test_movies_with_apostrophes() {
            let rows = parse_rows_path(fixture("movies.csv")).unwrap();

            assert_eq!(
                rows,
                vec![
                    row(&["username", "movie", "rating"]),
                    row(&["red_skunk", "Schindler's List", "8.5"]),
                    row(&["Ossum-Possum", "It's a Wonderful life", "6"]),
                ]
            );
        }

        #[test]
        fn test_quoted_commas() {
            let rows = parse_rows_path(fixture("quoted-commas.csv")).unwrap();

            assert_eq!(
                rows,
                vec![
                    row(&["tim", "helloooo, how are you?"]),
                    row(&["nim", "doing well, could be better, who's asking?"]),
                ]
            );
        }

        #[test]
        fn test_empty_lines_surrounding_data() {
            let rows = parse_rows_path(fixture("empty-lines-surround.csv")).unwrap();

            assert_eq!(
                rows,
                vec![
                    row(&["Luigi", "Super Smash Bros"]),
                    row(&["Mario", "Mario Kart 64"]),
                ]
            );
        }

        #[test]
        fn test_empty_lines_within_data() {
            let rows = parse_rows_path(fixture("empty-lines-within.csv")).unwrap();

            assert_eq!(
                rows,
                vec![
                    row(&["name", "shirt-size"]),
                    row(&["helly", "L"]),
                    row(&["mark s.", "XL"]),
                ]
            );
        }

        #[test]
        fn test_multi_line_fields() {
            let rows = parse_rows_path(fixture("multi-line.csv")).unwrap();

            assert_eq!(
                rows,
                vec![
                    row(&["name", "address", "phone number"]),
                    row(&[
                        "Josiah Carberry",
                        "69 Brown St\nProvidence, RI 02912",
                        "401-555-1968"
                    ]),
                    row(&["Natalie", "345 E. Main St\nKier, PE 07452", "800-234-3433"]),
                ]
            );
        }

        #[test]
        fn test_empty_fields() {
            let rows = parse_rows_path(fixture("empty-fields.csv")).unwrap();

            assert_eq!(
                rows,
                vec![
                    row(&["a world to win tee", "black, white", "30"]),
                    row(&["watts rebellion sweatshirt", "", "20"]),
                ]
            );
        }

        #[test]
        fn test_escaped_quotes() {
            let rows = parse_rows_path(fixture("escaped-quotes.csv")).unwrap();

            assert_eq!(
                rows,
                vec![
                    row(&["tim berners lee", "hello\" world!\""]),
                    row(&["einstein", "\"e=mc^2\""]),
                ]
            );
        }

        #[test]
        fn test_malformed_fails() {
            match parse_rows_path(fixture("malformed.csv")) {
                Err(Error::Malformed(e)) => {
                    assert_eq!(e.line, 2);
                    assert_eq!(e.col, 5);
                }
                other => panic!("expected malformed input error, got {other:?}"),
            }
        }

        #[test]
        fn test_missing_file_fails() {
            assert!(matches!(
                parse_rows_path(fixture("does-not-exist.csv")),
                Err(Error::Io(_, _))
            ));
        }
    }

    mod parse {
        use super::*;

        #[test]
        fn test_without_schema_yields_rows() {
            let outcome = parse::<_, Columns>("a,\"b,c\"\n".as_bytes(), None).unwrap();

            assert_eq!(outcome, ParseOutcome::Rows(vec![row(&["a", "b,c"])]));
        }

        #[test]
        fn test_with_schema_yields_values() {
            let outcome = parse("Alice,23\nNim,22\n".as_bytes(), Some(&people())).unwrap();

            assert_eq!(
                outcome,
                ParseOutcome::Validated(vec![
                    vec![Value::Text("Alice".into()), Value::Number(23.0)],
                    vec![Value::Text("Nim".into()), Value::Number(22.0)],
                ])
            );
        }

        #[test]
        fn test_malformed_input_wins_over_validation_failure() {
            let result = parse("Bob,thirty\nAda,\"12\n".as_bytes(), Some(&people()));

            assert!(matches!(result, Err(Error::Malformed(_))));
        }
    }

    mod parse_path {
        use super::*;

        #[test]
        fn test_people_fails_on_header_row() {
            let outcome = parse_path(fixture("people.csv"), Some(&people())).unwrap();

            match outcome {
                ParseOutcome::Invalid(failure) => {
                    assert_eq!(failure.row_number, 1);
                    assert_eq!(failure.row, row(&["name", "age"]));
                }
                other => panic!("expected validation failure, got {other:?}"),
            }
        }

        #[test]
        fn test_closure_schema_stops_at_first_bad_row() {
            let age = |row: &[String]| row[1].parse::<u8>().map_err(|e| e.to_string());

            let outcome = parse_path(fixture("people.csv"), Some(&age)).unwrap();

            let failure = outcome.failure().unwrap();
            assert_eq!(failure.row_number, 1);
            assert_eq!(failure.row, row(&["name", "age"]));
        }

        #[test]
        fn test_parsing_twice_is_idempotent() {
            let students = Columns::new(vec![
                Column::text("name"),
                Column::text("credits"),
                Column::text("email"),
            ]);

            let first = parse_path(fixture("students.csv"), Some(&students)).unwrap();
            let second = parse_path(fixture("students.csv"), Some(&students)).unwrap();

            assert_eq!(first, second);
        }
    }
}
