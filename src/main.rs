use csv_rows::{Column, Columns, Row, Schema, SchemaError, Value};

use log::{debug, error, LevelFilter};
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

const CSV_ROWS_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Default, PartialEq)]
pub(crate) struct CliOptions {
    csv_output: bool,
    input_path: PathBuf,
    schema: Option<SchemaName>,
    skip_header: bool,
    verbose: bool,
    version: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum SchemaName {
    People,
}

#[derive(Debug, thiserror::Error)]
enum RuntimeError {
    #[error("{0}")]
    Cli(String),
    #[error("{0}")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Parse(#[from] csv_rows::Error),
    #[error("{0}")]
    Validation(String),
}

#[derive(Debug, PartialEq)]
struct Person {
    name: String,
    age: f64,
}

struct PeopleSchema(Columns);

impl PeopleSchema {
    fn new() -> Self {
        PeopleSchema(Columns::new(vec![
            Column::text("name"),
            Column::number("age"),
        ]))
    }
}

impl Schema for PeopleSchema {
    type Output = Person;
    type Error = SchemaError;

    fn try_parse(&self, row: &[String]) -> Result<Person, SchemaError> {
        let values = self.0.try_parse(row)?;
        let name = values.first().and_then(Value::as_str);
        let age = values.get(1).and_then(Value::as_f64);

        match (name, age) {
            (Some(name), Some(age)) => Ok(Person {
                name: name.to_owned(),
                age,
            }),
            _ => Err(SchemaError::Arity {
                expected: self.0.columns().len(),
                found: row.len(),
            }),
        }
    }
}

fn help() {
    println!(
        "Usage:
csv-rows --version
csv-rows [-v|--verbose] [--csv] [--skip-header] [--schema people] FILE"
    );
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, RuntimeError> {
    let mut cfg = CliOptions::default();

    let mut args = args.into_iter().skip(1);
    let mut input_path: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match &arg[..] {
            "--csv" => cfg.csv_output = true,
            "--schema" => {
                cfg.schema = match args.next().as_deref() {
                    Some("people") => Some(SchemaName::People),
                    Some(name) => {
                        return Err(RuntimeError::Cli(format!("Unknown schema: {name}")))
                    }
                    None => return Err(RuntimeError::Cli("Missing schema name".into())),
                }
            }
            "--skip-header" => cfg.skip_header = true,
            "-v" | "--verbose" => cfg.verbose = true,
            "--version" => cfg.version = true,
            _ if arg.starts_with('-') => {
                return Err(RuntimeError::Cli(format!("Unknown argument: {arg}")))
            }
            _ => {
                if input_path.is_some() {
                    return Err(RuntimeError::Cli(format!("Unexpected argument: {arg}")));
                }
                input_path = Some(PathBuf::from(&arg));
            }
        }
    }

    match input_path {
        Some(path) => cfg.input_path = path,
        None if cfg.version => {}
        None => return Err(RuntimeError::Cli("Missing input file argument".into())),
    }

    Ok(cfg)
}

fn write_rows<W: Write>(writer: W, rows: &[Row], csv_output: bool) -> Result<(), RuntimeError> {
    if csv_output {
        let mut csv_writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(writer);
        for row in rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush()?;
    } else {
        let mut writer = writer;
        for row in rows {
            writeln!(writer, "{row:?}")?;
        }
        writer.flush()?;
    }

    Ok(())
}

fn write_people<W: Write>(
    writer: W,
    people: &[Person],
    csv_output: bool,
) -> Result<(), RuntimeError> {
    if csv_output {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for person in people {
            let age = person.age.to_string();
            csv_writer.write_record([person.name.as_str(), age.as_str()])?;
        }
        csv_writer.flush()?;
    } else {
        let mut writer = writer;
        for person in people {
            writeln!(writer, "{person:?}")?;
        }
        writer.flush()?;
    }

    Ok(())
}

fn log_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

fn run<W: Write>(cfg: &CliOptions, writer: W) -> Result<(), RuntimeError> {
    debug!("Parsing {:?}", cfg.input_path);

    let mut rows = csv_rows::parse_rows_path(&cfg.input_path)?;
    let skipped = if cfg.skip_header && !rows.is_empty() {
        rows.remove(0);
        1
    } else {
        0
    };

    match cfg.schema {
        None => write_rows(writer, &rows, cfg.csv_output),
        Some(SchemaName::People) => match csv_rows::validate(rows, &PeopleSchema::new()) {
            Ok(people) => write_people(writer, &people, cfg.csv_output),
            Err(mut failure) => {
                // report the position in the file, header included
                failure.row_number += skipped;
                Err(RuntimeError::Validation(failure.to_string()))
            }
        },
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let cfg = match parse_args(args) {
        Ok(cfg) => cfg,
        Err(e) => {
            println!("Error: {e}");
            help();
            process::exit(1)
        }
    };

    if let Err(e) = simplelog::WriteLogger::init(
        log_level(cfg.verbose),
        simplelog::ConfigBuilder::new()
            .set_time_level(LevelFilter::Off)
            .build(),
        io::stderr(),
    ) {
        eprintln!("Can't set up logging: {e}");
    }

    if cfg.version {
        println!("csv-rows {CSV_ROWS_VERSION}");
        process::exit(0);
    }

    if let Err(e) = run(&cfg, io::stdout().lock()) {
        error!("{e}");
        process::exit(1);
    }
}
