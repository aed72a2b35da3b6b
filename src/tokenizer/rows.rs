use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::iter::FusedIterator;
use std::path::Path;

use log::debug;

use super::{ParseError, Row, Tokenizer};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}: {1}")]
    Io(String, #[source] io::Error),
    #[error("malformed CSV input at {0}")]
    Malformed(#[from] ParseError),
}

/// Lazy, single-pass sequence of rows read from `R`.
///
/// Reading stops at the first error. The reader is owned by the iterator, so
/// dropping it (e.g. when the caller stops iterating early) releases the
/// underlying resource.
#[derive(Debug)]
pub struct Rows<R> {
    reader: R,
    tokenizer: Tokenizer,
    buf: String,
    done: bool,
    count: usize,
}

/// Opens the file at `path` for row-by-row reading.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Rows<BufReader<File>>, Error> {
    let path = path.as_ref();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => return Err(Error::Io(format!("Can't open {path:?}"), e)),
    };

    debug!("Reading rows from {path:?}");

    Ok(Rows::new(BufReader::new(file)))
}

pub fn read_rows<R: Read>(reader: R) -> Rows<BufReader<R>> {
    Rows::new(BufReader::new(reader))
}

impl<R: BufRead> Rows<R> {
    pub fn new(reader: R) -> Self {
        Rows {
            reader,
            tokenizer: Tokenizer::new(),
            buf: String::new(),
            done: false,
            count: 0,
        }
    }

    fn emit(&mut self, row: Row) -> Option<Result<Row, Error>> {
        self.count += 1;
        Some(Ok(row))
    }

    fn fail(&mut self, e: Error) -> Option<Result<Row, Error>> {
        self.done = true;
        debug!("Stopped reading after {} rows: {e}", self.count);
        Some(Err(e))
    }
}

impl<R: BufRead> Iterator for Rows<R> {
    type Item = Result<Row, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            self.buf.clear();

            match self.reader.read_line(&mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return match self.tokenizer.finish() {
                        Ok(Some(row)) => self.emit(row),
                        Ok(None) => {
                            debug!("Read {} rows", self.count);
                            None
                        }
                        Err(e) => self.fail(e.into()),
                    };
                }
                Ok(_) => {
                    if let Some(row) = self.tokenizer.feed_line(&self.buf) {
                        return self.emit(row);
                    }
                }
                Err(e) => return self.fail(Error::Io("Can't read CSV input".into(), e)),
            }
        }
    }
}

impl<R: BufRead> FusedIterator for Rows<R> {}
