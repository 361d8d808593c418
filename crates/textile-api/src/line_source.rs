use log::error;
use std::io::BufRead;

/// A source of raw input lines for the scanner.
///
/// The scanner itself runs over an in-memory buffer; this trait exists for
/// callers that start from a reader. Read failures are reported once and
/// then treated as the end of the input; nothing retries.
pub trait LineSource {
    /// Prepares the source for reading.
    ///
    /// @return Whether the source is readable.
    fn open(&mut self) -> bool;

    /// Returns the next line without its terminator, or `None` once the
    /// source is exhausted or has failed.
    fn read_line(&mut self) -> Option<String>;

    fn close(&mut self);
}

/// A `LineSource` over any buffered reader.
pub struct ReaderLineSource<R: BufRead> {
    reader: R,
    failed: bool,
}

impl<R: BufRead> ReaderLineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            failed: false,
        }
    }
}

impl<R: BufRead> LineSource for ReaderLineSource<R> {
    fn open(&mut self) -> bool {
        !self.failed
    }

    fn read_line(&mut self) -> Option<String> {
        if self.failed {
            return None;
        }

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                Some(line)
            }
            Err(e) => {
                error!("line source read failed, treating as end of input: {e}");
                self.failed = true;
                None
            }
        }
    }

    fn close(&mut self) {}
}

/// Drains a line source into one buffer, lines separated by `\n`.
pub fn slurp(source: &mut impl LineSource) -> String {
    let mut text = String::new();

    if !source.open() {
        return text;
    }

    let mut first = true;
    while let Some(line) = source.read_line() {
        if !first {
            text.push('\n');
        }
        first = false;
        text.push_str(&line);
    }
    source.close();

    text
}
