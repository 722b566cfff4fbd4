//! Lazy line splitting over raw payload bytes.

use std::io::{self, BufRead};

/// Iterator over the lines of a byte stream.
///
/// Lines end at `\n`, `\r`, or `\r\n`; the terminator is stripped. A final
/// line without a terminator is still yielded, but a trailing terminator does
/// not produce an extra empty line. Bytes that are not valid UTF-8 are
/// replaced with U+FFFD, so binary payloads can still be scanned.
///
/// Only one line is buffered at a time.
pub struct LineReader<R> {
    inner: R,
    /// Set after a `\r`, so that a directly following `\n` is swallowed.
    skip_lf: bool,
    done: bool,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            skip_lf: false,
            done: false,
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        let mut started = false;
        loop {
            let available = match self.inner.fill_buf() {
                Ok(available) => available,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };
            if available.is_empty() {
                return Ok(started.then(|| decode(buf)));
            }
            if self.skip_lf {
                self.skip_lf = false;
                if available[0] == b'\n' {
                    self.inner.consume(1);
                    continue;
                }
            }
            started = true;

            match available.iter().position(|b| *b == b'\n' || *b == b'\r') {
                Some(end) => {
                    let terminator = available[end];
                    buf.extend_from_slice(&available[..end]);
                    self.inner.consume(end + 1);
                    self.skip_lf = terminator == b'\r';
                    return Ok(Some(decode(buf)));
                }
                None => {
                    let len = available.len();
                    buf.extend_from_slice(available);
                    self.inner.consume(len);
                }
            }
        }
    }
}

fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(line) => line,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_line() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
