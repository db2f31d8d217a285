//! Reader input.
//!
//! _Requires Cargo feature `std`._

use std::io::{ErrorKind, Read};

use super::{DecodeError, Source};

/// Adapts any [`Read`] into a [`Source`].
///
/// _Requires Cargo feature `std`._
#[derive(Debug)]
pub struct ReaderSource<R>(pub R);

impl<R: Read> Source for ReaderSource<R> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        self.0.read_exact(buf).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => DecodeError::EndOfStream,
            _ => DecodeError::Io(e),
        })
    }
}
