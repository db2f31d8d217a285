//! Slice input.

use super::{DecodeError, Source};

/// Reading consumes the front of the slice.
impl Source for &[u8] {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        let (head, tail) = self
            .split_at_checked(buf.len())
            .ok_or(DecodeError::EndOfStream)?;

        buf.copy_from_slice(head);
        *self = tail;

        Ok(())
    }
}
