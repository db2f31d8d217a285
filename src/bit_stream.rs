//! Bit-addressable reading over runs of integers.

use alloc::vec::Vec;

use thiserror::Error;

/// An error reading from a [`BitStream`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BitStreamError {
    /// A read asked for no bits, or for more than 64.
    #[error("Cannot read {0} bits at once (between 1 and 64).")]
    BitCount(usize),
    /// Fewer bits remain than requested.
    #[error("Unexpectedly reached the end of the bit stream.")]
    EndOfStream,
}

/// An unsigned integer usable as a chunk of a [`BitStream`].
pub trait Chunk: Copy {
    const BITS: u32;

    fn widen(self) -> u64;
}

macro_rules! chunk {
    ($($t:ty),*) => {
        $(
            impl Chunk for $t {
                const BITS: u32 = <$t>::BITS;

                fn widen(self) -> u64 {
                    self.into()
                }
            }
        )*
    };
}

chunk!(u8, u16, u32, u64);

/// A cursor over the bits of one or more equal-width integers.
///
/// Bits are consumed from the least significant end of the first chunk
/// onward, so multi-bit reads compose little-endian across chunk boundaries.
#[derive(Debug, Clone)]
pub struct BitStream {
    chunks: Vec<u64>,
    chunk_bits: u32,
    position: usize,
}

impl BitStream {
    /// Create a stream over the bits of a single integer.
    pub fn from_value<T: Chunk>(value: T) -> Self {
        Self::from_values(&[value])
    }

    /// Create a stream over the bits of a run of integers.
    pub fn from_values<T: Chunk>(values: &[T]) -> Self {
        Self::from_chunks(values.iter().map(|v| v.widen()).collect(), T::BITS)
    }

    /// Create a stream over chunks already widened from `chunk_bits`-bit
    /// integers.
    pub(crate) fn from_chunks(chunks: Vec<u64>, chunk_bits: u32) -> Self {
        Self {
            chunks,
            chunk_bits,
            position: 0,
        }
    }

    /// Total bits held by the stream.
    pub fn len(&self) -> usize {
        self.chunks.len() * self.chunk_bits as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bits_available(&self) -> usize {
        self.len() - self.position
    }

    pub fn has_bits_available(&self) -> bool {
        self.bits_available() != 0
    }

    /// Rewind the cursor to the first bit.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Consume a single bit.
    pub fn read_bit(&mut self) -> Result<u8, BitStreamError> {
        if !self.has_bits_available() {
            Err(BitStreamError::EndOfStream)?;
        }

        let chunk = self.chunks[self.position / self.chunk_bits as usize];
        let bit = (chunk >> (self.position % self.chunk_bits as usize)) & 1;

        self.position += 1;

        Ok(bit as u8)
    }

    /// Consume `n` bits, 1 to 64, composing them least significant first.
    ///
    /// Nothing is consumed if the read fails.
    pub fn read_bits(&mut self, n: usize) -> Result<u64, BitStreamError> {
        if !(1..=64).contains(&n) {
            Err(BitStreamError::BitCount(n))?;
        }
        if n > self.bits_available() {
            Err(BitStreamError::EndOfStream)?;
        }

        let mut value = 0;
        for i in 0..n {
            value |= u64::from(self.read_bit()?) << i;
        }

        Ok(value)
    }
}
