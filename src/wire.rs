//! Byte-level layout of FIT data.
//!
//! The types in this module describe the fixed structures found on the wire:
//! the file header, record headers, and definition records. They carry no
//! decoding state. See [`crate::decoder`] and [`crate::encoder`] for the
//! sessions built on top of them.

pub mod check;
pub mod definition;
pub mod header;
