#![no_std]

//! An encoder and decoder for Garmin's Flexible and Interoperable Data
//! Transfer protocol.
//!
//! Sprocket reads FIT files into [`Mesg`] values, publishing each to a set of
//! listeners as it is decoded, and writes [`Mesg`] values back out as FIT
//! files. Messages, fields and developer fields are dynamic: a small built-in
//! [`profile`] supplies names, scales and subfields for the messages the codec
//! relies on, and everything else decodes as `unknown`.
//!
//! Most users should begin with [`Decoder`] and [`Encoder`]. The byte-level
//! structures they share are exposed in the [`wire`] module.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `std`: enable reader-based decoding (default).

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod accumulator;
pub mod base_type;
pub mod bit_stream;
pub mod decoder;
pub mod developer;
pub mod encoder;
pub mod field;
pub mod mesg;
pub mod profile;
pub mod value;
pub mod wire;

pub use accumulator::Accumulator;
pub use base_type::BaseType;
pub use bit_stream::BitStream;
#[cfg(feature = "std")]
pub use decoder::ReaderSource;
pub use decoder::{DecodeError, Decoder, MesgListener, Source, check_integrity, is_fit};
pub use developer::{DeveloperDataKey, DeveloperDataLookup, DeveloperField, DeveloperFieldDefinition};
pub use encoder::{EncodeError, Encoder};
pub use field::{Component, Field, FieldError, SubField};
pub use mesg::{Mesg, MesgError, SubFieldIndex};
pub use value::Value;
