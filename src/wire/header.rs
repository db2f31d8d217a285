//! File and record headers.

use either::Either::{self, Left, Right};
use tartan_bitfield::bitfield;
use thiserror::Error;
use zerocopy::{
    FromBytes, Immutable, IntoBytes,
    byteorder::little_endian::{U16, U32},
};

use super::check::compute_crc;

/// Protocol version written by default (2.0).
pub const PROTOCOL_VERSION: u8 = 0x20;

/// Profile version written by default (21.158).
pub const PROFILE_VERSION: u16 = 21158;

/// Size of a header carrying its own check value.
pub const HEADER_SIZE: u8 = 14;

/// Size of a header without a check value.
pub const LEGACY_HEADER_SIZE: u8 = 12;

/// An error parsing a file header.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    /// Incorrect filetype marker.
    #[error("Incorrect file type marker.")]
    NotFitData,
    /// Unknown header length.
    #[error("Unknown header length ({0}).")]
    UnknownHeaderLength(u8),
}

#[repr(C, packed)]
#[derive(FromBytes, IntoBytes, Immutable)]
struct RawFileHeader {
    header_size: u8,
    protocol_version: u8,
    profile_version: U16,
    data_size: U32,
    data_type: [u8; 4],
}

/// The header at the start of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub header_size: u8,
    pub protocol_version: u8,
    pub profile_version: u16,
    /// Bytes of record data between the header and the trailing check value.
    pub data_size: u32,
}

impl FileHeader {
    pub fn new(protocol_version: u8, profile_version: u16, data_size: u32) -> Self {
        Self {
            header_size: HEADER_SIZE,
            protocol_version,
            profile_version,
            data_size,
        }
    }

    /// Parse the part of a header common to every header length.
    ///
    /// For 14-byte headers, two check bytes follow.
    pub fn parse(r: [u8; 12]) -> Result<Self, HeaderError> {
        let RawFileHeader {
            header_size,
            protocol_version,
            profile_version,
            data_size,
            data_type,
        } = zerocopy::transmute!(r);

        if &data_type != b".FIT" {
            Err(HeaderError::NotFitData)?;
        }

        if header_size != HEADER_SIZE && header_size != LEGACY_HEADER_SIZE {
            Err(HeaderError::UnknownHeaderLength(header_size))?;
        }

        Ok(Self {
            header_size,
            protocol_version,
            profile_version: profile_version.get(),
            data_size: data_size.get(),
        })
    }

    /// Serialize as a 14-byte header, check value included.
    pub fn to_bytes(&self) -> [u8; 14] {
        let raw = RawFileHeader {
            header_size: HEADER_SIZE,
            protocol_version: self.protocol_version,
            profile_version: U16::new(self.profile_version),
            data_size: U32::new(self.data_size),
            data_type: *b".FIT",
        };

        let mut w = [0; 14];
        w[..12].copy_from_slice(raw.as_bytes());

        let crc = compute_crc(0, &w[..12]);
        w[12..].copy_from_slice(&crc.to_le_bytes());

        w
    }
}

/// A record header introducing a definition record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefinitionHeader {
    pub local_num: u8,
    /// Whether a developer field section follows the field definitions.
    pub has_developer_data: bool,
}

/// A record header introducing a data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataHeader {
    pub local_num: u8,
    /// Low five bits of the timestamp, for compressed timestamp headers.
    pub time_offset: Option<u8>,
}

bitfield! {
    struct NormalHeader(u8) {
        [0..4] local_message: u8,
        [5] is_developer,
        [6] is_definition,
        [7] is_compressed,
    }
}

bitfield! {
    struct CompressedHeader(u8) {
        [0..5] time_offset: u8,
        [5..7] local_message: u8,
        [7] is_compressed,
    }
}

/// Parse a record header byte.
pub fn parse_record_header(r: u8) -> Either<DefinitionHeader, DataHeader> {
    if NormalHeader(r).is_compressed() {
        let header = CompressedHeader(r);

        return Right(DataHeader {
            local_num: header.local_message(),
            time_offset: Some(header.time_offset()),
        });
    }

    let header = NormalHeader(r);

    if header.is_definition() {
        Left(DefinitionHeader {
            local_num: header.local_message(),
            has_developer_data: header.is_developer(),
        })
    } else {
        Right(DataHeader {
            local_num: header.local_message(),
            time_offset: None,
        })
    }
}

impl DefinitionHeader {
    pub fn to_byte(&self) -> u8 {
        NormalHeader(0)
            .with_local_message(self.local_num)
            .with_is_developer(self.has_developer_data)
            .with_is_definition(true)
            .0
    }
}

impl DataHeader {
    pub fn to_byte(&self) -> u8 {
        match self.time_offset {
            Some(time_offset) => CompressedHeader(0)
                .with_time_offset(time_offset)
                .with_local_message(self.local_num)
                .with_is_compressed(true)
                .0,
            None => NormalHeader(0).with_local_message(self.local_num).0,
        }
    }
}
