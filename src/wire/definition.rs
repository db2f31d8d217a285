//! Definition records.
//!
//! A definition record assigns a layout to a local message number: the global
//! message it carries, the architecture of its multi-byte elements, and the
//! number, size and base type of each field. Data records for that local
//! number are laid out accordingly until it is redefined.

use alloc::vec::Vec;

use zerocopy::{FromBytes, Immutable, IntoBytes};

#[repr(C, packed)]
#[derive(FromBytes, IntoBytes, Immutable)]
struct RawDefinition {
    _reserved: u8,
    architecture: u8,
    global_message: [u8; 2],
    fields: u8,
}

#[repr(C, packed)]
#[derive(FromBytes, IntoBytes, Immutable)]
struct RawFieldDefinition {
    num: u8,
    size: u8,
    base_type: u8,
}

/// Layout of one field within a data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDefinition {
    pub num: u8,
    /// Bytes occupied by the field in each data record.
    pub size: u8,
    /// Base type byte, as found on the wire.
    pub base_type: u8,
}

impl FieldDefinition {
    pub fn parse(r: [u8; 3]) -> Self {
        let RawFieldDefinition {
            num,
            size,
            base_type,
        } = zerocopy::transmute!(r);

        Self {
            num,
            size,
            base_type,
        }
    }

    pub fn to_bytes(&self) -> [u8; 3] {
        zerocopy::transmute!(RawFieldDefinition {
            num: self.num,
            size: self.size,
            base_type: self.base_type,
        })
    }
}

/// Layout of one developer field within a data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevFieldDefinition {
    /// Field definition number.
    pub num: u8,
    pub size: u8,
    pub developer_data_index: u8,
}

impl DevFieldDefinition {
    pub fn parse(r: [u8; 3]) -> Self {
        // Shares its layout with regular field definitions.
        let RawFieldDefinition {
            num,
            size,
            base_type: developer_data_index,
        } = zerocopy::transmute!(r);

        Self {
            num,
            size,
            developer_data_index,
        }
    }

    pub fn to_bytes(&self) -> [u8; 3] {
        [self.num, self.size, self.developer_data_index]
    }
}

/// A parsed definition record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MesgDefinition {
    pub global_num: u16,
    pub is_little_endian: bool,
    pub fields: Vec<FieldDefinition>,
    pub developer_fields: Vec<DevFieldDefinition>,
}

impl MesgDefinition {
    pub fn new(global_num: u16) -> Self {
        Self {
            global_num,
            is_little_endian: true,
            fields: Vec::new(),
            developer_fields: Vec::new(),
        }
    }

    /// Parse the fixed part of a definition record.
    ///
    /// Returns the definition, without fields, and the number of field
    /// definitions to follow.
    pub fn parse(r: [u8; 5]) -> (Self, u8) {
        let RawDefinition {
            architecture,
            global_message,
            fields,
            ..
        } = zerocopy::transmute!(r);

        let is_little_endian = architecture == 0;
        let global_num = if is_little_endian {
            u16::from_le_bytes(global_message)
        } else {
            u16::from_be_bytes(global_message)
        };

        let definition = Self {
            global_num,
            is_little_endian,
            ..Self::new(global_num)
        };

        (definition, fields)
    }

    /// Bytes occupied by each data record of this layout, excluding its
    /// header.
    pub fn data_size(&self) -> usize {
        let fields: usize = self.fields.iter().map(|f| f.size as usize).sum();
        let developer: usize = self.developer_fields.iter().map(|f| f.size as usize).sum();

        fields + developer
    }

    pub fn has_developer_data(&self) -> bool {
        !self.developer_fields.is_empty()
    }

    /// Write the record body, excluding its header.
    ///
    /// The developer field section is written only when developer fields are
    /// present. Counts are truncated to a byte; callers check them first.
    pub fn write(&self, w: &mut Vec<u8>) {
        let global_message = if self.is_little_endian {
            self.global_num.to_le_bytes()
        } else {
            self.global_num.to_be_bytes()
        };

        let raw = RawDefinition {
            _reserved: 0,
            architecture: (!self.is_little_endian).into(),
            global_message,
            fields: self.fields.len() as u8,
        };
        w.extend_from_slice(raw.as_bytes());

        for field in &self.fields {
            w.extend_from_slice(&field.to_bytes());
        }

        if self.has_developer_data() {
            w.push(self.developer_fields.len() as u8);
            for field in &self.developer_fields {
                w.extend_from_slice(&field.to_bytes());
            }
        }
    }
}
