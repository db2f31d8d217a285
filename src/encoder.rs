//! Encoding sessions.
//!
//! An [`Encoder`] lays out each message it is given as a data record,
//! preceded by a definition record whenever the message's layout differs from
//! the one last defined for its global message number. Closing the session
//! prepends the file header and appends the check value.
//!
//! ```
//! let mut encoder = Encoder::new();
//! encoder.write_mesg(&file_id)?;
//! let data = encoder.close();
//! ```

use alloc::vec::Vec;

use log::{debug, trace, warn};
use thiserror::Error;

use crate::{
    decoder::MesgListener,
    mesg::Mesg,
    wire::{
        check::Crc,
        definition::{DevFieldDefinition, FieldDefinition, MesgDefinition},
        header::{DataHeader, DefinitionHeader, FileHeader, PROFILE_VERSION, PROTOCOL_VERSION},
    },
};

/// Number of local message numbers available.
const LOCAL_MESGS: usize = 16;

/// An error encoding a message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// A definition record can describe at most 255 fields of each kind.
    #[error("Message {mesg} has {count} fields (at most 255).")]
    TooManyFields { mesg: u16, count: usize },
}

#[derive(Debug, Clone)]
struct LocalMesg {
    definition: MesgDefinition,
    /// Order of assignment, for reuse of the stalest slot.
    assigned: u64,
}

/// An encoding session producing one file.
#[derive(Debug, Clone)]
pub struct Encoder {
    protocol_version: u8,
    profile_version: u16,
    data: Vec<u8>,
    locals: [Option<LocalMesg>; LOCAL_MESGS],
    assignments: u64,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self::with_versions(PROTOCOL_VERSION, PROFILE_VERSION)
    }

    /// Write the given protocol and profile versions to the file header.
    pub fn with_versions(protocol_version: u8, profile_version: u16) -> Self {
        Self {
            protocol_version,
            profile_version,
            data: Vec::new(),
            locals: Default::default(),
            assignments: 0,
        }
    }

    /// Append a message, defining its layout first if needed.
    ///
    /// Fields holding no elements are left out.
    pub fn write_mesg(&mut self, mesg: &Mesg) -> Result<(), EncodeError> {
        let definition = definition_of(mesg)?;
        let local_num = self.local_num_for(definition)?;

        self.data.push(
            DataHeader {
                local_num,
                time_offset: None,
            }
            .to_byte(),
        );

        for field in mesg.fields().iter().filter(|f| f.num_values() != 0) {
            field.write(&mut self.data);
        }
        for field in mesg.developer_fields().iter().filter(|f| f.num_values() != 0) {
            field.write(&mut self.data);
        }

        trace!("Wrote {} ({}) as local message {local_num}.", mesg.name(), mesg.num());

        Ok(())
    }

    /// Append several messages in order.
    pub fn write_mesgs<'m>(&mut self, mesgs: impl IntoIterator<Item = &'m Mesg>) -> Result<(), EncodeError> {
        for mesg in mesgs {
            self.write_mesg(mesg)?;
        }

        Ok(())
    }

    /// The local message number carrying a layout, emitting a definition
    /// record if the layout is not the one currently assigned.
    fn local_num_for(&mut self, definition: MesgDefinition) -> Result<u8, EncodeError> {
        let existing = self
            .locals
            .iter()
            .position(|l| l.as_ref().is_some_and(|l| l.definition.global_num == definition.global_num));

        if let Some(i) = existing {
            if self.locals[i].as_ref().is_some_and(|l| l.definition == definition) {
                return Ok(i as u8);
            }
        }

        let i = existing
            .or_else(|| self.locals.iter().position(Option::is_none))
            .unwrap_or_else(|| self.stalest_local());

        debug!(
            "Defining local message {i} as global message {} ({} fields, {} developer fields).",
            definition.global_num,
            definition.fields.len(),
            definition.developer_fields.len(),
        );

        self.data.push(
            DefinitionHeader {
                local_num: i as u8,
                has_developer_data: definition.has_developer_data(),
            }
            .to_byte(),
        );
        definition.write(&mut self.data);

        self.assignments += 1;
        self.locals[i] = Some(LocalMesg {
            definition,
            assigned: self.assignments,
        });

        Ok(i as u8)
    }

    fn stalest_local(&self) -> usize {
        self.locals
            .iter()
            .enumerate()
            .min_by_key(|(_, l)| l.as_ref().map_or(0, |l| l.assigned))
            .map_or(0, |(i, _)| i)
    }

    /// Finish the file, returning its bytes.
    ///
    /// A session with no messages still produces a well-formed file.
    pub fn close(self) -> Vec<u8> {
        let header = FileHeader::new(
            self.protocol_version,
            self.profile_version,
            self.data.len() as u32,
        );

        let mut w = Vec::with_capacity(14 + self.data.len() + 2);
        w.extend_from_slice(&header.to_bytes());
        w.extend_from_slice(&self.data);

        let mut crc = Crc::new();
        crc.update(&w);
        w.extend_from_slice(&crc.value().to_le_bytes());

        debug!("Closed file with {} bytes of records.", self.data.len());

        w
    }
}

/// Re-encode every message received, as when transcoding a decoded file.
impl MesgListener for Encoder {
    fn on_mesg(&mut self, mesg: &Mesg) {
        if let Err(e) = self.write_mesg(mesg) {
            warn!("Dropping message {}: {e}", mesg.num());
        }
    }
}

/// The layout of a message's non-empty fields.
fn definition_of(mesg: &Mesg) -> Result<MesgDefinition, EncodeError> {
    let mut definition = MesgDefinition::new(mesg.num());

    definition.fields = mesg
        .fields()
        .iter()
        .filter(|f| f.num_values() != 0)
        .map(|f| FieldDefinition {
            num: f.num(),
            size: f.size() as u8,
            base_type: f.base_type() as u8,
        })
        .collect();

    definition.developer_fields = mesg
        .developer_fields()
        .iter()
        .filter(|f| f.num_values() != 0)
        .map(|f| DevFieldDefinition {
            num: f.field_definition_number(),
            size: f.size() as u8,
            developer_data_index: f.developer_data_index(),
        })
        .collect();

    for count in [definition.fields.len(), definition.developer_fields.len()] {
        if count > u8::MAX as usize {
            Err(EncodeError::TooManyFields {
                mesg: mesg.num(),
                count,
            })?;
        }
    }

    Ok(definition)
}
