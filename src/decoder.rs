//! Decoding sessions.
//!
//! A [`Decoder`] reads one file from a [`Source`], assembles each data record
//! into a [`Mesg`], and publishes it to every registered [`MesgListener`] in
//! stream order. Messages are published as soon as they are read, so those
//! preceding a failure have already been delivered when [`Decoder::read`]
//! returns an error.
//!
//! ```
//! let mut mesgs = Vec::new();
//!
//! let mut decoder = Decoder::new(data.as_slice());
//! decoder.add_mesg_listener(|mesg: &Mesg| mesgs.push(mesg.clone()));
//! decoder.read()?;
//! ```

use alloc::{boxed::Box, vec, vec::Vec};

use either::Either::{Left, Right};
use log::{debug, trace, warn};
use thiserror::Error;

use crate::{
    accumulator::Accumulator,
    base_type::BaseType,
    bit_stream::BitStream,
    developer::{DeveloperDataKey, DeveloperDataLookup, DeveloperField},
    field::Field,
    mesg::{Mesg, MesgError, SubFieldIndex},
    profile::{self, mesg_num},
    value::Value,
    wire::{
        check::{Crc, compute_crc},
        definition::{DevFieldDefinition, FieldDefinition, MesgDefinition},
        header::{DataHeader, DefinitionHeader, FileHeader, HEADER_SIZE, HeaderError, parse_record_header},
    },
};

#[cfg(feature = "std")]
pub mod reader;
pub mod slice;

#[cfg(feature = "std")]
pub use reader::ReaderSource;

/// Errors occurring while decoding.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Unexpectedly reached the end of the input.
    #[error("Unexpectedly reached the end of the input.")]
    EndOfStream,
    /// An error from the supplied reader.
    #[cfg(feature = "std")]
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Incorrect file header.
    #[error("Incorrect file header: {0}")]
    Header(#[from] HeaderError),
    /// Calculated and found header CRC values do not match.
    #[error("Calculated ({calculated}) and found ({found}) header CRC values do not match.")]
    HeaderCheck { found: u16, calculated: u16 },
    /// Calculated and found CRC values do not match.
    #[error("Calculated ({calculated}) and found ({found}) CRC values do not match.")]
    CyclicRedundancyCheck { found: u16, calculated: u16 },
    /// A data record referred to a local message with no definition.
    #[error("No definition for local message {0}.")]
    MissingDefinition(u8),
    /// A definition record named an unknown base type.
    #[error("Unknown base type ({0:#04x}).")]
    UnknownBaseType(u8),
    /// A record extended past the end of the declared data.
    #[error("Record data extends past the declared data size.")]
    PayloadOverrun,
    #[error(transparent)]
    Mesg(#[from] MesgError),
}

/// Input to a [`Decoder`].
pub trait Source {
    /// Fill `buf` entirely from the input.
    ///
    /// Fails with [`DecodeError::EndOfStream`] if the input runs out first.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), DecodeError>;
}

/// Receive messages from a [`Decoder`].
pub trait MesgListener {
    fn on_mesg(&mut self, mesg: &Mesg);
}

impl<F: FnMut(&Mesg)> MesgListener for F {
    fn on_mesg(&mut self, mesg: &Mesg) {
        self(mesg)
    }
}

/// A decoding session over one input.
pub struct Decoder<'a, S> {
    source: S,
    listeners: Vec<Box<dyn MesgListener + 'a>>,
    definitions: [Option<MesgDefinition>; 16],
    lookup: DeveloperDataLookup,
    accumulator: Accumulator,
    last_timestamp: u32,
    position: usize,
    crc: Crc,
}

impl<'a, S: Source> Decoder<'a, S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            listeners: Vec::new(),
            definitions: Default::default(),
            lookup: DeveloperDataLookup::new(),
            accumulator: Accumulator::new(),
            last_timestamp: 0,
            position: 0,
            crc: Crc::new(),
        }
    }

    /// Register a listener. Listeners are called in registration order.
    pub fn add_mesg_listener(&mut self, listener: impl MesgListener + 'a) {
        self.listeners.push(Box::new(listener));
    }

    /// Developer data registered so far.
    pub fn developer_data_lookup(&self) -> &DeveloperDataLookup {
        &self.lookup
    }

    /// Decode one file, publishing each message to the listeners.
    pub fn read(&mut self) -> Result<(), DecodeError> {
        self.position = 0;
        self.crc = Crc::new();

        let prefix = self.take::<12>()?;
        let header = FileHeader::parse(prefix)?;

        if header.header_size == HEADER_SIZE {
            let found = u16::from_le_bytes(self.take()?);
            let calculated = compute_crc(0, &prefix);

            // Writers may leave the header check value unset.
            if found != 0 && found != calculated {
                Err(DecodeError::HeaderCheck { found, calculated })?;
            }
        }

        debug!(
            "Decoding {} bytes of records (protocol {:#04x}, profile {}).",
            header.data_size, header.protocol_version, header.profile_version
        );

        // Offset to the end of the record section.
        let end = self.position + header.data_size as usize;

        while self.position < end {
            let [r] = self.take()?;

            match parse_record_header(r) {
                Left(header) => self.read_definition(header)?,
                Right(header) => self.read_data(header)?,
            }
        }

        if self.position > end {
            Err(DecodeError::PayloadOverrun)?;
        }

        let calculated = self.crc.value();
        let found = u16::from_le_bytes(self.take()?);

        if found != calculated {
            Err(DecodeError::CyclicRedundancyCheck { found, calculated })?;
        }

        Ok(())
    }

    fn read_definition(&mut self, header: DefinitionHeader) -> Result<(), DecodeError> {
        let (mut definition, fields) = MesgDefinition::parse(self.take()?);

        for _ in 0..fields {
            let field = FieldDefinition::parse(self.take()?);
            BaseType::try_from(field.base_type).map_err(DecodeError::UnknownBaseType)?;

            definition.fields.push(field);
        }

        if header.has_developer_data {
            let [fields] = self.take()?;
            for _ in 0..fields {
                definition
                    .developer_fields
                    .push(DevFieldDefinition::parse(self.take()?));
            }
        }

        debug!(
            "Defined local message {} as global message {} ({} fields, {} developer fields).",
            header.local_num,
            definition.global_num,
            definition.fields.len(),
            definition.developer_fields.len(),
        );

        self.definitions[header.local_num as usize] = Some(definition);

        Ok(())
    }

    fn read_data(&mut self, header: DataHeader) -> Result<(), DecodeError> {
        let definition = self.definitions[header.local_num as usize]
            .clone()
            .ok_or(DecodeError::MissingDefinition(header.local_num))?;

        let data = self.take_vec(definition.data_size())?;
        let (mut r, le) = (data.as_slice(), definition.is_little_endian);

        let mut mesg = profile::mesg(definition.global_num);
        mesg.set_local_num(header.local_num);

        for fd in &definition.fields {
            let (bytes, rest) = r.split_at(fd.size as usize);
            r = rest;

            let base_type = BaseType::try_from(fd.base_type).map_err(DecodeError::UnknownBaseType)?;

            let mut field = profile::field(definition.global_num, fd.num)
                .unwrap_or_else(|| Field::unknown(fd.num, base_type));
            field.read(bytes, base_type, le);

            if field.is_accumulated() && field.has_values() {
                if let Some(raw) = field.raw_value(0).and_then(Value::as_u64_bits) {
                    self.accumulator
                        .create_accumulated_field(definition.global_num, fd.num, raw);
                }
            }

            mesg.set_field(field);
        }

        for fd in &definition.developer_fields {
            let (bytes, rest) = r.split_at(fd.size as usize);
            r = rest;

            let key = DeveloperDataKey::new(fd.developer_data_index, fd.num);
            match self.lookup.definition(key, fd.size) {
                Some(d) => {
                    let mut field = DeveloperField::new(&d);
                    field.read(bytes, d.base_type(), le);
                    mesg.set_developer_field(field);
                }
                None => warn!(
                    "Skipping unregistered developer field {} of developer {}.",
                    fd.num, fd.developer_data_index
                ),
            }
        }

        self.resolve_timestamp(&mut mesg, header.time_offset)?;
        self.expand_components(&mut mesg);

        trace!(
            "Read {} ({}) with {} fields.",
            mesg.name(),
            mesg.num(),
            mesg.num_fields()
        );

        match mesg.num() {
            mesg_num::DEVELOPER_DATA_ID => {
                self.lookup.add_developer_data_id_mesg(mesg.clone());
            }
            mesg_num::FIELD_DESCRIPTION => {
                self.lookup.add_field_description_mesg(mesg.clone());
            }
            _ => {}
        }

        for listener in &mut self.listeners {
            listener.on_mesg(&mesg);
        }

        Ok(())
    }

    /// Track the running timestamp, expanding a compressed time offset into
    /// a full timestamp field.
    fn resolve_timestamp(&mut self, mesg: &mut Mesg, time_offset: Option<u8>) -> Result<(), DecodeError> {
        match time_offset {
            Some(offset) => {
                let last = self.last_timestamp;
                let timestamp = last.wrapping_add(u32::from(offset).wrapping_sub(last) & 0x1F);

                let value = Some(Value::U32(timestamp));
                mesg.set_field_value(profile::TIMESTAMP, 0, value, SubFieldIndex::MainField)?;

                self.last_timestamp = timestamp;
            }
            None => {
                let timestamp = mesg
                    .field(profile::TIMESTAMP)
                    .filter(|f| f.has_values())
                    .and_then(|f| f.raw_value(0))
                    .and_then(Value::as_u64_bits);

                if let Some(timestamp) = timestamp {
                    self.last_timestamp = timestamp as u32;
                }
            }
        }

        Ok(())
    }

    /// Unpack the components of every field into their target fields.
    ///
    /// Targets the record already carried are left as read, though their
    /// accumulators still advance.
    fn expand_components(&mut self, mesg: &mut Mesg) {
        let native: Vec<u8> = mesg.fields().iter().map(Field::num).collect();

        let sources: Vec<Field> = mesg
            .fields()
            .iter()
            .filter(|f| !f.components().is_empty() && f.has_values())
            .cloned()
            .collect();

        for field in sources {
            let chunks = field
                .raw_values()
                .iter()
                .filter_map(Value::as_u64_bits)
                .collect();
            let mut stream = BitStream::from_chunks(chunks, field.base_type().size() as u32 * 8);

            for component in field.components() {
                let Ok(mut raw) = stream.read_bits(component.bits as usize) else {
                    warn!(
                        "Field {} of {} has too few bits for its components.",
                        field.num(),
                        mesg.name()
                    );
                    break;
                };

                if component.accumulate {
                    let (m, f) = (mesg.num(), component.field_num);
                    if !self.accumulator.contains(m, f) {
                        self.accumulator.create_accumulated_field(m, f, 0);
                    }
                    raw = self.accumulator.accumulate(m, f, raw, component.bits).unwrap_or(raw);
                }

                if native.contains(&component.field_num) {
                    continue;
                }

                let value = Some(Value::F64(component.convert(raw)));
                if let Err(e) = mesg.set_field_value(component.field_num, 0, value, SubFieldIndex::MainField) {
                    warn!("Cannot expand component of field {}: {e}", field.num());
                }
            }
        }
    }

    /// Take an exact number of bytes, advancing the position and accumulating
    /// the CRC value.
    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut buf = [0; N];
        self.fill(&mut buf)?;

        Ok(buf)
    }

    fn take_vec(&mut self, n: usize) -> Result<Vec<u8>, DecodeError> {
        let mut buf = vec![0; n];
        self.fill(&mut buf)?;

        Ok(buf)
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        self.source.read_exact(buf)?;

        self.position += buf.len();
        self.crc.update(buf);

        Ok(())
    }
}

/// Whether the data begins with a FIT file header.
pub fn is_fit(data: &[u8]) -> bool {
    data.first_chunk::<12>()
        .is_some_and(|r| FileHeader::parse(*r).is_ok())
}

/// Whether the data holds a complete FIT file with matching check values.
pub fn check_integrity(data: &[u8]) -> bool {
    let Some(prefix) = data.first_chunk::<12>() else {
        return false;
    };
    let Ok(header) = FileHeader::parse(*prefix) else {
        return false;
    };

    if header.header_size == HEADER_SIZE {
        let Some(&[a, b]) = data.get(12..14) else {
            return false;
        };

        let found = u16::from_le_bytes([a, b]);
        if found != 0 && found != compute_crc(0, prefix) {
            return false;
        }
    }

    let end = header.header_size as usize + header.data_size as usize;
    let (Some(body), Some(check)) = (data.get(..end), data.get(end..end + 2)) else {
        return false;
    };

    compute_crc(0, body) == u16::from_le_bytes([check[0], check[1]])
}
