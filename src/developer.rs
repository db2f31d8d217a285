//! Fields declared at runtime by developer data.
//!
//! A developer announces itself with a `developer_data_id` message, then
//! declares each of its fields with a `field_description` message. Together
//! they describe a [`DeveloperFieldDefinition`], identified by a
//! [`DeveloperDataKey`].

use alloc::{collections::BTreeMap, string::String, vec::Vec};
use core::ops::{Deref, DerefMut};

use crate::{
    base_type::BaseType,
    field::Field,
    mesg::{Mesg, SubFieldIndex},
    profile::{developer_data_id as ddi, field_description as fd},
};

/// Identity of a developer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeveloperDataKey {
    pub developer_data_index: u8,
    pub field_definition_number: u8,
}

impl DeveloperDataKey {
    pub fn new(developer_data_index: u8, field_definition_number: u8) -> Self {
        Self {
            developer_data_index,
            field_definition_number,
        }
    }

    /// The key described by a declaring pair of messages: the index from the
    /// `developer_data_id`, and the number from the `field_description`.
    pub fn from_mesgs(developer_data_id: &Mesg, field_description: &Mesg) -> Option<Self> {
        Some(Self::new(
            u8_of(developer_data_id, ddi::DEVELOPER_DATA_INDEX)?,
            u8_of(field_description, fd::FIELD_DEFINITION_NUMBER)?,
        ))
    }

    /// The key declared by a `field_description` alone.
    pub fn from_field_description(field_description: &Mesg) -> Option<Self> {
        Some(Self::new(
            u8_of(field_description, fd::DEVELOPER_DATA_INDEX)?,
            u8_of(field_description, fd::FIELD_DEFINITION_NUMBER)?,
        ))
    }
}

fn integer_of(mesg: &Mesg, num: u8) -> Option<i128> {
    mesg.get_field_value(num, 0, SubFieldIndex::MainField)?.as_i128()
}

fn u8_of(mesg: &Mesg, num: u8) -> Option<u8> {
    integer_of(mesg, num)?.try_into().ok()
}

fn bytes_of(mesg: &Mesg, num: u8) -> Vec<u8> {
    mesg.field(num)
        .map(|f| {
            f.raw_values()
                .iter()
                .filter_map(|v| v.as_u64_bits())
                .map(|x| x as u8)
                .collect()
        })
        .unwrap_or_default()
}

/// Metadata of a developer field, derived from its declaring messages.
#[derive(Debug, Clone, PartialEq)]
pub struct DeveloperFieldDefinition {
    key: DeveloperDataKey,
    size: u8,
    base_type: BaseType,
    scale: f64,
    offset: f64,
    name: String,
    units: String,
    native_mesg_num: Option<u16>,
    native_field_num: Option<u8>,
    developer_id: Vec<u8>,
    application_id: Vec<u8>,
    application_version: Option<u32>,
}

impl DeveloperFieldDefinition {
    /// Derive a definition, with `size` bytes per occurrence on the wire.
    ///
    /// Returns `None` if either message lacks its half of the key.
    pub fn new(field_description: &Mesg, developer_data_id: &Mesg, size: u8) -> Option<Self> {
        let key = DeveloperDataKey::from_mesgs(developer_data_id, field_description)?;

        let base_type = u8_of(field_description, fd::FIT_BASE_TYPE_ID)
            .and_then(|b| BaseType::try_from(b).ok())
            .unwrap_or(BaseType::Byte);

        let string_of = |num| {
            field_description
                .field(num)
                .and_then(|f| f.string_value(0))
                .map(String::from)
                .unwrap_or_default()
        };

        Some(Self {
            key,
            size,
            base_type,
            scale: integer_of(field_description, fd::SCALE).map_or(1.0, |x| x as f64),
            offset: integer_of(field_description, fd::OFFSET).map_or(0.0, |x| x as f64),
            name: string_of(fd::FIELD_NAME),
            units: string_of(fd::UNITS),
            native_mesg_num: integer_of(field_description, fd::NATIVE_MESG_NUM)
                .and_then(|x| x.try_into().ok()),
            native_field_num: u8_of(field_description, fd::NATIVE_FIELD_NUM),
            developer_id: bytes_of(developer_data_id, ddi::DEVELOPER_ID),
            application_id: bytes_of(developer_data_id, ddi::APPLICATION_ID),
            application_version: integer_of(developer_data_id, ddi::APPLICATION_VERSION)
                .and_then(|x| x.try_into().ok()),
        })
    }

    pub fn key(&self) -> DeveloperDataKey {
        self.key
    }

    pub fn developer_data_index(&self) -> u8 {
        self.key.developer_data_index
    }

    pub fn field_definition_number(&self) -> u8 {
        self.key.field_definition_number
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn base_type(&self) -> BaseType {
        self.base_type
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// The first localized field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The first localized units.
    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn native_mesg_num(&self) -> Option<u16> {
        self.native_mesg_num
    }

    /// The native field this developer field stands in for, if any.
    pub fn native_field_num(&self) -> Option<u8> {
        self.native_field_num
    }

    pub fn developer_id(&self) -> &[u8] {
        &self.developer_id
    }

    pub fn application_id(&self) -> &[u8] {
        &self.application_id
    }

    pub fn application_version(&self) -> Option<u32> {
        self.application_version
    }
}

/// A field declared by developer data.
///
/// Behaves as a [`Field`] numbered by its field definition number, and
/// additionally compares on its developer data index.
#[derive(Debug, Clone, PartialEq)]
pub struct DeveloperField {
    field: Field,
    developer_data_index: u8,
    native_override: Option<u8>,
}

impl DeveloperField {
    pub fn new(definition: &DeveloperFieldDefinition) -> Self {
        Self {
            field: Field::new(
                definition.name.clone(),
                definition.field_definition_number(),
                definition.base_type,
                definition.scale,
                definition.offset,
                definition.units.clone(),
                false,
            ),
            developer_data_index: definition.developer_data_index(),
            native_override: definition.native_field_num,
        }
    }

    /// Build directly from the declaring messages.
    pub fn from_mesgs(field_description: &Mesg, developer_data_id: &Mesg) -> Option<Self> {
        DeveloperFieldDefinition::new(field_description, developer_data_id, 0).map(|d| Self::new(&d))
    }

    pub fn key(&self) -> DeveloperDataKey {
        DeveloperDataKey::new(self.developer_data_index, self.field.num())
    }

    pub fn developer_data_index(&self) -> u8 {
        self.developer_data_index
    }

    pub fn field_definition_number(&self) -> u8 {
        self.field.num()
    }

    pub fn native_override(&self) -> Option<u8> {
        self.native_override
    }
}

impl Deref for DeveloperField {
    type Target = Field;

    fn deref(&self) -> &Field {
        &self.field
    }
}

impl DerefMut for DeveloperField {
    fn deref_mut(&mut self) -> &mut Field {
        &mut self.field
    }
}

/// Registry of the developer data seen during one decoding session.
#[derive(Debug, Clone, Default)]
pub struct DeveloperDataLookup {
    developer_data_ids: BTreeMap<u8, Mesg>,
    field_descriptions: BTreeMap<DeveloperDataKey, Mesg>,
}

impl DeveloperDataLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a `developer_data_id` message.
    ///
    /// Re-announcing an index discards every field description registered
    /// under it. Returns `false` if the message carries no index.
    pub fn add_developer_data_id_mesg(&mut self, mesg: Mesg) -> bool {
        let Some(index) = u8_of(&mesg, ddi::DEVELOPER_DATA_INDEX) else {
            return false;
        };

        self.field_descriptions
            .retain(|k, _| k.developer_data_index != index);
        self.developer_data_ids.insert(index, mesg);

        true
    }

    /// Register a `field_description` message, replacing any with the same
    /// key.
    ///
    /// Returns `false` if the message does not carry a full key.
    pub fn add_field_description_mesg(&mut self, mesg: Mesg) -> bool {
        let Some(key) = DeveloperDataKey::from_field_description(&mesg) else {
            return false;
        };

        self.field_descriptions.insert(key, mesg);

        true
    }

    /// Resolve a definition by the key values held in a pair of messages.
    pub fn get_developer_field_definition(
        &self,
        developer_data_id: &Mesg,
        field_description: &Mesg,
    ) -> Option<DeveloperFieldDefinition> {
        let key = DeveloperDataKey::from_mesgs(developer_data_id, field_description)?;
        self.definition(key, 0)
    }

    /// Resolve a definition by key, with `size` bytes per occurrence.
    pub fn definition(&self, key: DeveloperDataKey, size: u8) -> Option<DeveloperFieldDefinition> {
        let developer_data_id = self.developer_data_ids.get(&key.developer_data_index)?;
        let field_description = self.field_descriptions.get(&key)?;

        DeveloperFieldDefinition::new(field_description, developer_data_id, size)
    }
}

