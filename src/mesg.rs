//! Messages: ordered collections of fields.

use alloc::{string::String, vec::Vec};

use thiserror::Error;

use crate::{
    developer::{DeveloperDataKey, DeveloperField},
    field::{Field, FieldError, SubField},
    profile,
    value::Value,
};

/// An error modifying a message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MesgError {
    /// No field with this number exists in the message or its profile.
    #[error("Unknown field ({0}).")]
    UnknownField(u8),
    /// No subfield at this index exists for the field.
    #[error("Unknown subfield ({sub_field}) of field {field}.")]
    UnknownSubField { field: u8, sub_field: usize },
    /// The message's reference fields do not select this subfield.
    #[error("Subfield {sub_field} of field {field} is not supported by the message.")]
    SubFieldNotSupported { field: u8, sub_field: usize },
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// How a field value is interpreted when read or written through a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubFieldIndex {
    /// The field itself, ignoring subfields.
    MainField,
    /// The first subfield supported by the message, or the field itself.
    #[default]
    Active,
    /// A specific subfield, regardless of the message's reference fields.
    Index(usize),
}

/// One message occurrence.
///
/// Cloning copies every field by value.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesg {
    name: String,
    num: u16,
    local_num: u8,
    fields: Vec<Field>,
    developer_fields: Vec<DeveloperField>,
}

impl Mesg {
    pub fn new(name: impl Into<String>, num: u16) -> Self {
        Self {
            name: name.into(),
            num,
            local_num: 0,
            fields: Vec::new(),
            developer_fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Global message number.
    pub fn num(&self) -> u16 {
        self.num
    }

    /// Local message number this occurrence was decoded from.
    pub fn local_num(&self) -> u8 {
        self.local_num
    }

    pub fn set_local_num(&mut self, local_num: u8) {
        self.local_num = local_num;
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn has_field(&self, num: u8) -> bool {
        self.field(num).is_some()
    }

    pub fn field(&self, num: u8) -> Option<&Field> {
        self.fields.iter().find(|f| f.num() == num)
    }

    pub fn field_mut(&mut self, num: u8) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.num() == num)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Insert a field, replacing any with the same number in place.
    pub fn set_field(&mut self, field: Field) {
        match self.field_mut(field.num()) {
            Some(f) => *f = field,
            None => self.fields.push(field),
        }
    }

    pub fn remove_field(&mut self, num: u8) -> Option<Field> {
        let i = self.fields.iter().position(|f| f.num() == num)?;
        Some(self.fields.remove(i))
    }

    /// The field with this number, instantiated from the profile if absent.
    fn field_or_profile(&mut self, num: u8) -> Result<&mut Field, MesgError> {
        if !self.has_field(num) {
            let field = profile::field(self.num, num).ok_or(MesgError::UnknownField(num))?;
            self.fields.push(field);
        }

        self.field_mut(num).ok_or(MesgError::UnknownField(num))
    }

    /// Index of the first subfield of a field supported by the message.
    ///
    /// Evaluated against current field values on every call.
    pub fn active_sub_field_index(&self, num: u8) -> Option<usize> {
        self.field(num)?
            .sub_fields()
            .iter()
            .position(|s| s.can_mesg_support(self))
    }

    /// Index of a subfield by name.
    pub fn sub_field_index(&self, num: u8, name: &str) -> Option<usize> {
        match self.field(num) {
            Some(f) => f.sub_field_index(name),
            None => profile::field(self.num, num)?.sub_field_index(name),
        }
    }

    /// Read a field value.
    ///
    /// Explicitly addressed subfields not supported by the message read as
    /// `None`.
    pub fn get_field_value(&self, num: u8, index: usize, sub: SubFieldIndex) -> Option<Value> {
        let field = self.field(num)?;

        match sub {
            SubFieldIndex::MainField => field.value_at(index, None),
            SubFieldIndex::Active => {
                let s = self.active_sub_field_index(num).and_then(|i| field.sub_field(i));
                field.value_at(index, s)
            }
            SubFieldIndex::Index(i) => {
                let s = field.sub_field(i)?;
                if !s.can_mesg_support(self) {
                    return None;
                }
                field.value_at(index, Some(s))
            }
        }
    }

    /// Write a field value, instantiating the field from the profile if
    /// absent.
    ///
    /// Explicitly addressed subfields must be supported by the message.
    pub fn set_field_value(
        &mut self,
        num: u8,
        index: usize,
        value: Option<Value>,
        sub: SubFieldIndex,
    ) -> Result<(), MesgError> {
        let sub_field = self.resolve_sub_field(num, sub)?;
        let field = self.field_or_profile(num)?;

        Ok(field.set_value_at(index, value, sub_field.as_ref())?)
    }

    fn resolve_sub_field(&self, num: u8, sub: SubFieldIndex) -> Result<Option<SubField>, MesgError> {
        let template = profile::field(self.num, num);
        let Some(field) = self.field(num).or(template.as_ref()) else {
            return Err(MesgError::UnknownField(num));
        };

        Ok(match sub {
            SubFieldIndex::MainField => None,
            SubFieldIndex::Active => field
                .sub_fields()
                .iter()
                .find(|s| s.can_mesg_support(self))
                .cloned(),
            SubFieldIndex::Index(i) => {
                let s = field.sub_field(i).ok_or(MesgError::UnknownSubField {
                    field: num,
                    sub_field: i,
                })?;

                if !s.can_mesg_support(self) {
                    Err(MesgError::SubFieldNotSupported {
                        field: num,
                        sub_field: i,
                    })?;
                }

                Some(s.clone())
            }
        })
    }

    pub fn developer_fields(&self) -> &[DeveloperField] {
        &self.developer_fields
    }

    /// Insert a developer field, replacing any with the same key in place.
    pub fn set_developer_field(&mut self, field: DeveloperField) {
        let key = field.key();
        match self.developer_fields.iter_mut().find(|f| f.key() == key) {
            Some(f) => *f = field,
            None => self.developer_fields.push(field),
        }
    }

    /// A developer field by developer data index and field definition number.
    pub fn developer_field(&self, developer_data_index: u8, field_definition_number: u8) -> Option<&DeveloperField> {
        self.developer_fields
            .iter()
            .find(|f| f.key() == DeveloperDataKey::new(developer_data_index, field_definition_number))
    }

    /// A developer field by the values held in the messages that declared it.
    pub fn developer_field_for(&self, developer_data_id: &Mesg, field_description: &Mesg) -> Option<&DeveloperField> {
        let key = DeveloperDataKey::from_mesgs(developer_data_id, field_description)?;
        self.developer_fields.iter().find(|f| f.key() == key)
    }
}
