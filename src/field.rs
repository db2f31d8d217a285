//! Fields, and the alternate interpretations they may take on.
//!
//! A [`Field`] stores its elements as raw, wire-scaled values of its base
//! type. Values assigned through [`Field::set_value_at`] pass through the
//! field's scale and offset (or those of a [`SubField`]) on the way in, and
//! are reversed on the way out through [`Field::value_at`].

use alloc::{string::String, vec, vec::Vec};

use thiserror::Error;

use crate::{base_type::BaseType, mesg::Mesg, value::Value};

/// Largest number of bytes a single field may occupy on the wire.
pub const MAX_FIELD_SIZE: usize = 255;

/// An error modifying a field.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    /// The write would grow the field past [`MAX_FIELD_SIZE`].
    #[error("Field size of {size} bytes exceeds the limit of 255 bytes.")]
    SizeOverflow { size: usize },
}

/// One field of a message.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    num: u8,
    base_type: BaseType,
    scale: f64,
    offset: f64,
    units: String,
    accumulated: bool,
    values: Vec<Value>,
    sub_fields: Vec<SubField>,
    components: Vec<Component>,
}

impl Field {
    pub fn new(
        name: impl Into<String>,
        num: u8,
        base_type: BaseType,
        scale: f64,
        offset: f64,
        units: impl Into<String>,
        accumulated: bool,
    ) -> Self {
        Self {
            name: name.into(),
            num,
            base_type,
            scale,
            offset,
            units: units.into(),
            accumulated,
            values: Vec::new(),
            sub_fields: Vec::new(),
            components: Vec::new(),
        }
    }

    /// A field without a profile entry: no scale, offset or units.
    pub fn unknown(num: u8, base_type: BaseType) -> Self {
        Self::new("unknown", num, base_type, 1.0, 0.0, "", false)
    }

    pub fn with_sub_fields(mut self, sub_fields: Vec<SubField>) -> Self {
        self.sub_fields = sub_fields;
        self
    }

    pub fn with_components(mut self, components: Vec<Component>) -> Self {
        self.components = components;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num(&self) -> u8 {
        self.num
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

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn is_accumulated(&self) -> bool {
        self.accumulated
    }

    pub fn sub_fields(&self) -> &[SubField] {
        &self.sub_fields
    }

    pub fn sub_field(&self, index: usize) -> Option<&SubField> {
        self.sub_fields.get(index)
    }

    pub fn sub_field_index(&self, name: &str) -> Option<usize> {
        self.sub_fields.iter().position(|s| s.name == name)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Number of stored elements (or string slots).
    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    /// Stored elements, as they will be written to the wire.
    pub fn raw_values(&self) -> &[Value] {
        &self.values
    }

    pub fn raw_value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Whether any stored element differs from the invalid marker.
    pub fn has_values(&self) -> bool {
        self.values.iter().any(|v| self.base_type.is_valid(v))
    }

    /// Bytes occupied on the wire, including string terminators.
    pub fn size(&self) -> usize {
        self.values.iter().map(|v| self.element_size(v)).sum()
    }

    fn element_size(&self, value: &Value) -> usize {
        match value {
            Value::String(s) => s.len() + 1,
            _ => self.base_type.size(),
        }
    }

    fn scale_and_offset(&self, sub: Option<&SubField>) -> (f64, f64) {
        match sub {
            Some(s) => (s.scale, s.offset),
            None => (self.scale, self.offset),
        }
    }

    /// The first element, converted.
    pub fn value(&self) -> Option<Value> {
        self.value_at(0, None)
    }

    /// An element, converted through the scale and offset of the field (or of
    /// `sub`).
    ///
    /// Returns `None` for missing elements and those holding the invalid
    /// marker. Transformed values are returned as `F64`; otherwise the raw
    /// value is returned unchanged.
    pub fn value_at(&self, index: usize, sub: Option<&SubField>) -> Option<Value> {
        let raw = self.values.get(index)?;

        if self.base_type.is_invalid(raw) {
            return None;
        }

        let (scale, offset) = self.scale_and_offset(sub);
        if self.base_type.is_string() || !is_transformed(scale, offset) {
            return Some(raw.clone());
        }

        Some(Value::F64(raw.as_f64()? / nonzero(scale) - offset))
    }

    /// A string slot, if it holds a value.
    pub fn string_value(&self, index: usize) -> Option<&str> {
        self.values
            .get(index)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// All elements, converted.
    pub fn to_vec(&self, sub: Option<&SubField>) -> Vec<Option<Value>> {
        (0..self.values.len()).map(|i| self.value_at(i, sub)).collect()
    }

    /// Assign the first element.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<(), FieldError> {
        self.set_value_at(0, Some(value.into()), None)
    }

    /// Assign an element, converting through the scale and offset of the
    /// field (or of `sub`).
    ///
    /// `None` stores the invalid marker. Writing past the end pads the gap
    /// with invalid markers. Byte sequences are spread across consecutive
    /// elements, unless the field holds strings.
    ///
    /// Fails without modifying the field if the result would not fit on the
    /// wire.
    pub fn set_value_at(
        &mut self,
        index: usize,
        value: Option<Value>,
        sub: Option<&SubField>,
    ) -> Result<(), FieldError> {
        let elements = match value {
            None => vec![self.base_type.invalid_value()],
            Some(Value::Bytes(b)) if !self.base_type.is_string() => b
                .into_iter()
                .map(|x| self.convert(&Value::U8(x), sub))
                .collect(),
            Some(v) => vec![self.convert(&v, sub)],
        };

        self.splice(index, elements)
    }

    /// Append an already wire-scaled element.
    ///
    /// Out-of-range input is stored as the invalid marker.
    pub fn add_raw_value(&mut self, value: impl Into<Value>) -> Result<(), FieldError> {
        let value = self.base_type.correct_range_and_type(&value.into());
        self.splice(self.values.len(), vec![value])
    }

    /// Remove all elements.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    fn convert(&self, value: &Value, sub: Option<&SubField>) -> Value {
        let (scale, offset) = self.scale_and_offset(sub);

        if self.base_type.is_string() || !is_transformed(scale, offset) {
            return self.base_type.correct_range_and_type(value);
        }

        let Some(x) = value.as_f64() else {
            return self.base_type.invalid_value();
        };

        let mut raw = (x + offset) * nonzero(scale);
        if self.base_type.is_integer() {
            raw = round(raw);
        }

        self.base_type.correct_range_and_type(&Value::F64(raw))
    }

    /// Overwrite elements from `index` onward, after checking the resulting
    /// wire size.
    fn splice(&mut self, index: usize, elements: Vec<Value>) -> Result<(), FieldError> {
        let padding = self.element_size(&self.base_type.invalid_value());
        let gap = index.saturating_sub(self.values.len());

        let added: usize = elements.iter().map(|v| self.element_size(v)).sum();
        let replaced: usize = self
            .values
            .get(index..)
            .unwrap_or_default()
            .iter()
            .take(elements.len())
            .map(|v| self.element_size(v))
            .sum();

        // Saturates, so that absurd indices still report an overflow.
        let size = padding
            .checked_mul(gap)
            .and_then(|p| p.checked_add(self.size()))
            .and_then(|s| s.checked_add(added))
            .map_or(usize::MAX, |s| s - replaced);

        if size > MAX_FIELD_SIZE {
            Err(FieldError::SizeOverflow { size })?;
        }

        // Bounded by the size check above.
        let end = index + elements.len();

        if self.values.len() < end {
            self.values.resize(end, self.base_type.invalid_value());
        }
        for (slot, value) in self.values[index..end].iter_mut().zip(elements) {
            *slot = value;
        }

        Ok(())
    }

    /// Replace the elements with those decoded from `r`, which holds data of
    /// type `base_type`.
    ///
    /// Elements are coerced into the field's own base type. String data is
    /// split on terminators: trailing terminators are dropped, while leading
    /// or repeated ones produce empty slots.
    pub fn read(&mut self, r: &[u8], base_type: BaseType, is_little_endian: bool) {
        self.values.clear();

        let decoded: Vec<Value> = if base_type.is_string() {
            let end = r.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);

            if end == 0 {
                vec![base_type.invalid_value()]
            } else {
                r[..end]
                    .split(|b| *b == 0)
                    .map(|s| Value::String(String::from_utf8_lossy(s).into_owned()))
                    .collect()
            }
        } else {
            r.chunks_exact(base_type.size())
                .map(|c| {
                    base_type
                        .decode(c, is_little_endian)
                        .unwrap_or_else(|| base_type.invalid_value())
                })
                .collect()
        };

        for value in decoded {
            let value = if base_type == self.base_type {
                value
            } else if base_type.is_invalid(&value) {
                self.base_type.invalid_value()
            } else {
                self.base_type.correct_range_and_type(&value)
            };

            self.values.push(value);
        }
    }

    /// Write every element, invalid markers included, in wire order.
    pub fn write(&self, w: &mut Vec<u8>) {
        for value in &self.values {
            self.base_type.encode(value, w);
        }
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.num == other.num
            && self.base_type == other.base_type
            && self.scale.to_bits() == other.scale.to_bits()
            && self.offset.to_bits() == other.offset.to_bits()
            && self.units == other.units
            && self.values == other.values
    }
}

/// An alternate interpretation of a field, selected by the values of other
/// fields in the same message.
#[derive(Debug, Clone, PartialEq)]
pub struct SubField {
    name: String,
    base_type: BaseType,
    scale: f64,
    offset: f64,
    units: String,
    maps: Vec<SubFieldMap>,
}

/// A constraint on a reference field: its first raw value must be one of
/// those listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubFieldMap {
    pub ref_field_num: u8,
    pub ref_field_values: Vec<i64>,
}

impl SubField {
    pub fn new(
        name: impl Into<String>,
        base_type: BaseType,
        scale: f64,
        offset: f64,
        units: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_type,
            scale,
            offset,
            units: units.into(),
            maps: Vec::new(),
        }
    }

    /// Add a constraint on a reference field.
    pub fn with_map(mut self, ref_field_num: u8, ref_field_values: impl IntoIterator<Item = i64>) -> Self {
        self.maps.push(SubFieldMap {
            ref_field_num,
            ref_field_values: ref_field_values.into_iter().collect(),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
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

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn maps(&self) -> &[SubFieldMap] {
        &self.maps
    }

    /// Whether every reference constraint holds against the message's current
    /// field values.
    pub fn can_mesg_support(&self, mesg: &Mesg) -> bool {
        !self.maps.is_empty() && self.maps.iter().all(|m| m.is_satisfied_by(mesg))
    }
}

impl SubFieldMap {
    fn is_satisfied_by(&self, mesg: &Mesg) -> bool {
        mesg.field(self.ref_field_num)
            .and_then(|f| f.raw_value(0))
            .and_then(Value::as_i128)
            .is_some_and(|v| self.ref_field_values.iter().any(|x| i128::from(*x) == v))
    }
}

/// A run of bits within a field that expands into another field.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Target field number.
    pub field_num: u8,
    pub bits: u8,
    pub scale: f64,
    pub offset: f64,
    /// Whether successive samples roll over into a running total.
    pub accumulate: bool,
}

impl Component {
    pub fn new(field_num: u8, bits: u8, scale: f64, offset: f64, accumulate: bool) -> Self {
        Self {
            field_num,
            bits,
            scale,
            offset,
            accumulate,
        }
    }

    /// Convert a raw bit sample into the target field's units.
    pub fn convert(&self, raw: u64) -> f64 {
        if is_transformed(self.scale, self.offset) {
            raw as f64 / nonzero(self.scale) - self.offset
        } else {
            raw as f64
        }
    }
}

fn is_transformed(scale: f64, offset: f64) -> bool {
    scale != 1.0 || offset != 0.0
}

fn nonzero(scale: f64) -> f64 {
    if scale == 0.0 { 1.0 } else { scale }
}

/// Round half away from zero.
fn round(x: f64) -> f64 {
    // Every float of this magnitude is already integral.
    const LIMIT: f64 = 4_503_599_627_370_496.0;

    if !x.is_finite() || !(-LIMIT..LIMIT).contains(&x) {
        return x;
    }

    let t = x as i64 as f64;
    match x - t {
        d if d >= 0.5 => t + 1.0,
        d if d <= -0.5 => t - 1.0,
        _ => t,
    }
}
