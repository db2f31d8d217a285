//! Reconstruction of wide counters from narrow, wrapping samples.

use alloc::collections::BTreeMap;

#[derive(Debug, Clone, Copy)]
struct AccumulatedField {
    last_value: u64,
    accumulated_value: u64,
}

/// Running totals, keyed by global message and field number.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    fields: BTreeMap<(u16, u8), AccumulatedField>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed (or reset) the running total for a field.
    pub fn create_accumulated_field(&mut self, mesg_num: u16, field_num: u8, value: u64) {
        self.fields.insert(
            (mesg_num, field_num),
            AccumulatedField {
                last_value: value,
                accumulated_value: value,
            },
        );
    }

    pub fn contains(&self, mesg_num: u16, field_num: u8) -> bool {
        self.fields.contains_key(&(mesg_num, field_num))
    }

    /// Add a `bits`-wide sample to the running total for a field.
    ///
    /// The sample is assumed to have wrapped at most once since the last one.
    /// Returns the new total, or `None` if the field was never seeded.
    pub fn accumulate(&mut self, mesg_num: u16, field_num: u8, value: u64, bits: u8) -> Option<u64> {
        let field = self.fields.get_mut(&(mesg_num, field_num))?;

        let mask = match bits {
            64.. => u64::MAX,
            _ => (1 << bits) - 1,
        };

        let delta = value.wrapping_sub(field.last_value) & mask;
        field.accumulated_value = field.accumulated_value.wrapping_add(delta);
        field.last_value = value;

        Some(field.accumulated_value)
    }
}
