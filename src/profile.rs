//! Built-in schema for the messages the codec itself depends on.
//!
//! This is a small excerpt of the global profile: enough to identify files,
//! carry developer data, and exercise subfields and components. Messages and
//! fields missing from it decode as `unknown`, with no scale or offset.

use alloc::vec;

use crate::{
    base_type::BaseType,
    field::{Component, Field, SubField},
    mesg::Mesg,
};

/// Global message numbers.
pub mod mesg_num {
    pub const FILE_ID: u16 = 0;
    pub const RECORD: u16 = 20;
    pub const WORKOUT_STEP: u16 = 27;
    pub const FIELD_DESCRIPTION: u16 = 206;
    pub const DEVELOPER_DATA_ID: u16 = 207;
}

/// Field number of the timestamp common to all messages.
pub const TIMESTAMP: u8 = 253;

pub mod file_id {
    pub const TYPE: u8 = 0;
    pub const MANUFACTURER: u8 = 1;
    pub const PRODUCT: u8 = 2;
    pub const SERIAL_NUMBER: u8 = 3;
    pub const TIME_CREATED: u8 = 4;
    pub const NUMBER: u8 = 5;
    pub const PRODUCT_NAME: u8 = 8;

    /// Subfields of `product`.
    pub const FAVERO_PRODUCT: usize = 0;
    pub const GARMIN_PRODUCT: usize = 1;

    /// `manufacturer` values.
    pub const MANUFACTURER_GARMIN: i64 = 1;
    pub const MANUFACTURER_DYNASTREAM_OEM: i64 = 13;
    pub const MANUFACTURER_DYNASTREAM: i64 = 15;
    pub const MANUFACTURER_TACX: i64 = 89;
    pub const MANUFACTURER_DEVELOPMENT: i64 = 255;
    pub const MANUFACTURER_FAVERO_ELECTRONICS: i64 = 263;

    /// `type` values.
    pub const TYPE_ACTIVITY: u8 = 4;
    pub const TYPE_WORKOUT: u8 = 5;
}

pub mod record {
    pub const POSITION_LAT: u8 = 0;
    pub const POSITION_LONG: u8 = 1;
    pub const ALTITUDE: u8 = 2;
    pub const HEART_RATE: u8 = 3;
    pub const CADENCE: u8 = 4;
    pub const DISTANCE: u8 = 5;
    pub const SPEED: u8 = 6;
    pub const COMPRESSED_SPEED_DISTANCE: u8 = 8;
    pub const TEMPERATURE: u8 = 13;
    pub const CYCLES: u8 = 18;
    pub const TOTAL_CYCLES: u8 = 19;
}

pub mod workout_step {
    pub const WKT_STEP_NAME: u8 = 0;
    pub const DURATION_TYPE: u8 = 1;
    pub const DURATION_VALUE: u8 = 2;
    pub const TARGET_TYPE: u8 = 3;
    pub const TARGET_VALUE: u8 = 4;

    /// Subfields of `duration_value`.
    pub const DURATION_TIME: usize = 0;
    pub const DURATION_DISTANCE: usize = 1;
    pub const DURATION_HR: usize = 2;
    pub const DURATION_CALORIES: usize = 3;

    /// `duration_type` values.
    pub const DURATION_TYPE_TIME: i64 = 0;
    pub const DURATION_TYPE_DISTANCE: i64 = 1;
    pub const DURATION_TYPE_HR_LESS_THAN: i64 = 2;
    pub const DURATION_TYPE_HR_GREATER_THAN: i64 = 3;
    pub const DURATION_TYPE_CALORIES: i64 = 4;
    pub const DURATION_TYPE_REPETITION_TIME: i64 = 28;
}

pub mod field_description {
    pub const DEVELOPER_DATA_INDEX: u8 = 0;
    pub const FIELD_DEFINITION_NUMBER: u8 = 1;
    pub const FIT_BASE_TYPE_ID: u8 = 2;
    pub const FIELD_NAME: u8 = 3;
    pub const ARRAY: u8 = 4;
    pub const COMPONENTS: u8 = 5;
    pub const SCALE: u8 = 6;
    pub const OFFSET: u8 = 7;
    pub const UNITS: u8 = 8;
    pub const BITS: u8 = 9;
    pub const ACCUMULATE: u8 = 10;
    pub const FIT_BASE_UNIT_ID: u8 = 13;
    pub const NATIVE_MESG_NUM: u8 = 14;
    pub const NATIVE_FIELD_NUM: u8 = 15;
}

pub mod developer_data_id {
    pub const DEVELOPER_ID: u8 = 0;
    pub const APPLICATION_ID: u8 = 1;
    pub const MANUFACTURER_ID: u8 = 2;
    pub const DEVELOPER_DATA_INDEX: u8 = 3;
    pub const APPLICATION_VERSION: u8 = 4;
}

/// Name of a global message, if it is in the profile.
pub fn mesg_name(num: u16) -> Option<&'static str> {
    Some(match num {
        mesg_num::FILE_ID => "file_id",
        mesg_num::RECORD => "record",
        mesg_num::WORKOUT_STEP => "workout_step",
        mesg_num::FIELD_DESCRIPTION => "field_description",
        mesg_num::DEVELOPER_DATA_ID => "developer_data_id",
        _ => return None,
    })
}

/// An empty message of a global message number.
pub fn mesg(num: u16) -> Mesg {
    Mesg::new(mesg_name(num).unwrap_or("unknown"), num)
}

fn plain(name: &str, num: u8, base_type: BaseType, units: &str) -> Field {
    Field::new(name, num, base_type, 1.0, 0.0, units, false)
}

fn scaled(name: &str, num: u8, base_type: BaseType, scale: f64, offset: f64, units: &str) -> Field {
    Field::new(name, num, base_type, scale, offset, units, false)
}

/// A fresh, empty field of a message, if it is in the profile.
pub fn field(mesg_num: u16, field_num: u8) -> Option<Field> {
    use BaseType as B;

    Some(match (mesg_num, field_num) {
        (mesg_num::FILE_ID, file_id::TYPE) => plain("type", field_num, B::Enum, ""),
        (mesg_num::FILE_ID, file_id::MANUFACTURER) => plain("manufacturer", field_num, B::Uint16, ""),
        (mesg_num::FILE_ID, file_id::PRODUCT) => plain("product", field_num, B::Uint16, "").with_sub_fields(vec![
            SubField::new("favero_product", B::Uint16, 1.0, 0.0, "")
                .with_map(file_id::MANUFACTURER, [file_id::MANUFACTURER_FAVERO_ELECTRONICS]),
            SubField::new("garmin_product", B::Uint16, 1.0, 0.0, "").with_map(
                file_id::MANUFACTURER,
                [
                    file_id::MANUFACTURER_GARMIN,
                    file_id::MANUFACTURER_DYNASTREAM,
                    file_id::MANUFACTURER_DYNASTREAM_OEM,
                    file_id::MANUFACTURER_TACX,
                ],
            ),
        ]),
        (mesg_num::FILE_ID, file_id::SERIAL_NUMBER) => plain("serial_number", field_num, B::Uint32z, ""),
        (mesg_num::FILE_ID, file_id::TIME_CREATED) => plain("time_created", field_num, B::Uint32, ""),
        (mesg_num::FILE_ID, file_id::NUMBER) => plain("number", field_num, B::Uint16, ""),
        (mesg_num::FILE_ID, file_id::PRODUCT_NAME) => plain("product_name", field_num, B::String, ""),

        (mesg_num::RECORD, record::POSITION_LAT) => plain("position_lat", field_num, B::Sint32, "semicircles"),
        (mesg_num::RECORD, record::POSITION_LONG) => plain("position_long", field_num, B::Sint32, "semicircles"),
        (mesg_num::RECORD, record::ALTITUDE) => scaled("altitude", field_num, B::Uint16, 5.0, 500.0, "m"),
        (mesg_num::RECORD, record::HEART_RATE) => plain("heart_rate", field_num, B::Uint8, "bpm"),
        (mesg_num::RECORD, record::CADENCE) => plain("cadence", field_num, B::Uint8, "rpm"),
        (mesg_num::RECORD, record::DISTANCE) => scaled("distance", field_num, B::Uint32, 100.0, 0.0, "m"),
        (mesg_num::RECORD, record::SPEED) => scaled("speed", field_num, B::Uint16, 1000.0, 0.0, "m/s"),
        (mesg_num::RECORD, record::COMPRESSED_SPEED_DISTANCE) => {
            plain("compressed_speed_distance", field_num, B::Byte, "").with_components(vec![
                Component::new(record::SPEED, 12, 100.0, 0.0, false),
                Component::new(record::DISTANCE, 12, 16.0, 0.0, true),
            ])
        }
        (mesg_num::RECORD, record::TEMPERATURE) => plain("temperature", field_num, B::Sint8, "C"),
        (mesg_num::RECORD, record::CYCLES) => plain("cycles", field_num, B::Uint8, "cycles")
            .with_components(vec![Component::new(record::TOTAL_CYCLES, 8, 1.0, 0.0, true)]),
        (mesg_num::RECORD, record::TOTAL_CYCLES) => {
            Field::new("total_cycles", field_num, B::Uint32, 1.0, 0.0, "cycles", true)
        }

        (mesg_num::WORKOUT_STEP, workout_step::WKT_STEP_NAME) => plain("wkt_step_name", field_num, B::String, ""),
        (mesg_num::WORKOUT_STEP, workout_step::DURATION_TYPE) => plain("duration_type", field_num, B::Enum, ""),
        (mesg_num::WORKOUT_STEP, workout_step::DURATION_VALUE) => {
            plain("duration_value", field_num, B::Uint32, "").with_sub_fields(vec![
                SubField::new("duration_time", B::Uint32, 1000.0, 0.0, "s").with_map(
                    workout_step::DURATION_TYPE,
                    [
                        workout_step::DURATION_TYPE_TIME,
                        workout_step::DURATION_TYPE_REPETITION_TIME,
                    ],
                ),
                SubField::new("duration_distance", B::Uint32, 100.0, 0.0, "m")
                    .with_map(workout_step::DURATION_TYPE, [workout_step::DURATION_TYPE_DISTANCE]),
                SubField::new("duration_hr", B::Uint32, 1.0, 0.0, "% or bpm").with_map(
                    workout_step::DURATION_TYPE,
                    [
                        workout_step::DURATION_TYPE_HR_LESS_THAN,
                        workout_step::DURATION_TYPE_HR_GREATER_THAN,
                    ],
                ),
                SubField::new("duration_calories", B::Uint32, 1.0, 0.0, "calories")
                    .with_map(workout_step::DURATION_TYPE, [workout_step::DURATION_TYPE_CALORIES]),
            ])
        }
        (mesg_num::WORKOUT_STEP, workout_step::TARGET_TYPE) => plain("target_type", field_num, B::Enum, ""),
        (mesg_num::WORKOUT_STEP, workout_step::TARGET_VALUE) => plain("target_value", field_num, B::Uint32, ""),

        (mesg_num::FIELD_DESCRIPTION, field_description::DEVELOPER_DATA_INDEX) => {
            plain("developer_data_index", field_num, B::Uint8, "")
        }
        (mesg_num::FIELD_DESCRIPTION, field_description::FIELD_DEFINITION_NUMBER) => {
            plain("field_definition_number", field_num, B::Uint8, "")
        }
        (mesg_num::FIELD_DESCRIPTION, field_description::FIT_BASE_TYPE_ID) => {
            plain("fit_base_type_id", field_num, B::Uint8, "")
        }
        (mesg_num::FIELD_DESCRIPTION, field_description::FIELD_NAME) => plain("field_name", field_num, B::String, ""),
        (mesg_num::FIELD_DESCRIPTION, field_description::ARRAY) => plain("array", field_num, B::Uint8, ""),
        (mesg_num::FIELD_DESCRIPTION, field_description::COMPONENTS) => plain("components", field_num, B::String, ""),
        (mesg_num::FIELD_DESCRIPTION, field_description::SCALE) => plain("scale", field_num, B::Uint8, ""),
        (mesg_num::FIELD_DESCRIPTION, field_description::OFFSET) => plain("offset", field_num, B::Sint8, ""),
        (mesg_num::FIELD_DESCRIPTION, field_description::UNITS) => plain("units", field_num, B::String, ""),
        (mesg_num::FIELD_DESCRIPTION, field_description::BITS) => plain("bits", field_num, B::String, ""),
        (mesg_num::FIELD_DESCRIPTION, field_description::ACCUMULATE) => plain("accumulate", field_num, B::String, ""),
        (mesg_num::FIELD_DESCRIPTION, field_description::FIT_BASE_UNIT_ID) => {
            plain("fit_base_unit_id", field_num, B::Uint16, "")
        }
        (mesg_num::FIELD_DESCRIPTION, field_description::NATIVE_MESG_NUM) => {
            plain("native_mesg_num", field_num, B::Uint16, "")
        }
        (mesg_num::FIELD_DESCRIPTION, field_description::NATIVE_FIELD_NUM) => {
            plain("native_field_num", field_num, B::Uint8, "")
        }

        (mesg_num::DEVELOPER_DATA_ID, developer_data_id::DEVELOPER_ID) => plain("developer_id", field_num, B::Byte, ""),
        (mesg_num::DEVELOPER_DATA_ID, developer_data_id::APPLICATION_ID) => {
            plain("application_id", field_num, B::Byte, "")
        }
        (mesg_num::DEVELOPER_DATA_ID, developer_data_id::MANUFACTURER_ID) => {
            plain("manufacturer_id", field_num, B::Uint16, "")
        }
        (mesg_num::DEVELOPER_DATA_ID, developer_data_id::DEVELOPER_DATA_INDEX) => {
            plain("developer_data_index", field_num, B::Uint8, "")
        }
        (mesg_num::DEVELOPER_DATA_ID, developer_data_id::APPLICATION_VERSION) => {
            plain("application_version", field_num, B::Uint32, "")
        }

        (_, TIMESTAMP) => plain("timestamp", field_num, B::Uint32, "s"),

        _ => return None,
    })
}
