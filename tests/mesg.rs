use sprocket::{
    Mesg, MesgError, SubFieldIndex, Value,
    profile::{self, file_id, mesg_num, workout_step},
};

fn set(mesg: &mut Mesg, num: u8, value: impl Into<Value>, sub: SubFieldIndex) -> Result<(), MesgError> {
    mesg.set_field_value(num, 0, Some(value.into()), sub)
}

fn workout_step() -> Mesg {
    profile::mesg(mesg_num::WORKOUT_STEP)
}

#[test]
fn profile_names_messages() {
    assert_eq!(profile::mesg(mesg_num::FILE_ID).name(), "file_id");
    assert_eq!(profile::mesg(mesg_num::RECORD).name(), "record");
    assert_eq!(profile::mesg(0xFF00).name(), "unknown");
}

#[test]
fn set_field_instantiates_from_profile() {
    let mut mesg = profile::mesg(mesg_num::RECORD);
    set(&mut mesg, profile::record::ALTITUDE, 20.0, SubFieldIndex::MainField).unwrap();

    let field = mesg.field(profile::record::ALTITUDE).unwrap();
    assert_eq!(field.name(), "altitude");
    assert_eq!(field.units(), "m");
    assert_eq!(field.raw_value(0), Some(&Value::U16(2600)));
    assert_eq!(mesg.field_by_name("altitude"), Some(field));
}

#[test]
fn set_unknown_field_fails() {
    let mut mesg = profile::mesg(mesg_num::RECORD);

    assert_eq!(
        set(&mut mesg, 200, 1u8, SubFieldIndex::MainField),
        Err(MesgError::UnknownField(200))
    );
    assert_eq!(mesg.num_fields(), 0);
}

#[test]
fn string_field_stringifies_numbers() {
    let mut mesg = profile::mesg(mesg_num::FILE_ID);
    set(&mut mesg, file_id::PRODUCT_NAME, 1234u16, SubFieldIndex::MainField).unwrap();

    assert_eq!(
        mesg.get_field_value(file_id::PRODUCT_NAME, 0, SubFieldIndex::MainField),
        Some(Value::from("1234"))
    );
}

#[test]
fn set_field_replaces_in_place() {
    let mut mesg = profile::mesg(mesg_num::FILE_ID);
    set(&mut mesg, file_id::TYPE, 4u8, SubFieldIndex::MainField).unwrap();
    set(&mut mesg, file_id::NUMBER, 1u16, SubFieldIndex::MainField).unwrap();

    let mut field = profile::field(mesg_num::FILE_ID, file_id::TYPE).unwrap();
    field.set_value(5u8).unwrap();
    mesg.set_field(field);

    let nums: Vec<u8> = mesg.fields().iter().map(|f| f.num()).collect();
    assert_eq!(nums, [file_id::TYPE, file_id::NUMBER]);
    assert_eq!(mesg.field(file_id::TYPE).unwrap().value(), Some(Value::U8(5)));

    assert!(mesg.remove_field(file_id::TYPE).is_some());
    assert!(!mesg.has_field(file_id::TYPE));
}

#[test]
fn product_subfield_without_manufacturer_fails() {
    let mut mesg = profile::mesg(mesg_num::FILE_ID);
    let garmin = SubFieldIndex::Index(file_id::GARMIN_PRODUCT);

    assert_eq!(
        set(&mut mesg, file_id::PRODUCT, 4536u16, garmin),
        Err(MesgError::SubFieldNotSupported {
            field: file_id::PRODUCT,
            sub_field: file_id::GARMIN_PRODUCT,
        })
    );
}

#[test]
fn product_subfield_with_other_manufacturer_fails() {
    let mut mesg = profile::mesg(mesg_num::FILE_ID);
    let garmin = SubFieldIndex::Index(file_id::GARMIN_PRODUCT);

    let development = file_id::MANUFACTURER_DEVELOPMENT as u16;
    set(&mut mesg, file_id::MANUFACTURER, development, SubFieldIndex::MainField).unwrap();

    assert!(set(&mut mesg, file_id::PRODUCT, 4536u16, garmin).is_err());
}

#[test]
fn product_subfield_with_garmin_manufacturer() {
    let mut mesg = profile::mesg(mesg_num::FILE_ID);
    let garmin = SubFieldIndex::Index(file_id::GARMIN_PRODUCT);
    let favero = SubFieldIndex::Index(file_id::FAVERO_PRODUCT);

    let manufacturer = file_id::MANUFACTURER_GARMIN as u16;
    set(&mut mesg, file_id::MANUFACTURER, manufacturer, SubFieldIndex::MainField).unwrap();
    set(&mut mesg, file_id::PRODUCT, 4536u16, garmin).unwrap();

    let product = mesg.field(file_id::PRODUCT).unwrap();
    assert!(!product.sub_field(file_id::FAVERO_PRODUCT).unwrap().can_mesg_support(&mesg));
    assert!(product.sub_field(file_id::GARMIN_PRODUCT).unwrap().can_mesg_support(&mesg));

    assert_eq!(mesg.sub_field_index(file_id::PRODUCT, "garmin_product"), Some(file_id::GARMIN_PRODUCT));
    assert_eq!(mesg.active_sub_field_index(file_id::PRODUCT), Some(file_id::GARMIN_PRODUCT));

    assert_eq!(mesg.get_field_value(file_id::PRODUCT, 0, garmin), Some(Value::U16(4536)));
    assert_eq!(mesg.get_field_value(file_id::PRODUCT, 0, favero), None);
    assert_eq!(
        mesg.get_field_value(file_id::PRODUCT, 0, SubFieldIndex::MainField),
        Some(Value::U16(4536))
    );
}

#[test]
fn subfield_scale_is_applied() {
    let mut mesg = workout_step();
    let time = SubFieldIndex::Index(workout_step::DURATION_TIME);

    let duration_type = workout_step::DURATION_TYPE_TIME as u8;
    set(&mut mesg, workout_step::DURATION_TYPE, duration_type, SubFieldIndex::MainField).unwrap();
    set(&mut mesg, workout_step::DURATION_VALUE, 1u32, time).unwrap();

    assert_eq!(mesg.get_field_value(workout_step::DURATION_VALUE, 0, time), Some(Value::F64(1.0)));
    assert_eq!(
        mesg.get_field_value(workout_step::DURATION_VALUE, 0, SubFieldIndex::MainField),
        Some(Value::U32(1000))
    );

    set(&mut mesg, workout_step::DURATION_VALUE, 0.01, time).unwrap();

    assert_eq!(mesg.get_field_value(workout_step::DURATION_VALUE, 0, time), Some(Value::F64(0.01)));
    assert_eq!(
        mesg.get_field_value(workout_step::DURATION_VALUE, 0, SubFieldIndex::MainField),
        Some(Value::U32(10))
    );
}

#[test]
fn active_subfield_follows_reference_field() {
    let mut mesg = workout_step();
    let (time, distance) = (
        SubFieldIndex::Index(workout_step::DURATION_TIME),
        SubFieldIndex::Index(workout_step::DURATION_DISTANCE),
    );

    let duration_type = workout_step::DURATION_TYPE_DISTANCE as u8;
    set(&mut mesg, workout_step::DURATION_TYPE, duration_type, SubFieldIndex::MainField).unwrap();
    set(&mut mesg, workout_step::DURATION_VALUE, 1u32, distance).unwrap();

    let active = mesg.get_field_value(workout_step::DURATION_VALUE, 0, SubFieldIndex::Active);
    assert_eq!(active, Some(Value::F64(1.0)));
    assert_eq!(
        mesg.active_sub_field_index(workout_step::DURATION_VALUE),
        Some(workout_step::DURATION_DISTANCE)
    );

    assert_eq!(mesg.get_field_value(workout_step::DURATION_VALUE, 0, time), None);
    assert_eq!(mesg.get_field_value(workout_step::DURATION_VALUE, 0, distance), active);
    assert_eq!(
        mesg.get_field_value(workout_step::DURATION_VALUE, 0, SubFieldIndex::MainField),
        Some(Value::U32(100))
    );

    // Changing the reference field changes how the same raw value reads.
    let duration_type = workout_step::DURATION_TYPE_CALORIES as u8;
    set(&mut mesg, workout_step::DURATION_TYPE, duration_type, SubFieldIndex::MainField).unwrap();

    assert_eq!(
        mesg.active_sub_field_index(workout_step::DURATION_VALUE),
        Some(workout_step::DURATION_CALORIES)
    );
    assert_eq!(
        mesg.get_field_value(workout_step::DURATION_VALUE, 0, SubFieldIndex::Active),
        Some(Value::U32(100))
    );

    // Untyped writes go through the active subfield.
    let duration_type = workout_step::DURATION_TYPE_TIME as u8;
    set(&mut mesg, workout_step::DURATION_TYPE, duration_type, SubFieldIndex::MainField).unwrap();
    set(&mut mesg, workout_step::DURATION_VALUE, 2.5, SubFieldIndex::Active).unwrap();

    assert_eq!(
        mesg.get_field_value(workout_step::DURATION_VALUE, 0, SubFieldIndex::MainField),
        Some(Value::U32(2500))
    );
}

#[test]
fn active_subfield_without_match_uses_main_field() {
    let mut mesg = workout_step();
    set(&mut mesg, workout_step::DURATION_VALUE, 7u32, SubFieldIndex::Active).unwrap();

    assert_eq!(mesg.active_sub_field_index(workout_step::DURATION_VALUE), None);
    assert_eq!(
        mesg.get_field_value(workout_step::DURATION_VALUE, 0, SubFieldIndex::Active),
        Some(Value::U32(7))
    );
}

#[test]
fn subfield_with_incompatible_reference_fails() {
    let mut mesg = workout_step();
    let distance = SubFieldIndex::Index(workout_step::DURATION_DISTANCE);

    assert!(set(&mut mesg, workout_step::DURATION_VALUE, 1u32, distance).is_err());

    let duration_type = workout_step::DURATION_TYPE_TIME as u8;
    set(&mut mesg, workout_step::DURATION_TYPE, duration_type, SubFieldIndex::MainField).unwrap();

    assert!(set(&mut mesg, workout_step::DURATION_VALUE, 1u32, distance).is_err());
    assert_eq!(
        set(&mut mesg, workout_step::DURATION_VALUE, 1u32, SubFieldIndex::Index(9)),
        Err(MesgError::UnknownSubField {
            field: workout_step::DURATION_VALUE,
            sub_field: 9,
        })
    );
}

#[test]
fn subfield_metadata() {
    let field = profile::field(mesg_num::WORKOUT_STEP, workout_step::DURATION_VALUE).unwrap();
    let time = field.sub_field(workout_step::DURATION_TIME).unwrap();

    assert_eq!(field.name(), "duration_value");
    assert_eq!(field.units(), "");
    assert_eq!(time.name(), "duration_time");
    assert_eq!(time.units(), "s");
    assert_eq!(time.base_type(), field.base_type());
    assert_eq!(field.sub_field_index("duration_time"), Some(workout_step::DURATION_TIME));
}

#[test]
fn clone_is_deep() {
    let mut mesg = workout_step();
    set(&mut mesg, workout_step::WKT_STEP_NAME, "Warm up", SubFieldIndex::MainField).unwrap();

    let mut copy = mesg.clone();
    set(&mut copy, workout_step::WKT_STEP_NAME, "Cool down", SubFieldIndex::MainField).unwrap();

    assert_eq!(
        mesg.get_field_value(workout_step::WKT_STEP_NAME, 0, SubFieldIndex::MainField),
        Some(Value::from("Warm up"))
    );
    assert_ne!(mesg, copy);
}
