#![cfg(feature = "std")]

use std::path::Path;

use csv::ReaderBuilder;
use sprocket::{Decoder, Mesg, MesgListener, ReaderSource, Value};

#[test]
fn decode_slice_activity() {
    const PATH: &str = "fixtures/activity.fit";
    let data = std::fs::read(PATH).unwrap();
    let mut validator = Validator::new(PATH);

    let mut decoder = Decoder::new(data.as_slice());
    decoder.add_mesg_listener(|m: &Mesg| validator.validate(m));
    decoder.read().unwrap();
    drop(decoder);

    validator.finish();
}

#[test]
fn decode_reader_activity() {
    const PATH: &str = "fixtures/activity.fit";
    let file = std::fs::File::open(PATH).unwrap();
    let mut validator = Validator::new(PATH);

    let mut decoder = Decoder::new(ReaderSource(file));
    decoder.add_mesg_listener(|m: &Mesg| validator.validate(m));
    decoder.read().unwrap();
    drop(decoder);

    validator.finish();
}

#[test]
fn transcode_activity() {
    const PATH: &str = "fixtures/activity.fit";
    let data = std::fs::read(PATH).unwrap();

    let mut encoder = sprocket::Encoder::new();
    let mut decoder = Decoder::new(data.as_slice());
    decoder.add_mesg_listener(|m: &Mesg| encoder.on_mesg(m));
    decoder.read().unwrap();
    drop(decoder);

    let transcoded = encoder.close();
    assert!(sprocket::check_integrity(&transcoded));

    let mut validator = Validator::new(PATH);
    let mut decoder = Decoder::new(transcoded.as_slice());
    decoder.add_mesg_listener(|m: &Mesg| validator.validate(m));
    decoder.read().unwrap();
    drop(decoder);

    validator.finish();
}

#[test]
fn decode_activity_developer_fields() {
    let data = std::fs::read("fixtures/activity.fit").unwrap();
    let mut records = Vec::new();

    let mut decoder = Decoder::new(data.as_slice());
    decoder.add_mesg_listener(|m: &Mesg| {
        if m.num() == sprocket::profile::mesg_num::RECORD {
            records.push(m.clone());
        }
    });
    decoder.read().unwrap();
    drop(decoder);

    let field = records[0].developer_field(0, 0).unwrap();
    assert_eq!(field.name(), "doughnuts");
    assert_eq!(field.units(), "count");
    assert_eq!(field.value(), Some(Value::U8(3)));

    // Present, but holding the invalid marker.
    let field = records[3].developer_field(0, 0).unwrap();
    assert_eq!(field.value(), None);

    assert!(records[1].developer_fields().is_empty());
}

/// Compares decoded messages against rows of a CSV file: the global message
/// number, then each field number followed by its raw values.
struct Validator(Vec<Vec<String>>);

impl Validator {
    fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().with_extension("csv");

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_path(path)
            .unwrap();

        let expected: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(|f| f.to_string()).collect())
            .collect();

        Self(expected)
    }

    fn finish(&self) {
        assert!(self.0.is_empty(), "{} messages not received", self.0.len());
    }

    fn validate(&mut self, mesg: &Mesg) {
        let mut found = vec![mesg.num().to_string()];

        for field in mesg.fields() {
            found.push(field.num().to_string());
            found.extend(field.raw_values().iter().map(|v| v.to_string()));
        }

        assert_eq!(found, self.0.remove(0));
    }
}
