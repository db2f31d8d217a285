use sprocket::{BitStream, bit_stream::BitStreamError};

#[test]
fn read_bit_from_bytes() {
    let mut stream = BitStream::from_values(&[0xAAu8, 0xFF]);
    let expected = [0, 1, 0, 1, 0, 1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1];

    for (i, bit) in expected.into_iter().enumerate() {
        assert!(stream.has_bits_available());
        assert_eq!(stream.bits_available(), expected.len() - i);
        assert_eq!(stream.read_bit().unwrap(), bit);
    }

    assert!(!stream.has_bits_available());
}

#[test]
fn read_bit_from_integer() {
    let mut stream = BitStream::from_value(0xAAFFu16);
    let expected = [1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 0, 1, 0, 1, 0, 1];

    for bit in expected {
        assert_eq!(stream.read_bit().unwrap(), bit);
    }
}

#[test]
fn read_bits_splits_a_byte() {
    let mut stream = BitStream::from_value(0xABu8);

    assert_eq!(stream.read_bits(4).unwrap(), 0xB);
    assert_eq!(stream.read_bits(1).unwrap(), 0x0);
    assert_eq!(stream.read_bits(1).unwrap(), 0x1);
    assert_eq!(stream.read_bits(1).unwrap(), 0x0);
    assert_eq!(stream.read_bits(1).unwrap(), 0x1);
}

#[test]
fn read_bits_across_chunks() {
    let mut stream = BitStream::from_values(&[0xAAu8, 0xCB, 0xDE, 0xFF]);
    assert_eq!(stream.read_bits(16).unwrap(), 0xCBAA);
    assert_eq!(stream.read_bits(16).unwrap(), 0xFFDE);

    stream.reset();
    assert_eq!(stream.read_bits(32).unwrap(), 0xFFDECBAA);

    let mut stream = BitStream::from_values(&[0xABCDu16, 0xEF01]);
    assert_eq!(stream.read_bits(32).unwrap(), 0xEF01ABCD);
}

#[test]
fn read_bits_within_wide_integers() {
    let mut stream = BitStream::from_value(0xABCDEF01u32);
    assert_eq!(stream.read_bits(16).unwrap(), 0xEF01);
    assert_eq!(stream.read_bits(16).unwrap(), 0xABCD);

    let mut stream = BitStream::from_value(0xABCDEF0123456789u64);
    assert_eq!(stream.read_bits(32).unwrap(), 0x23456789);
    assert_eq!(stream.read_bits(32).unwrap(), 0xABCDEF01);

    let mut stream = BitStream::from_value(0x7BCDEF0123456789u64);
    assert_eq!(stream.read_bits(64).unwrap(), 0x7BCDEF0123456789);
}

#[test]
fn read_past_end_fails() {
    let mut stream = BitStream::from_value(0xABCDEFFFu32);
    stream.read_bits(32).unwrap();
    assert_eq!(stream.read_bits(2), Err(BitStreamError::EndOfStream));

    let mut stream = BitStream::from_value(0xABu8);
    stream.read_bits(8).unwrap();
    assert_eq!(stream.read_bit(), Err(BitStreamError::EndOfStream));
}

#[test]
fn failed_read_consumes_nothing() {
    let mut stream = BitStream::from_value(0xABu8);
    stream.read_bits(4).unwrap();

    assert_eq!(stream.read_bits(5), Err(BitStreamError::EndOfStream));
    assert_eq!(stream.read_bits(4).unwrap(), 0xA);
}

#[test]
fn read_more_than_64_bits_fails() {
    let mut stream = BitStream::from_values(&[u64::MAX, u64::MAX]);
    assert_eq!(stream.read_bits(65), Err(BitStreamError::BitCount(65)));
    assert_eq!(stream.bits_available(), 128);
}

#[test]
fn read_zero_bits_fails() {
    let mut stream = BitStream::from_value(0xFFu8);
    assert_eq!(stream.read_bits(0), Err(BitStreamError::BitCount(0)));
    assert_eq!(stream.bits_available(), 8);
    assert_eq!(stream.read_bits(8), Ok(0xFF));
}
