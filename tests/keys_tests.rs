use granary::keys::{
    decode_bytes, decode_u16, decode_u64, due_time_job_key, encode_bytes, encode_u16, encode_u64,
    job_key, parse_due_time_job_key, parse_job_key, parse_type_job_key, type_job_key, type_prefix,
    KeyError,
};

#[test]
fn test_u64_roundtrip() {
    let mut buf = Vec::new();
    encode_u64(&mut buf, 0xDEAD_BEEF_CAFE_F00D);
    let (value, rest) = decode_u64(&buf, "test").unwrap();
    assert_eq!(value, 0xDEAD_BEEF_CAFE_F00D);
    assert!(rest.is_empty());
}

#[test]
fn test_u16_roundtrip() {
    let mut buf = Vec::new();
    encode_u16(&mut buf, 4);
    let (value, rest) = decode_u16(&buf, "test").unwrap();
    assert_eq!(value, 4);
    assert!(rest.is_empty());
}

#[test]
fn test_bytes_roundtrip() {
    let mut buf = Vec::new();
    encode_bytes(&mut buf, b"payment");
    encode_u64(&mut buf, 42);
    let (bytes, rest) = decode_bytes(&buf, "test").unwrap();
    assert_eq!(bytes, b"payment");
    let (value, rest) = decode_u64(rest, "test").unwrap();
    assert_eq!(value, 42);
    assert!(rest.is_empty());
}

#[test]
fn test_u64_order_matches_numeric_order() {
    // Big-endian encoding makes lexicographic order equal numeric order
    let mut smaller = Vec::new();
    let mut bigger = Vec::new();
    encode_u64(&mut smaller, 255);
    encode_u64(&mut bigger, 256);
    assert!(smaller < bigger);

    let mut max = Vec::new();
    encode_u64(&mut max, u64::MAX);
    assert!(bigger < max);
}

#[test]
fn test_job_key_roundtrip() {
    let key = job_key(77);
    assert_eq!(parse_job_key(&key).unwrap(), 77);
}

#[test]
fn test_type_job_key_roundtrip() {
    let key = type_job_key(b"payment", 42);
    let (job_type, job_key) = parse_type_job_key(&key).unwrap();
    assert_eq!(job_type, b"payment");
    assert_eq!(job_key, 42);
}

#[test]
fn test_type_job_key_ordering() {
    // Within one type, entries order by job key
    let key1 = type_job_key(b"payment", 1);
    let key2 = type_job_key(b"payment", 2);
    assert!(key1 < key2);
}

#[test]
fn test_type_prefix_scanning() {
    let key1 = type_job_key(b"payment", 1);
    let key2 = type_job_key(b"payment", 99);
    let prefix = type_prefix(b"payment");
    assert!(key1.starts_with(&prefix));
    assert!(key2.starts_with(&prefix));

    let other = type_job_key(b"shipping", 1);
    assert!(!other.starts_with(&prefix));
}

#[test]
fn test_type_prefix_does_not_match_longer_type() {
    // The length prefix keeps "pay" from matching "payment" entries
    let prefix = type_prefix(b"pay");
    let key = type_job_key(b"payment", 1);
    assert!(!key.starts_with(&prefix));
}

#[test]
fn test_due_time_job_key_roundtrip() {
    let key = due_time_job_key(2000, 42);
    let (due_time, job_key) = parse_due_time_job_key(&key).unwrap();
    assert_eq!(due_time, 2000);
    assert_eq!(job_key, 42);
}

#[test]
fn test_due_time_ordering() {
    // Earlier deadline first; ties break on job key
    let key1 = due_time_job_key(1000, 9);
    let key2 = due_time_job_key(1001, 1);
    let key3 = due_time_job_key(1000, 10);
    assert!(key1 < key2);
    assert!(key1 < key3);
    assert!(key3 < key2);
}

#[test]
fn test_truncated_u64_fails() {
    let err = decode_u64(&[1, 2, 3], "job key").unwrap_err();
    assert_eq!(err, KeyError::Truncated("job key"));
}

#[test]
fn test_truncated_bytes_fails() {
    // Length prefix says 10 bytes but only 2 follow
    let mut buf = Vec::new();
    buf.extend_from_slice(&10u32.to_be_bytes());
    buf.extend_from_slice(b"ab");
    assert!(decode_bytes(&buf, "job type").is_err());
}

#[test]
fn test_trailing_bytes_rejected() {
    let mut key = due_time_job_key(1000, 1);
    key.push(0xFF);
    let err = parse_due_time_job_key(&key).unwrap_err();
    assert_eq!(err, KeyError::TrailingBytes(1));
}

#[test]
fn test_parse_type_job_key_truncated() {
    let key = type_job_key(b"payment", 42);
    assert!(parse_type_job_key(&key[..key.len() - 1]).is_err());
}
