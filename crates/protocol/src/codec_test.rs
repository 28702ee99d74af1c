//! Wire codec tests

use crate::{
    read_filename, read_message_id, read_text_blob, read_u16, read_u32, write_filename,
    write_text_blob, write_u16, ProtocolError, FILENAME_FIELD_SIZE, MAX_BLOB_SIZE,
};

#[tokio::test]
async fn test_read_u16_little_endian() {
    let mut stream: &[u8] = &[0x02, 0x00];
    assert_eq!(read_u16(&mut stream).await.unwrap(), 2);

    let mut stream: &[u8] = &[0x34, 0x12];
    assert_eq!(read_u16(&mut stream).await.unwrap(), 0x1234);
}

#[tokio::test]
async fn test_read_u32_little_endian() {
    let mut stream: &[u8] = &[0x0a, 0x00, 0x00, 0x00];
    assert_eq!(read_u32(&mut stream).await.unwrap(), 10);
}

#[tokio::test]
async fn test_read_u16_truncated() {
    let mut stream: &[u8] = &[0x01];
    let err = read_u16(&mut stream).await.unwrap_err();
    assert!(matches!(err, ProtocolError::TruncatedRead { .. }));
}

#[tokio::test]
async fn test_read_message_id() {
    let mut stream: &[u8] = &[0x07, 0x00];
    assert_eq!(read_message_id(&mut stream).await.unwrap(), Some(7));
}

#[tokio::test]
async fn test_read_message_id_clean_eof() {
    let mut stream: &[u8] = &[];
    assert_eq!(read_message_id(&mut stream).await.unwrap(), None);
}

#[tokio::test]
async fn test_read_message_id_partial_is_truncated() {
    // One id byte then EOF is a cut-off message, not a disconnect
    let mut stream: &[u8] = &[0x07];
    let err = read_message_id(&mut stream).await.unwrap_err();
    assert!(matches!(err, ProtocolError::TruncatedRead { .. }));
}

#[tokio::test]
async fn test_filename_round_trip() {
    let mut buf = Vec::new();
    write_filename(&mut buf, "default.xml").await.unwrap();
    assert_eq!(buf.len(), FILENAME_FIELD_SIZE);

    let mut stream = buf.as_slice();
    assert_eq!(read_filename(&mut stream).await.unwrap(), "default.xml");
}

#[tokio::test]
async fn test_filename_without_nul_uses_full_field() {
    let buf = [b'a'; FILENAME_FIELD_SIZE];
    let mut stream = buf.as_slice();
    let name = read_filename(&mut stream).await.unwrap();
    assert_eq!(name.len(), FILENAME_FIELD_SIZE);
}

#[tokio::test]
async fn test_filename_short_field_is_truncated_read() {
    let buf = [0u8; 100];
    let mut stream = buf.as_slice();
    let err = read_filename(&mut stream).await.unwrap_err();
    assert!(matches!(err, ProtocolError::TruncatedRead { .. }));
}

#[tokio::test]
async fn test_filename_too_long_to_write() {
    let name = "x".repeat(FILENAME_FIELD_SIZE);
    let mut buf = Vec::new();
    let err = write_filename(&mut buf, &name).await.unwrap_err();
    assert!(matches!(err, ProtocolError::InvalidString { .. }));
}

#[tokio::test]
async fn test_text_blob_round_trip() {
    let mut buf = Vec::new();
    write_text_blob(&mut buf, "<configuration/>").await.unwrap();

    let mut stream = buf.as_slice();
    assert_eq!(read_text_blob(&mut stream).await.unwrap(), "<configuration/>");
}

#[tokio::test]
async fn test_text_blob_stops_at_nul() {
    // C clients include the terminator in the counted bytes
    let mut buf = Vec::new();
    buf.extend_from_slice(&6u32.to_le_bytes());
    buf.extend_from_slice(b"hello\0");

    let mut stream = buf.as_slice();
    assert_eq!(read_text_blob(&mut stream).await.unwrap(), "hello");
}

#[tokio::test]
async fn test_text_blob_without_nul_uses_all_bytes() {
    let mut buf = Vec::new();
    buf.extend_from_slice(&5u32.to_le_bytes());
    buf.extend_from_slice(b"hello");

    let mut stream = buf.as_slice();
    assert_eq!(read_text_blob(&mut stream).await.unwrap(), "hello");
}

#[tokio::test]
async fn test_text_blob_truncated_body() {
    let mut buf = Vec::new();
    buf.extend_from_slice(&100u32.to_le_bytes());
    buf.extend_from_slice(b"short");

    let mut stream = buf.as_slice();
    let err = read_text_blob(&mut stream).await.unwrap_err();
    assert!(matches!(err, ProtocolError::TruncatedRead { .. }));
}

#[tokio::test]
async fn test_text_blob_oversized_length_rejected() {
    let mut buf = Vec::new();
    buf.extend_from_slice(&(MAX_BLOB_SIZE + 1).to_le_bytes());

    let mut stream = buf.as_slice();
    let err = read_text_blob(&mut stream).await.unwrap_err();
    assert!(matches!(err, ProtocolError::BlobTooLarge { .. }));
}

#[tokio::test]
async fn test_write_u16_wire_bytes() {
    let mut buf = Vec::new();
    write_u16(&mut buf, 0x1234).await.unwrap();
    assert_eq!(buf, vec![0x34, 0x12]);
}
