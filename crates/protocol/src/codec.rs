//! Wire codec - primitive readers and writers over a byte stream
//!
//! All multi-byte integers are little-endian. Each function reads or
//! writes exactly one field; no state is retained across calls.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{ProtocolError, Result, FILENAME_FIELD_SIZE, MAX_BLOB_SIZE};

/// Read the u16 id that opens the next message
///
/// Returns `None` when the stream ends cleanly on a message boundary,
/// before the first id byte. A stream that ends after delivering only
/// half the id is a `TruncatedRead`.
pub async fn read_message_id<R>(stream: &mut R) -> Result<Option<u16>>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = [0u8; 2];
    let n = stream.read(&mut buf[..1]).await?;
    if n == 0 {
        return Ok(None);
    }
    read_field(stream, &mut buf[1..]).await?;
    Ok(Some(u16::from_le_bytes(buf)))
}

/// Read a little-endian u16 from the stream
pub async fn read_u16<R>(stream: &mut R) -> Result<u16>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = [0u8; 2];
    read_field(stream, &mut buf).await?;
    Ok(u16::from_le_bytes(buf))
}

/// Read a little-endian u32 from the stream
pub async fn read_u32<R>(stream: &mut R) -> Result<u32>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = [0u8; 4];
    read_field(stream, &mut buf).await?;
    Ok(u32::from_le_bytes(buf))
}

/// Read the fixed 1024-byte filename field
///
/// The filename is the bytes before the first NUL; a field with no NUL
/// uses all 1024 bytes. A short read is a `TruncatedRead`.
pub async fn read_filename<R>(stream: &mut R) -> Result<String>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = [0u8; FILENAME_FIELD_SIZE];
    read_field(stream, &mut buf).await?;

    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    let name = std::str::from_utf8(&buf[..end])
        .map_err(|_| ProtocolError::InvalidString { field: "filename" })?;

    Ok(name.to_owned())
}

/// Read a length-prefixed text blob: u32 length `n`, then exactly `n` bytes
///
/// The full `n` bytes are the content; a NUL, if present, ends the
/// content (many clients write C strings). Fewer than `n` bytes
/// available is a `TruncatedRead`.
pub async fn read_text_blob<R>(stream: &mut R) -> Result<String>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let n = read_u32(stream).await?;

    if n > MAX_BLOB_SIZE {
        return Err(ProtocolError::BlobTooLarge {
            size: n,
            max: MAX_BLOB_SIZE,
        });
    }

    let mut buf = vec![0u8; n as usize];
    read_field(stream, &mut buf).await?;

    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    let text = std::str::from_utf8(&buf[..end])
        .map_err(|_| ProtocolError::InvalidString { field: "text blob" })?;

    Ok(text.to_owned())
}

/// Read a length-prefixed binary blob: u32 length `n`, then exactly `n` bytes
///
/// Unlike `read_text_blob`, the bytes are returned untouched. This is
/// the framing the built-in data readers use.
pub async fn read_blob<R>(stream: &mut R) -> Result<Bytes>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let n = read_u32(stream).await?;

    if n > MAX_BLOB_SIZE {
        return Err(ProtocolError::BlobTooLarge {
            size: n,
            max: MAX_BLOB_SIZE,
        });
    }

    let mut buf = vec![0u8; n as usize];
    read_field(stream, &mut buf).await?;
    Ok(Bytes::from(buf))
}

/// Write a binary blob with its u32 length prefix
pub async fn write_blob<W>(stream: &mut W, data: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let len = u32::try_from(data.len()).map_err(|_| ProtocolError::BlobTooLarge {
        size: u32::MAX,
        max: MAX_BLOB_SIZE,
    })?;

    stream.write_all(&len.to_le_bytes()).await?;
    stream.write_all(data).await?;
    Ok(())
}

/// Write a little-endian u16 to the stream
pub async fn write_u16<W>(stream: &mut W, value: u16) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    stream.write_all(&value.to_le_bytes()).await?;
    Ok(())
}

/// Write a text blob with its u32 length prefix
pub async fn write_text_blob<W>(stream: &mut W, text: &str) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let len = u32::try_from(text.len()).map_err(|_| ProtocolError::BlobTooLarge {
        size: u32::MAX,
        max: MAX_BLOB_SIZE,
    })?;

    stream.write_all(&len.to_le_bytes()).await?;
    stream.write_all(text.as_bytes()).await?;
    Ok(())
}

/// Write the fixed 1024-byte filename field, NUL-padded
///
/// Returns an error if the name does not fit with its terminator.
pub async fn write_filename<W>(stream: &mut W, name: &str) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    if name.len() >= FILENAME_FIELD_SIZE {
        return Err(ProtocolError::InvalidString { field: "filename" });
    }

    let mut buf = [0u8; FILENAME_FIELD_SIZE];
    buf[..name.len()].copy_from_slice(name.as_bytes());
    stream.write_all(&buf).await?;
    Ok(())
}

/// Fill `buf` completely, mapping a premature EOF to `TruncatedRead`
async fn read_field<R>(stream: &mut R, buf: &mut [u8]) -> Result<()>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let expected = buf.len();
    stream.read_exact(buf).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ProtocolError::truncated(expected)
        } else {
            ProtocolError::Io(e)
        }
    })?;
    Ok(())
}
