//! Built-in reader and writer plugins
//!
//! Built-in codecs for the standard MRI data messages. They share one
//! body framing: a u32 length prefix followed by the raw payload bytes.
//! The payload types themselves are opaque to the pipeline; downstream
//! stages downcast to the ones they understand.

use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use recon_protocol::{read_blob, Message};
use tokio::io::AsyncRead;

use crate::{Payload, Reader, RegistryError, Result, Writer};

/// Default slot for raw acquisition (k-space) data
pub const ACQUISITION_SLOT: u16 = 1008;

/// Default slot for image data on the way back out
pub const IMAGE_SLOT: u16 = 1022;

/// Default slot for physiological waveform data
pub const WAVEFORM_SLOT: u16 = 1026;

/// One raw k-space readout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    pub data: Bytes,
}

/// One physiological waveform record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Waveform {
    pub data: Bytes,
}

/// One reconstructed image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub data: Bytes,
}

/// Decodes acquisition bodies into `Acquisition` payloads
#[derive(Debug, Default)]
pub struct AcquisitionReader;

#[async_trait]
impl Reader for AcquisitionReader {
    fn slot(&self) -> u16 {
        ACQUISITION_SLOT
    }

    async fn read(&self, stream: &mut (dyn AsyncRead + Send + Unpin)) -> Result<Payload> {
        let data = read_blob(stream).await?;
        Ok(Box::new(Acquisition { data }))
    }
}

/// Decodes waveform bodies into `Waveform` payloads
#[derive(Debug, Default)]
pub struct WaveformReader;

#[async_trait]
impl Reader for WaveformReader {
    fn slot(&self) -> u16 {
        WAVEFORM_SLOT
    }

    async fn read(&self, stream: &mut (dyn AsyncRead + Send + Unpin)) -> Result<Payload> {
        let data = read_blob(stream).await?;
        Ok(Box::new(Waveform { data }))
    }
}

/// Serializes `Image` payloads back to the wire
#[derive(Debug, Default)]
pub struct ImageWriter;

impl Writer for ImageWriter {
    fn slot(&self) -> u16 {
        IMAGE_SLOT
    }

    fn serialize(&self, message: &Message) -> Result<Bytes> {
        let image = message
            .downcast_ref::<Image>()
            .ok_or(RegistryError::UnsupportedMessage {
                writer: "ImageWriter",
                id: message.id(),
            })?;

        let mut body = BytesMut::with_capacity(4 + image.data.len());
        body.put_u32_le(image.data.len() as u32);
        body.extend_from_slice(&image.data);
        Ok(body.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquisition_reader_decodes_blob() {
        let mut body = Vec::new();
        body.extend_from_slice(&4u32.to_le_bytes());
        body.extend_from_slice(b"abcd");

        let reader = AcquisitionReader;
        assert_eq!(reader.slot(), ACQUISITION_SLOT);

        let mut stream = body.as_slice();
        let payload = reader.read(&mut stream).await.unwrap();
        let acquisition = payload.downcast::<Acquisition>().unwrap();
        assert_eq!(acquisition.data.as_ref(), b"abcd");
    }

    #[tokio::test]
    async fn test_acquisition_reader_truncated_body() {
        let mut body = Vec::new();
        body.extend_from_slice(&10u32.to_le_bytes());
        body.extend_from_slice(b"abc");

        let mut stream = body.as_slice();
        let err = AcquisitionReader.read(&mut stream).await.unwrap_err();
        assert!(err.is_disconnect());
    }

    #[test]
    fn test_image_writer_frames_payload() {
        let message = Message::new(
            IMAGE_SLOT,
            Image {
                data: Bytes::from_static(b"pixels"),
            },
        );

        let body = ImageWriter.serialize(&message).unwrap();
        assert_eq!(&body[..4], &6u32.to_le_bytes());
        assert_eq!(&body[4..], b"pixels");
    }

    #[test]
    fn test_image_writer_rejects_foreign_payload() {
        let message = Message::new(IMAGE_SLOT, 17u32);
        let err = ImageWriter.serialize(&message).unwrap_err();
        assert!(matches!(err, RegistryError::UnsupportedMessage { .. }));
    }
}
