//! Acquisition header - structured scan and equipment description
//!
//! The HEADER control message carries an XML document describing the
//! acquisition: system information and the encoding geometry the
//! reconstruction needs. Only the elements the pipeline consumes are
//! modeled; unknown elements are skipped.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader as XmlReader, Writer as XmlWriter};
use thiserror::Error;

/// Errors that can occur while deserializing an acquisition header
#[derive(Debug, Error)]
pub enum HeaderError {
    /// Malformed XML
    #[error("failed to parse header: {0}")]
    Parse(String),

    /// A required element is absent
    #[error("header is missing required element '{0}'")]
    MissingElement(&'static str),

    /// An element holds a value of the wrong type
    #[error("header element '{element}' has invalid value '{value}'")]
    InvalidValue { element: String, value: String },
}

/// Scanner system description
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemInfo {
    pub vendor: String,
    pub model: String,
    pub field_strength_t: f32,
    pub receiver_channels: u16,
}

/// Matrix dimensions of an encoding space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodingSpace {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

/// Deserialized acquisition header
///
/// Produced exactly once per connection from the HEADER control
/// message; the pipeline builder combines it with run-time paths into
/// the reconstruction context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcquisitionHeader {
    pub system: SystemInfo,
    pub encoded_space: EncodingSpace,
    pub recon_space: EncodingSpace,
    pub acceleration_factor: u16,
}

impl AcquisitionHeader {
    /// Deserialize a header from its XML text
    ///
    /// The encoded-space matrix is required; everything else falls back
    /// to defaults when absent.
    pub fn from_xml(text: &str) -> Result<Self, HeaderError> {
        let mut reader = XmlReader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut header = AcquisitionHeader::default();
        let mut path: Vec<String> = Vec::new();
        let mut seen_encoded_space = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    path.push(name);
                }
                Ok(Event::End(_)) => {
                    path.pop();
                }
                Ok(Event::Text(e)) => {
                    let value = e
                        .unescape()
                        .map_err(|err| HeaderError::Parse(err.to_string()))?;
                    if Self::apply_text(&mut header, &path, value.as_ref())? {
                        seen_encoded_space = true;
                    }
                }
                Ok(Event::Eof) => {
                    if !path.is_empty() {
                        return Err(HeaderError::Parse("unexpected end of document".into()));
                    }
                    break;
                }
                Ok(_) => {}
                Err(err) => return Err(HeaderError::Parse(err.to_string())),
            }
        }

        if !seen_encoded_space {
            return Err(HeaderError::MissingElement("encodedSpace/matrixSize"));
        }

        Ok(header)
    }

    /// Apply one text node at `path`; returns true if it filled part of
    /// the encoded-space matrix
    fn apply_text(
        header: &mut AcquisitionHeader,
        path: &[String],
        value: &str,
    ) -> Result<bool, HeaderError> {
        let tail = |n: usize| -> Vec<&str> {
            let start = path.len().saturating_sub(n);
            path[start..].iter().map(String::as_str).collect()
        };

        match tail(2).as_slice() {
            ["acquisitionSystemInformation", "systemVendor"] => {
                header.system.vendor = value.to_owned();
                return Ok(false);
            }
            ["acquisitionSystemInformation", "systemModel"] => {
                header.system.model = value.to_owned();
                return Ok(false);
            }
            ["acquisitionSystemInformation", "systemFieldStrength_T"] => {
                header.system.field_strength_t = parse_value(path, value)?;
                return Ok(false);
            }
            ["acquisitionSystemInformation", "receiverChannels"] => {
                header.system.receiver_channels = parse_value(path, value)?;
                return Ok(false);
            }
            ["accelerationFactor", "kspace_encoding_step_1"] => {
                header.acceleration_factor = parse_value(path, value)?;
                return Ok(false);
            }
            _ => {}
        }

        if let [space, "matrixSize", axis] = tail(3).as_slice() {
            let target = match *space {
                "encodedSpace" => &mut header.encoded_space,
                "reconSpace" => &mut header.recon_space,
                _ => return Ok(false),
            };
            let parsed: u32 = parse_value(path, value)?;
            match *axis {
                "x" => target.x = parsed,
                "y" => target.y = parsed,
                "z" => target.z = parsed,
                _ => return Ok(false),
            }
            return Ok(*space == "encodedSpace");
        }

        Ok(false)
    }

    /// Serialize the header back to XML (clients and tests)
    pub fn to_xml(&self) -> String {
        // Writing into an in-memory Vec cannot fail
        self.write_xml().expect("in-memory XML write")
    }

    fn write_xml(&self) -> std::io::Result<String> {
        let mut writer = XmlWriter::new(Vec::new());

        writer.write_event(Event::Start(BytesStart::new("ismrmrdHeader")))?;

        write_element_group(&mut writer, "acquisitionSystemInformation", |w| {
            write_text_element(w, "systemVendor", &self.system.vendor)?;
            write_text_element(w, "systemModel", &self.system.model)?;
            write_text_element(
                w,
                "systemFieldStrength_T",
                &self.system.field_strength_t.to_string(),
            )?;
            write_text_element(
                w,
                "receiverChannels",
                &self.system.receiver_channels.to_string(),
            )
        })?;

        write_element_group(&mut writer, "encoding", |w| {
            write_matrix(w, "encodedSpace", self.encoded_space)?;
            write_matrix(w, "reconSpace", self.recon_space)?;
            write_element_group(w, "parallelImaging", |w| {
                write_element_group(w, "accelerationFactor", |w| {
                    write_text_element(
                        w,
                        "kspace_encoding_step_1",
                        &self.acceleration_factor.to_string(),
                    )
                })
            })
        })?;

        writer.write_event(Event::End(BytesEnd::new("ismrmrdHeader")))?;

        Ok(String::from_utf8(writer.into_inner()).expect("writer produces UTF-8"))
    }
}

fn parse_value<T: std::str::FromStr>(path: &[String], value: &str) -> Result<T, HeaderError> {
    value.parse().map_err(|_| HeaderError::InvalidValue {
        element: path.join("/"),
        value: value.to_owned(),
    })
}

fn write_element_group<F>(writer: &mut XmlWriter<Vec<u8>>, name: &str, body: F) -> std::io::Result<()>
where
    F: FnOnce(&mut XmlWriter<Vec<u8>>) -> std::io::Result<()>,
{
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    body(writer)?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_text_element(writer: &mut XmlWriter<Vec<u8>>, name: &str, value: &str) -> std::io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_matrix(
    writer: &mut XmlWriter<Vec<u8>>,
    name: &str,
    space: EncodingSpace,
) -> std::io::Result<()> {
    write_element_group(writer, name, |w| {
        write_element_group(w, "matrixSize", |w| {
            write_text_element(w, "x", &space.x.to_string())?;
            write_text_element(w, "y", &space.y.to_string())?;
            write_text_element(w, "z", &space.z.to_string())
        })
    })
}
