//! Acquisition header deserialization tests

use crate::{AcquisitionHeader, EncodingSpace, HeaderError, SystemInfo};

const FULL_HEADER: &str = r#"<ismrmrdHeader>
  <acquisitionSystemInformation>
    <systemVendor>TestVendor</systemVendor>
    <systemModel>TestModel</systemModel>
    <systemFieldStrength_T>3</systemFieldStrength_T>
    <receiverChannels>32</receiverChannels>
  </acquisitionSystemInformation>
  <encoding>
    <encodedSpace>
      <matrixSize><x>256</x><y>140</y><z>80</z></matrixSize>
    </encodedSpace>
    <reconSpace>
      <matrixSize><x>128</x><y>116</y><z>64</z></matrixSize>
    </reconSpace>
    <parallelImaging>
      <accelerationFactor>
        <kspace_encoding_step_1>2</kspace_encoding_step_1>
      </accelerationFactor>
    </parallelImaging>
  </encoding>
</ismrmrdHeader>"#;

#[test]
fn test_parse_full_header() {
    let header = AcquisitionHeader::from_xml(FULL_HEADER).unwrap();

    assert_eq!(header.system.vendor, "TestVendor");
    assert_eq!(header.system.model, "TestModel");
    assert_eq!(header.system.receiver_channels, 32);
    assert_eq!(
        header.encoded_space,
        EncodingSpace { x: 256, y: 140, z: 80 }
    );
    assert_eq!(header.recon_space, EncodingSpace { x: 128, y: 116, z: 64 });
    assert_eq!(header.acceleration_factor, 2);
}

#[test]
fn test_parse_minimal_header() {
    let xml = r#"<ismrmrdHeader>
      <encoding>
        <encodedSpace><matrixSize><x>64</x><y>64</y><z>1</z></matrixSize></encodedSpace>
      </encoding>
    </ismrmrdHeader>"#;

    let header = AcquisitionHeader::from_xml(xml).unwrap();
    assert_eq!(header.encoded_space, EncodingSpace { x: 64, y: 64, z: 1 });
    assert_eq!(header.system, SystemInfo::default());
    assert_eq!(header.acceleration_factor, 0);
}

#[test]
fn test_missing_encoded_space_rejected() {
    let xml = "<ismrmrdHeader><encoding/></ismrmrdHeader>";
    let err = AcquisitionHeader::from_xml(xml).unwrap_err();
    assert!(matches!(err, HeaderError::MissingElement(_)));
}

#[test]
fn test_malformed_xml_rejected() {
    let err = AcquisitionHeader::from_xml("<ismrmrdHeader><encoding>").unwrap_err();
    assert!(matches!(err, HeaderError::Parse(_)));
}

#[test]
fn test_invalid_numeric_value_rejected() {
    let xml = r#"<ismrmrdHeader>
      <encoding>
        <encodedSpace><matrixSize><x>wide</x><y>64</y><z>1</z></matrixSize></encodedSpace>
      </encoding>
    </ismrmrdHeader>"#;

    let err = AcquisitionHeader::from_xml(xml).unwrap_err();
    assert!(matches!(err, HeaderError::InvalidValue { .. }));
}

#[test]
fn test_unknown_elements_skipped() {
    let xml = r#"<ismrmrdHeader>
      <studyInformation><studyDate>2024-01-01</studyDate></studyInformation>
      <encoding>
        <trajectory>cartesian</trajectory>
        <encodedSpace><matrixSize><x>64</x><y>64</y><z>1</z></matrixSize></encodedSpace>
      </encoding>
    </ismrmrdHeader>"#;

    let header = AcquisitionHeader::from_xml(xml).unwrap();
    assert_eq!(header.encoded_space.x, 64);
}

#[test]
fn test_header_round_trip() {
    let header = AcquisitionHeader::from_xml(FULL_HEADER).unwrap();
    let rebuilt = AcquisitionHeader::from_xml(&header.to_xml()).unwrap();
    assert_eq!(header, rebuilt);
}
