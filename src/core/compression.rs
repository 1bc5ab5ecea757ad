//! Payload encodings for transmitted arrays.
//!
//! Compressed payloads are zip archives holding a single DEFLATE entry
//! named `data/<hash>`, which is what the receiving client unpacks.

use std::io::{Cursor, Read, Write};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::util::Result;

/// Directory of the single entry inside a zipped payload.
pub const ENTRY_DIR: &str = "data";

/// Entry path for a payload.
pub fn entry_name(name: &str) -> String {
    format!("{}/{}", ENTRY_DIR, name)
}

/// Wrap `data` in a zip archive under `data/<name>`.
pub fn zip_payload(name: &str, data: &[u8]) -> Result<Vec<u8>> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file(entry_name(name), options)?;
    writer.write_all(data)?;
    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

/// Extract the `data/<name>` entry of a zipped payload.
pub fn unzip_payload(zipped: &[u8], name: &str) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(zipped))?;
    let mut entry = archive.by_name(&entry_name(name))?;
    let mut out = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut out)?;
    Ok(out)
}

/// Standard base64 text of `data`.
#[inline]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_roundtrip() {
        let original = b"Hello, World! This is some test data that should compress well when repeated. ".repeat(100);

        let zipped = zip_payload("abc_12f", &original).unwrap();
        assert!(zipped.len() < original.len());
        // Local file header signature.
        assert_eq!(&zipped[..4], b"PK\x03\x04");

        let unzipped = unzip_payload(&zipped, "abc_12f").unwrap();
        assert_eq!(unzipped, original);
    }

    #[test]
    fn test_unzip_wrong_entry_fails() {
        let zipped = zip_payload("one", b"payload").unwrap();
        assert!(unzip_payload(&zipped, "two").is_err());
    }

    #[test]
    fn test_base64_roundtrip() {
        let text = encode_base64(b"\x00\x01\xff");
        assert_eq!(text, "AAH/");
        assert_eq!(decode_base64(&text).unwrap(), b"\x00\x01\xff");
        assert!(decode_base64("not base64!").is_err());
    }
}
