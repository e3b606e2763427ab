//! Reading and writing documents in the Xournal (`.xoj`) format.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::Document;

pub mod color;
pub mod xoj;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Errors that can occur while loading or saving a document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decompress document: {0}")]
    Gzip(#[source] std::io::Error),

    #[error("Malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Invalid number {value:?} in {attribute}")]
    InvalidNumber { attribute: String, value: String },

    #[error("<{element}> is missing the {attribute} attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("Document contains no pages")]
    NoPages,

    #[error("Document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// How a saved document is stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Compression {
    /// Plain XML
    #[default]
    None,
    /// Gzip-compressed XML, as written by Xournal itself
    Gzip,
}

/// Decodes document bytes, transparently inflating gzip input.
pub fn read_document(bytes: &[u8]) -> Result<Document, DocumentError> {
    if bytes.starts_with(&GZIP_MAGIC) {
        let mut xml = String::new();
        GzDecoder::new(bytes)
            .read_to_string(&mut xml)
            .map_err(DocumentError::Gzip)?;
        return xoj::parse(&xml);
    }
    xoj::parse(std::str::from_utf8(bytes)?)
}

/// Encodes a document, optionally gzip-compressed.
pub fn encode_document(document: &Document, compression: Compression) -> Result<Vec<u8>, DocumentError> {
    let xml = xoj::write(document);
    match compression {
        Compression::None => Ok(xml.into_bytes()),
        Compression::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(xml.as_bytes())?;
            Ok(encoder.finish()?)
        }
    }
}

pub fn load_document(path: &Path) -> Result<Document, DocumentError> {
    let bytes = fs::read(path)?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    read_document(&bytes)
}

pub fn save_document(document: &Document, path: &Path, compression: Compression) -> Result<(), DocumentError> {
    let bytes = encode_document(document, compression)?;
    fs::write(path, bytes)?;
    debug!("Wrote {} ({:?})", path.display(), compression);
    Ok(())
}
