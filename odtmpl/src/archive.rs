//! OpenDocument container handling
//!
//! An `.odt` file is a zip archive. Rendering only rewrites two of its parts, so every
//! other entry is carried through untouched: same order, same bytes, same compression
//! method. The `mimetype` entry is written first and stored uncompressed, which is what
//! ODF consumers sniff for.

use std::io::{Cursor, Read, Seek, Write};

use log::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::RenderError;

pub const MIMETYPE: &str = "mimetype";

/// One archive member, fully loaded in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub data: Vec<u8>,
    pub compression: CompressionMethod,
    pub is_dir: bool,
}

/// Ordered list of archive members
#[derive(Debug, Clone, Default)]
pub struct Archive {
    entries: Vec<Entry>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every entry of a zip stream
    pub fn read<R: Read + Seek>(reader: R) -> Result<Self, RenderError> {
        let mut zip = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(zip.len());

        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            let name = file.name().to_string();
            let is_dir = file.is_dir();
            let compression = file.compression();
            let mut data = Vec::new();
            if !is_dir {
                file.read_to_end(&mut data)?;
            }
            debug!("unpacked {name} ({} bytes)", data.len());
            entries.push(Entry {
                name,
                data,
                compression,
                is_dir,
            });
        }

        Ok(Archive { entries })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RenderError> {
        Self::read(Cursor::new(bytes))
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|entry| entry.name == name && !entry.is_dir)
            .map(|entry| entry.data.as_slice())
    }

    /// Replace the data of an existing entry, or append a new deflated one
    pub fn set(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(Entry {
                name: name.to_string(),
                data,
                compression: CompressionMethod::Deflated,
                is_dir: false,
            }),
        }
    }

    /// Write the archive to a zip stream
    pub fn write<W: Write + Seek>(&self, writer: W) -> Result<W, RenderError> {
        let mut zip = ZipWriter::new(writer);

        let ordered = self
            .entries
            .iter()
            .filter(|entry| entry.name == MIMETYPE)
            .chain(self.entries.iter().filter(|entry| entry.name != MIMETYPE));

        for entry in ordered {
            let options = SimpleFileOptions::default().compression_method(method_for(entry));
            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)?;
            } else {
                zip.start_file(entry.name.as_str(), options)?;
                zip.write_all(&entry.data)?;
            }
            debug!("packed {} with {:?}", entry.name, method_for(entry));
        }

        Ok(zip.finish()?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, RenderError> {
        Ok(self.write(Cursor::new(Vec::new()))?.into_inner())
    }
}

fn method_for(entry: &Entry) -> CompressionMethod {
    if entry.name == MIMETYPE {
        return CompressionMethod::Stored;
    }
    match entry.compression {
        CompressionMethod::Stored => CompressionMethod::Stored,
        _ => CompressionMethod::Deflated,
    }
}
