//! TFRecord container framing.
//!
//! Each record is laid out as:
//!
//! ```text
//! u64 LE  payload length
//! u32 LE  masked CRC32C of the length bytes
//! [u8]    payload
//! u32 LE  masked CRC32C of the payload
//! ```
//!
//! The mask is TensorFlow's: `((crc >> 15) | (crc << 17)) + 0xa282ead8`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use prost::Message;

use crate::error::ConvertError;
use crate::example::Example;

const MASK_DELTA: u32 = 0xa282_ead8;

fn masked_crc32c(bytes: &[u8]) -> u32 {
    let crc = crc32c::crc32c(bytes);
    ((crc >> 15) | (crc << 17)).wrapping_add(MASK_DELTA)
}

/// Appends framed records to an underlying writer.
pub struct RecordWriter<W: Write> {
    inner: W,
    written: u64,
}

impl RecordWriter<BufWriter<File>> {
    /// Creates (truncating) a record file, creating parent directories as
    /// needed.
    pub fn create(path: &Path) -> Result<Self, ConvertError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(ConvertError::Io)?;
            }
        }
        let file = File::create(path).map_err(ConvertError::Io)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Appends one record payload.
    pub fn write_record(&mut self, payload: &[u8]) -> Result<(), ConvertError> {
        let len_bytes = (payload.len() as u64).to_le_bytes();
        self.inner.write_all(&len_bytes)?;
        self.inner
            .write_all(&masked_crc32c(&len_bytes).to_le_bytes())?;
        self.inner.write_all(payload)?;
        self.inner.write_all(&masked_crc32c(payload).to_le_bytes())?;
        self.written += 1;
        Ok(())
    }

    /// Serializes and appends one example.
    pub fn write_example(&mut self, example: &Example) -> Result<(), ConvertError> {
        self.write_record(&example.encode_to_vec())
    }

    pub fn records_written(&self) -> u64 {
        self.written
    }

    pub fn flush(&mut self) -> Result<(), ConvertError> {
        self.inner.flush().map_err(ConvertError::Io)
    }
}

/// Reads framed records back, verifying both checksums.
///
/// Exists for round-trip verification of freshly written containers.
pub struct RecordReader<R: Read> {
    inner: R,
    offset: u64,
}

impl RecordReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, ConvertError> {
        let file = File::open(path).map_err(ConvertError::Io)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

enum Fill {
    Eof,
    Partial,
    Full,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    /// Reads the next record payload. `None` at a clean end of stream.
    pub fn next_record(&mut self) -> Result<Option<Vec<u8>>, ConvertError> {
        let record_offset = self.offset;

        let mut len_bytes = [0u8; 8];
        match self.fill(&mut len_bytes)? {
            Fill::Eof => return Ok(None),
            Fill::Partial => return Err(self.corrupt(record_offset, "truncated length header")),
            Fill::Full => {}
        }

        let mut len_crc_bytes = [0u8; 4];
        if !matches!(self.fill(&mut len_crc_bytes)?, Fill::Full) {
            return Err(self.corrupt(record_offset, "truncated length checksum"));
        }
        if u32::from_le_bytes(len_crc_bytes) != masked_crc32c(&len_bytes) {
            return Err(self.corrupt(record_offset, "length checksum mismatch"));
        }

        let len = u64::from_le_bytes(len_bytes) as usize;
        let mut payload = vec![0u8; len];
        if !matches!(self.fill(&mut payload)?, Fill::Full) {
            return Err(self.corrupt(record_offset, "truncated payload"));
        }

        let mut data_crc_bytes = [0u8; 4];
        if !matches!(self.fill(&mut data_crc_bytes)?, Fill::Full) {
            return Err(self.corrupt(record_offset, "truncated payload checksum"));
        }
        if u32::from_le_bytes(data_crc_bytes) != masked_crc32c(&payload) {
            return Err(self.corrupt(record_offset, "payload checksum mismatch"));
        }

        Ok(Some(payload))
    }

    /// Reads and decodes the next example.
    pub fn next_example(&mut self) -> Result<Option<Example>, ConvertError> {
        let record_offset = self.offset;
        let Some(payload) = self.next_record()? else {
            return Ok(None);
        };

        let example = Example::decode(payload.as_slice()).map_err(|err| {
            ConvertError::RecordCorrupt {
                offset: record_offset,
                message: format!("example decode failed: {err}"),
            }
        })?;
        Ok(Some(example))
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<Fill, ConvertError> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.inner.read(&mut buf[filled..]).map_err(ConvertError::Io)?;
            if n == 0 {
                return Ok(if filled == 0 { Fill::Eof } else { Fill::Partial });
            }
            filled += n;
        }
        self.offset += buf.len() as u64;
        Ok(Fill::Full)
    }

    fn corrupt(&self, offset: u64, message: &str) -> ConvertError {
        ConvertError::RecordCorrupt {
            offset,
            message: message.to_string(),
        }
    }
}
