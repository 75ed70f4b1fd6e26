//! Image ingestion: raw encoded bytes, header-probed dimensions, and the
//! SHA-256 content key carried in each record.
//!
//! Images are never decoded; the record schema stores the encoded bytes as
//! is, and dimensions come from the container header.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::ConvertError;

/// Image container formats the record schema can name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Tiff,
    Bmp,
    Webp,
}

impl ImageFormat {
    /// Derives the format from the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Result<Self, ConvertError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "tif" | "tiff" => Ok(Self::Tiff),
            "bmp" => Ok(Self::Bmp),
            "webp" => Ok(Self::Webp),
            _ => Err(ConvertError::ImageFormatUnknown {
                path: path.to_path_buf(),
            }),
        }
    }

    /// The name stored in the `image/format` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Tiff => "tiff",
            Self::Bmp => "bmp",
            Self::Webp => "webp",
        }
    }
}

/// An image read from disk, ready to be embedded in a record.
#[derive(Clone, Debug)]
pub struct EncodedImage {
    /// The input path as given, used for `image/filename` and
    /// `image/source_id`.
    pub source_id: String,
    pub width: i64,
    pub height: i64,
    pub format: ImageFormat,
    pub encoded: Vec<u8>,
    /// Lowercase hex SHA-256 digest of `encoded`.
    pub key_sha256: String,
}

impl EncodedImage {
    /// Reads an image file and probes its dimensions from the header.
    pub fn read(path: &Path) -> Result<Self, ConvertError> {
        let format = ImageFormat::from_path(path)?;

        let encoded = fs::read(path).map_err(|source| ConvertError::ImageRead {
            path: path.to_path_buf(),
            source,
        })?;

        let size =
            imagesize::blob_size(&encoded).map_err(|source| ConvertError::ImageDimensions {
                path: path.to_path_buf(),
                source,
            })?;

        let key_sha256 = sha256_hex(&encoded);

        Ok(Self {
            source_id: path.to_string_lossy().replace('\\', "/"),
            width: size.width as i64,
            height: size.height as i64,
            format,
            encoded,
            key_sha256,
        })
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
        let row_stride = (width * 3).div_ceil(4) * 4;
        let pixel_array_size = row_stride * height;
        let file_size = 54 + pixel_array_size;

        let mut bytes = Vec::with_capacity(file_size as usize);
        bytes.extend_from_slice(b"BM");
        bytes.extend_from_slice(&file_size.to_le_bytes());
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        bytes.extend_from_slice(&54u32.to_le_bytes());

        bytes.extend_from_slice(&40u32.to_le_bytes());
        bytes.extend_from_slice(&(width as i32).to_le_bytes());
        bytes.extend_from_slice(&(height as i32).to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&24u16.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
        bytes.extend_from_slice(&2835u32.to_le_bytes());
        bytes.extend_from_slice(&2835u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());

        bytes.resize(file_size as usize, 0);
        bytes
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            ImageFormat::from_path(Path::new("a.JPG")).unwrap(),
            ImageFormat::Jpeg
        );
        assert_eq!(
            ImageFormat::from_path(Path::new("a.tif")).unwrap(),
            ImageFormat::Tiff
        );
        assert!(matches!(
            ImageFormat::from_path(Path::new("a.gif")),
            Err(ConvertError::ImageFormatUnknown { .. })
        ));
        assert!(matches!(
            ImageFormat::from_path(Path::new("noext")),
            Err(ConvertError::ImageFormatUnknown { .. })
        ));
    }

    #[test]
    fn reads_dimensions_and_hash_from_bmp() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("sample.bmp");
        let bytes = bmp_bytes(12, 8);
        std::fs::write(&path, &bytes).expect("write bmp");

        let image = EncodedImage::read(&path).expect("read image");
        assert_eq!(image.width, 12);
        assert_eq!(image.height, 8);
        assert_eq!(image.format, ImageFormat::Bmp);
        assert_eq!(image.encoded, bytes);
        assert_eq!(image.key_sha256, sha256_hex(&bytes));
        assert_eq!(image.key_sha256.len(), 64);
    }

    #[test]
    fn sha256_hex_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn missing_image_is_an_error() {
        let err = EncodedImage::read(Path::new("does/not/exist.png")).unwrap_err();
        assert!(matches!(err, ConvertError::ImageRead { .. }));
    }
}
