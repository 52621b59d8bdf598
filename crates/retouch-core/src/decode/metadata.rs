//! EXIF orientation and property extraction.

use std::io::Cursor;

use exif::{Exif, In, Reader, Tag};

use super::{ExifError, Orientation};

/// Read the orientation tag from the primary IFD of an image container.
///
/// # Errors
///
/// Returns `ExifError::Missing` when the container has no EXIF block,
/// `ExifError::Malformed` when it cannot be parsed (including bytes that are
/// not a recognised container), `ExifError::NoOrientationTag` when the tag is
/// absent and `ExifError::InvalidValue` when it is not an integer.
pub fn read_orientation(bytes: &[u8]) -> Result<Orientation, ExifError> {
    orientation_of(&read_exif(bytes)?)
}

/// Read the orientation tag from a bare TIFF-structured EXIF chunk, as
/// handed out by image decoders. Errors as for [`read_orientation`].
pub fn read_raw_orientation(chunk: Vec<u8>) -> Result<Orientation, ExifError> {
    let exif = Reader::new()
        .read_raw(chunk)
        .map_err(|e| ExifError::Malformed(e.to_string()))?;
    orientation_of(&exif)
}

fn orientation_of(exif: &Exif) -> Result<Orientation, ExifError> {
    let field = exif
        .get_field(Tag::Orientation, In::PRIMARY)
        .ok_or(ExifError::NoOrientationTag)?;

    field
        .value
        .get_uint(0)
        .map(Orientation::from)
        .ok_or_else(|| ExifError::InvalidValue(field.display_value().to_string()))
}

/// Collect the primary IFD fields as `exif:<Tag>` properties.
///
/// Returns an empty list when the bytes carry no readable EXIF block.
pub fn read_properties(bytes: &[u8]) -> Vec<(String, String)> {
    let Ok(exif) = read_exif(bytes) else {
        return Vec::new();
    };

    exif.fields()
        .filter(|field| field.ifd_num == In::PRIMARY)
        .map(|field| {
            let value = match (field.tag, field.value.get_uint(0)) {
                // Numeric text, not the descriptive rendering
                (Tag::Orientation, Some(v)) => v.to_string(),
                _ => field.display_value().to_string().trim_matches('"').to_string(),
            };
            (format!("exif:{}", field.tag), value)
        })
        .collect()
}

/// Pick the authoritative orientation.
///
/// A successful EXIF read wins outright, even when it carries an out of range
/// value. Any EXIF failure falls back to the tag embedded in the decoded
/// pixel data.
pub fn resolve_orientation(
    from_exif: Result<Orientation, ExifError>,
    embedded: Orientation,
) -> Orientation {
    match from_exif {
        Ok(orientation) => orientation,
        Err(err) => {
            tracing::debug!(%err, fallback = ?embedded, "EXIF orientation unavailable");
            embedded
        }
    }
}

fn read_exif(bytes: &[u8]) -> Result<Exif, ExifError> {
    let mut cursor = Cursor::new(bytes);
    Reader::new()
        .read_from_container(&mut cursor)
        .map_err(|e| match e {
            exif::Error::NotFound(_) => ExifError::Missing,
            other => ExifError::Malformed(other.to_string()),
        })
}
