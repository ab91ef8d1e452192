//! Raw binary primitives used by the scene codec.
//!
//! Values are plain-old-data copied byte for byte in host order. Vectors are
//! prefixed with a `u64` element count, strings with an `i32` byte length.

use std::io::{ErrorKind, Read, Write};

use bytemuck::Pod;

use super::format::FormatError;

pub fn write_element<W: Write, T: Pod>(writer: &mut W, value: &T) -> Result<(), FormatError> {
    writer.write_all(bytemuck::bytes_of(value))?;
    Ok(())
}

pub fn write_array<W: Write, T: Pod>(writer: &mut W, values: &[T]) -> Result<(), FormatError> {
    writer.write_all(bytemuck::cast_slice(values))?;
    Ok(())
}

/// Writes the element count as `u64` followed by the elements.
pub fn write_vector<W: Write, T: Pod>(writer: &mut W, values: &[T]) -> Result<(), FormatError> {
    write_element(writer, &(values.len() as u64))?;
    write_array(writer, values)
}

/// Writes the byte length as `i32` followed by the UTF-8 bytes, without a terminator.
pub fn write_string<W: Write>(writer: &mut W, value: &str) -> Result<(), FormatError> {
    let len = i32::try_from(value.len()).map_err(|_| FormatError::LengthOverflow(value.len()))?;
    write_element(writer, &len)?;
    write_array(writer, value.as_bytes())
}

fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), FormatError> {
    reader.read_exact(buf).map_err(|err| match err.kind() {
        ErrorKind::UnexpectedEof => FormatError::PartialRead,
        _ => FormatError::IoError(err),
    })
}

pub fn read_element<R: Read, T: Pod>(reader: &mut R) -> Result<T, FormatError> {
    let mut value = T::zeroed();
    fill(reader, bytemuck::bytes_of_mut(&mut value))?;
    Ok(value)
}

/// Reads exactly `count` elements.
///
/// The buffer grows with the bytes actually read, so a corrupt count ends in
/// [`FormatError::PartialRead`] rather than a huge allocation.
pub fn read_array<R: Read, T: Pod>(reader: &mut R, count: usize) -> Result<Vec<T>, FormatError> {
    let byte_len = count
        .checked_mul(std::mem::size_of::<T>())
        .ok_or(FormatError::LengthOverflow(count))?;

    let mut bytes = Vec::new();
    reader.by_ref().take(byte_len as u64).read_to_end(&mut bytes)?;
    if bytes.len() != byte_len {
        return Err(FormatError::PartialRead);
    }
    Ok(bytemuck::pod_collect_to_vec(&bytes))
}

pub fn read_vector<R: Read, T: Pod>(reader: &mut R) -> Result<Vec<T>, FormatError> {
    let count: u64 = read_element(reader)?;
    let count = usize::try_from(count).map_err(|_| FormatError::InvalidLength(count as i64))?;
    read_array(reader, count)
}

pub fn read_string<R: Read>(reader: &mut R) -> Result<String, FormatError> {
    let len: i32 = read_element(reader)?;
    let len = usize::try_from(len).map_err(|_| FormatError::InvalidLength(len.into()))?;
    let bytes = read_array::<R, u8>(reader, len)?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mini_common::{Vec2f, Vec3f, Vec3i};
    use std::io::Cursor;

    #[test]
    fn test_element_layout() {
        let mut buf = Vec::new();
        write_element(&mut buf, &7u64).unwrap();
        write_element(&mut buf, &-1i32).unwrap();
        write_element(&mut buf, &Vec3f::new(1.0, 2.0, 3.0)).unwrap();

        assert_eq!(buf.len(), 8 + 4 + 12);
        assert_eq!(&buf[..8], &7u64.to_ne_bytes());
        assert_eq!(&buf[8..12], &(-1i32).to_ne_bytes());

        let mut cursor = Cursor::new(buf);
        assert_eq!(read_element::<_, u64>(&mut cursor).unwrap(), 7);
        assert_eq!(read_element::<_, i32>(&mut cursor).unwrap(), -1);
        assert_eq!(
            read_element::<_, Vec3f>(&mut cursor).unwrap(),
            Vec3f::new(1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn test_vector_is_count_prefixed() {
        let indices = vec![Vec3i::new(0, 1, 2), Vec3i::new(2, 1, 3)];
        let mut buf = Vec::new();
        write_vector(&mut buf, &indices).unwrap();

        assert_eq!(buf.len(), 8 + 2 * 12);
        assert_eq!(&buf[..8], &2u64.to_ne_bytes());

        let read: Vec<Vec3i> = read_vector(&mut Cursor::new(buf)).unwrap();
        assert_eq!(read, indices);
    }

    #[test]
    fn test_empty_vector() {
        let mut buf = Vec::new();
        write_vector::<_, Vec2f>(&mut buf, &[]).unwrap();
        assert_eq!(buf, 0u64.to_ne_bytes());

        let read: Vec<Vec2f> = read_vector(&mut Cursor::new(buf)).unwrap();
        assert!(read.is_empty());
    }

    #[test]
    fn test_string_has_i32_length_and_no_terminator() {
        let mut buf = Vec::new();
        write_string(&mut buf, "mini").unwrap();

        assert_eq!(buf.len(), 4 + 4);
        assert_eq!(&buf[..4], &4i32.to_ne_bytes());
        assert_eq!(&buf[4..], b"mini");

        assert_eq!(read_string(&mut Cursor::new(buf)).unwrap(), "mini");
    }

    #[test]
    fn test_short_reads_are_partial_read() {
        let short = [0u8; 3];
        assert!(matches!(
            read_element::<_, u64>(&mut Cursor::new(&short[..])),
            Err(FormatError::PartialRead)
        ));

        let mut buf = Vec::new();
        write_vector(&mut buf, &[1.0f32, 2.0, 3.0]).unwrap();
        buf.truncate(buf.len() - 1);
        assert!(matches!(
            read_vector::<_, f32>(&mut Cursor::new(buf)),
            Err(FormatError::PartialRead)
        ));
    }

    #[test]
    fn test_corrupt_count_does_not_preallocate() {
        let mut buf = Vec::new();
        write_element(&mut buf, &(u64::MAX / 64)).unwrap();
        buf.extend_from_slice(&[0; 16]);

        assert!(matches!(
            read_vector::<_, Vec3f>(&mut Cursor::new(buf)),
            Err(FormatError::PartialRead) | Err(FormatError::LengthOverflow(_))
        ));
    }

    #[test]
    fn test_negative_string_length() {
        let mut buf = Vec::new();
        write_element(&mut buf, &-5i32).unwrap();

        assert!(matches!(
            read_string(&mut Cursor::new(buf)),
            Err(FormatError::InvalidLength(-5))
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut buf = Vec::new();
        write_element(&mut buf, &2i32).unwrap();
        buf.extend_from_slice(&[0xff, 0xfe]);

        assert!(matches!(
            read_string(&mut Cursor::new(buf)),
            Err(FormatError::InvalidUtf8(_))
        ));
    }
}
