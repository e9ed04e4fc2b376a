use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{SnapshotError, SnapshotResult};

/// Length prefix written in place of an absent string.
pub(crate) const ABSENT_LEN: i32 = -1;

// keeps a bogus element count from reserving memory before the bytes show up
const PREALLOC_LIMIT: usize = 1024;

pub(crate) fn wire_len(field: &'static str, len: usize) -> SnapshotResult<i32> {
    i32::try_from(len).map_err(|_| SnapshotError::TooLarge { field, len })
}

pub(crate) fn write_string<W: Write>(
    dest: &mut W,
    field: &'static str,
    value: Option<&str>,
) -> SnapshotResult<()> {
    match value {
        None => dest.write_i32::<LittleEndian>(ABSENT_LEN)?,
        Some(value) => {
            dest.write_i32::<LittleEndian>(wire_len(field, value.len())?)?;
            dest.write_all(value.as_bytes())?;
        }
    }
    Ok(())
}

pub(crate) fn write_long_array<W: Write>(
    dest: &mut W,
    field: &'static str,
    values: &[i64],
) -> SnapshotResult<()> {
    dest.write_i32::<LittleEndian>(wire_len(field, values.len())?)?;
    for value in values {
        dest.write_i64::<LittleEndian>(*value)?;
    }
    Ok(())
}

pub(crate) fn read_i32<R: Read>(src: &mut R, field: &'static str) -> SnapshotResult<i32> {
    src.read_i32::<LittleEndian>()
        .map_err(|e| read_error(field, e))
}

pub(crate) fn read_i64<R: Read>(src: &mut R, field: &'static str) -> SnapshotResult<i64> {
    src.read_i64::<LittleEndian>()
        .map_err(|e| read_error(field, e))
}

pub(crate) fn read_f64<R: Read>(src: &mut R, field: &'static str) -> SnapshotResult<f64> {
    src.read_f64::<LittleEndian>()
        .map_err(|e| read_error(field, e))
}

pub(crate) fn read_string<R: Read>(
    src: &mut R,
    field: &'static str,
    max_len: usize,
) -> SnapshotResult<Option<String>> {
    let len = read_i32(src, field)?;
    if len == ABSENT_LEN {
        return Ok(None);
    }
    let len = checked_len(field, len, max_len)?;

    let mut bytes = Vec::with_capacity(len.min(PREALLOC_LIMIT));
    src.by_ref()
        .take(len as u64)
        .read_to_end(&mut bytes)
        .map_err(|e| read_error(field, e))?;
    if bytes.len() != len {
        return Err(SnapshotError::MalformedInput(format!(
            "Unexpected end for {}, expected {} bytes, found {}",
            field,
            len,
            bytes.len()
        )));
    }

    String::from_utf8(bytes).map(Some).map_err(|e| {
        SnapshotError::MalformedInput(format!("Invalid UTF-8 in {}: {}", field, e))
    })
}

pub(crate) fn read_long_array<R: Read>(
    src: &mut R,
    field: &'static str,
    max_len: usize,
) -> SnapshotResult<Vec<i64>> {
    let len = read_i32(src, field)?;
    let len = checked_len(field, len, max_len)?;

    let mut values = Vec::with_capacity(len.min(PREALLOC_LIMIT));
    for i in 0..len {
        match src.read_i64::<LittleEndian>() {
            Ok(value) => values.push(value),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(SnapshotError::MalformedInput(format!(
                    "Unexpected end for {}, expected {} elements, ending at {}",
                    field, len, i
                )))
            }
            Err(e) => return Err(SnapshotError::Io(e)),
        }
    }
    Ok(values)
}

fn checked_len(field: &'static str, len: i32, max_len: usize) -> SnapshotResult<usize> {
    let len = usize::try_from(len).map_err(|_| {
        SnapshotError::MalformedInput(format!("Negative length {} for {}", len, field))
    })?;
    if len > max_len {
        return Err(SnapshotError::MalformedInput(format!(
            "Length {} for {} exceeds limit {}",
            len, field, max_len
        )));
    }
    Ok(len)
}

// a short read is a malformed record, anything else is the reader's own failure
fn read_error(field: &'static str, err: io::Error) -> SnapshotError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        SnapshotError::MalformedInput(format!("Unexpected end for {}", field))
    } else {
        SnapshotError::Io(err)
    }
}
