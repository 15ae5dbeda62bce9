use std::fmt;

use byteorder::{ByteOrder, LittleEndian};

use crate::{EMAIL_OFFSET, EMAIL_SIZE, ID_OFFSET, ID_SIZE, ROW_SIZE, USERNAME_OFFSET, USERNAME_SIZE};

/// One record of the single table: `(id, username, email)`.
///
/// On disk a row is exactly [`ROW_SIZE`] bytes: the id in little-endian,
/// then the two text columns NUL-padded to their field widths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    pub username: String,
    pub email: String,
}

impl Row {
    pub fn new(id: u32, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
        }
    }

    /// Writes the row into the first [`ROW_SIZE`] bytes of `dst`.
    ///
    /// Column widths are checked when the statement is prepared; text past a
    /// field's width is not written.
    pub fn serialize(&self, dst: &mut [u8]) {
        let dst = &mut dst[..ROW_SIZE];
        LittleEndian::write_u32(&mut dst[ID_OFFSET..ID_OFFSET + ID_SIZE], self.id);
        write_text(
            &mut dst[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE],
            &self.username,
        );
        write_text(&mut dst[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE], &self.email);
    }

    /// Reads a row back from the first [`ROW_SIZE`] bytes of `src`.
    pub fn deserialize(src: &[u8]) -> Self {
        let src = &src[..ROW_SIZE];
        Self {
            id: LittleEndian::read_u32(&src[ID_OFFSET..ID_OFFSET + ID_SIZE]),
            username: read_text(&src[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE]),
            email: read_text(&src[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE]),
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username, self.email)
    }
}

fn write_text(field: &mut [u8], text: &str) {
    let bytes = text.as_bytes();
    let len = bytes.len().min(field.len());
    field[..len].copy_from_slice(&bytes[..len]);
    field[len..].fill(0);
}

fn read_text(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}
