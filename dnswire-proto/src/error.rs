//! Custom error type definitions.

use std::io;

use thiserror::Error;

/// Errors that may arise while decoding or encoding DNS messages.
#[derive(Debug, Error)]
pub enum DnsError {
    #[error("Message is too short to be valid: a header needs 12 bytes, got {0}.")]
    TooShort(usize),

    #[error("Unexpected end of message.")]
    Truncated,

    #[error("Domain name too long: allowed are up to 255 bytes, got {0}.")]
    NameTooLong(usize),

    #[error("Label too long: allowed are up to 63 bytes, got {0}.")]
    LabelTooLong(usize),

    #[error("Invalid name: contains an empty label.")]
    EmptyLabel,

    #[error("Tried to encode non-ASCII name: {0}.")]
    NonAsciiName(String),

    #[error("TXT string too long: allowed are up to 255 bytes, got {0}.")]
    TextTooLong(usize),

    #[error("RDATA too long: allowed are up to 65535 bytes, got {0}.")]
    RdataTooLong(usize),

    #[error("Invalid label type: must be 192 (i.e. pointer) or smaller than 64, is {0}.")]
    InvalidLabelType(u8),

    #[error("Invalid compression pointer to offset {0}.")]
    MalformedPointer(usize),

    #[error("There are {0} bytes of unread data left over.")]
    ExtraData(usize),

    #[error("Unsupported record type: valid are 1, 15, 16, 28 or 255, got {0}.")]
    UnsupportedRecordType(u16),

    #[error("IO error.")]
    Io(#[source] io::Error),
}

impl From<io::Error> for DnsError {
    /// Reads from a cursor over the message only fail when they run past its end, so
    /// [`io::ErrorKind::UnexpectedEof`] becomes [`DnsError::Truncated`].
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => DnsError::Truncated,
            _ => DnsError::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use byteorder::{NetworkEndian, ReadBytesExt};

    use super::DnsError;

    #[test]
    fn short_read_is_truncated() {
        let mut cursor = Cursor::new(&[0x12u8][..]);
        let err: DnsError = cursor.read_u16::<NetworkEndian>().unwrap_err().into();
        assert!(matches!(err, DnsError::Truncated));
    }

    #[test]
    fn other_io_errors_are_kept() {
        let err: DnsError = io::Error::new(io::ErrorKind::BrokenPipe, "closed").into();
        assert!(matches!(err, DnsError::Io(_)));
    }
}
