//! `TXT` RDATA definition.

use std::fmt::Display;
use std::io::{Cursor, Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::error::DnsError;

use super::{RdataTrait, RecordData};

#[cfg(feature = "serde")]
use serde::Serialize;

/// A record containing descriptive text. [\[RFC 1035\]](https://www.rfc-editor.org/rfc/rfc1035)
///
/// The RDATA is read as a single character string: the first byte is taken as its length byte
/// and skipped, and all remaining `rdlength - 1` bytes are kept verbatim. If a record carries
/// several character strings, the length bytes of the later ones therefore end up in `text`.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct TXT {
    /// The text bytes, without the leading length byte.
    pub text: Vec<u8>,
}

impl RdataTrait for TXT {
    fn parse_rdata(rdata: &mut Cursor<&[u8]>, rdlength: u16) -> Result<RecordData, DnsError> {
        // RecordData::parse() only gets here for rdlength > 0
        let _length_byte = rdata.read_u8()?;
        let mut text = vec![0; rdlength.saturating_sub(1) as usize];
        rdata.read_exact(&mut text)?;
        Ok(RecordData::TXT(Self { text }))
    }

    fn encode_rdata_into(&self, buf: &mut impl Write) -> Result<u16, DnsError> {
        let len = self.text.len();
        if len > u8::MAX as usize {
            return Err(DnsError::TextTooLong(len));
        }
        buf.write_u8(len as u8)?;
        buf.write_all(&self.text)?;
        Ok(1 + len as u16)
    }
}

impl Display for TXT {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // escape quotes, since the text is printed quoted
        let text = String::from_utf8_lossy(&self.text).replace('"', "\\\"");
        write!(f, "\"{}\"", text)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crate::error::DnsError;
    use crate::rdata::{RdataTrait, RecordData, TYPE_TXT};

    use super::TXT;

    #[test]
    fn skips_length_byte() {
        let rdata = b"\x0bhello world";
        let mut cursor = Cursor::new(&rdata[..]);
        let parsed = RecordData::parse(TYPE_TXT, &mut cursor, rdata.len() as u16).unwrap();
        assert_eq!(parsed.as_txt().unwrap().text, b"hello world");
        assert_eq!(parsed.to_string(), "\"hello world\"");
    }

    #[test]
    fn length_byte_value_is_ignored() {
        // the length byte claims 2, but the whole RDATA is kept
        let rdata = b"\x02abcd";
        let mut cursor = Cursor::new(&rdata[..]);
        let parsed = RecordData::parse(TYPE_TXT, &mut cursor, 5).unwrap();
        assert_eq!(parsed.as_txt().unwrap().text, b"abcd");
    }

    #[test]
    fn quotes_are_escaped() {
        let txt = TXT {
            text: b"say \"hi\"".to_vec(),
        };
        assert_eq!(txt.to_string(), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn encoding_limits() {
        let txt = TXT {
            text: b"v=spf1 -all".to_vec(),
        };
        assert_eq!(txt.encode().unwrap(), b"\x0bv=spf1 -all");

        let txt = TXT {
            text: vec![b'a'; 256],
        };
        assert!(matches!(txt.encode(), Err(DnsError::TextTooLong(256))));
    }
}
