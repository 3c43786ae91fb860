//! `MX` RDATA definition.

use std::fmt::Display;
use std::io::{Cursor, Write};

use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};

use crate::error::DnsError;
use crate::name::Name;

use super::{RdataTrait, RecordData};

#[cfg(feature = "serde")]
use serde::Serialize;

/// A record containing mail exchange information.
/// [\[RFC 1035\]](https://www.rfc-editor.org/rfc/rfc1035)
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct MX {
    /// The preference given to this record among others at the same owner. Lower values are
    /// preferred.
    pub preference: u16,
    /// A host willing to act as a mail exchange for the owner name.
    pub exchange: Name,
}

impl RdataTrait for MX {
    fn parse_rdata(rdata: &mut Cursor<&[u8]>, _rdlength: u16) -> Result<RecordData, DnsError> {
        let preference = rdata.read_u16::<NetworkEndian>()?;
        let exchange = Name::parse(rdata)?;
        Ok(RecordData::MX(Self {
            preference,
            exchange,
        }))
    }

    fn encode_rdata_into(&self, buf: &mut impl Write) -> Result<u16, DnsError> {
        buf.write_u16::<NetworkEndian>(self.preference)?;
        self.exchange
            .encode_into(buf)
            .map(|bytes_written| bytes_written + 2)
    }
}

impl Display for MX {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.preference, self.exchange)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crate::rdata::{RdataTrait, RecordData, TYPE_MX};
    use crate::Name;

    use super::MX;

    #[test]
    fn exchange_may_be_compressed() {
        // "example.com" at 0, MX rdata (preference 10, "mail" + pointer to 0) at 13
        let msg = b"\x07example\x03com\x00\x00\x0a\x04mail\xc0\x00";
        let mut cursor = Cursor::new(&msg[..]);
        cursor.set_position(13);

        let rdata = RecordData::parse(TYPE_MX, &mut cursor, 9).unwrap();
        let mx = rdata.as_mx().unwrap();
        assert_eq!(mx.preference, 10);
        assert_eq!(mx.exchange, "mail.example.com");
        assert_eq!(rdata.to_string(), "10 mail.example.com");

        // encoding never compresses
        let encoded = mx.encode().unwrap();
        assert_eq!(encoded, b"\x00\x0a\x04mail\x07example\x03com\x00");
    }

    #[test]
    fn encode_reports_length() {
        let mx = MX {
            preference: 5,
            exchange: Name::from_ascii("mx.example").unwrap(),
        };
        let mut buf = Vec::new();
        assert_eq!(mx.encode_rdata_into(&mut buf).unwrap(), buf.len() as u16);
    }
}
