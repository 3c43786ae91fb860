//! `AAAA` RDATA definition.

use std::fmt::Display;
use std::io::{Cursor, Write};
use std::net::Ipv6Addr;

use byteorder::{NetworkEndian, ReadBytesExt};

use crate::error::DnsError;

use super::{RdataTrait, RecordData};

#[cfg(feature = "serde")]
use serde::Serialize;

/// A record containing an IPv6 host address.
/// [\[RFC 3596\]](https://www.rfc-editor.org/rfc/rfc3596)
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct AAAA {
    /// The host's address.
    pub address: Ipv6Addr,
}

impl RdataTrait for AAAA {
    fn parse_rdata(rdata: &mut Cursor<&[u8]>, _rdlength: u16) -> Result<RecordData, DnsError> {
        let address = Ipv6Addr::from(rdata.read_u128::<NetworkEndian>()?);
        Ok(RecordData::AAAA(Self { address }))
    }

    fn encode_rdata_into(&self, buf: &mut impl Write) -> Result<u16, DnsError> {
        buf.write_all(&self.address.octets())?;
        Ok(16)
    }
}

/// Writes all eight groups with four hex digits each, without `::` shortening, e.g.
/// `2606:2800:0220:0001:0248:1893:25c8:1946`.
impl Display for AAAA {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.address.segments().iter().enumerate() {
            if i > 0 {
                write!(f, ":")?;
            }
            write!(f, "{:04x}", segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv6Addr;

    use super::AAAA;

    #[test]
    fn display_is_not_shortened() {
        let aaaa = AAAA {
            address: "2001:db8::1".parse::<Ipv6Addr>().unwrap(),
        };
        assert_eq!(aaaa.to_string(), "2001:0db8:0000:0000:0000:0000:0000:0001");
    }
}
