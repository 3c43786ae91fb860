//! `A` RDATA definition.

use std::fmt::Display;
use std::io::{Cursor, Write};
use std::net::Ipv4Addr;

use byteorder::{NetworkEndian, ReadBytesExt};

use crate::error::DnsError;

use super::{RdataTrait, RecordData};

#[cfg(feature = "serde")]
use serde::Serialize;

/// A record containing an IPv4 host address. [\[RFC 1035\]](https://www.rfc-editor.org/rfc/rfc1035)
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct A {
    /// The host's address.
    pub address: Ipv4Addr,
}

impl RdataTrait for A {
    fn parse_rdata(rdata: &mut Cursor<&[u8]>, _rdlength: u16) -> Result<RecordData, DnsError> {
        let address = Ipv4Addr::from(rdata.read_u32::<NetworkEndian>()?);
        Ok(RecordData::A(Self { address }))
    }

    fn encode_rdata_into(&self, buf: &mut impl Write) -> Result<u16, DnsError> {
        buf.write_all(&self.address.octets())?;
        Ok(4)
    }
}

impl Display for A {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.address)
    }
}
