//! `CNAME` RDATA definition.

use std::fmt::Display;
use std::io::{Cursor, Write};

use crate::error::DnsError;
use crate::name::Name;

use super::{RdataTrait, RecordData};

#[cfg(feature = "serde")]
use serde::Serialize;

/// A record containing the canonical name for an alias.
/// [\[RFC 1035\]](https://www.rfc-editor.org/rfc/rfc1035)
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct CNAME {
    /// The canonical or primary name for the owner. The owner name is an alias.
    pub name: Name,
}

impl RdataTrait for CNAME {
    fn parse_rdata(rdata: &mut Cursor<&[u8]>, _rdlength: u16) -> Result<RecordData, DnsError> {
        Ok(RecordData::CNAME(Self {
            name: Name::parse(rdata)?,
        }))
    }

    fn encode_rdata_into(&self, buf: &mut impl Write) -> Result<u16, DnsError> {
        self.name.encode_into(buf)
    }
}

impl Display for CNAME {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
