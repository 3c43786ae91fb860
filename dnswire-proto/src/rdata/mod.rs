//! RDATA type definitions.
//!
//! Only the record types a stub client commonly asks for are interpreted; the RDATA of every
//! other record is kept as [`RecordData::Raw`] bytes.

use std::fmt::Display;
use std::io::{Cursor, Read, Write};

use data_encoding::HEXUPPER;

use crate::error::DnsError;

#[cfg(feature = "serde")]
use serde::Serialize;

pub mod a;
pub mod aaaa;
pub mod cname;
pub mod mx;
pub mod txt;

pub use a::A;
pub use aaaa::AAAA;
pub use cname::CNAME;
pub use mx::MX;
pub use txt::TXT;

/// TYPE value of `A` records.
pub const TYPE_A: u16 = 1;
/// TYPE value of `CNAME` records.
pub const TYPE_CNAME: u16 = 5;
/// TYPE value of `MX` records.
pub const TYPE_MX: u16 = 15;
/// TYPE value of `TXT` records.
pub const TYPE_TXT: u16 = 16;
/// TYPE value of `AAAA` records.
pub const TYPE_AAAA: u16 = 28;

/// The record data (RDATA) for a [`Record`][super::Record].
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum RecordData {
    A(A),
    AAAA(AAAA),
    CNAME(CNAME),
    MX(MX),
    TXT(TXT),

    /// RDATA that is not interpreted, containing the raw RDATA bytes.
    Raw(Vec<u8>),
}

/// A trait for working with the different RDATA variants.
pub trait RdataTrait: Sized + Display {
    /// Parses the RDATA from the encoded bytes, starting at `rdata`'s current position in the
    /// slice.
    ///
    /// `rdata` is a [`Cursor`] wrapping the complete DNS message that contains the RDATA. It is
    /// important that the slice contains the complete message, as this is needed for handling DNS
    /// message compression: names in RDATA may point anywhere before them in the message.
    ///
    /// `rdlength` is the byte count of the encoded RDATA that will be parsed. The caller has
    /// already checked that this many bytes are left in the message.
    fn parse_rdata(rdata: &mut Cursor<&[u8]>, rdlength: u16) -> Result<RecordData, DnsError>;

    /// Encodes the RDATA into the given `buf` and returns the number of written bytes on success.
    ///
    /// If an error is returned, no guarantees for the state of `buf` are given.
    fn encode_rdata_into(&self, buf: &mut impl Write) -> Result<u16, DnsError>;

    /// Encodes the RDATA and returns the encoded bytes.
    fn encode(&self) -> Result<Vec<u8>, DnsError> {
        let mut rdata = Vec::new();
        self.encode_rdata_into(&mut rdata)?;
        Ok(rdata)
    }
}

#[doc(hidden)]
macro_rules! impl_from_rtype {
    ($variant:ident) => {
        impl From<$variant> for RecordData {
            fn from(rdata: $variant) -> Self {
                Self::$variant(rdata)
            }
        }
    };
}

#[doc(hidden)]
macro_rules! impl_as_rtype {
    ($method:ident, $variant:ident, $doc:expr) => {
        #[doc = "Returns a reference to the inner [`"]
        #[doc = $doc]
        #[doc = "`] when called on the `"]
        #[doc = $doc]
        #[doc = "` variant. For all other variants, returns [`None`]."]
        pub fn $method(&self) -> Option<&$variant> {
            if let Self::$variant(inner) = self {
                Some(inner)
            } else {
                None
            }
        }
    };

    ($method:ident, $variant:ident) => {
        impl_as_rtype!($method, $variant, stringify!($variant));
    };
}

/// Match on every [`RecordData`] variant and execute a block for it.
///
/// `$arm` is used for the interpreted variants, `$raw_arm` for [`RecordData::Raw`]; `$inner` and
/// `$inner_raw` name the inner field in the respective arm.
macro_rules! match_rdata {
    ($self:ident, $inner:ident, $arm:block, $inner_raw:ident, $raw_arm:block) => {
        match $self {
            RecordData::A($inner) => $arm,
            RecordData::AAAA($inner) => $arm,
            RecordData::CNAME($inner) => $arm,
            RecordData::MX($inner) => $arm,
            RecordData::TXT($inner) => $arm,
            RecordData::Raw($inner_raw) => $raw_arm,
        }
    };
}

impl RecordData {
    /// Parses RDATA of the given type, selecting the variant by `rtype` and `rdlength`:
    ///
    /// | type    | rdlength | variant                  |
    /// |---------|----------|--------------------------|
    /// | `A`     | 4        | [`RecordData::A`]        |
    /// | `AAAA`  | 16       | [`RecordData::AAAA`]     |
    /// | `CNAME` | any      | [`RecordData::CNAME`]    |
    /// | `MX`    | > 3      | [`RecordData::MX`]       |
    /// | `TXT`   | > 0      | [`RecordData::TXT`]      |
    ///
    /// Everything else becomes [`RecordData::Raw`].
    ///
    /// `msg` is the complete message, positioned at the start of the RDATA. Where the cursor
    /// ends up afterwards is unspecified; [`Record::parse()`](crate::Record::parse) moves it to
    /// the end of the RDATA.
    pub fn parse(
        rtype: u16,
        msg: &mut Cursor<&[u8]>,
        rdlength: u16,
    ) -> Result<RecordData, DnsError> {
        match (rtype, rdlength) {
            (TYPE_A, 4) => A::parse_rdata(msg, rdlength),
            (TYPE_AAAA, 16) => AAAA::parse_rdata(msg, rdlength),
            (TYPE_CNAME, _) => CNAME::parse_rdata(msg, rdlength),
            (TYPE_MX, n) if n > 3 => MX::parse_rdata(msg, rdlength),
            (TYPE_TXT, n) if n > 0 => TXT::parse_rdata(msg, rdlength),
            _ => {
                let mut rdata = vec![0; rdlength as usize];
                msg.read_exact(&mut rdata)?;
                Ok(RecordData::Raw(rdata))
            }
        }
    }

    /// See [`RdataTrait::encode()`].
    pub fn encode(&self) -> Result<Vec<u8>, DnsError> {
        match_rdata!(self, rdata, { rdata.encode() }, raw, { Ok(raw.clone()) })
    }

    /// See [`RdataTrait::encode_rdata_into()`].
    pub fn encode_into(&self, buf: &mut impl Write) -> Result<u16, DnsError> {
        match_rdata!(self, rdata, { rdata.encode_rdata_into(buf) }, raw, {
            let len = checked_rdlength(raw.len())?;
            buf.write_all(raw)?;
            Ok(len)
        })
    }

    /// Returns the TYPE value that matches this RDATA, or [`None`] for [`RecordData::Raw`], which
    /// does not know its type.
    pub fn rtype(&self) -> Option<u16> {
        match self {
            RecordData::A(_) => Some(TYPE_A),
            RecordData::AAAA(_) => Some(TYPE_AAAA),
            RecordData::CNAME(_) => Some(TYPE_CNAME),
            RecordData::MX(_) => Some(TYPE_MX),
            RecordData::TXT(_) => Some(TYPE_TXT),
            RecordData::Raw(_) => None,
        }
    }

    impl_as_rtype!(as_a, A);
    impl_as_rtype!(as_aaaa, AAAA);
    impl_as_rtype!(as_cname, CNAME);
    impl_as_rtype!(as_mx, MX);
    impl_as_rtype!(as_txt, TXT);

    /// Returns the raw bytes when called on the `Raw` variant. For all other variants, returns
    /// [`None`].
    pub fn as_raw(&self) -> Option<&[u8]> {
        if let Self::Raw(raw) = self {
            Some(raw)
        } else {
            None
        }
    }
}

impl_from_rtype!(A);
impl_from_rtype!(AAAA);
impl_from_rtype!(CNAME);
impl_from_rtype!(MX);
impl_from_rtype!(TXT);

impl Display for RecordData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match_rdata!(self, rdata, { write!(f, "{}", rdata) }, data, {
            write!(f, "\\# {} {}", data.len(), HEXUPPER.encode(data))
        })
    }
}

/// Converts an encoded RDATA length to RDLENGTH, failing with [`DnsError::RdataTooLong`] if it
/// does not fit into 16 bits.
pub(crate) fn checked_rdlength(len: usize) -> Result<u16, DnsError> {
    u16::try_from(len).map_err(|_| DnsError::RdataTooLong(len))
}

/// Returns the mnemonic of the record types this crate knows about.
///
/// # Examples
/// ```rust
/// use dnswire_proto::rdata::type_name;
///
/// assert_eq!(type_name(5), Some("CNAME"));
/// assert_eq!(type_name(255), Some("ANY"));
/// assert_eq!(type_name(2), None);
/// ```
pub fn type_name(rtype: u16) -> Option<&'static str> {
    match rtype {
        TYPE_A => Some("A"),
        TYPE_CNAME => Some("CNAME"),
        TYPE_MX => Some("MX"),
        TYPE_TXT => Some("TXT"),
        TYPE_AAAA => Some("AAAA"),
        255 => Some("ANY"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::net::Ipv4Addr;

    use crate::error::DnsError;
    use crate::Name;

    use super::*;

    fn parse(rtype: u16, rdata: &[u8]) -> Result<RecordData, DnsError> {
        RecordData::parse(rtype, &mut Cursor::new(rdata), rdata.len() as u16)
    }

    #[test]
    fn selects_variant_by_type_and_length() {
        assert_eq!(
            parse(TYPE_A, &[93, 184, 216, 34]).unwrap(),
            RecordData::A(A {
                address: Ipv4Addr::new(93, 184, 216, 34)
            })
        );
        // an A record with the wrong length stays opaque
        assert_eq!(
            parse(TYPE_A, &[1, 2, 3]).unwrap(),
            RecordData::Raw(vec![1, 2, 3])
        );
        assert_eq!(
            parse(TYPE_AAAA, &[0; 4]).unwrap(),
            RecordData::Raw(vec![0; 4])
        );
        // MX needs room for the preference and at least a two-byte name
        assert_eq!(
            parse(TYPE_MX, &[0, 10, 0]).unwrap(),
            RecordData::Raw(vec![0, 10, 0])
        );
        assert_eq!(parse(2, b"\x00").unwrap(), RecordData::Raw(vec![0]));
    }

    #[test]
    fn empty_txt_does_not_underflow() {
        assert_eq!(parse(TYPE_TXT, &[]).unwrap(), RecordData::Raw(Vec::new()));
    }

    #[test]
    fn cname_rdata() {
        let rdata = parse(TYPE_CNAME, b"\x03www\x07example\x03com\x00").unwrap();
        assert_eq!(
            rdata.as_cname().unwrap().name,
            Name::from_ascii("www.example.com").unwrap()
        );
        assert_eq!(rdata.rtype(), Some(TYPE_CNAME));
    }

    #[test]
    fn raw_display() {
        let rdata = RecordData::Raw(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(rdata.to_string(), "\\# 4 DEADBEEF");
        assert_eq!(rdata.rtype(), None);
        assert_eq!(rdata.encode().unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn oversized_raw_rdata() {
        let rdata = RecordData::Raw(vec![0; 65536]);
        let mut buf = Vec::new();
        assert!(matches!(
            rdata.encode_into(&mut buf),
            Err(DnsError::RdataTooLong(65536))
        ));
        assert!(buf.is_empty());

        let rdata = RecordData::Raw(vec![0; 65535]);
        assert_eq!(rdata.encode_into(&mut buf).unwrap(), 65535);
    }

    #[test]
    fn truncated_raw_rdata() {
        let mut cursor = Cursor::new(&[1u8, 2][..]);
        assert!(matches!(
            RecordData::parse(99, &mut cursor, 3),
            Err(DnsError::Truncated)
        ));
    }
}
