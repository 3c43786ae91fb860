//! `dnswire-proto` provides the definition of the DNS message format as well as the means to
//! de-/serialize it from/to the wire format described in
//! [RFC 1035](https://www.rfc-editor.org/rfc/rfc1035). In simpler terms, you can build a query for
//! a hostname, and decode any query or response a nameserver sends back.
//!
//! It is used as the backend for the `dnswire` command line client, but does no I/O itself:
//! sending the bytes somewhere is up to you.
//!
//! # Basic usage example
//! ```rust
//! use dnswire_proto::{decode, encode_with_id, RecordType};
//!
//! let query = encode_with_id("example.com", RecordType::A, 0xabcd).unwrap();
//! assert_eq!(query.len(), 29);
//!
//! // queries and responses share one format, so the query can be decoded as well
//! let msg = decode(&query).unwrap();
//! assert_eq!(msg.header.id, 0xabcd);
//! assert_eq!(msg.questions[0].qname, "example.com");
//! assert_eq!(msg.questions[0].qtype, 1);
//! ```
//!
//! # Usage note
//! You can construct most structs directly, without using any `new()` method. In that case it is
//! possible to build inconsistent messages, e.g. a [`Message`] whose header counts don't match the
//! number of records. [`Message::encode()`] writes the header as it is.

use std::cmp::max;
use std::fmt::{self, Display};
use std::io::{Cursor, Write};

use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use owo_colors::OwoColorize;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::Serialize;
use strum_macros::EnumString;

mod bits;
pub mod error;
pub mod name;
pub mod rdata;

use error::DnsError;

pub use name::Name;
pub use rdata::RecordData;

/// Size of the fixed header every message starts with.
pub const HEADER_LEN: usize = 12;

/// The only query class used by this crate: Internet.
pub const CLASS_IN: u16 = 1;

/// Represents a DNS OpCode.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Opcode {
    /// A standard query (`QUERY`).
    Standard,
    /// An inverse query (`IQUERY`, obsolete).
    Reverse,
    /// A server status request (`STATUS`).
    Status,
    /// Any other value of the four bit field.
    Other(u8),
}

/// Represents a DNS RCODE.
///
/// Only the codes of [RFC 1035](https://www.rfc-editor.org/rfc/rfc1035) have names.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum ResponseCode {
    Success,
    FormatError,
    ServerFailure,
    /// The queried domain name does not exist (`NXDOMAIN`).
    NameError,
    NotImplemented,
    Refused,
    Other(u8),
}

/// The record types a query can be made for.
///
/// This is deliberately closed: use [`RecordType::try_from()`] to convert a TYPE value from
/// elsewhere, and [`str::parse()`] for mnemonics like `"aaaa"`.
///
/// # Examples
/// ```rust
/// use dnswire_proto::RecordType;
///
/// assert_eq!("mx".parse::<RecordType>().ok(), Some(RecordType::MX));
/// assert_eq!(u16::from(RecordType::AAAA), 28);
/// assert!(RecordType::try_from(5).is_err());
/// ```
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Copy, Clone, EnumString, Debug)]
#[strum(ascii_case_insensitive)]
#[repr(u16)]
pub enum RecordType {
    A = 1,
    MX = 15,
    TXT = 16,
    AAAA = 28,
    ANY = 255,
}

/// Represents the flags of a [`Header`].
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub struct HeaderFlags {
    /// authoritative answer (valid in responses only)
    pub authoritative: bool,
    /// the message was truncated because it was too long for the transport
    pub truncated: bool,
    /// recursion desired (copied in answer if supported and accepted)
    pub recursion_desired: bool,
    /// valid in responses, indicating recursive query support in the name server
    pub recursion_available: bool,
}

/// Represents a DNS header.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Header {
    /// Supplied by questioner and reflected back unchanged by responder.
    pub id: u16,
    /// False for queries, true for responses.
    pub is_response: bool,
    /// The [`Opcode`] of the message.
    pub opcode: Opcode,
    /// The [`HeaderFlags`] of the message.
    pub flags: HeaderFlags,
    /// The return/status code of the server. Only meaningful if `is_response` is set.
    pub response_code: ResponseCode,
    /// The number of questions.
    pub qdcount: u16,
    /// The number of answer resource records.
    pub ancount: u16,
    /// The number of name server resource records.
    pub nscount: u16,
    /// The number of additional resource records.
    pub arcount: u16,
}

/// Represents a DNS question, i.e. an entry in the question section of a DNS message.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Question {
    /// The [`Name`] to query for.
    pub qname: Name,
    /// The TYPE value to query for.
    pub qtype: u16,
    /// The query CLASS (will almost always be [`CLASS_IN`]).
    pub qclass: u16,
}

/// Represents a DNS resource record, i.e. an entry in the answer, authority or additional section
/// of a DNS message.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Record {
    /// The [`Name`] that this record is for.
    pub owner: Name,
    /// The TYPE value of this record.
    pub rtype: u16,
    /// The CLASS value of this record.
    pub class: u16,
    /// The amount of seconds this record may be cached for.
    pub ttl: u32,
    /// The length of the RDATA on the wire. For decoded records this may differ from the length
    /// of the encoded `rdata`, as names in the RDATA may have been compressed.
    pub rdlength: u16,
    /// The decoded RDATA.
    pub rdata: RecordData,
}

/// Represents a DNS message.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Message {
    /// The message header.
    pub header: Header,
    /// The list of questions.
    pub questions: Vec<Question>,
    /// The list of answer resource records.
    pub answers: Vec<Record>,
    /// The list of name server resource records.
    pub authorities: Vec<Record>,
    /// The list of additional resource records.
    pub additionals: Vec<Record>,
    // bytes left after the declared sections when the message was parsed
    #[cfg_attr(feature = "serde", serde(skip))]
    trailing_bytes: usize,
}

/// Parses a DNS message from a buffer. See [`Message::parse()`].
pub fn decode(buffer: &[u8]) -> Result<Message, DnsError> {
    Message::parse(&mut Cursor::new(buffer))
}

/// Builds a query for `hostname` and returns it in wire format, ready to be sent to a nameserver.
///
/// The message ID is chosen randomly; use [`encode_with_id()`] to choose it yourself.
///
/// Returns an error if `hostname` is longer than 255 bytes, contains a label longer than 63
/// bytes, contains an empty label, or is not ASCII.
pub fn encode(hostname: &str, record_type: RecordType) -> Result<Vec<u8>, DnsError> {
    encode_with_id(hostname, record_type, rand::thread_rng().gen())
}

/// The same as [`encode()`], but with the given message ID.
///
/// # Examples
/// ```rust
/// use dnswire_proto::{encode_with_id, RecordType};
///
/// let query = encode_with_id("example.com", RecordType::AAAA, 0xabcd).unwrap();
/// assert_eq!(
///     query,
///     b"\xab\xcd\x01\x00\x00\x01\x00\x00\x00\x00\x00\x00\
///       \x07example\x03com\x00\x00\x1c\x00\x01"
/// );
/// ```
pub fn encode_with_id(
    hostname: &str,
    record_type: RecordType,
    id: u16,
) -> Result<Vec<u8>, DnsError> {
    let qname = Name::from_ascii(hostname)?;
    Message::new_query(qname, record_type, id).encode()
}

impl Opcode {
    /// Encodes an `Opcode` as the four bit value stored in the header.
    pub fn encode(&self) -> u8 {
        match self {
            Opcode::Standard => 0,
            Opcode::Reverse => 1,
            Opcode::Status => 2,
            Opcode::Other(x) => *x,
        }
    }

    /// Parses an `Opcode` from the four bit value stored in the header.
    pub fn parse(val: u8) -> Opcode {
        match val {
            0 => Opcode::Standard,
            1 => Opcode::Reverse,
            2 => Opcode::Status,
            x => Opcode::Other(x),
        }
    }

    /// Returns the lowercase description used in message dumps, `"?"` for unnamed values.
    pub fn description(&self) -> &'static str {
        match self {
            Opcode::Standard => "standard",
            Opcode::Reverse => "reverse",
            Opcode::Status => "status",
            Opcode::Other(_) => "?",
        }
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl ResponseCode {
    /// Encodes a `ResponseCode` as the value stored in the header.
    pub fn encode(&self) -> u8 {
        match self {
            ResponseCode::Success => 0,
            ResponseCode::FormatError => 1,
            ResponseCode::ServerFailure => 2,
            ResponseCode::NameError => 3,
            ResponseCode::NotImplemented => 4,
            ResponseCode::Refused => 5,
            ResponseCode::Other(x) => *x,
        }
    }

    /// Parses a `ResponseCode` from the value stored in the header.
    pub fn parse(val: u8) -> ResponseCode {
        match val {
            0 => ResponseCode::Success,
            1 => ResponseCode::FormatError,
            2 => ResponseCode::ServerFailure,
            3 => ResponseCode::NameError,
            4 => ResponseCode::NotImplemented,
            5 => ResponseCode::Refused,
            x => ResponseCode::Other(x),
        }
    }

    /// Returns the lowercase description used in message dumps, `"?"` for unnamed values.
    pub fn description(&self) -> &'static str {
        match self {
            ResponseCode::Success => "success",
            ResponseCode::FormatError => "format error",
            ResponseCode::ServerFailure => "server failure",
            ResponseCode::NameError => "name error",
            ResponseCode::NotImplemented => "not implemented",
            ResponseCode::Refused => "refused",
            ResponseCode::Other(_) => "?",
        }
    }
}

impl Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl From<RecordType> for u16 {
    fn from(rtype: RecordType) -> Self {
        rtype as u16
    }
}

impl TryFrom<u16> for RecordType {
    type Error = DnsError;

    fn try_from(val: u16) -> Result<Self, Self::Error> {
        Ok(match val {
            1 => RecordType::A,
            15 => RecordType::MX,
            16 => RecordType::TXT,
            28 => RecordType::AAAA,
            255 => RecordType::ANY,
            x => return Err(DnsError::UnsupportedRecordType(x)),
        })
    }
}

impl Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Returns the mnemonic of a TYPE value, or `TYPE<n>` for types this crate has no name for.
fn type_string(rtype: u16) -> String {
    match rdata::type_name(rtype) {
        Some(name) => name.to_string(),
        None => format!("TYPE{}", rtype),
    }
}

impl Header {
    /// Creates a header for a standard query with recursion desired and a single question.
    pub fn new_query_header(id: u16) -> Self {
        Header {
            id,
            is_response: false,
            opcode: Opcode::Standard,
            flags: HeaderFlags {
                recursion_desired: true,
                ..HeaderFlags::default()
            },
            response_code: ResponseCode::Success,
            qdcount: 1,
            ancount: 0,
            nscount: 0,
            arcount: 0,
        }
    }

    /// Creates a header for a DNS response message.
    ///
    /// `qdcount`, `ancount`, `nscount` and `arcount` are grouped in that order in the `counts`
    /// parameter.
    pub fn new_response_header(
        id: u16,
        opcode: Opcode,
        flags: HeaderFlags,
        response_code: ResponseCode,
        counts: [u16; 4],
    ) -> Self {
        Header {
            id,
            is_response: true,
            opcode,
            flags,
            response_code,
            qdcount: counts[0],
            ancount: counts[1],
            nscount: counts[2],
            arcount: counts[3],
        }
    }

    /// Encodes a `Header` as a series of bytes.
    pub fn encode(&self) -> Result<Vec<u8>, DnsError> {
        let mut buf = Vec::with_capacity(HEADER_LEN);
        self.encode_into(&mut buf)?;
        Ok(buf)
    }

    /// The same as [`encode()`](Self::encode()), but encoded bytes are appended to the given writer
    /// instead of to a newly allocated one.
    pub fn encode_into(&self, buf: &mut impl Write) -> Result<(), DnsError> {
        let byte2 = bits::pack_byte2(
            self.is_response,
            self.opcode.encode(),
            self.flags.authoritative,
            self.flags.truncated,
            self.flags.recursion_desired,
        );
        let byte3 = bits::pack_byte3(self.flags.recursion_available, self.response_code.encode());

        buf.write_u16::<NetworkEndian>(self.id)?;
        buf.write_u8(byte2)?;
        buf.write_u8(byte3)?;
        buf.write_u16::<NetworkEndian>(self.qdcount)?;
        buf.write_u16::<NetworkEndian>(self.ancount)?;
        buf.write_u16::<NetworkEndian>(self.nscount)?;
        buf.write_u16::<NetworkEndian>(self.arcount)?;

        Ok(())
    }

    /// Parses an encoded `Header` from a series of bytes.
    ///
    /// Returns [`DnsError::Truncated`] if fewer than 12 bytes are left.
    pub fn parse(header: &mut Cursor<&[u8]>) -> Result<Self, DnsError> {
        let id = header.read_u16::<NetworkEndian>()?;
        let byte2 = header.read_u8()?;
        let byte3 = header.read_u8()?;

        Ok(Header {
            id,
            is_response: bits::qr(byte2),
            opcode: Opcode::parse(bits::opcode(byte2)),
            flags: HeaderFlags {
                authoritative: bits::aa(byte2),
                truncated: bits::tc(byte2),
                recursion_desired: bits::rd(byte2),
                recursion_available: bits::ra(byte3),
            },
            response_code: ResponseCode::parse(bits::rcode(byte3)),
            qdcount: header.read_u16::<NetworkEndian>()?,
            ancount: header.read_u16::<NetworkEndian>()?,
            nscount: header.read_u16::<NetworkEndian>()?,
            arcount: header.read_u16::<NetworkEndian>()?,
        })
    }

    /// Creates a string containing information (id, opcode, rcode if applicable, flags) about the
    /// header.
    pub fn info_str(&self) -> String {
        let mut s = if self.is_response {
            format!(
                "id: {}, opcode: {}, rcode: {}, flags:",
                self.id, self.opcode, self.response_code
            )
        } else {
            format!("id: {}, opcode: {}, flags:", self.id, self.opcode)
        };
        let flags = [
            (self.flags.authoritative, " aa"),
            (self.flags.truncated, " tc"),
            (self.flags.recursion_desired, " rd"),
            (self.flags.recursion_available, " ra"),
        ];
        for (_, name) in flags.iter().filter(|(set, _)| *set) {
            s.push_str(name);
        }
        s
    }
}

impl Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_response {
            write!(f, "DNS Response ({})", self.info_str())
        } else {
            write!(f, "DNS Query ({})", self.info_str())
        }
    }
}

impl Question {
    /// Creates a DNS question.
    pub fn new(qname: Name, qtype: u16, qclass: u16) -> Self {
        Question {
            qname,
            qtype,
            qclass,
        }
    }

    /// Encodes a `Question` as a series of bytes.
    pub fn encode(&self) -> Result<Vec<u8>, DnsError> {
        let mut buf = Vec::new();
        self.encode_into(&mut buf)?;
        Ok(buf)
    }

    /// The same as [`encode()`](Self::encode()), but encoded bytes are appended to the given writer
    /// instead of to a newly allocated one.
    pub fn encode_into(&self, buf: &mut impl Write) -> Result<(), DnsError> {
        self.qname.encode_into(buf)?;
        buf.write_u16::<NetworkEndian>(self.qtype)?;
        buf.write_u16::<NetworkEndian>(self.qclass)?;
        Ok(())
    }

    /// Parses an encoded `Question` from a series of bytes.
    ///
    /// `msg` must wrap the complete message, see [`Name::parse()`].
    pub fn parse(msg: &mut Cursor<&[u8]>) -> Result<Self, DnsError> {
        let qname = Name::parse(msg)?;
        let qtype = msg.read_u16::<NetworkEndian>()?;
        let qclass = msg.read_u16::<NetworkEndian>()?;

        Ok(Question {
            qname,
            qtype,
            qclass,
        })
    }
}

impl Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DNS Question for '{}' (type: {}, class: {})",
            self.qname,
            type_string(self.qtype),
            self.qclass
        )
    }
}

impl Record {
    /// Creates a new `Record` from [`RecordData`], filling in `rdlength` from the encoded RDATA.
    ///
    /// `rtype` is taken as given, so [`RecordData::Raw`] can be used for any type.
    ///
    /// Returns an error if `rdata` could not be encoded, or if it is longer than RDLENGTH can
    /// express.
    pub fn new(
        owner: Name,
        rtype: u16,
        class: u16,
        ttl: u32,
        rdata: RecordData,
    ) -> Result<Self, DnsError> {
        let rdlength = rdata::checked_rdlength(rdata.encode()?.len())?;
        Ok(Self {
            owner,
            rtype,
            class,
            ttl,
            rdlength,
            rdata,
        })
    }

    /// Encodes a `Record` as a series of bytes.
    pub fn encode(&self) -> Result<Vec<u8>, DnsError> {
        let mut buf = Vec::new();
        self.encode_into(&mut buf)?;
        Ok(buf)
    }

    /// The same as [`encode()`](Self::encode()), but encoded bytes are appended to the given writer
    /// instead of to a newly allocated one.
    ///
    /// The RDLENGTH field is computed from the encoded RDATA, not taken from `rdlength`.
    pub fn encode_into(&self, buf: &mut impl Write) -> Result<(), DnsError> {
        let rdata = self.rdata.encode()?;
        let rdlength = rdata::checked_rdlength(rdata.len())?;
        self.owner.encode_into(buf)?;
        buf.write_u16::<NetworkEndian>(self.rtype)?;
        buf.write_u16::<NetworkEndian>(self.class)?;
        buf.write_u32::<NetworkEndian>(self.ttl)?;
        buf.write_u16::<NetworkEndian>(rdlength)?;
        buf.write_all(&rdata)?;
        Ok(())
    }

    /// Parses an encoded `Record` from a series of bytes.
    ///
    /// `msg` must wrap the complete message, see [`Name::parse()`]. Afterwards the cursor is
    /// positioned right behind the RDATA, as given by RDLENGTH, no matter how much of it was
    /// needed to decode the [`RecordData`].
    ///
    /// Returns [`DnsError::Truncated`] if the message ends before the RDATA does.
    pub fn parse(msg: &mut Cursor<&[u8]>) -> Result<Self, DnsError> {
        let owner = Name::parse(msg)?;
        let rtype = msg.read_u16::<NetworkEndian>()?;
        let class = msg.read_u16::<NetworkEndian>()?;
        let ttl = msg.read_u32::<NetworkEndian>()?;
        let rdlength = msg.read_u16::<NetworkEndian>()?;

        let rdata_start = msg.position() as usize;
        let rdata_end = rdata_start + rdlength as usize;
        if rdata_end > msg.get_ref().len() {
            return Err(DnsError::Truncated);
        }
        let rdata = RecordData::parse(rtype, msg, rdlength)?;
        msg.set_position(rdata_end as u64);

        Ok(Record {
            owner,
            rtype,
            class,
            ttl,
            rdlength,
            rdata,
        })
    }

    /// Returns a string representing the record in the format used in zone files, but without the
    /// class and without trailing dots for domain names.
    ///
    /// If `owner_len`/`rtype_len` is [`Some`], the owner/type field is padded to the specified
    /// length and the TTL field is right-aligned to six characters.
    ///
    /// If `output` is [`Some`] and the specified output stream supports colours, the output will
    /// be colourized.
    pub fn as_string(
        &self,
        owner_len: Option<usize>,
        rtype_len: Option<usize>,
        output: Option<owo_colors::Stream>,
    ) -> String {
        let mut owner = self.owner.to_string();
        let mut rtype = type_string(self.rtype);
        let padded = owner_len.is_some() || rtype_len.is_some();
        if let Some(len) = owner_len {
            owner = format!("{:<1$}", owner, len);
        }
        if let Some(len) = rtype_len {
            rtype = format!("{:<1$}", rtype, len);
        }

        if let Some(stream) = output {
            owner = owner.if_supports_color(stream, |s| s.green()).to_string();
            rtype = rtype.if_supports_color(stream, |s| s.purple()).to_string();
        }

        if padded {
            format!("{}  {:>6}  {}  {}", owner, self.ttl, rtype, self.rdata)
        } else {
            format!("{} {} {} {}", owner, self.ttl, rtype, self.rdata)
        }
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string(None, None, None))
    }
}

impl Message {
    /// Creates a standard query with recursion desired for `qname`, class `IN`.
    pub fn new_query(qname: Name, qtype: RecordType, id: u16) -> Self {
        Message {
            header: Header::new_query_header(id),
            questions: vec![Question::new(qname, qtype.into(), CLASS_IN)],
            answers: Vec::new(),
            authorities: Vec::new(),
            additionals: Vec::new(),
            trailing_bytes: 0,
        }
    }

    /// Creates a DNS response.
    ///
    /// `answers`, `authorities`, `additionals` are grouped in that order in the `records`
    /// parameter. The header counts are set from the lengths of the given lists.
    pub fn new_response(
        id: u16,
        opcode: Opcode,
        flags: HeaderFlags,
        response_code: ResponseCode,
        questions: Vec<Question>,
        records: [Vec<Record>; 3],
    ) -> Self {
        let [answers, authorities, additionals] = records;
        Message {
            header: Header::new_response_header(
                id,
                opcode,
                flags,
                response_code,
                [
                    questions.len() as u16,
                    answers.len() as u16,
                    authorities.len() as u16,
                    additionals.len() as u16,
                ],
            ),
            questions,
            answers,
            authorities,
            additionals,
            trailing_bytes: 0,
        }
    }

    /// Encodes a `Message` as a series of bytes. Names are not compressed.
    pub fn encode(&self) -> Result<Vec<u8>, DnsError> {
        let mut buf = Vec::new();
        self.encode_into(&mut buf)?;
        Ok(buf)
    }

    /// The same as [`encode()`](Self::encode()), but encoded bytes are appended to the given writer
    /// instead of to a newly allocated one.
    pub fn encode_into(&self, buf: &mut impl Write) -> Result<(), DnsError> {
        self.header.encode_into(buf)?;
        for question in &self.questions {
            question.encode_into(buf)?;
        }
        for record in self.records() {
            record.encode_into(buf)?;
        }

        Ok(())
    }

    /// Parses an encoded `Message` from a series of bytes.
    ///
    /// `msg` must wrap the complete message and be positioned at its start.
    ///
    /// For responses with a response code other than [`ResponseCode::Success`], only the header
    /// is parsed, as servers often omit the sections then; see
    /// [`is_error_response()`](Self::is_error_response).
    ///
    /// Bytes left over after the declared sections are not an error; see
    /// [`extra_data()`](Self::extra_data).
    ///
    /// Returns [`DnsError::TooShort`] if there are fewer than 12 bytes, and an error if
    /// [`Header::parse()`], [`Question::parse()`] or [`Record::parse()`] return one.
    pub fn parse(msg: &mut Cursor<&[u8]>) -> Result<Self, DnsError> {
        let available = msg
            .get_ref()
            .len()
            .saturating_sub(msg.position() as usize);
        if available < HEADER_LEN {
            return Err(DnsError::TooShort(available));
        }

        let header = Header::parse(msg)?;
        let mut message = Message {
            header,
            questions: Vec::new(),
            answers: Vec::new(),
            authorities: Vec::new(),
            additionals: Vec::new(),
            trailing_bytes: 0,
        };

        if message.is_error_response() {
            debug!(
                "response {} has rcode {}, not parsing any sections",
                message.header.id, message.header.response_code
            );
            return Ok(message);
        }

        message.questions = Message::parse_questions(msg, message.header.qdcount)?;
        message.answers = Message::parse_records(msg, message.header.ancount)?;
        message.authorities = Message::parse_records(msg, message.header.nscount)?;
        message.additionals = Message::parse_records(msg, message.header.arcount)?;

        message.trailing_bytes = msg
            .get_ref()
            .len()
            .saturating_sub(msg.position() as usize);
        if message.trailing_bytes > 0 {
            debug!(
                "message {} has {} bytes of unread data left over",
                message.header.id, message.trailing_bytes
            );
        }

        Ok(message)
    }

    /// Returns true iff this is a response whose response code is not
    /// [`ResponseCode::Success`].
    pub fn is_error_response(&self) -> bool {
        self.header.is_response && self.header.response_code != ResponseCode::Success
    }

    /// Returns [`DnsError::ExtraData`] if the parsed message had bytes left over after its
    /// declared sections.
    ///
    /// This is a diagnostic only: the message itself was parsed successfully.
    pub fn extra_data(&self) -> Option<DnsError> {
        if self.trailing_bytes > 0 {
            Some(DnsError::ExtraData(self.trailing_bytes))
        } else {
            None
        }
    }

    /// Returns an iterator over the answer, authority and additional records, in that order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.answers
            .iter()
            .chain(self.authorities.iter())
            .chain(self.additionals.iter())
    }

    /// Returns a string describing every field of the message, one per line:
    ///
    /// ```text
    /// ID = AB CD
    /// QR = 1 response
    /// OPCODE = 0 standard
    /// AA = 0
    /// TC = 0
    /// RD = 1 recursion desired
    /// RCODE = 0 success
    /// QDCOUNT = 1
    /// ...
    /// Answer  1
    ///   name:     (Pointer 12):example.com
    ///   type: 1
    ///  class: 1
    ///    ttl: 3600
    ///  rdlen: 4
    /// Address 93.184.216.34
    /// ```
    ///
    /// Names read through compression pointers show each pointer, see [`Name::annotated()`]. Error
    /// responses end after the `RCODE` line, as their sections were not parsed.
    ///
    /// If `output` is [`Some`] and the specified output stream supports colours, the output will
    /// be colourized.
    pub fn as_string(&self, output: Option<owo_colors::Stream>) -> String {
        let heading = |s: String| match output {
            Some(stream) => s.if_supports_color(stream, |s| s.yellow()).to_string(),
            None => s,
        };
        let name = |n: &Name| match output {
            Some(stream) => n
                .annotated()
                .if_supports_color(stream, |s| s.green())
                .to_string(),
            None => n.annotated().to_string(),
        };
        let flag = |field: &str, set: bool, desc: &str| {
            if set {
                format!("{} = 1 {}\n", field, desc)
            } else {
                format!("{} = 0\n", field)
            }
        };

        let header = &self.header;
        let mut res = String::new();

        let id = header.id.to_be_bytes();
        res.push_str(&format!("ID = {:X} {:X}\n", id[0], id[1]));
        res.push_str(&format!(
            "QR = {} {}\n",
            header.is_response as u8,
            if header.is_response {
                "response"
            } else {
                "query"
            }
        ));
        res.push_str(&format!(
            "OPCODE = {} {}\n",
            header.opcode.encode(),
            header.opcode.description()
        ));
        res.push_str(&flag("AA", header.flags.authoritative, "authoritative"));
        res.push_str(&flag("TC", header.flags.truncated, "message truncated"));
        res.push_str(&flag(
            "RD",
            header.flags.recursion_desired,
            "recursion desired",
        ));

        if header.is_response {
            res.push_str(&format!(
                "RCODE = {} {}\n",
                header.response_code.encode(),
                header.response_code.description()
            ));
        }

        if !self.is_error_response() {
            res.push_str(&format!("QDCOUNT = {}\n", header.qdcount));
            res.push_str(&format!("ANCOUNT = {}\n", header.ancount));
            res.push_str(&format!("NSCOUNT = {}\n", header.nscount));
            res.push_str(&format!("ARCOUNT = {}\n", header.arcount));

            for (i, question) in self.questions.iter().enumerate() {
                res.push_str(&heading(format!("Query {:2}", i + 1)));
                res.push('\n');
                res.push_str(&format!("  name: {}\n", name(&question.qname)));
                res.push_str(&format!("  type: {}\n", question.qtype));
                res.push_str(&format!(" class: {}\n", question.qclass));
            }

            for (i, record) in self.records().enumerate() {
                res.push_str(&heading(format!("Answer {:2}", i + 1)));
                res.push('\n');
                res.push_str(&format!("  name: {}\n", name(&record.owner)));
                res.push_str(&format!("  type: {}\n", record.rtype));
                res.push_str(&format!(" class: {}\n", record.class));
                res.push_str(&format!("   ttl: {}\n", record.ttl));
                res.push_str(&format!(" rdlen: {}\n", record.rdlength));
                match &record.rdata {
                    RecordData::A(a) => res.push_str(&format!("Address {}\n", a)),
                    RecordData::AAAA(aaaa) => res.push_str(&format!("Address {}\n", aaaa)),
                    RecordData::MX(mx) => {
                        res.push_str(&format!("  pref: {}\n", mx.preference));
                        res.push_str(&format!("MX: {}\n", name(&mx.exchange)));
                    }
                    RecordData::TXT(txt) => res.push_str(&format!(
                        "TXT: '{}'\n",
                        String::from_utf8_lossy(&txt.text)
                    )),
                    RecordData::CNAME(cname) => {
                        res.push_str(&format!("CNAME: {}\n", name(&cname.name)))
                    }
                    raw @ RecordData::Raw(_) => res.push_str(&format!("RDATA: {}\n", raw)),
                }
            }

            if self.trailing_bytes > 0 {
                res.push_str("There is some unread data left over.\n");
            }
        }

        // remove trailing '\n'
        res.pop();
        res
    }

    /// Returns the answer section one record per line, with owners and types padded to the same
    /// width, or `None` if the message has no records at all.
    ///
    /// If `output` is [`Some`] and the specified output stream supports colours, the output will
    /// be colourized.
    pub fn records_string(&self, output: Option<owo_colors::Stream>) -> Option<String> {
        let (mut max_owner_len, mut max_type_len) = (0, 0);
        for record in self.records() {
            max_owner_len = max(max_owner_len, record.owner.string_len());
            max_type_len = max(max_type_len, type_string(record.rtype).len());
        }

        let lines: Vec<_> = self
            .records()
            .map(|record| record.as_string(Some(max_owner_len), Some(max_type_len), output))
            .collect();
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }

    /// Parses the question section of a DNS message.
    fn parse_questions(msg: &mut Cursor<&[u8]>, qdcount: u16) -> Result<Vec<Question>, DnsError> {
        let mut questions = Vec::new();
        for _i in 0..qdcount {
            questions.push(Question::parse(msg)?);
        }

        Ok(questions)
    }

    /// Parses a record section (i.e. answer, authority or additional) of a DNS message.
    fn parse_records(msg: &mut Cursor<&[u8]>, count: u16) -> Result<Vec<Record>, DnsError> {
        let mut records = Vec::new();
        for _i in 0..count {
            records.push(Record::parse(msg)?);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::net::Ipv4Addr;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::error::DnsError;
    use crate::rdata::{A, MX, TXT};
    use crate::*;

    /// A response for `example.com A` with a single compressed answer.
    const EXAMPLE_RESPONSE: &[u8] = b"\xab\xcd\x81\x80\x00\x01\x00\x01\x00\x00\x00\x00\
        \x07example\x03com\x00\x00\x01\x00\x01\
        \xc0\x0c\x00\x01\x00\x01\x00\x00\x0e\x10\x00\x04\x5d\xb8\xd8\x22";

    fn header(byte2: u8, byte3: u8, counts: [u16; 4]) -> Vec<u8> {
        let mut buf = vec![0x12, 0x34, byte2, byte3];
        for count in counts {
            buf.extend_from_slice(&count.to_be_bytes());
        }
        buf
    }

    #[test]
    fn query_round_trip() {
        let query = encode_with_id("example.com", RecordType::A, 0x1234).unwrap();
        assert_eq!(
            query,
            b"\x12\x34\x01\x00\x00\x01\x00\x00\x00\x00\x00\x00\
              \x07example\x03com\x00\x00\x01\x00\x01"
        );

        let msg = decode(&query).unwrap();
        assert_eq!(msg.header, Header::new_query_header(0x1234));
        assert_eq!(
            msg.questions,
            vec![Question::new(
                Name::from_ascii("example.com").unwrap(),
                1,
                CLASS_IN
            )]
        );
        assert_eq!(msg.records().count(), 0);
        assert!(msg.extra_data().is_none());
    }

    #[test]
    fn random_ids_are_used() {
        let query = encode("example.com", RecordType::TXT).unwrap();
        assert_eq!(query.len(), 29);
        assert_eq!(&query[2..4], b"\x01\x00");
        assert_eq!(&query[27..], b"\x00\x01");
        assert_eq!(&query[25..27], b"\x00\x10");
    }

    #[test]
    fn encoder_rejects_bad_names() {
        let long_label = "a".repeat(64);
        assert!(matches!(
            encode(&long_label, RecordType::A),
            Err(DnsError::LabelTooLong(64))
        ));

        let long_name = vec!["abcdefg"; 40].join(".");
        assert!(matches!(
            encode(&long_name, RecordType::A),
            Err(DnsError::NameTooLong(319))
        ));

        assert!(matches!(
            encode("a..b", RecordType::MX),
            Err(DnsError::EmptyLabel)
        ));
        assert!(matches!(
            encode("bücher.de", RecordType::A),
            Err(DnsError::NonAsciiName(_))
        ));
    }

    #[test]
    fn root_query() {
        let query = encode_with_id(".", RecordType::ANY, 1).unwrap();
        assert_eq!(&query[12..], b"\x00\x00\xff\x00\x01");
        assert!(decode(&query).unwrap().questions[0].qname.is_root());
    }

    #[test]
    fn short_messages() {
        assert!(matches!(decode(&[0; 11]), Err(DnsError::TooShort(11))));
        assert!(matches!(decode(&[]), Err(DnsError::TooShort(0))));

        // a header announcing a question that isn't there
        let msg = header(0x01, 0x00, [1, 0, 0, 0]);
        assert!(matches!(decode(&msg), Err(DnsError::Truncated)));
    }

    #[test]
    fn a_record_response() {
        let msg = decode(EXAMPLE_RESPONSE).unwrap();
        assert!(msg.header.is_response);
        assert!(msg.header.flags.recursion_desired);
        assert!(msg.header.flags.recursion_available);
        assert!(!msg.is_error_response());
        assert_eq!(msg.answers.len(), 1);

        let answer = &msg.answers[0];
        assert_eq!(answer.owner, "example.com");
        assert_eq!(answer.ttl, 3600);
        assert_eq!(answer.rdlength, 4);
        assert_eq!(
            answer.rdata,
            RecordData::A(A {
                address: Ipv4Addr::new(93, 184, 216, 34)
            })
        );
        assert_eq!(answer.to_string(), "example.com 3600 A 93.184.216.34");
        assert_eq!(
            msg.records_string(None).unwrap(),
            "example.com    3600  A  93.184.216.34"
        );
    }

    #[test]
    fn error_response_stops_after_header() {
        // NXDOMAIN, with a question that would not even parse
        let mut msg = header(0x81, 0x83, [1, 0, 0, 0]);
        msg.push(0xc0);
        let msg = decode(&msg).unwrap();

        assert!(msg.is_error_response());
        assert_eq!(msg.header.response_code, ResponseCode::NameError);
        assert!(msg.questions.is_empty());
        assert!(msg.extra_data().is_none());
        assert_eq!(
            msg.as_string(None),
            "ID = 12 34\n\
             QR = 1 response\n\
             OPCODE = 0 standard\n\
             AA = 0\n\
             TC = 0\n\
             RD = 1 recursion desired\n\
             RCODE = 3 name error"
        );
    }

    #[test]
    fn rcode_is_ignored_in_queries() {
        let msg = header(0x00, 0x05, [0; 4]);
        let msg = decode(&msg).unwrap();
        assert_eq!(msg.header.response_code, ResponseCode::Refused);
        assert!(!msg.is_error_response());
    }

    #[test]
    fn compressed_question() {
        let mut msg = header(0x01, 0x00, [2, 0, 0, 0]);
        msg.extend_from_slice(b"\x07example\x03com\x00\x00\x01\x00\x01");
        msg.extend_from_slice(b"\xc0\x0c\x00\x1c\x00\x01");

        let msg = decode(&msg).unwrap();
        assert_eq!(msg.questions.len(), 2);
        assert_eq!(msg.questions[1].qname, "example.com");
        assert_eq!(msg.questions[1].qtype, 28);
        assert!(msg.extra_data().is_none());
    }

    #[test]
    fn pointer_loops_are_rejected() {
        let mut msg = header(0x01, 0x00, [1, 0, 0, 0]);
        msg.extend_from_slice(b"\xc0\x0c\x00\x01\x00\x01");
        assert!(matches!(
            decode(&msg),
            Err(DnsError::MalformedPointer(12))
        ));
    }

    #[test]
    fn trailing_data_is_reported() {
        let mut msg = EXAMPLE_RESPONSE.to_vec();
        msg.extend_from_slice(&[0, 0, 0]);
        let msg = decode(&msg).unwrap();

        assert_eq!(msg.answers.len(), 1);
        assert!(matches!(msg.extra_data(), Some(DnsError::ExtraData(3))));
        assert!(msg
            .as_string(None)
            .ends_with("Address 93.184.216.34\nThere is some unread data left over."));
    }

    #[test]
    fn rdata_shorter_than_rdlength() {
        // the A rdata claims 4 bytes, but the message ends after 2
        let msg = &EXAMPLE_RESPONSE[..EXAMPLE_RESPONSE.len() - 2];
        assert!(matches!(decode(msg), Err(DnsError::Truncated)));
    }

    #[test]
    fn unknown_rdata_is_skipped_by_rdlength() {
        // an NS record followed by an A record
        let mut msg = header(0x81, 0x80, [0, 2, 0, 0]);
        msg.extend_from_slice(b"\x00\x00\x02\x00\x01\x00\x00\x00\x3c\x00\x02\xc0\x00");
        msg.extend_from_slice(b"\x00\x00\x01\x00\x01\x00\x00\x00\x3c\x00\x04\x7f\x00\x00\x01");

        let msg = decode(&msg).unwrap();
        assert_eq!(msg.answers[0].rdata, RecordData::Raw(vec![0xc0, 0x00]));
        assert_eq!(msg.answers[1].owner, Name::root());
        assert_eq!(
            msg.answers[1].rdata.as_a().map(|a| a.address),
            Some(Ipv4Addr::LOCALHOST)
        );
    }

    #[test]
    fn header_flags_survive_encoding() {
        let flags = HeaderFlags {
            authoritative: true,
            truncated: true,
            recursion_desired: false,
            recursion_available: true,
        };
        let header = Header::new_response_header(
            0xbeef,
            Opcode::Status,
            flags,
            ResponseCode::Refused,
            [0; 4],
        );
        let encoded = header.encode().unwrap();
        assert_eq!(encoded[2..4], [0x96, 0x85]);

        let parsed = Header::parse(&mut Cursor::new(&encoded[..])).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(
            parsed.to_string(),
            "DNS Response (id: 48879, opcode: Status, rcode: Refused, flags: aa tc ra)"
        );
    }

    #[test]
    fn response_round_trip() {
        let owner = Name::from_ascii("example.com").unwrap();
        let answers = vec![
            Record::new(
                owner.clone(),
                rdata::TYPE_MX,
                CLASS_IN,
                300,
                MX {
                    preference: 10,
                    exchange: Name::from_ascii("mail.example.com").unwrap(),
                }
                .into(),
            )
            .unwrap(),
            Record::new(
                owner.clone(),
                rdata::TYPE_TXT,
                CLASS_IN,
                300,
                TXT {
                    text: b"v=spf1 -all".to_vec(),
                }
                .into(),
            )
            .unwrap(),
        ];
        assert_eq!(answers[0].rdlength, 20);
        assert_eq!(answers[1].rdlength, 12);

        let msg = Message::new_response(
            7,
            Opcode::Standard,
            HeaderFlags::default(),
            ResponseCode::Success,
            vec![Question::new(owner, RecordType::ANY.into(), CLASS_IN)],
            [answers, Vec::new(), Vec::new()],
        );
        assert_eq!(msg.header.qdcount, 1);
        assert_eq!(msg.header.ancount, 2);

        let decoded = decode(&msg.encode().unwrap()).unwrap();
        assert_eq!(decoded, msg);
    }

    fn assert_query_round_trip(hostname: &str, qtype: RecordType, id: u16) {
        let query = encode_with_id(hostname, qtype, id)
            .unwrap_or_else(|e| panic!("could not encode {:?}: {}", hostname, e));
        let msg = decode(&query)
            .unwrap_or_else(|e| panic!("could not decode query for {:?}: {}", hostname, e));

        assert_eq!(msg.header, Header::new_query_header(id));
        assert_eq!(msg.questions.len(), 1);
        assert_eq!(msg.questions[0].qname, Name::from_ascii(hostname).unwrap());
        assert_eq!(msg.questions[0].qtype, u16::from(qtype));
        assert_eq!(msg.questions[0].qclass, CLASS_IN);
        assert!(msg.extra_data().is_none());
    }

    #[test]
    fn longest_hostnames_round_trip() {
        // four 63-byte labels, 255 bytes in total
        let widest = vec!["x".repeat(63); 4].join(".");
        assert_eq!(widest.len(), 255);
        assert_query_round_trip(&widest, RecordType::A, 1);

        // 128 single-byte labels
        let deepest = format!("{}a", "a.".repeat(127));
        assert_eq!(deepest.len(), 255);
        assert_query_round_trip(&deepest, RecordType::AAAA, 2);

        // 254 bytes plus the trailing dot
        let dotted = format!("{}.{}.", vec!["b".repeat(63); 3].join("."), "c".repeat(62));
        assert_eq!(dotted.len(), 255);
        assert_query_round_trip(&dotted, RecordType::MX, 3);
    }

    #[test]
    fn random_hostnames_round_trip() {
        const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-_";
        let types = [
            RecordType::A,
            RecordType::MX,
            RecordType::TXT,
            RecordType::AAAA,
            RecordType::ANY,
        ];
        let mut rng = StdRng::seed_from_u64(0xd05);

        for _ in 0..500 {
            let target_len = rng.gen_range(1..=255);
            let mut labels: Vec<String> = Vec::new();
            let mut len = 0;
            loop {
                let dot = usize::from(!labels.is_empty());
                if len + dot >= target_len {
                    break;
                }
                let room = target_len - len - dot;
                let label_len = rng.gen_range(1..=room.min(63));
                let label: String = (0..label_len)
                    .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
                    .collect();
                len += label_len + dot;
                labels.push(label);
            }
            let hostname = labels.join(".");
            assert!(hostname.len() <= 255);

            let qtype = types[rng.gen_range(0..types.len())];
            assert_query_round_trip(&hostname, qtype, rng.gen());
        }
    }

    #[test]
    fn oversized_rdata_is_rejected() {
        let rdata = RecordData::Raw(vec![0; 70000]);
        assert!(matches!(
            Record::new(Name::root(), 99, CLASS_IN, 0, rdata.clone()),
            Err(DnsError::RdataTooLong(70000))
        ));

        let record = Record {
            owner: Name::root(),
            rtype: 99,
            class: CLASS_IN,
            ttl: 0,
            rdlength: 0,
            rdata,
        };
        let mut buf = Vec::new();
        assert!(matches!(
            record.encode_into(&mut buf),
            Err(DnsError::RdataTooLong(70000))
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn message_dump() {
        let msg = decode(EXAMPLE_RESPONSE).unwrap();
        assert_eq!(
            msg.as_string(None),
            "ID = AB CD\n\
             QR = 1 response\n\
             OPCODE = 0 standard\n\
             AA = 0\n\
             TC = 0\n\
             RD = 1 recursion desired\n\
             RCODE = 0 success\n\
             QDCOUNT = 1\n\
             ANCOUNT = 1\n\
             NSCOUNT = 0\n\
             ARCOUNT = 0\n\
             Query  1\n  \
               name: example.com\n  \
               type: 1\n \
             class: 1\n\
             Answer  1\n  \
               name:     (Pointer 12):example.com\n  \
               type: 1\n \
             class: 1\n   \
                ttl: 3600\n \
             rdlen: 4\n\
             Address 93.184.216.34"
        );
    }

    #[test]
    fn query_dump() {
        let query = encode_with_id("example.com", RecordType::MX, 0x0102).unwrap();
        let dump = decode(&query).unwrap().as_string(None);
        assert!(dump.starts_with("ID = 1 2\nQR = 0 query\n"));
        assert!(!dump.contains("RCODE"));
        assert!(dump.ends_with("  type: 15\n class: 1"));
    }

    #[test]
    fn record_type_conversions() {
        assert_eq!("AaAa".parse::<RecordType>().ok(), Some(RecordType::AAAA));
        assert!("cname".parse::<RecordType>().is_err());
        assert_eq!(u16::from(RecordType::ANY), 255);
        assert_eq!(RecordType::try_from(16).ok(), Some(RecordType::TXT));
        assert!(matches!(
            RecordType::try_from(2),
            Err(DnsError::UnsupportedRecordType(2))
        ));
    }

    #[test]
    fn garbage_never_panics() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let valid = [
            EXAMPLE_RESPONSE.to_vec(),
            encode_with_id("www.example.com", RecordType::AAAA, 9).unwrap(),
        ];

        for _ in 0..2000 {
            let len = rng.gen_range(0..64);
            let buf: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
            let _ = decode(&buf);
        }

        for _ in 0..2000 {
            let mut buf = valid[rng.gen_range(0..valid.len())].clone();
            for _ in 0..rng.gen_range(1..4) {
                let i = rng.gen_range(0..buf.len());
                buf[i] = rng.gen();
            }
            buf.truncate(rng.gen_range(0..=buf.len()));
            if let Ok(msg) = decode(&buf) {
                let _ = msg.as_string(None);
            }
        }
    }
}
