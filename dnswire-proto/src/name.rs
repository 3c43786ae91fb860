//! Definition and implementation of the [`Name`] type.

use std::fmt::{self, Display, Write as _};
use std::io::{Cursor, Write};
use std::str::FromStr;

use byteorder::WriteBytesExt;
use log::trace;
use smartstring::{LazyCompact, SmartString};

use crate::error::DnsError;

/// Longest name (in presentation format, without the trailing dot) that is accepted.
pub const MAX_NAME_LEN: usize = 255;
/// Longest label that fits the six bits of a length byte.
pub const MAX_LABEL_LEN: usize = 63;
/// Upper bound on the number of compression pointers followed while reading a single name.
pub const MAX_POINTERS: usize = 128;

const POINTER: u8 = 0b1100_0000;
const POINTER_OFFSET_HIGH: u8 = 0b0011_1111;

/// A DNS domain name.
///
/// Labels read from the wire are stored byte for byte, each byte as the `char` with the same
/// value, so names containing arbitrary octets survive a decode/encode cycle unchanged. The
/// string representation escapes `.`, `\` and non-printable bytes (`\.`, `\\`, `\DDD`) and omits
/// the trailing dot; the DNS root's name is represented as `"."`.
///
/// Comparisons ignore ASCII case, as DNS does.
#[derive(Eq, Clone, Debug, Default)]
pub struct Name {
    // does not contain the root label, as that would be the empty string
    labels: Vec<SmartString<LazyCompact>>,
    // compression pointers followed while parsing: (index of the label read next, target offset)
    pointers: Vec<(usize, usize)>,
}

impl Name {
    /// Returns a `Name` representing the DNS root (`"."`).
    ///
    /// # Examples
    /// ```rust
    /// use dnswire_proto::Name;
    ///
    /// assert_eq!(Name::from_ascii(".").ok(), Some(Name::root()));
    /// ```
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a `Name` encoded as a DNS QNAME from the given cursor and moves the cursor behind
    /// it.
    ///
    /// The cursor must wrap the complete message, as compression pointers are offsets from the
    /// start of the message. See [`Name::parse_at()`].
    ///
    /// # Examples
    /// ```rust
    /// use std::io::Cursor;
    /// use dnswire_proto::Name;
    ///
    /// // "sub.example.com" encoded via the "sub" label followed by a pointer to "example.com"
    /// let bytes = b"\x07example\x03com\0\x03sub\xc0\x00";
    /// let mut cursor = Cursor::new(&bytes[..]);
    ///
    /// let name = Name::parse(&mut cursor).unwrap();
    /// assert_eq!(name, "example.com");
    ///
    /// let name = Name::parse(&mut cursor).unwrap();
    /// assert_eq!(name, "sub.example.com");
    /// assert_eq!(cursor.position(), bytes.len() as u64);
    /// ```
    pub fn parse(msg: &mut Cursor<&[u8]>) -> Result<Self, DnsError> {
        let buf: &[u8] = msg.get_ref();
        let (name, next) = Name::parse_at(buf, msg.position() as usize)?;
        msg.set_position(next as u64);
        Ok(name)
    }

    /// Parses a `Name` starting at `offset` in `msg` and returns it together with the offset of
    /// the first byte after the encoded name.
    ///
    /// `msg` must be the complete message. If the name is (partially) compressed, the returned
    /// offset points right behind the first 2-byte compression pointer; the labels the pointer
    /// refers to are read from wherever it points.
    ///
    /// A pointer has to point strictly before the run of labels it terminates, so every jump
    /// goes backwards and a name cannot loop. Pointers to the same position or forwards, and
    /// chains of more than [`MAX_POINTERS`] pointers, are rejected with
    /// [`DnsError::MalformedPointer`].
    ///
    /// # Examples
    /// ```rust
    /// use dnswire_proto::{error::DnsError, Name};
    ///
    /// let msg = b"\x03www\x07example\x03com\0";
    /// let (name, next) = Name::parse_at(msg, 0).unwrap();
    /// assert_eq!(name, "www.example.com");
    /// assert_eq!(next, msg.len());
    ///
    /// // a pointer to itself
    /// assert!(matches!(
    ///     Name::parse_at(b"\xc0\x00", 0),
    ///     Err(DnsError::MalformedPointer(0))
    /// ));
    /// ```
    pub fn parse_at(msg: &[u8], offset: usize) -> Result<(Self, usize), DnsError> {
        let mut labels = Vec::new();
        let mut pos = offset;
        // start of the run of labels currently being read; pointers must jump before it
        let mut run_start = offset;
        let mut resume_at = None;
        let mut pointers = 0;
        let mut text_len = 0;
        let mut followed = Vec::new();

        loop {
            let c = *msg.get(pos).ok_or(DnsError::Truncated)?;

            if c & POINTER == POINTER {
                let low = *msg.get(pos + 1).ok_or(DnsError::Truncated)?;
                let target = (((c & POINTER_OFFSET_HIGH) as usize) << 8) | low as usize;
                pointers += 1;
                if target >= run_start || pointers > MAX_POINTERS {
                    return Err(DnsError::MalformedPointer(target));
                }
                trace!("following compression pointer at {} to {}", pos, target);
                resume_at.get_or_insert(pos + 2);
                followed.push((labels.len(), target));
                pos = target;
                run_start = target;
            } else if c & POINTER != 0 {
                return Err(DnsError::InvalidLabelType(c));
            } else if c == 0 {
                let next = resume_at.unwrap_or(pos + 1);
                return Ok((
                    Name {
                        labels,
                        pointers: followed,
                    },
                    next,
                ));
            } else {
                let start = pos + 1;
                let end = start + c as usize;
                let bytes = msg.get(start..end).ok_or(DnsError::Truncated)?;

                // + 1 for the dot separating this label from the previous one
                text_len += bytes.len() + usize::from(!labels.is_empty());
                if text_len > MAX_NAME_LEN {
                    return Err(DnsError::NameTooLong(text_len));
                }

                labels.push(bytes.iter().map(|&b| b as char).collect());
                pos = end;
            }
        }
    }

    /// Constructs a `Name` from an ASCII domain string, e.g. a hostname given by a user.
    ///
    /// The string is split on `.`. A single trailing dot is allowed, but not necessary; `""` and
    /// `"."` both give the root name.
    ///
    /// Returns an error if the string is longer than 255 bytes, is not ASCII, contains an empty
    /// label or a label longer than 63 bytes.
    ///
    /// # Examples
    /// ```rust
    /// use dnswire_proto::Name;
    ///
    /// assert_eq!(Name::from_ascii("").ok(), Some(Name::root()));
    /// assert!(Name::from_ascii("example.com").is_ok());
    /// assert!(Name::from_ascii("example.com.").is_ok());
    /// assert!(Name::from_ascii("_srv.example.com").is_ok());
    ///
    /// assert!(Name::from_ascii("example..com").is_err());
    /// assert!(Name::from_ascii("exämple.com").is_err());
    /// ```
    pub fn from_ascii(name: impl AsRef<str>) -> Result<Self, DnsError> {
        let name = name.as_ref();

        if name.len() > MAX_NAME_LEN {
            return Err(DnsError::NameTooLong(name.len()));
        }
        if !name.is_ascii() {
            return Err(DnsError::NonAsciiName(name.to_string()));
        }
        if name.is_empty() || name == "." {
            return Ok(Self::root());
        }

        let name = name.strip_suffix('.').unwrap_or(name);
        let mut labels = Vec::new();
        for label in name.split('.') {
            if label.is_empty() {
                return Err(DnsError::EmptyLabel);
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(DnsError::LabelTooLong(label.len()));
            }
            labels.push(label.into());
        }

        Ok(Name {
            labels,
            pointers: Vec::new(),
        })
    }

    /// Encodes this name as a DNS QNAME into the given buffer. Does not use message compression.
    ///
    /// Returns the number of bytes written on success.
    ///
    /// # Examples
    /// ```rust
    /// use dnswire_proto::Name;
    ///
    /// let mut buf = Vec::new();
    /// let name = Name::from_ascii("example.com").unwrap();
    /// assert_eq!(name.encode_into(&mut buf).unwrap(), 13);
    /// assert_eq!(buf, b"\x07example\x03com\0");
    /// ```
    pub fn encode_into(&self, buf: &mut impl Write) -> Result<u16, DnsError> {
        let mut bytes_written = 0;
        for label in &self.labels {
            let bytes: Vec<u8> = label.chars().map(|c| c as u8).collect();
            buf.write_u8(bytes.len() as u8)?;
            buf.write_all(&bytes)?;
            bytes_written += 1 + bytes.len();
        }
        buf.write_u8(0)?;
        Ok(bytes_written as u16 + 1)
    }

    /// Returns an iterator over the labels, leftmost first.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|label| label.as_str())
    }

    /// Returns the number of labels; the root name has none.
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Returns the length of the string returned if this `Name` is made into a [`String`].
    ///
    /// # Examples
    /// ```rust
    /// use dnswire_proto::Name;
    ///
    /// assert_eq!(Name::root().string_len(), 1);
    /// assert_eq!(Name::from_ascii("example.com").unwrap().string_len(), 11);
    /// ```
    pub fn string_len(&self) -> usize {
        if self.is_root() {
            return 1;
        }

        let chars: usize = self
            .labels
            .iter()
            .flat_map(|label| label.chars())
            .map(escaped_len)
            .sum();
        chars + self.labels.len() - 1
    }

    /// Returns the compression pointers that were followed when this name was parsed, as pairs of
    /// the index of the label read after the jump and the offset jumped to.
    pub fn pointers(&self) -> &[(usize, usize)] {
        &self.pointers
    }

    /// Returns a displayable form that marks every followed compression pointer in the place it
    /// occurred, e.g. `mail.    (Pointer 12):example.com`.
    ///
    /// Names without pointers display as with [`Display`].
    ///
    /// # Examples
    /// ```rust
    /// use dnswire_proto::Name;
    ///
    /// let msg = b"\x07example\x03com\0\x04mail\xc0\x00";
    /// let (name, _) = Name::parse_at(msg, 13).unwrap();
    /// assert_eq!(name.to_string(), "mail.example.com");
    /// assert_eq!(name.annotated().to_string(), "mail.    (Pointer 0):example.com");
    /// ```
    pub fn annotated(&self) -> Annotated<'_> {
        Annotated(self)
    }

    /// Returns true iff this `Name` represents the DNS root (`"."`).
    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Number of characters `c` takes up in the string representation.
fn escaped_len(c: char) -> usize {
    match c {
        '.' | '\\' => 2,
        '!'..='~' => 1,
        _ => 4,
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.labels.len() == other.labels.len()
            && self
                .labels
                .iter()
                .zip(&other.labels)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        Name::from_ascii(other).map_or(false, |other| *self == other)
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        *self == **other
    }
}

impl FromStr for Name {
    type Err = DnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Name::from_ascii(s)
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_char('.');
        }

        for (i, label) in self.labels.iter().enumerate() {
            if i > 0 {
                f.write_char('.')?;
            }
            write_label(f, label)?;
        }
        Ok(())
    }
}

/// A [`Name`] displayed together with the compression pointers it was read through. See
/// [`Name::annotated()`].
pub struct Annotated<'a>(&'a Name);

impl Display for Annotated<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.0;
        if name.pointers.is_empty() {
            return write!(f, "{}", name);
        }

        let mut pointers = name.pointers.iter().peekable();
        for i in 0..=name.labels.len() {
            let mut separated = i == 0;
            while let Some((_, target)) = pointers.next_if(|(at, _)| *at == i) {
                if !separated {
                    f.write_char('.')?;
                    separated = true;
                }
                write!(f, "    (Pointer {}):", target)?;
            }
            if let Some(label) = name.labels.get(i) {
                if !separated {
                    f.write_char('.')?;
                }
                write_label(f, label)?;
            }
        }
        Ok(())
    }
}

fn write_label(f: &mut fmt::Formatter<'_>, label: &str) -> fmt::Result {
    for c in label.chars() {
        match c {
            '.' | '\\' => write!(f, "\\{}", c)?,
            '!'..='~' => f.write_char(c)?,
            _ => write!(f, "\\{:03}", c as u32)?,
        }
    }
    Ok(())
}

#[cfg(feature = "serde")]
impl serde::Serialize for Name {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
