//! Utility functions.

use anyhow::{Context, Result};
use dnswire_proto::{decode, encode, Message};
use log::{info, warn};

use std::time::Duration;

use crate::net::{send_query_udp, Nameserver};
use crate::QueryMetadata;

/// Builds the query for `metadata` in wire format, with a random message ID.
pub fn prepare_query(metadata: &QueryMetadata) -> Result<Vec<u8>> {
    encode(&metadata.name, metadata.qtype).context("Could not create query.")
}

/// Sends the encoded query `data` and returns the undecoded reply, its size, and the round trip
/// time.
pub fn send_query(
    metadata: &QueryMetadata,
    nameserver: &mut Nameserver,
    data: &[u8],
) -> Result<(Vec<u8>, usize, Duration)> {
    info!(
        "querying {} for {} {}",
        nameserver, metadata.name, metadata.qtype
    );
    send_query_udp(nameserver, metadata.timeout, data)
}

/// Decodes a reply, logging anything unusual about it.
pub fn parse_reply(reply: &[u8]) -> Result<Message> {
    let msg = decode(reply).context("Could not parse answer.")?;
    if msg.header.flags.truncated {
        warn!("the reply was truncated by the nameserver");
    }
    if let Some(extra) = msg.extra_data() {
        warn!("{}", extra);
    }
    Ok(msg)
}

/// Returns true iff `reply` answers `query`, judged by the message ID.
pub fn reply_matches(query: &Message, reply: &Message) -> bool {
    query.header.id == reply.header.id
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use dnswire_proto::{decode, encode_with_id, RecordType};

    use super::*;

    fn metadata(name: &str) -> QueryMetadata {
        QueryMetadata {
            name: name.into(),
            qtype: RecordType::MX,
            nameserver: "127.0.0.1".into(),
            port: 53,
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn query_for_metadata() {
        let query = prepare_query(&metadata("example.org")).unwrap();
        let msg = decode(&query).unwrap();
        assert_eq!(msg.questions[0].qname, "example.org");
        assert_eq!(msg.questions[0].qtype, 15);
        assert!(msg.header.flags.recursion_desired);
    }

    #[test]
    fn invalid_hostname() {
        let err = prepare_query(&metadata("a..b")).unwrap_err();
        assert_eq!(err.to_string(), "Could not create query.");
    }

    #[test]
    fn reply_ids() {
        let query = decode(&encode_with_id("example.org", RecordType::A, 1).unwrap()).unwrap();
        let mut reply = encode_with_id("example.org", RecordType::A, 1).unwrap();
        reply[2] |= 0x80;
        let reply = parse_reply(&reply).unwrap();
        assert!(reply_matches(&query, &reply));

        let other = decode(&encode_with_id("example.org", RecordType::A, 2).unwrap()).unwrap();
        assert!(!reply_matches(&query, &other));
    }

    #[test]
    fn garbage_reply() {
        assert!(parse_reply(&[0; 5]).is_err());
    }
}
