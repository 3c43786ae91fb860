use std::time::Duration;

use dnswire_proto::RecordType;

pub mod net;
pub mod util;

/// Port nameservers listen on unless told otherwise.
pub const DEFAULT_PORT: u16 = 53;

/// How long to wait for a reply unless told otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct QueryMetadata {
    /// The hostname to query for, as given by the user.
    pub name: String,
    pub qtype: RecordType,
    /// IP address or hostname of the nameserver.
    pub nameserver: String,
    pub port: u16,
    /// Read timeout for the reply.
    pub timeout: Duration,
}
