//! Network-related code, i.e. actually sending queries and receiving answers.

use anyhow::{Context, Result};
use log::debug;
use std::fmt::Display;
use std::io;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};

use crate::QueryMetadata;

/// Size of the receive buffer. Replies longer than this are cut off by the socket.
pub const RECV_BUFSIZE: usize = 1024;

/// A nameserver as given on the command line, plus the address its reply came from.
#[derive(Clone, Debug)]
pub struct Nameserver {
    /// IP address or hostname.
    pub host: String,
    pub port: u16,
    /// Set once a reply was received.
    pub replied_from: Option<SocketAddr>,
}

impl Nameserver {
    pub fn from_metadata(metadata: &QueryMetadata) -> Self {
        Self {
            host: metadata.nameserver.clone(),
            port: metadata.port,
            replied_from: None,
        }
    }

    /// Returns the nameserver's IP address if it was given as one.
    pub fn ip(&self) -> Option<IpAddr> {
        self.host.parse().ok()
    }
}

/// Shows `host:port`, followed by the address that replied if `host` is a hostname.
impl Display for Nameserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.ip(), self.replied_from) {
            (Some(ip), _) => write!(f, "{}", SocketAddr::new(ip, self.port)),
            (None, Some(addr)) => write!(f, "{}:{} ({})", self.host, self.port, addr.ip()),
            (None, None) => write!(f, "{}:{}", self.host, self.port),
        }
    }
}

impl ToSocketAddrs for Nameserver {
    type Iter = std::vec::IntoIter<SocketAddr>;
    fn to_socket_addrs(&self) -> io::Result<Self::Iter> {
        (self.host.as_str(), self.port).to_socket_addrs()
    }
}

/// Sends `data` to `nameserver` in a single UDP datagram and waits up to `timeout` for the reply.
///
/// Returns the reply, its size, and the time between sending and receiving. The address the
/// reply came from is stored in `nameserver`.
pub fn send_query_udp(
    nameserver: &mut Nameserver,
    timeout: Duration,
    data: &[u8],
) -> Result<(Vec<u8>, usize, Duration)> {
    let socket = create_and_connect_udp_socket(nameserver)?;
    let mut res = vec![0; RECV_BUFSIZE];

    socket
        .set_write_timeout(Some(Duration::new(2, 0)))
        .context("Could not set UDP socket write timeout.")?;
    socket
        .set_read_timeout(Some(timeout))
        .context("Could not set UDP socket read timeout.")?;

    let before = Instant::now();
    socket
        .send(data)
        .context("Could not send data to nameserver.")?;

    let (bytes_recvd, remote_addr) = socket
        .recv_from(&mut res)
        .context("The nameserver did not reply in time.")?;
    let elapsed = before.elapsed();
    debug!("received {} bytes from {}", bytes_recvd, remote_addr);

    nameserver.replied_from = Some(remote_addr);

    res.truncate(bytes_recvd);

    Ok((res, bytes_recvd, elapsed))
}

fn create_and_connect_udp_socket(nameserver: &Nameserver) -> Result<UdpSocket> {
    // binding to :: and connecting to an IPv4 address fails on some systems, so the bind address
    // follows the nameserver's address family; for hostnames, IPv6 is tried before IPv4
    let bind_addrs: &[&str] = match nameserver.ip() {
        Some(ip) if ip.is_ipv6() => &["::"],
        Some(_) => &["0.0.0.0"],
        None => &["::", "0.0.0.0"],
    };

    let mut last_err = None;
    for bind_addr in bind_addrs {
        let socket = UdpSocket::bind((*bind_addr, 0)).context("Could not create UDP socket.")?;
        match socket.connect(nameserver) {
            Ok(()) => return Ok(socket),
            Err(e) => {
                debug!("connecting from {} failed: {}", bind_addr, e);
                last_err = Some(e);
            }
        }
    }

    let err = last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "no bind address"));
    Err(err).context(format!("Could not connect to {} via UDP.", nameserver))
}
