//! Persistent network connections for syslog output
//!
//! A [`ConnSink`] dials its address when created and keeps the connection
//! open. When a write fails the connection is dropped, redialled once and the
//! write retried.

use crate::core::{LoggerError, Result, Sink};
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs, UdpSocket};
use std::str::FromStr;
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::net::{UnixDatagram, UnixStream};

const DIAL_TIMEOUT: Duration = Duration::from_secs(5);
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Tcp,
    Tcp4,
    Tcp6,
    Udp,
    Udp4,
    Udp6,
    Unix,
    Unixgram,
}

impl Network {
    pub const ALL: [Network; 8] = [
        Network::Tcp,
        Network::Tcp4,
        Network::Tcp6,
        Network::Udp,
        Network::Udp4,
        Network::Udp6,
        Network::Unix,
        Network::Unixgram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Tcp => "tcp",
            Network::Tcp4 => "tcp4",
            Network::Tcp6 => "tcp6",
            Network::Udp => "udp",
            Network::Udp4 => "udp4",
            Network::Udp6 => "udp6",
            Network::Unix => "unix",
            Network::Unixgram => "unixgram",
        }
    }

    fn is_stream(&self) -> bool {
        matches!(self, Network::Tcp | Network::Tcp4 | Network::Tcp6)
    }

    fn accepts(&self, addr: &SocketAddr) -> bool {
        match self {
            Network::Tcp4 | Network::Udp4 => addr.is_ipv4(),
            Network::Tcp6 | Network::Udp6 => addr.is_ipv6(),
            _ => true,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        Network::ALL
            .iter()
            .copied()
            .find(|network| network.as_str() == s)
            .ok_or_else(|| LoggerError::UnsupportedNetwork {
                network: s.to_string(),
            })
    }
}

/// Split an address token of the form `[network:]address`.
///
/// The prefix only counts as the network when it names one; otherwise the
/// whole token is the address and the network is TCP, so `host:514` stays a
/// host and port.
pub fn split_address(token: &str) -> (Network, String) {
    if let Some((prefix, rest)) = token.split_once(':') {
        if let Ok(network) = prefix.parse::<Network>() {
            return (network, rest.to_string());
        }
    }
    (Network::Tcp, token.to_string())
}

enum Conn {
    Tcp(TcpStream),
    Udp(UdpSocket),
    #[cfg(unix)]
    Unix(UnixStream),
    #[cfg(unix)]
    Unixgram(UnixDatagram),
}

impl Conn {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Conn::Tcp(stream) => stream.write_all(buf),
            Conn::Udp(socket) => socket.send(buf).map(|_| ()),
            #[cfg(unix)]
            Conn::Unix(stream) => stream.write_all(buf),
            #[cfg(unix)]
            Conn::Unixgram(socket) => socket.send(buf).map(|_| ()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Conn::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            Conn::Unix(stream) => stream.flush(),
            _ => Ok(()),
        }
    }
}

fn resolve(network: Network, address: &str) -> io::Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = address
        .to_socket_addrs()?
        .filter(|addr| network.accepts(addr))
        .collect();
    if addrs.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("no {} address for '{}'", network, address),
        ));
    }
    Ok(addrs)
}

fn dial_tcp(network: Network, address: &str) -> io::Result<Conn> {
    let mut last_err = None;
    for addr in resolve(network, address)? {
        match TcpStream::connect_timeout(&addr, DIAL_TIMEOUT) {
            Ok(stream) => {
                stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
                stream.set_nodelay(true)?;
                return Ok(Conn::Tcp(stream));
            }
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::from(io::ErrorKind::AddrNotAvailable)))
}

fn dial_udp(network: Network, address: &str) -> io::Result<Conn> {
    let mut last_err = None;
    for addr in resolve(network, address)? {
        let local: SocketAddr = if addr.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let socket = UdpSocket::bind(local)?;
        match socket.connect(addr) {
            Ok(()) => {
                socket.set_write_timeout(Some(WRITE_TIMEOUT))?;
                return Ok(Conn::Udp(socket));
            }
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::from(io::ErrorKind::AddrNotAvailable)))
}

#[cfg(unix)]
fn dial_unix(network: Network, address: &str) -> io::Result<Conn> {
    if network == Network::Unix {
        let stream = UnixStream::connect(address)?;
        stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
        Ok(Conn::Unix(stream))
    } else {
        let socket = UnixDatagram::unbound()?;
        socket.connect(address)?;
        socket.set_write_timeout(Some(WRITE_TIMEOUT))?;
        Ok(Conn::Unixgram(socket))
    }
}

#[cfg(not(unix))]
fn dial_unix(network: Network, _address: &str) -> io::Result<Conn> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("{} sockets are not available on this platform", network),
    ))
}

fn dial(network: Network, address: &str) -> io::Result<Conn> {
    match network {
        Network::Tcp | Network::Tcp4 | Network::Tcp6 => dial_tcp(network, address),
        Network::Udp | Network::Udp4 | Network::Udp6 => dial_udp(network, address),
        Network::Unix | Network::Unixgram => dial_unix(network, address),
    }
}

/// A syslog destination reached over the network
pub struct ConnSink {
    network: Network,
    address: String,
    name: String,
    conn: Mutex<Option<Conn>>,
}

impl ConnSink {
    /// Connect now, failing if the address cannot be reached
    pub fn dial(network: Network, address: impl Into<String>) -> Result<Self> {
        let address = address.into();
        let conn = dial(network, &address)
            .map_err(|e| LoggerError::dial(network.as_str(), address.clone(), e))?;

        Ok(Self {
            name: format!("{}:{}", network, address),
            network,
            address,
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Connect to a `[network:]address` token
    pub fn dial_token(token: &str) -> Result<Self> {
        let (network, address) = split_address(token);
        Self::dial(network, address)
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Whether a stream transport, which needs framing to separate messages
    pub fn is_stream(&self) -> bool {
        self.network.is_stream() || self.network == Network::Unix
    }
}

impl Sink for ConnSink {
    fn write(&self, buf: &[u8]) -> Result<()> {
        let mut conn = self.conn.lock();

        let first = match conn.as_mut() {
            Some(c) => c.write_all(buf),
            None => Err(io::Error::from(io::ErrorKind::NotConnected)),
        };
        let err = match first {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        // connection lost: redial once and resend
        *conn = None;
        match dial(self.network, &self.address) {
            Ok(mut fresh) => {
                fresh.write_all(buf).map_err(|e| {
                    LoggerError::io_operation("syslog write", self.name.clone(), e)
                })?;
                *conn = Some(fresh);
                Ok(())
            }
            Err(redial_err) => Err(LoggerError::writer(format!(
                "Failed to send log to {} and reconnect: {} (reconnect: {})",
                self.name, err, redial_err
            ))),
        }
    }

    fn sync(&self) -> Result<()> {
        if let Some(conn) = self.conn.lock().as_mut() {
            conn.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
