/*
    trill_invoke Copyright 2025 The trill_invoke contributors

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.
*/

pub mod osc;

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::{error::Error, fmt::Display};

pub use osc::{OscBundle, OscError, OscMessage, OscPacket, OscType};

pub const DEFAULT_REMOTE_HOST: &str = "127.0.0.1";
pub const DEFAULT_REMOTE_PORT: u16 = 7562;
pub const DEFAULT_LOCAL_PORT: u16 = 7563;

/// Largest datagram we will ever try to receive.
pub const MAX_DATAGRAM_SIZE: usize = 65536;

/// An [Endpoint] is a (host, port) pair naming one end of the UDP conversation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Endpoint {
            host: host.into(),
            port,
        }
    }

    /// Resolve the endpoint to a socket address. IPv4 results are preferred, since the receive
    /// socket is always bound to an IPv4 wildcard address.
    pub fn resolve(&self) -> Result<SocketAddr, ClientError> {
        let addrs: Vec<SocketAddr> = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| ClientError::Resolve(self.to_string(), e.to_string()))?
            .collect();

        addrs
            .iter()
            .find(|a| a.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| {
                ClientError::Resolve(self.to_string(), "no addresses found".to_string())
            })
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Endpoint::new(DEFAULT_REMOTE_HOST, DEFAULT_REMOTE_PORT)
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// [ClientError] represents the errors that can occur when talking to a trill-osc device.
#[derive(Debug)]
pub enum ClientError {
    Bind(u16, io::Error),
    Resolve(String, String),
    Send(io::Error),
    ShortSend(usize, usize),
    Receive(io::Error),
}

impl Error for ClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ClientError::Bind(_, e) | ClientError::Send(e) | ClientError::Receive(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Bind(port, e) => {
                write!(f, "Failed to bind UDP socket to local port {}: {}", port, e)
            }
            ClientError::Resolve(endpoint, reason) => {
                write!(f, "Failed to resolve remote endpoint {}: {}", endpoint, reason)
            }
            ClientError::Send(e) => {
                write!(f, "Failed to send datagram: {}", e)
            }
            ClientError::ShortSend(sent, expected) => {
                write!(f, "Only sent {} bytes of {}.", sent, expected)
            }
            ClientError::Receive(e) => {
                write!(f, "Failed to receive datagram: {}", e)
            }
        }
    }
}

/// An [OscSocket] is the one UDP socket the process owns. It receives on a fixed local port and
/// sends to a fixed remote endpoint.
#[derive(Debug)]
pub struct OscSocket {
    socket: UdpSocket,
    remote: SocketAddr,
}

impl OscSocket {
    /// Bind the receive socket on all interfaces at `local_port` and resolve `remote` as the
    /// target for every send. Port 0 picks an ephemeral port.
    pub fn bind(local_port: u16, remote: &Endpoint) -> Result<OscSocket, ClientError> {
        let remote_addr = remote.resolve()?;
        let local = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), local_port);
        OscSocket::bind_to(local, remote_addr)
    }

    pub fn bind_to(local: SocketAddr, remote: SocketAddr) -> Result<OscSocket, ClientError> {
        let socket = UdpSocket::bind(local).map_err(|e| ClientError::Bind(local.port(), e))?;
        log::debug!(
            "Bound UDP socket on {:?}, sending to {}",
            socket.local_addr().ok(),
            remote
        );
        Ok(OscSocket { socket, remote })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    /// Send a single datagram to the remote endpoint.
    pub fn send(&self, buf: &[u8]) -> Result<usize, ClientError> {
        match self.socket.send_to(buf, self.remote) {
            Ok(bytes) if bytes != buf.len() => Err(ClientError::ShortSend(bytes, buf.len())),
            Ok(bytes) => {
                log::trace!("send: {} bytes to {}", bytes, self.remote);
                Ok(bytes)
            }
            Err(e) => Err(ClientError::Send(e)),
        }
    }

    /// Block until one datagram arrives. Returns the number of bytes written into `buf` and the
    /// sender's address.
    pub fn recv(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr), ClientError> {
        self.socket.recv_from(buf).map_err(ClientError::Receive)
    }

    /// Get a second handle to the same socket, so a receive loop can own one.
    pub fn try_clone(&self) -> Result<OscSocket, ClientError> {
        let socket = self.socket.try_clone().map_err(ClientError::Receive)?;
        Ok(OscSocket {
            socket,
            remote: self.remote,
        })
    }
}
