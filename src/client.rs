//! Negotiation client.
//!
//! Performs the single request/response exchange with the allocation server:
//! connect, send the 4-byte request, half-close, read until the server closes,
//! decode. The connection is owned by [`NegotiationClient::exchange`] and is
//! closed when it returns, whatever the outcome.

use crate::config::ServerConfig;
use crate::protocol::{self, NegotiationResponse, ProtocolError};
use crate::topology::TopologyRequest;
use log::{debug, info};
use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Read chunk size for the response loop
const READ_CHUNK: usize = 4096;

/// Errors that end a negotiation. None of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum NegotiationError {
    #[error("failed to resolve {address}: {source}")]
    Resolve {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("{address} did not resolve to any address")]
    NoAddresses { address: String },

    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("no response from server within {timeout:?}")]
    ReadTimeout { timeout: Duration },

    #[error("connection error while {action}: {source}")]
    Io {
        action: &'static str,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Client for one negotiation with the allocation server
#[derive(Debug, Clone)]
pub struct NegotiationClient {
    host: String,
    port: u16,
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
}

impl NegotiationClient {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: None,
            read_timeout: None,
        }
    }

    pub fn from_config(server: &ServerConfig) -> Self {
        Self::new(server.host.clone(), server.port)
            .with_connect_timeout(server.connect_timeout)
            .with_read_timeout(server.read_timeout)
    }

    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Run the negotiation and decode the server's reply.
    pub fn negotiate(
        &self,
        request: TopologyRequest,
    ) -> Result<NegotiationResponse, NegotiationError> {
        if request.is_no_preference() {
            info!("requesting a topology ...");
        } else {
            info!("requesting topology #{} ...", request.value());
        }

        let stream = self.connect()?;
        let raw = self.exchange(stream, request)?;
        debug!("Received {} bytes from {}", raw.len(), self.address());

        Ok(protocol::decode_response(raw)?)
    }

    /// Resolve the server and connect to the first address that accepts.
    fn connect(&self) -> Result<TcpStream, NegotiationError> {
        let address = self.address();
        let candidates: Vec<SocketAddr> = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|source| NegotiationError::Resolve {
                address: address.clone(),
                source,
            })?
            .collect();

        let mut last_error = None;
        for candidate in &candidates {
            debug!("Connecting to {} ({})", address, candidate);
            let attempt = match self.connect_timeout {
                Some(timeout) => TcpStream::connect_timeout(candidate, timeout),
                None => TcpStream::connect(candidate),
            };
            match attempt {
                Ok(stream) => return Ok(stream),
                Err(err) => {
                    debug!("Connection to {} failed: {}", candidate, err);
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(source) => Err(NegotiationError::Connect { address, source }),
            None => Err(NegotiationError::NoAddresses { address }),
        }
    }

    /// Send the request, half-close, and read until the server closes.
    ///
    /// Takes the stream by value so it is closed on every return path.
    fn exchange(
        &self,
        mut stream: TcpStream,
        request: TopologyRequest,
    ) -> Result<Vec<u8>, NegotiationError> {
        stream
            .set_read_timeout(self.read_timeout)
            .map_err(|source| NegotiationError::Io {
                action: "configuring the read timeout",
                source,
            })?;

        stream
            .write_all(&protocol::encode_request(request))
            .map_err(|source| NegotiationError::Io {
                action: "sending the request",
                source,
            })?;

        // The server starts replying only after it sees EOF on its side
        stream
            .shutdown(Shutdown::Write)
            .map_err(|source| NegotiationError::Io {
                action: "half-closing the connection",
                source,
            })?;

        let mut accum = Vec::new();
        let mut buf = [0u8; READ_CHUNK];
        loop {
            match stream.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => accum.extend_from_slice(&buf[..n]),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if is_timeout(&err) => {
                    return Err(match self.read_timeout {
                        Some(timeout) => NegotiationError::ReadTimeout { timeout },
                        None => NegotiationError::Io {
                            action: "reading the response",
                            source: err,
                        },
                    });
                }
                Err(source) => {
                    return Err(NegotiationError::Io {
                        action: "reading the response",
                        source,
                    })
                }
            }
        }

        Ok(accum)
    }
}

/// Read timeouts surface as `WouldBlock` on Unix and `TimedOut` on Windows
fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    /// Accept one connection, capture the request, reply with `reply`.
    fn serve_once(reply: Vec<u8>) -> (u16, thread::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            conn.read_to_end(&mut request).unwrap();
            conn.write_all(&reply).unwrap();
            request
        });
        (port, handle)
    }

    #[test]
    fn test_negotiate_round_trip() {
        let mut reply = vec![0, 0, 0, 9];
        reply.extend_from_slice(b"table");
        let (port, server) = serve_once(reply);

        let client = NegotiationClient::new("127.0.0.1", port);
        let response = client.negotiate(TopologyRequest::new(3)).unwrap();

        assert_eq!(server.join().unwrap(), vec![0, 0, 0, 3]);
        assert_eq!(response.assigned_topology, 9);
        assert_eq!(response.routing_table, b"table");
    }

    #[test]
    fn test_short_response_is_protocol_error() {
        let (port, server) = serve_once(vec![0, 0]);

        let client = NegotiationClient::new("127.0.0.1", port);
        let err = client.negotiate(TopologyRequest::NO_PREFERENCE).unwrap_err();
        server.join().unwrap();

        assert!(matches!(
            err,
            NegotiationError::Protocol(ProtocolError::ResponseTooSmall { received: 2 })
        ));
    }

    #[test]
    fn test_connection_refused() {
        // Bind then drop to get a port nothing listens on
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let client = NegotiationClient::new("127.0.0.1", port)
            .with_connect_timeout(Some(Duration::from_secs(2)));
        let err = client.negotiate(TopologyRequest::NO_PREFERENCE).unwrap_err();
        assert!(matches!(err, NegotiationError::Connect { .. }), "{:?}", err);
    }

    #[test]
    fn test_read_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (conn, _) = listener.accept().unwrap();
            // Hold the connection open without replying
            thread::sleep(Duration::from_millis(500));
            drop(conn);
        });

        let client = NegotiationClient::new("127.0.0.1", port)
            .with_read_timeout(Some(Duration::from_millis(100)));
        let err = client.negotiate(TopologyRequest::new(1)).unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, NegotiationError::ReadTimeout { .. }), "{:?}", err);
    }

    #[test]
    fn test_from_config() {
        let server = ServerConfig {
            host: "alloc.example.net".to_string(),
            port: 4000,
            connect_timeout: Some(Duration::from_secs(5)),
            read_timeout: None,
        };
        let client = NegotiationClient::from_config(&server);
        assert_eq!(client.address(), "alloc.example.net:4000");
        assert_eq!(client.connect_timeout, Some(Duration::from_secs(5)));
        assert_eq!(client.read_timeout, None);
    }
}
