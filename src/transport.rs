use std::io::{self, Read as _, Write as _};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use embedded_io_async::{ErrorType, Write as AsyncWrite};
use tracing::info;

use crate::error::ConsoleError;

/// Persistent TCP connection to the device.
///
/// The console only ever writes to it; the caller may drain whatever the
/// device sends back between console iterations.
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    /// Connect to `endpoint` (`host:port`), trying each resolved address in turn
    pub fn connect(endpoint: &str, timeout: Duration) -> Result<Self, ConsoleError> {
        let connect_err = |source: io::Error| ConsoleError::Connect {
            endpoint: endpoint.to_string(),
            source,
        };

        let mut last_err = io::Error::new(io::ErrorKind::NotFound, "endpoint did not resolve");
        for addr in endpoint.to_socket_addrs().map_err(connect_err)? {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    stream.set_nodelay(true).map_err(connect_err)?;
                    info!(peer = %addr, "connected to device");
                    return Ok(Self { stream });
                }
                Err(err) => last_err = err,
            }
        }
        Err(connect_err(last_err))
    }

    /// Read whatever the device has already sent, without blocking.
    ///
    /// Returns `Ok(0)` when nothing is pending.
    pub fn drain_incoming(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.set_nonblocking(true)?;
        let result = match self.stream.read(buf) {
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(0),
            other => other,
        };
        self.stream.set_nonblocking(false)?;
        result
    }
}

impl ErrorType for TcpTransport {
    type Error = io::Error;
}

impl AsyncWrite for TcpTransport {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.stream.write(buf)
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.stream.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    #[test]
    fn test_sends_and_drains() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = listener.local_addr().unwrap().to_string();

        let mut transport = TcpTransport::connect(&endpoint, Duration::from_secs(1)).unwrap();
        let (mut device, _) = listener.accept().unwrap();

        let mut buf = [0u8; 16];
        assert_eq!(transport.drain_incoming(&mut buf).unwrap(), 0);

        block_on(transport.write_all(b"LL")).unwrap();
        let mut received = [0u8; 2];
        device.read_exact(&mut received).unwrap();
        assert_eq!(&received, b"LL");

        device.write_all(b"ok\n").unwrap();
        device.flush().unwrap();
        let mut n = 0;
        for _ in 0..100 {
            n = transport.drain_incoming(&mut buf).unwrap();
            if n > 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(&buf[..n], b"ok\n");
    }

    #[test]
    fn test_connect_failure_names_endpoint() {
        // Bind then drop to get a port nothing listens on.
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let endpoint = format!("127.0.0.1:{port}");

        let err = TcpTransport::connect(&endpoint, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ConsoleError::Connect { endpoint: e, .. } if e == endpoint));
    }
}
