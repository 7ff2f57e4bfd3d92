//! One request/reply exchange with the recolor service.
//!
//! A [`Connection`] is opened with a time budget that covers the whole
//! exchange. Connecting, sending the request and waiting for the reply all
//! draw on the same deadline, so `--timeout-ms` bounds the client's total
//! wait however the time is split.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use recolor_config::SocketEndpoint;

#[cfg(unix)]
use std::os::unix::net::UnixStream;

#[cfg(unix)]
use socket2::{Domain, SockAddr, Socket, Type};

use crate::AppError;

/// Outcome of waiting for one reply line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Received {
    /// A complete line, or the bytes sent before the service hung up.
    Line(Vec<u8>),
    /// The service hung up without sending anything.
    Closed,
    /// The deadline passed first.
    Expired,
}

enum Stream {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl Stream {
    fn limit_blocking(&self, timeout: Duration) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => {
                stream.set_read_timeout(Some(timeout))?;
                stream.set_write_timeout(Some(timeout))
            }
            #[cfg(unix)]
            Self::Unix(stream) => {
                stream.set_read_timeout(Some(timeout))?;
                stream.set_write_timeout(Some(timeout))
            }
        }
    }
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            Self::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            Self::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            Self::Unix(stream) => stream.flush(),
        }
    }
}

/// A service connection bounded by a single deadline.
pub(crate) struct Connection {
    stream: BufReader<Stream>,
    deadline: Instant,
    budget: Duration,
}

impl Connection {
    /// Connects to `endpoint`, spending at most `budget` on the attempt.
    pub(crate) fn open(endpoint: &SocketEndpoint, budget: Duration) -> Result<Self, AppError> {
        let deadline = Instant::now() + budget;
        let connect_error = |source| AppError::Connect {
            endpoint: endpoint.to_string(),
            source,
        };
        let stream = match endpoint {
            SocketEndpoint::Tcp { host, port } => {
                let address =
                    resolve_tcp_address(host, *port).map_err(|source| AppError::Resolve {
                        endpoint: endpoint.to_string(),
                        source,
                    })?;
                TcpStream::connect_timeout(&address, budget)
                    .map(Stream::Tcp)
                    .map_err(connect_error)?
            }
            #[cfg(unix)]
            SocketEndpoint::Unix { path } => {
                connect_unix(path.as_str(), budget).map_err(connect_error)?
            }
            #[cfg(not(unix))]
            SocketEndpoint::Unix { .. } => {
                return Err(AppError::UnsupportedUnixTransport(endpoint.to_string()));
            }
        };
        Ok(Self {
            stream: BufReader::new(stream),
            deadline,
            budget,
        })
    }

    /// The budget the connection was opened with.
    pub(crate) fn budget(&self) -> Duration {
        self.budget
    }

    fn remaining(&self) -> Option<Duration> {
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        (!remaining.is_zero()).then_some(remaining)
    }

    /// Writes `payload` followed by a newline.
    pub(crate) fn send_line(&mut self, payload: &[u8]) -> io::Result<()> {
        let remaining = self
            .remaining()
            .ok_or_else(|| io::Error::from(io::ErrorKind::TimedOut))?;
        let stream = self.stream.get_mut();
        stream.limit_blocking(remaining)?;
        stream.write_all(payload)?;
        stream.write_all(b"\n")?;
        stream.flush()
    }

    /// Waits for one newline-terminated line until the deadline.
    ///
    /// Partial lines survive read timeouts, so a reply that arrives in
    /// several segments is reassembled.
    pub(crate) fn receive_line(&mut self) -> io::Result<Received> {
        let mut line = Vec::new();
        loop {
            let Some(remaining) = self.remaining() else {
                return Ok(Received::Expired);
            };
            self.stream.get_ref().limit_blocking(remaining)?;
            match self.stream.read_until(b'\n', &mut line) {
                Ok(0) if line.is_empty() => return Ok(Received::Closed),
                Ok(_) => return Ok(Received::Line(line)),
                Err(error)
                    if matches!(
                        error.kind(),
                        io::ErrorKind::WouldBlock
                            | io::ErrorKind::TimedOut
                            | io::ErrorKind::Interrupted
                    ) => {}
                Err(error) => return Err(error),
            }
        }
    }
}

fn resolve_tcp_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}

#[cfg(unix)]
fn connect_unix(path: &str, timeout: Duration) -> io::Result<Stream> {
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
    socket.connect_timeout(&SockAddr::unix(path)?, timeout)?;
    Ok(Stream::Unix(UnixStream::from(std::os::fd::OwnedFd::from(socket))))
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    use super::*;

    fn local_listener() -> (TcpListener, SocketEndpoint) {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        (listener, SocketEndpoint::tcp("127.0.0.1", port))
    }

    #[test]
    fn reassembles_a_reply_sent_in_pieces() {
        let (listener, endpoint) = local_listener();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            stream.write_all(b"{\"status\":").expect("first piece");
            thread::sleep(Duration::from_millis(100));
            stream.write_all(b"\"done\"}\n").expect("second piece");
        });

        let mut connection = Connection::open(&endpoint, Duration::from_secs(2)).expect("open");
        let received = connection.receive_line().expect("receive");
        assert_eq!(received, Received::Line(b"{\"status\":\"done\"}\n".to_vec()));
        server.join().expect("join server");
    }

    #[test]
    fn silence_runs_out_the_budget() {
        let (listener, endpoint) = local_listener();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let server = thread::spawn(move || {
            let (_stream, _) = listener.accept().expect("accept");
            let _ = release_rx.recv();
        });

        let started = Instant::now();
        let mut connection = Connection::open(&endpoint, Duration::from_millis(200)).expect("open");
        connection.send_line(b"{}").expect("send");
        assert_eq!(connection.receive_line().expect("receive"), Received::Expired);
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert!(started.elapsed() < Duration::from_secs(2));

        drop(release_tx);
        server.join().expect("join server");
    }

    #[test]
    fn hang_up_before_any_bytes_is_closed() {
        let (listener, endpoint) = local_listener();
        let server = thread::spawn(move || drop(listener.accept().expect("accept")));

        let mut connection = Connection::open(&endpoint, Duration::from_secs(2)).expect("open");
        server.join().expect("join server");
        assert_eq!(connection.receive_line().expect("receive"), Received::Closed);
    }

    #[test]
    fn refused_connections_report_the_endpoint() {
        let (listener, endpoint) = local_listener();
        drop(listener);
        let error = match Connection::open(&endpoint, Duration::from_secs(1)) {
            Ok(_) => panic!("connection should be refused"),
            Err(error) => error,
        };
        assert!(
            matches!(&error, AppError::Connect { endpoint: named, .. } if named.contains("127.0.0.1")),
            "{error:?}"
        );
    }
}
