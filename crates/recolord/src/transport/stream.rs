//! Connection streams handed from the listener to connection handlers.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::net::UnixStream;

/// How long a blocked read waits before re-checking the shutdown flag.
const READ_POLL_INTERVAL: Duration = Duration::from_millis(200);

enum StreamKind {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

/// Accepted connection whose reads end cleanly once the listener shuts down.
///
/// Reads block until data arrives, the peer closes the connection, or the
/// shutdown flag is raised; the last case reports end-of-stream so the
/// serve loop unwinds without special casing.
pub(crate) struct ConnectionStream {
    kind: StreamKind,
    shutdown: Arc<AtomicBool>,
}

impl ConnectionStream {
    pub(crate) fn tcp(stream: TcpStream, shutdown: Arc<AtomicBool>) -> io::Result<Self> {
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(READ_POLL_INTERVAL))?;
        Ok(Self {
            kind: StreamKind::Tcp(stream),
            shutdown,
        })
    }

    #[cfg(unix)]
    pub(crate) fn unix(stream: UnixStream, shutdown: Arc<AtomicBool>) -> io::Result<Self> {
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(READ_POLL_INTERVAL))?;
        Ok(Self {
            kind: StreamKind::Unix(stream),
            shutdown,
        })
    }

    fn read_once(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.kind {
            StreamKind::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            StreamKind::Unix(stream) => stream.read(buf),
        }
    }
}

impl Read for ConnectionStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.read_once(buf) {
                Ok(read) => return Ok(read),
                Err(error)
                    if matches!(
                        error.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    if self.shutdown.load(Ordering::SeqCst) {
                        return Ok(0);
                    }
                }
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error) => return Err(error),
            }
        }
    }
}

impl Write for ConnectionStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.kind {
            StreamKind::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            StreamKind::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.kind {
            StreamKind::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            StreamKind::Unix(stream) => stream.flush(),
        }
    }
}

/// Handles accepted socket connections.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Serves a single connection until the peer disconnects. Implementations
    /// should avoid panicking.
    fn handle(&self, stream: ConnectionStream);
}
