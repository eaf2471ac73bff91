//! Listener lifecycle: bind, wait until connectable, cancel, join.

use may::coroutine::JoinHandle;
use may_minihttp::{HttpServerWithHeaders, HttpService};
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Requests with more headers than this are rejected by the parser.
///
/// Sized for traffic that has passed through a proxy or gateway, which adds
/// forwarding and tracing headers of its own.
pub const MAX_HEADERS: usize = 32;

/// How long [`ServerHandle::wait_ready`] keeps trying before giving up.
const READY_TIMEOUT: Duration = Duration::from_millis(500);

/// Pause between connection attempts while waiting for the listener.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Binds a `may_minihttp` service to a socket.
///
/// The wrapped value is usually an [`AppService`](super::AppService), but any
/// cloneable [`HttpService`] works; the listener clones it once per
/// connection.
///
/// ```no_run
/// use std::sync::Arc;
/// use switchyard::server::{AppService, HttpServer};
/// use switchyard::App;
///
/// let handle = HttpServer(AppService::new(Arc::new(App::new())))
///     .start("127.0.0.1:8080")?;
/// handle.wait_ready()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct HttpServer<T>(pub T);

/// Owns the accept-loop coroutine of a running server.
///
/// Dropping the handle leaves the server running; call [`ServerHandle::stop`]
/// to shut it down or [`ServerHandle::join`] to block on it.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the listener is bound to
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Block until the listener accepts TCP connections.
    ///
    /// Mostly useful in tests, where requests are sent right after
    /// [`HttpServer::start`] returns.
    ///
    /// # Errors
    ///
    /// `TimedOut` if nothing answers within half a second.
    pub fn wait_ready(&self) -> io::Result<()> {
        self.wait_ready_for(READY_TIMEOUT)
    }

    /// Like [`ServerHandle::wait_ready`] with a caller-chosen timeout.
    ///
    /// # Errors
    ///
    /// `TimedOut` if nothing answers within `timeout`.
    pub fn wait_ready_for(&self, timeout: Duration) -> io::Result<()> {
        poll_until_connectable(self.addr, timeout, READY_POLL_INTERVAL)
    }

    /// Cancel the accept loop and wait for it to finish.
    ///
    /// Requests already being handled on other coroutines are not waited for.
    pub fn stop(self) {
        info!(addr = %self.addr, "Stopping HTTP server");
        // SAFETY: `cancel` is unsafe in `may` because it unwinds the target
        // coroutine at its next yield point. This handle is the only owner of
        // the accept loop, which holds no state that needs a clean exit.
        unsafe {
            self.handle.coroutine().cancel();
        }
        if self.handle.join().is_err() {
            debug!(addr = %self.addr, "Accept loop ended by cancellation");
        }
    }

    /// Block until the server exits.
    ///
    /// The accept loop runs until [`ServerHandle::stop`] is called from
    /// elsewhere or the listener fails.
    ///
    /// # Errors
    ///
    /// Returns the panic payload if the server coroutine panicked.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    /// Bind `addr` and start serving on the `may` runtime.
    ///
    /// Only the first address `addr` resolves to is used.
    ///
    /// # Errors
    ///
    /// Fails if the address does not resolve or cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let handle = HttpServerWithHeaders::<_, MAX_HEADERS>(self.0).start(addr)?;
        info!(addr = %addr, max_headers = MAX_HEADERS, "HTTP server listening");
        Ok(ServerHandle { addr, handle })
    }
}

fn poll_until_connectable(addr: SocketAddr, timeout: Duration, interval: Duration) -> io::Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if TcpStream::connect(addr).is_ok() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"));
        }
        thread::sleep(interval);
    }
}
