//! UDP transport - outbound sink and inbound listener
//!
//! OSC framing is handled by `rosc`; this module only moves packets.
//! Outbound sends are fire-and-forget over a non-blocking socket. The listener
//! loop polls a shutdown flag between socket reads, using the read timeout as
//! its poll interval.

use crate::error::{BindError, Result};
use rosc::{OscMessage, OscPacket};
use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Largest UDP payload; OSC messages of any size must fit in one read
pub const MAX_DATAGRAM: usize = 65_536;

/// Pause after a receive error when the socket has no read timeout
const DEFAULT_ERROR_BACKOFF: Duration = Duration::from_millis(10);

/// Outbound message substrate
///
/// Implementations must not block indefinitely: sends originate from whatever
/// thread mutated a bound field.
pub trait OutboundSink: Send + Sync {
    fn send(&self, message: &OscMessage) -> Result<()>;
}

/// Fire-and-forget UDP client for one target
pub struct UdpSink {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpSink {
    /// Open a client socket targeting `host:port`
    pub fn connect(host: &str, port: u16, allow_broadcast: bool) -> Result<Self> {
        let target = resolve(host, port)?;
        let local: SocketAddr = if target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };

        let socket = UdpSocket::bind(local)?;
        socket.set_broadcast(allow_broadcast)?;
        socket.set_nonblocking(true)?;

        debug!(%target, allow_broadcast, "OSC client opened");
        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl OutboundSink for UdpSink {
    fn send(&self, message: &OscMessage) -> Result<()> {
        let bytes = rosc::encoder::encode(&OscPacket::Message(message.clone()))
            .map_err(|e| BindError::Codec(format!("{:?}", e)))?;

        match self.socket.send_to(&bytes, self.target) {
            Ok(_) => {
                trace!(address = %message.addr, target = %self.target, "OSC TX");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                warn!(address = %message.addr, "OSC send buffer full, dropping message");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Bind the inbound socket with the poll interval as read timeout
pub fn bind_listener(host: &str, port: u16, poll_interval: Duration) -> Result<UdpSocket> {
    let addr = resolve(host, port)?;
    let socket = UdpSocket::bind(addr)?;
    socket.set_read_timeout(Some(poll_interval))?;
    Ok(socket)
}

/// Receive loop: decode each datagram and hand messages to `on_message`
///
/// Returns once `shutdown` is raised (checked at least every read timeout).
/// Decode errors are logged per datagram and never end the loop.
pub fn serve(socket: UdpSocket, shutdown: &AtomicBool, mut on_message: impl FnMut(OscMessage)) {
    let mut buf = vec![0u8; MAX_DATAGRAM];
    let backoff = error_backoff(&socket);
    let local = socket
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "?".to_string());

    info!("🎧 OSC listener serving on {}", local);

    while !shutdown.load(Ordering::Acquire) {
        let (len, peer) = match socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => continue,
            Err(e) => {
                // e.g. ICMP port unreachable surfacing as ConnectionReset on some platforms
                debug!(error = %e, "OSC receive error");
                thread::sleep(backoff);
                continue;
            }
        };

        match rosc::decoder::decode_udp(&buf[..len]) {
            Ok((_, OscPacket::Message(message))) => {
                debug!(address = %message.addr, %peer, "OSC RX");
                on_message(message);
            }
            Ok((_, OscPacket::Bundle(bundle))) => {
                debug!(%peer, items = bundle.content.len(), "Ignoring OSC bundle");
            }
            Err(e) => {
                warn!(%peer, bytes = len, "Malformed OSC packet: {:?}", e);
            }
        }
    }

    info!("🛑 OSC listener on {} stopped", local);
}

/// Delay after a failed read: the poll interval, so a persistent socket
/// error cannot spin the loop
fn error_backoff(socket: &UdpSocket) -> Duration {
    socket
        .read_timeout()
        .ok()
        .flatten()
        .unwrap_or(DEFAULT_ERROR_BACKOFF)
}

/// Listener running on its own thread
///
/// Dropping the handle stops the thread and waits for it.
pub struct ListenerThread {
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
    local_addr: SocketAddr,
}

impl ListenerThread {
    pub fn spawn(
        socket: UdpSocket,
        on_message: impl FnMut(OscMessage) + Send + 'static,
    ) -> Result<Self> {
        let local_addr = socket.local_addr()?;
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = shutdown.clone();

        let handle = thread::Builder::new()
            .name("osc-listener".to_string())
            .spawn(move || serve(socket, &flag, on_message))?;

        Ok(Self {
            shutdown,
            handle: Some(handle),
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Signal the loop and wait for the thread (unless called from it)
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                warn!("OSC listener thread panicked");
            }
        }
    }
}

impl Drop for ListenerThread {
    fn drop(&mut self) {
        self.stop();
    }
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| BindError::Io(std::io::Error::new(
            ErrorKind::AddrNotAvailable,
            format!("cannot resolve {}:{}", host, port),
        )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use rosc::OscType;
    use std::time::Instant;

    fn wait_for<T>(timeout: Duration, mut probe: impl FnMut() -> Option<T>) -> Option<T> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Some(v) = probe() {
                return Some(v);
            }
            thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[test]
    fn test_sink_to_listener_loopback() {
        let socket = bind_listener("127.0.0.1", 0, Duration::from_millis(10)).unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink_vec = received.clone();
        let mut listener = ListenerThread::spawn(socket, move |m| sink_vec.lock().push(m)).unwrap();

        let port = listener.local_addr().port();
        let sink = UdpSink::connect("127.0.0.1", port, false).unwrap();
        let message = OscMessage {
            addr: "/config/age".to_string(),
            args: vec![OscType::Int(42)],
        };
        sink.send(&message).unwrap();

        let got = wait_for(Duration::from_secs(2), || received.lock().first().cloned());
        assert_eq!(got, Some(message));

        listener.stop();
        listener.stop();
    }

    #[test]
    fn test_listener_survives_garbage() {
        let socket = bind_listener("127.0.0.1", 0, Duration::from_millis(10)).unwrap();
        let received = Arc::new(Mutex::new(0usize));
        let counter = received.clone();
        let listener = ListenerThread::spawn(socket, move |_| *counter.lock() += 1).unwrap();
        let target = listener.local_addr();

        let raw = UdpSocket::bind("127.0.0.1:0").unwrap();
        raw.send_to(b"not osc at all", target).unwrap();

        let sink = UdpSink::connect("127.0.0.1", target.port(), false).unwrap();
        sink.send(&OscMessage {
            addr: "/ok".to_string(),
            args: vec![],
        })
        .unwrap();

        assert!(wait_for(Duration::from_secs(2), || (*received.lock() == 1).then_some(())).is_some());
        drop(listener);
    }

    #[test]
    fn test_large_message_is_received_whole() {
        let socket = bind_listener("127.0.0.1", 0, Duration::from_millis(10)).unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink_vec = received.clone();
        let listener = ListenerThread::spawn(socket, move |m| sink_vec.lock().push(m)).unwrap();

        // Larger than a single Ethernet MTU
        let text = "x".repeat(4000);
        let message = OscMessage {
            addr: "/config/name".to_string(),
            args: vec![OscType::String(text)],
        };
        let sink = UdpSink::connect("127.0.0.1", listener.local_addr().port(), false).unwrap();
        sink.send(&message).unwrap();

        let got = wait_for(Duration::from_secs(2), || received.lock().first().cloned());
        assert_eq!(got, Some(message));
    }

    #[test]
    fn test_error_backoff_follows_poll_interval() {
        let socket = bind_listener("127.0.0.1", 0, Duration::from_millis(25)).unwrap();
        assert_eq!(error_backoff(&socket), Duration::from_millis(25));

        let plain = UdpSocket::bind("127.0.0.1:0").unwrap();
        assert_eq!(error_backoff(&plain), DEFAULT_ERROR_BACKOFF);
    }

    #[test]
    fn test_serve_returns_when_flag_raised() {
        let socket = bind_listener("127.0.0.1", 0, Duration::from_millis(5)).unwrap();
        let shutdown = AtomicBool::new(true);
        // Already raised: the loop must exit without reading
        serve(socket, &shutdown, |_| panic!("no message expected"));
    }
}
