//! Service lifecycle - run / stop

use super::{ListenerState, OscService};
use crate::error::{BindError, Result};
use crate::transport::{bind_listener, serve, ListenerThread, UdpSink};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

impl OscService {
    /// Open the configured transports
    ///
    /// With an outbound port, a UDP client targeting `host:out_port` is
    /// attached. With an inbound port, a listener is bound to `host:in_port`:
    /// on a background thread, or on the calling thread when `blocking` is
    /// true, in which case this returns only after [`OscService::stop`].
    pub fn run(&self, blocking: bool) -> Result<()> {
        let mut slot = self.listener.lock();
        if slot.is_some() {
            return Err(BindError::AlreadyRunning);
        }

        self.config
            .validate()
            .map_err(|e| BindError::InvalidConfig(e.to_string()))?;

        // Open both transports before committing either, so a failed bind
        // leaves the service exactly as it was
        let sink = match self.config.out_port {
            Some(port) => Some(UdpSink::connect(
                &self.config.host,
                port,
                self.config.allow_broadcast,
            )?),
            None => None,
        };
        let socket = match self.config.in_port {
            Some(port) => Some(bind_listener(
                &self.config.host,
                port,
                self.config.poll_duration(),
            )?),
            None => None,
        };

        let Some(socket) = socket else {
            self.commit_sink(sink);
            debug!("No inbound port configured, not listening");
            return Ok(());
        };

        let local_addr = socket.local_addr()?;
        let dispatcher = self.dispatcher.clone();

        if !blocking {
            let thread = ListenerThread::spawn(socket, move |message| {
                dispatcher.dispatch(&message);
            })?;
            self.commit_sink(sink);
            *slot = Some(ListenerState::Background(thread));
            info!("✅ OSC service listening on {}", local_addr);
            return Ok(());
        }

        self.commit_sink(sink);
        let shutdown = Arc::new(AtomicBool::new(false));
        *slot = Some(ListenerState::Foreground {
            shutdown: shutdown.clone(),
            local_addr,
        });
        drop(slot);

        info!("✅ OSC service listening on {} (blocking)", local_addr);
        serve(socket, &shutdown, |message| {
            dispatcher.dispatch(&message);
        });

        // stop() normally clears the slot; only clear it if it is still ours
        let mut slot = self.listener.lock();
        if matches!(&*slot, Some(ListenerState::Foreground { shutdown: s, .. }) if Arc::ptr_eq(s, &shutdown)) {
            *slot = None;
        }
        Ok(())
    }

    fn commit_sink(&self, sink: Option<UdpSink>) {
        if let Some(sink) = sink {
            info!("📤 OSC client → {}", sink.target());
            self.attach_sink(Arc::new(sink));
        }
    }

    /// Stop the inbound listener; no-op when not running
    ///
    /// Safe to call from any thread, any number of times.
    pub fn stop(&self) {
        let state = self.listener.lock().take();
        match state {
            None => debug!("OSC service not running, stop is a no-op"),
            Some(ListenerState::Background(mut thread)) => {
                thread.stop();
                info!("OSC service stopped");
            }
            Some(ListenerState::Foreground { shutdown, .. }) => {
                shutdown.store(true, Ordering::Release);
                info!("OSC service stop requested");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.listener.lock().is_some()
    }

    /// Bound inbound address while running (resolves port 0)
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &*self.listener.lock() {
            Some(ListenerState::Background(thread)) => Some(thread.local_addr()),
            Some(ListenerState::Foreground { local_addr, .. }) => Some(*local_addr),
            None => None,
        }
    }
}

impl Drop for OscService {
    fn drop(&mut self) {
        self.stop();
    }
}
