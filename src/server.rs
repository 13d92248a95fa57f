//! TCP listener.
//!
//! Accepts connections one at a time and services each session to
//! completion before accepting the next. Fully synchronous by design:
//! there is no concurrent client handling, no timeouts, and the only
//! shared state across connections is the read-only configuration. A
//! stalled peer stalls the server; acceptable for the single-client
//! deployment and documented as a limitation.

use anyhow::{anyhow, Context, Result};
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::Config;
use crate::detect::RedDetector;
use crate::session::run_session;
use crate::viz::{NullVisualizer, SnapshotVisualizer, Visualizer};

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The vision bridge server. Owns the configuration for its lifetime.
pub struct VisionServer {
    config: Config,
}

/// Handle to a spawned server: the bound address and an orderly stop.
#[derive(Debug)]
pub struct ServerHandle {
    pub addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl ServerHandle {
    /// Signal shutdown and wait for the accept loop to finish.
    pub fn stop(mut self) -> Result<()> {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(join) = self.join.take() {
            join.join()
                .map_err(|_| anyhow!("vision server thread panicked"))?;
        }
        Ok(())
    }
}

impl VisionServer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Bind the configured address and start the accept loop on a worker
    /// thread. A bind failure is fatal to startup; nothing is retried.
    pub fn spawn(self) -> Result<ServerHandle> {
        let bind_addr = format!("{}:{}", self.config.host, self.config.port);
        let listener =
            TcpListener::bind(&bind_addr).with_context(|| format!("bind {}", bind_addr))?;
        let addr = listener.local_addr()?;
        listener.set_nonblocking(true)?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_thread = shutdown.clone();
        let config = self.config;
        let join = std::thread::spawn(move || {
            if let Err(err) = accept_loop(listener, config, shutdown_thread) {
                log::error!("vision server stopped: {:#}", err);
            }
        });

        Ok(ServerHandle {
            addr,
            shutdown,
            join: Some(join),
        })
    }
}

fn accept_loop(listener: TcpListener, config: Config, shutdown: Arc<AtomicBool>) -> Result<()> {
    let detector = RedDetector::new(config.min_red_ratio);
    let mut viz: Box<dyn Visualizer> = if config.display {
        Box::new(SnapshotVisualizer::new(&config.display_dir))
    } else {
        Box::new(NullVisualizer)
    };

    log::info!(
        "vision server listening on {} (min_red_ratio={}, display={})",
        listener.local_addr()?,
        config.min_red_ratio,
        config.display
    );

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match listener.accept() {
            Ok((stream, peer)) => serve_client(stream, peer, &detector, viz.as_mut()),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                std::thread::sleep(ACCEPT_POLL_INTERVAL);
                continue;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// Service one connection to completion. Session failures end that session
/// only; they are logged here and never propagate into the accept loop.
fn serve_client(
    mut stream: TcpStream,
    peer: SocketAddr,
    detector: &RedDetector,
    viz: &mut dyn Visualizer,
) {
    log::info!("client connected: {}", peer);
    if let Err(err) = stream.set_nonblocking(false) {
        log::warn!("client {} rejected: {}", peer, err);
        return;
    }
    match run_session(&mut stream, detector, viz) {
        Ok(frames) => log::info!("client disconnected: {} ({} frames answered)", peer, frames),
        Err(err) => log::warn!("client {} session ended: {}", peer, err),
    }
}
