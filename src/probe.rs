use std::fmt::Display;

use redis::{Client, Connection};

use crate::errors::ProbeError;

/// Well-known port the gate probes unless a target is given explicitly.
pub const REDIS_PORT: u16 = 6379;
pub const DEFAULT_HOST: &str = "localhost";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeTarget {
    pub host: String,
    pub port: u16,
}

impl ProbeTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }
}

impl Default for ProbeTarget {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, REDIS_PORT)
    }
}

impl Display for ProbeTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Opens and releases connections to an external dependency.
///
/// `open` must leave nothing behind when it fails. `close` is best-effort.
pub trait Probe: Send + Sync {
    type Handle;

    fn target(&self) -> &ProbeTarget;

    fn open(&self) -> Result<Self::Handle, ProbeError>;

    fn close(&self, handle: Self::Handle) -> Result<(), ProbeError>;
}

/// A live probe connection owned by a single invocation.
///
/// Closed through its probe at most once, by `release` or on drop.
pub struct ProbeResource<'p, P: Probe + ?Sized> {
    probe: &'p P,
    handle: Option<P::Handle>,
}

impl<'p, P: Probe + ?Sized> ProbeResource<'p, P> {
    pub fn new(probe: &'p P, handle: P::Handle) -> Self {
        Self {
            probe,
            handle: Some(handle),
        }
    }

    pub fn target(&self) -> &ProbeTarget {
        self.probe.target()
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<&P::Handle> {
        self.handle.as_ref()
    }

    pub fn handle_mut(&mut self) -> Option<&mut P::Handle> {
        self.handle.as_mut()
    }

    /// Closes the handle once; later calls are no-ops.
    pub fn release(&mut self) -> Result<(), ProbeError> {
        match self.handle.take() {
            Some(handle) => self.probe.close(handle),
            None => Ok(()),
        }
    }
}

impl<'p, P: Probe + ?Sized> Drop for ProbeResource<'p, P> {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            warn!("Failed to release probe connection to {}: {err:#}", self.target());
        }
    }
}

/// Probes a Redis server with a plain synchronous connection and a `PING`.
///
/// There is no explicit timeout and no retry; the driver's connect defaults apply.
#[derive(Clone, Debug, Default)]
pub struct RedisProbe {
    target: ProbeTarget,
}

impl RedisProbe {
    pub fn new(target: ProbeTarget) -> Self {
        Self { target }
    }
}

impl Probe for RedisProbe {
    type Handle = Connection;

    fn target(&self) -> &ProbeTarget {
        &self.target
    }

    fn open(&self) -> Result<Connection, ProbeError> {
        let client = Client::open(self.target.url())?;
        let mut connection = client.get_connection()?;
        // a connection that fails the handshake is dropped here, closing the socket
        let reply: String = redis::cmd("PING").query(&mut connection)?;
        if reply != "PONG" {
            return Err(ProbeError::UnexpectedHandshake { reply });
        }
        debug!("Opened probe connection to {}", self.target);
        Ok(connection)
    }

    fn close(&self, mut handle: Connection) -> Result<(), ProbeError> {
        let quit: redis::RedisResult<()> = redis::cmd("QUIT").query(&mut handle);
        drop(handle);
        debug!("Closed probe connection to {}", self.target);
        quit.map_err(ProbeError::from)
    }
}
