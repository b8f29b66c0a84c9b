//! Bounded channel pool with RAII leases.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lexgate_core::RpcError;
use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::channel::{Endpoint, RpcChannel};

/// Pool failure, distinct from the RPC errors of calls made on a leased
/// channel.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// Every channel stayed leased for the whole wait.
    #[error("no channel available within {0:?}")]
    LeaseTimeout(Duration),
    /// The pool was shut down.
    #[error("channel pool is closed")]
    Closed,
    /// Dialing a fresh channel failed.
    #[error("connect: {0}")]
    Connect(#[source] RpcError),
}

/// Sizing and timing knobs for one downstream pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum channels leased out at once.
    pub size: usize,
    /// How long a caller waits for a free channel before giving up.
    pub lease_timeout: Duration,
}

/// Dials new channels for the pool. Split out as a trait so pool tests can
/// run against an in-memory factory.
#[async_trait]
pub trait ChannelFactory: Send + Sync {
    async fn connect(&self) -> Result<RpcChannel, RpcError>;
}

/// Production factory: dials the configured endpoint.
#[derive(Debug)]
pub struct EndpointFactory {
    endpoint: Endpoint,
}

impl EndpointFactory {
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl ChannelFactory for EndpointFactory {
    async fn connect(&self) -> Result<RpcChannel, RpcError> {
        RpcChannel::connect(&self.endpoint).await
    }
}

struct PoolInner {
    idle: Mutex<Vec<RpcChannel>>,
    closed: AtomicBool,
}

/// Fixed-capacity pool of RPC channels to one downstream service.
///
/// Connections are opened lazily up to the configured size. At most `size`
/// leases exist at any moment; excess callers queue on the semaphore and
/// fail with [`PoolError::LeaseTimeout`] when the wait exceeds the lease
/// timeout.
pub struct ChannelPool {
    factory: Arc<dyn ChannelFactory>,
    semaphore: Arc<Semaphore>,
    inner: Arc<PoolInner>,
    config: PoolConfig,
}

impl ChannelPool {
    #[must_use]
    pub fn new(factory: Arc<dyn ChannelFactory>, config: PoolConfig) -> Self {
        Self {
            factory,
            semaphore: Arc::new(Semaphore::new(config.size)),
            inner: Arc::new(PoolInner {
                idle: Mutex::new(Vec::with_capacity(config.size)),
                closed: AtomicBool::new(false),
            }),
            config,
        }
    }

    /// Connects to the endpoint given a default pool configuration.
    #[must_use]
    pub fn for_endpoint(endpoint: Endpoint, config: PoolConfig) -> Self {
        Self::new(Arc::new(EndpointFactory::new(endpoint)), config)
    }

    /// Dials one channel and parks it in the idle set, verifying the
    /// downstream is reachable. Called once per pool at startup.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Connect`] when the downstream cannot be dialed;
    /// startup treats that as fatal.
    pub async fn warm(&self) -> Result<(), PoolError> {
        let channel = self.factory.connect().await.map_err(PoolError::Connect)?;
        self.inner.idle.lock().push(channel);
        Ok(())
    }

    /// Leases a channel, dialing a fresh one when the idle set is empty.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Closed`] after shutdown,
    /// [`PoolError::LeaseTimeout`] when all channels stay busy, or
    /// [`PoolError::Connect`] when a fresh dial fails (the permit is
    /// released, so capacity is not lost).
    pub async fn lease(&self) -> Result<ChannelLease, PoolError> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(PoolError::Closed);
        }

        let permit = tokio::time::timeout(
            self.config.lease_timeout,
            Arc::clone(&self.semaphore).acquire_owned(),
        )
        .await
        .map_err(|_| PoolError::LeaseTimeout(self.config.lease_timeout))?
        .map_err(|_| PoolError::Closed)?;

        let existing = self.inner.idle.lock().pop();
        let channel = match existing {
            Some(channel) => channel,
            None => self.factory.connect().await.map_err(PoolError::Connect)?,
        };

        Ok(ChannelLease {
            channel: Some(channel),
            inner: Arc::clone(&self.inner),
            _permit: permit,
        })
    }

    /// Shuts the pool down: waits for outstanding leases to finish, then
    /// drops every idle channel. Subsequent leases fail with
    /// [`PoolError::Closed`].
    pub async fn close(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        // Absorbing every permit waits out the in-flight leases.
        if let Ok(permits) = Arc::clone(&self.semaphore)
            .acquire_many_owned(u32::try_from(self.config.size).unwrap_or(u32::MAX))
            .await
        {
            permits.forget();
        }
        self.semaphore.close();
        self.inner.idle.lock().clear();
    }
}

impl std::fmt::Debug for ChannelPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelPool")
            .field("size", &self.config.size)
            .field("idle", &self.inner.idle.lock().len())
            .finish_non_exhaustive()
    }
}

/// RAII lease on one pooled channel.
///
/// Dropping the lease returns the channel to the idle set; channels marked
/// broken are discarded instead so the next lease dials anew. Either way
/// the semaphore permit is released on drop.
pub struct ChannelLease {
    channel: Option<RpcChannel>,
    inner: Arc<PoolInner>,
    _permit: OwnedSemaphorePermit,
}

impl ChannelLease {
    /// Drops the channel instead of returning it to the pool.
    pub fn discard(mut self) {
        self.channel = None;
    }
}

impl std::fmt::Debug for ChannelLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelLease")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

impl std::ops::Deref for ChannelLease {
    type Target = RpcChannel;

    fn deref(&self) -> &RpcChannel {
        self.channel.as_ref().expect("lease holds a channel")
    }
}

impl std::ops::DerefMut for ChannelLease {
    fn deref_mut(&mut self) -> &mut RpcChannel {
        self.channel.as_mut().expect("lease holds a channel")
    }
}

impl Drop for ChannelLease {
    fn drop(&mut self) {
        if let Some(channel) = self.channel.take() {
            if !channel.is_broken() && !self.inner.closed.load(Ordering::Acquire) {
                self.inner.idle.lock().push(channel);
            }
        }
    }
}
