use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};

/// Opens the physical connection that the [`ConnectionManager`] caches.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Handle: Clone + Send + Sync + 'static;

    async fn connect(&self) -> Result<Self::Handle, sqlx::Error>;
}

pub struct PgConnector {
    database_url: String,
    max_connections: u32,
    acquire_timeout: Duration,
}

impl PgConnector {
    pub fn new(config: &Config) -> Self {
        Self {
            database_url: config.database_url.clone(),
            max_connections: config.max_connections,
            acquire_timeout: config.acquire_timeout,
        }
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Handle = PgPool;

    async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        // Connect eagerly and bound acquisition so a dead database fails the
        // call instead of parking queries in the pool.
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .test_before_acquire(true)
            .connect(&self.database_url)
            .await
    }
}

type Attempt<H> = Shared<BoxFuture<'static, Result<H, Arc<sqlx::Error>>>>;

enum Slot<H> {
    Empty,
    Connecting { generation: u64, attempt: Attempt<H> },
    Ready(H),
}

struct Inner<H> {
    slot: Slot<H>,
    generation: u64,
}

enum Lookup<H> {
    Ready(H),
    Pending(u64, Attempt<H>),
}

/// Process-wide owner of the single database connection.
///
/// The first caller starts the connection attempt; every caller that arrives
/// while it is in flight awaits the same attempt and sees the same handle or
/// the same error. A failed attempt clears the slot so the next call retries.
/// Build one per process and share it through the application state.
pub struct ConnectionManager<C: Connector> {
    connector: Arc<C>,
    inner: Mutex<Inner<C::Handle>>,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector: Arc::new(connector),
            inner: Mutex::new(Inner {
                slot: Slot::Empty,
                generation: 0,
            }),
        }
    }

    pub async fn get_connection(&self) -> Result<C::Handle> {
        let (generation, attempt) = match self.lookup() {
            Lookup::Ready(handle) => return Ok(handle),
            Lookup::Pending(generation, attempt) => (generation, attempt),
        };

        let outcome = attempt.await;
        self.settle(generation, &outcome);

        outcome.map_err(Error::Connection)
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.lock().slot, Slot::Ready(_))
    }

    fn lock(&self) -> MutexGuard<'_, Inner<C::Handle>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup(&self) -> Lookup<C::Handle> {
        let mut inner = self.lock();

        match &inner.slot {
            Slot::Ready(handle) => return Lookup::Ready(handle.clone()),
            Slot::Connecting { generation, attempt } => {
                debug!("Joining in-flight connection attempt #{}", generation);
                return Lookup::Pending(*generation, attempt.clone());
            }
            Slot::Empty => {}
        }

        inner.generation += 1;
        let generation = inner.generation;
        let connector = Arc::clone(&self.connector);
        let attempt = async move { connector.connect().await.map_err(Arc::new) }
            .boxed()
            .shared();

        info!("Connecting to database (attempt #{})...", generation);
        inner.slot = Slot::Connecting {
            generation,
            attempt: attempt.clone(),
        };

        Lookup::Pending(generation, attempt)
    }

    fn settle(&self, generation: u64, outcome: &Result<C::Handle, Arc<sqlx::Error>>) {
        let mut inner = self.lock();

        let current = matches!(
            &inner.slot,
            Slot::Connecting { generation: g, .. } if *g == generation
        );
        if !current {
            return;
        }

        match outcome {
            Ok(handle) => {
                info!("Database connected");
                inner.slot = Slot::Ready(handle.clone());
            }
            Err(err) => {
                warn!("Database connection attempt #{} failed: {}", generation, err);
                inner.slot = Slot::Empty;
            }
        }
    }
}
