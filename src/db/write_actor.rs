use std::any::Any;
use std::time::Duration;

use diesel::SqliteConnection;
use tokio::sync::{mpsc, oneshot};

use super::DbPool;
use crate::constants::STORE_WRITE_TIMEOUT_SECS;
use crate::errors::{DatabaseError, Error, Result};

// Type alias for the job to be executed by the writer actor.
// It takes a mutable reference to a SqliteConnection and returns a Result.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    // Sender part of the MPSC channel to send jobs.
    // Each job is a boxed closure, and a oneshot sender is used for the reply.
    // The Box<dyn Any + Send> is used for type erasure of the job's return type.
    #[allow(clippy::type_complexity)]
    tx: mpsc::Sender<(
        Job<Box<dyn Any + Send + 'static>>,
        oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>,
    )>,
}

impl WriteHandle {
    /// Executes a database job on the writer actor's dedicated connection.
    ///
    /// The job runs inside an IMMEDIATE transaction, so its reads and writes
    /// are one atomic unit and jobs from concurrent callers serialize.
    ///
    /// If no reply arrives within the store write timeout the job's outcome
    /// is unknown; the caller gets a retryable timeout error and must not
    /// assume the write happened.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        // Create a oneshot channel for receiving the result from the actor.
        let (ret_tx, ret_rx) = oneshot::channel();

        // Send the job to the writer actor, wrapped to erase its return type.
        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .expect("Writer actor's receiving channel was closed, indicating the actor stopped.");

        let reply = tokio::time::timeout(
            Duration::from_secs(STORE_WRITE_TIMEOUT_SECS),
            ret_rx,
        )
        .await
        .map_err(|_| {
            Error::Database(DatabaseError::Timeout(format!(
                "no reply within {}s",
                STORE_WRITE_TIMEOUT_SECS
            )))
        })?;

        reply
            .expect("Writer actor dropped the reply sender without sending a result.")
            .map(|boxed: Box<dyn Any + Send + 'static>| {
                *boxed
                    .downcast::<T>()
                    .unwrap_or_else(|_| panic!("Failed to downcast writer actor result."))
            })
    }
}

/// Spawns a background Tokio task that acts as a single writer to the database.
/// This actor owns one database connection from the pool and processes write jobs serially.
pub fn spawn_writer(pool: &DbPool) -> WriteHandle {
    // The channel is bounded; 1024 is an arbitrary size.
    let (tx, mut rx) = mpsc::channel::<(
        Job<Box<dyn Any + Send + 'static>>,
        oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>,
    )>(1024);

    let pool = pool.clone();
    tokio::spawn(async move {
        // Acquire a single connection from the pool for this actor.
        // This connection is held for the lifetime of the actor.
        let mut conn = pool.get().expect(
            "Failed to get a connection from the DB pool for the writer actor. The pool might be exhausted or misconfigured.",
        );

        while let Some((job, reply_tx)) = rx.recv().await {
            // Execute the job within an immediate database transaction.
            let result: Result<Box<dyn Any + Send + 'static>> =
                conn.immediate_transaction::<_, Error, _>(|c| job(c));

            // Send the result back to the requester.
            // Ignore error if the receiver has dropped (e.g., request timed out or was cancelled).
            let _ = reply_tx.send(result);
        }
        // If rx.recv() returns None, the sender side (all WriteHandles) was
        // dropped, so the actor can terminate.
    });

    WriteHandle { tx }
}

/// Handle with no actor behind it, for tests that must reject before any
/// store write is attempted.
#[cfg(test)]
pub(crate) fn disconnected_writer() -> WriteHandle {
    let (tx, _rx) = mpsc::channel(1);
    WriteHandle { tx }
}
