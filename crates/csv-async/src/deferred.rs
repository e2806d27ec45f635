/*!
# Settle-once Deferred Results

A [`Resolver`] and [`Deferred`] pair turns an error-first completion callback
into a future. The first outcome handed to the resolver wins; anything after
it is dropped.
*/

use csv_async_engine::EngineCallback;
use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, PoisonError},
    task::{Context, Poll},
};
use tokio::sync::oneshot;
use tracing::debug;

/// Create a linked resolver and future
pub fn deferred<T, E>() -> (Resolver<T, E>, Deferred<T, E>) {
    let (sender, receiver) = oneshot::channel();
    let resolver = Resolver {
        sender: Arc::new(Mutex::new(Some(sender))),
    };
    let deferred = Deferred {
        receiver,
        dangling: false,
    };
    (resolver, deferred)
}

/// Write side of a [`Deferred`]
///
/// Clones share the same slot, so the pair still settles at most once.
pub struct Resolver<T, E> {
    // `None` once settled
    sender: Arc<Mutex<Option<oneshot::Sender<Result<T, E>>>>>,
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
        }
    }
}

impl<T, E> Resolver<T, E> {
    /// Settle the paired future with `outcome`
    ///
    /// Returns `false`, leaving the future untouched, if it was already settled.
    pub fn settle(&self, outcome: Result<T, E>) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match sender {
            Some(sender) => {
                if sender.send(outcome).is_err() {
                    debug!("Deferred result dropped before settlement, discarding outcome");
                }
                true
            }
            None => {
                debug!("Ignoring completion of an already settled operation");
                false
            }
        }
    }

    pub fn is_settled(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl<T, E> Resolver<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Completion callback that settles this resolver
    pub fn into_callback(self) -> EngineCallback<T, E> {
        Box::new(move |outcome: Result<T, E>| {
            self.settle(outcome);
        })
    }
}

/// Future side of a settle-once result
///
/// Resolves as soon as its [`Resolver`] settles. If every resolver is dropped
/// without settling, it never resolves.
#[must_use = "a deferred result does nothing unless awaited"]
pub struct Deferred<T, E> {
    receiver: oneshot::Receiver<Result<T, E>>,
    // Set once the receiver reported a dropped sender; it must not be polled again
    dangling: bool,
}

impl<T, E> Future for Deferred<T, E> {
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.dangling {
            return Poll::Pending;
        }

        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => {
                debug!("Completion callback dropped without being invoked");
                this.dangling = true;
                Poll::Pending
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
