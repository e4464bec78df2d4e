//! Single-value channel from a pool thread to either a blocked thread or a future.
//!
//! Small enough that it isn't worth bringing in an async runtime's channel for it.

use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Condvar, Mutex},
    task::{Context, Poll, Waker},
};

/// Why no value arrived.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RecvError {
    /// The sender was dropped without sending.
    Hangup,
    /// A thread panicked while holding the channel lock.
    Poisoned,
}

impl std::fmt::Display for RecvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecvError::Hangup => write!(f, "sender hung up"),
            RecvError::Poisoned => write!(f, "channel lock poisoned"),
        }
    }
}

/// Create a linked sender and receiver.
pub fn new<T>() -> (Sender<T>, Receiver<T>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(Slot {
            value: None,
            waker: None,
            sender_gone: false,
            receiver_gone: false,
        }),
        ready: Condvar::new(),
    });
    (
        Sender {
            shared: Some(shared.clone()),
        },
        Receiver { shared },
    )
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

struct Slot<T> {
    value: Option<T>,
    waker: Option<Waker>,
    sender_gone: bool,
    receiver_gone: bool,
}

/// Sending half. Sending never blocks and never fails; if the receiver is gone, the value
/// is dropped.
pub struct Sender<T> {
    shared: Option<Arc<Shared<T>>>,
}

impl<T> Sender<T> {
    /// True once the receiver has been dropped.
    pub fn is_cancelled(&self) -> bool {
        match &self.shared {
            Some(shared) => shared.slot.lock().map(|s| s.receiver_gone).unwrap_or(true),
            None => true,
        }
    }

    pub fn send(mut self, value: T) {
        if let Some(shared) = self.shared.take() {
            shared.finish(Some(value));
        }
    }
}

impl<T> Drop for Sender<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            shared.finish(None);
        }
    }
}

impl<T> Shared<T> {
    fn finish(&self, value: Option<T>) {
        let waker = match self.slot.lock() {
            Ok(mut slot) => {
                slot.sender_gone = true;
                if !slot.receiver_gone {
                    slot.value = value;
                }
                slot.waker.take()
            }
            Err(_) => None,
        };
        self.ready.notify_all();
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

/// Receiving half: either block on [`Receiver::recv`] or `.await` it.
pub struct Receiver<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Receiver<T> {
    /// Block until the value arrives or the sender goes away.
    pub fn recv(self) -> Result<T, RecvError> {
        let mut slot = self.shared.slot.lock().map_err(|_| RecvError::Poisoned)?;
        loop {
            if let Some(value) = slot.value.take() {
                return Ok(value);
            }
            if slot.sender_gone {
                return Err(RecvError::Hangup);
            }
            slot = self
                .shared
                .ready
                .wait(slot)
                .map_err(|_| RecvError::Poisoned)?;
        }
    }
}

impl<T> Future for Receiver<T> {
    type Output = Result<T, RecvError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = match self.shared.slot.lock() {
            Ok(slot) => slot,
            Err(_) => return Poll::Ready(Err(RecvError::Poisoned)),
        };
        if let Some(value) = slot.value.take() {
            return Poll::Ready(Ok(value));
        }
        if slot.sender_gone {
            return Poll::Ready(Err(RecvError::Hangup));
        }
        slot.waker = Some(cx.waker().clone());
        Poll::Pending
    }
}

impl<T> Drop for Receiver<T> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.shared.slot.lock() {
            slot.receiver_gone = true;
            slot.value = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_crosses_threads() {
        let (tx, rx) = new();
        std::thread::spawn(move || tx.send(42));
        assert_eq!(rx.recv(), Ok(42));
    }

    #[test]
    fn value_sent_before_recv() {
        let (tx, rx) = new();
        tx.send("done");
        assert_eq!(rx.recv(), Ok("done"));
    }

    #[test]
    fn dropped_sender_is_hangup() {
        let (tx, rx) = new::<u8>();
        std::thread::spawn(move || drop(tx));
        assert_eq!(rx.recv(), Err(RecvError::Hangup));
    }

    #[test]
    fn cancellation_is_visible() {
        let (tx, rx) = new::<u8>();
        assert!(!tx.is_cancelled());
        drop(rx);
        assert!(tx.is_cancelled());
        tx.send(1);
    }

    #[tokio::test]
    async fn awaits_value() {
        let (tx, rx) = new();
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(10));
            tx.send(7)
        });
        assert_eq!(rx.await, Ok(7));
    }
}
