//! Additive event subscriptions
//!
//! Fan-out list with defined unsubscribe semantics: subscribing never
//! displaces an earlier subscriber, and dropping a receiver removes it on
//! the next publish. Replaces single-slot callback fields, which silently
//! overwrite whoever registered first.

use tokio::sync::mpsc;

/// A list of subscribers to a cloneable event stream
pub struct Subscribers<T: Clone> {
    senders: Vec<mpsc::UnboundedSender<T>>,
}

impl<T: Clone> Subscribers<T> {
    pub fn new() -> Self {
        Self {
            senders: Vec::new(),
        }
    }

    /// Add a subscriber; the returned receiver unsubscribes when dropped
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.push(tx);
        rx
    }

    /// Publish to all live subscribers, pruning closed ones
    pub fn publish(&mut self, event: T) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

impl<T: Clone> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_subscribers_receive_every_event() {
        let mut subs: Subscribers<u32> = Subscribers::new();
        let mut a = subs.subscribe();
        let mut b = subs.subscribe();
        subs.publish(7);
        assert_eq!(a.try_recv().unwrap(), 7);
        assert_eq!(b.try_recv().unwrap(), 7);
    }

    #[test]
    fn dropped_receiver_is_pruned_on_publish() {
        let mut subs: Subscribers<u32> = Subscribers::new();
        let a = subs.subscribe();
        let mut b = subs.subscribe();
        drop(a);
        subs.publish(1);
        assert_eq!(subs.len(), 1);
        assert_eq!(b.try_recv().unwrap(), 1);
    }
}
