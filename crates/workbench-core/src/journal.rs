//! Record of craft outcomes, kept in a pre-allocated ring buffer.
//!
//! Rejection reasons never cross the wire, so the journal is where they
//! become observable: tests assert on it, and passive listeners (analytics,
//! admin tooling) subscribe to it.

use crate::codec::CodecError;
use crate::coordinator::{OutputSpec, Rejection};
use crate::id::{BlockPos, EntityId, PlayerId};

/// The outcome of one packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CraftEvent {
    /// The packet failed to decode and never reached the queue.
    Dropped { sender: PlayerId, error: CodecError },
    Crafted {
        sender: PlayerId,
        batch: u64,
        station: BlockPos,
        entity: EntityId,
        spec: OutputSpec,
    },
    Rejected {
        sender: PlayerId,
        batch: u64,
        output_type_id: String,
        station: BlockPos,
        reason: Rejection,
    },
}

impl CraftEvent {
    pub fn sender(&self) -> PlayerId {
        match self {
            CraftEvent::Dropped { sender, .. }
            | CraftEvent::Crafted { sender, .. }
            | CraftEvent::Rejected { sender, .. } => *sender,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            CraftEvent::Rejected { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// A passive listener receives events read-only.
pub type JournalListener = Box<dyn FnMut(&CraftEvent) + Send>;

/// Fixed-capacity ring buffer of craft events. When full, the oldest events
/// are dropped.
pub struct CraftJournal {
    events: Vec<Option<CraftEvent>>,
    /// Write position (wraps around).
    head: usize,
    len: usize,
    total_written: u64,
    listeners: Vec<JournalListener>,
}

impl std::fmt::Debug for CraftJournal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CraftJournal")
            .field("capacity", &self.capacity())
            .field("len", &self.len)
            .field("total_written", &self.total_written)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl CraftJournal {
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: JournalListener) {
        self.listeners.push(listener);
    }

    /// Notify listeners, then store. If full, the oldest event is dropped.
    pub fn record(&mut self, event: CraftEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
        let capacity = self.capacity();
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % capacity;
        if self.len < capacity {
            self.len += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total events recorded since creation (including dropped).
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Iterate over events from oldest to newest.
    pub fn iter(&self) -> JournalIter<'_> {
        // head points to the next write position, which is the oldest entry once full.
        let start = if self.len < self.capacity() { 0 } else { self.head };
        JournalIter {
            journal: self,
            index: start,
            remaining: self.len,
        }
    }

    /// The most recent event, if any.
    pub fn last(&self) -> Option<&CraftEvent> {
        if self.len == 0 {
            return None;
        }
        let index = (self.head + self.capacity() - 1) % self.capacity();
        self.events[index].as_ref()
    }

    pub fn clear(&mut self) {
        for slot in &mut self.events {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

/// Iterator over a [`CraftJournal`], from oldest to newest.
pub struct JournalIter<'a> {
    journal: &'a CraftJournal,
    index: usize,
    remaining: usize,
}

impl<'a> Iterator for JournalIter<'a> {
    type Item = &'a CraftEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let event = self.journal.events[self.index].as_ref();
        self.index = (self.index + 1) % self.journal.capacity();
        self.remaining -= 1;
        event
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for JournalIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_player;
    use std::sync::{Arc, Mutex};

    fn dropped(n: usize) -> CraftEvent {
        CraftEvent::Dropped {
            sender: test_player(),
            error: CodecError::TrailingBytes(n),
        }
    }

    #[test]
    fn records_in_order() {
        let mut journal = CraftJournal::new(4);
        journal.record(dropped(1));
        journal.record(dropped(2));
        let seen: Vec<_> = journal.iter().cloned().collect();
        assert_eq!(seen, vec![dropped(1), dropped(2)]);
        assert_eq!(journal.last(), Some(&dropped(2)));
    }

    #[test]
    fn wraps_when_full() {
        let mut journal = CraftJournal::new(2);
        for n in 1..=5 {
            journal.record(dropped(n));
        }
        assert_eq!(journal.len(), 2);
        assert_eq!(journal.total_written(), 5);
        let seen: Vec<_> = journal.iter().cloned().collect();
        assert_eq!(seen, vec![dropped(4), dropped(5)]);
        assert_eq!(journal.last(), Some(&dropped(5)));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut journal = CraftJournal::new(0);
        assert_eq!(journal.capacity(), 1);
        journal.record(dropped(1));
        journal.record(dropped(2));
        assert_eq!(journal.iter().count(), 1);
    }

    #[test]
    fn listeners_see_every_event() {
        let seen = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&seen);
        let mut journal = CraftJournal::new(1);
        journal.subscribe(Box::new(move |_| *counter.lock().unwrap() += 1));
        for n in 0..3 {
            journal.record(dropped(n));
        }
        assert_eq!(*seen.lock().unwrap(), 3);
    }

    #[test]
    fn clear_empties() {
        let mut journal = CraftJournal::new(3);
        journal.record(dropped(1));
        journal.clear();
        assert!(journal.is_empty());
        assert!(journal.last().is_none());
    }

    #[test]
    fn rejection_accessor() {
        let event = CraftEvent::Rejected {
            sender: test_player(),
            batch: 0,
            output_type_id: "pkg:x".to_string(),
            station: BlockPos::default(),
            reason: Rejection::NoOpenStation,
        };
        assert_eq!(event.rejection(), Some(&Rejection::NoOpenStation));
        assert!(dropped(0).rejection().is_none());
    }
}
