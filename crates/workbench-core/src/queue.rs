//! Ordered queue of decoded craft requests awaiting the authority.
//!
//! Requests are pushed as packets arrive and taken in submission order,
//! one transaction at a time. Requests for the same station can never
//! interleave.

use std::collections::VecDeque;

use crate::codec::CraftRequest;
use crate::id::PlayerId;

/// A decoded request together with the player who sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub sender: PlayerId,
    pub request: CraftRequest,
}

/// An envelope that has left the queue, tagged with the batch that ran it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taken {
    pub batch: u64,
    pub envelope: Envelope,
}

#[derive(Debug, Default)]
pub struct CraftQueue {
    pending: VecDeque<Envelope>,
    recent: VecDeque<Taken>,
    /// Upper bound on `recent`. Zero disables retention.
    retain: usize,
}

impl CraftQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue that remembers the last `retain` envelopes it handed out.
    pub fn retaining(retain: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            recent: VecDeque::with_capacity(retain),
            retain,
        }
    }

    pub fn push(&mut self, sender: PlayerId, request: CraftRequest) {
        self.pending.push_back(Envelope { sender, request });
    }

    /// Take everything pending, oldest first.
    pub fn take_batch(&mut self, batch: u64) -> Vec<Envelope> {
        let taken: Vec<Envelope> = self.pending.drain(..).collect();
        if self.retain == 0 {
            return taken;
        }
        for envelope in &taken {
            if self.recent.len() == self.retain {
                self.recent.pop_front();
            }
            self.recent.push_back(Taken {
                batch,
                envelope: envelope.clone(),
            });
        }
        taken
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Retained envelopes, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = &Taken> {
        self.recent.iter()
    }

    pub fn forget_recent(&mut self) {
        self.recent.clear();
    }
}
