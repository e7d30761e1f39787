//! Ordered queue of actions waiting to be applied, with history of released ones.
//!
//! Pending actions can be grouped into blocks: a block is a run of consecutive pending actions
//! that is meant to be released together (for instance everything issued during one execution
//! cycle). Blocks always partition a prefix of the pending queue and are consumed front to back.

use std::collections::VecDeque;
use std::sync::Arc;
use tracing::trace;

use crate::action::{Action, ActionId};

#[derive(Debug, Default)]
pub struct ActionBuffer {
    /// Issued but not yet released, in order of issuing.
    pending: VecDeque<Arc<Action>>,

    /// History of released actions. Only appended to.
    released: Vec<Arc<Action>>,

    /// Sizes of the blocks at the head of `pending`. Their sum never exceeds the pending length.
    block_counts: VecDeque<usize>,
}

impl ActionBuffer {
    pub fn new() -> Self {
        ActionBuffer::default()
    }

    pub fn add(&mut self, action: Arc<Action>) {
        trace!("Buffered {}", action);
        self.pending.push_back(action);
    }

    /// Releases the first pending action, or returns None if nothing is pending.
    pub fn get_next(&mut self) -> Option<Arc<Action>> {
        let action = self.pending.pop_front()?;
        self.released.push(action.clone());
        self.consume_blocks(1);
        Some(action)
    }

    /// The most recently released action.
    pub fn get_last(&self) -> Option<Arc<Action>> {
        self.released.last().cloned()
    }

    /// All pending actions in order. If `flush` is set, they are all released.
    pub fn get_all_pending(&mut self, flush: bool) -> Vec<Arc<Action>> {
        let actions: Vec<Arc<Action>> = self.pending.iter().cloned().collect();
        if flush {
            self.released.extend(self.pending.drain(..));
            self.block_counts.clear();
        }
        actions
    }

    /// Releases, in order, all pending actions with ids up to and including `id`.
    ///
    /// # Panics
    ///
    /// See [`ActionBuffer::count_up_to_id`].
    pub fn get_all_up_to_id(&mut self, id: ActionId) -> Vec<Arc<Action>> {
        let count = self.count_up_to_id(id);
        let actions: Vec<Arc<Action>> = self.pending.drain(..count).collect();
        self.released.extend(actions.iter().cloned());
        self.consume_blocks(count);
        actions
    }

    /// Number of pending actions with ids up to and including `id`.
    ///
    /// # Panics
    ///
    /// If the release would stop in the middle of the pending queue without ending exactly
    /// at `id`. This means the caller lost track of what it has issued and the buffer cannot
    /// be cut consistently.
    pub fn count_up_to_id(&self, id: ActionId) -> usize {
        let count = self.pending.iter().take_while(|a| a.id <= id).count();
        if count < self.pending.len() {
            let last_id = count.checked_sub(1).map(|last| self.pending[last].id);
            if last_id != Some(id) {
                panic!(
                    "Cannot release up to action #{}: it is not a boundary of the pending actions \
                    (last releasable is {:?}, {} pending)",
                    id,
                    last_id,
                    self.pending.len()
                );
            }
        }
        count
    }

    /// Number of actions in the first block, or of all pending actions if there are no blocks.
    pub fn block_len(&self) -> usize {
        self.block_counts.front().copied().unwrap_or(self.pending.len())
    }

    /// Marks all pending actions not yet in a block as a new block.
    pub fn set_block(&mut self) {
        let covered: usize = self.block_counts.iter().sum();
        let size = self.pending.len() - covered;
        if size > 0 {
            trace!("New block of {} actions", size);
            self.block_counts.push_back(size);
        }
    }

    /// Actions of the first block, or all pending actions if there are no blocks. If `flush`
    /// is set, the returned actions are released.
    pub fn get_block_pending(&mut self, flush: bool) -> Vec<Arc<Action>> {
        let Some(&size) = self.block_counts.front() else {
            return self.get_all_pending(flush);
        };

        if flush {
            self.block_counts.pop_front();
            let actions: Vec<Arc<Action>> = self.pending.drain(..size).collect();
            self.released.extend(actions.iter().cloned());
            actions
        } else {
            self.pending.iter().take(size).cloned().collect()
        }
    }

    pub fn are_actions_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn actions_pending(&self) -> usize {
        self.pending.len()
    }

    /// Number of blocks not yet released.
    pub fn block_count(&self) -> usize {
        self.block_counts.len()
    }

    /// True if nothing was ever added or released.
    pub fn is_virgin(&self) -> bool {
        self.pending.is_empty() && self.released.is_empty()
    }

    /// Released history, oldest first.
    pub fn released(&self) -> &[Arc<Action>] {
        &self.released
    }

    pub fn pending(&self) -> impl Iterator<Item = &Arc<Action>> {
        self.pending.iter()
    }

    /// Hard reset: drops pending and released actions and all blocks without releasing anything.
    pub fn flush(&mut self) {
        self.pending.clear();
        self.released.clear();
        self.block_counts.clear();
    }

    /// Account for `count` actions released from the head of the pending queue.
    fn consume_blocks(&mut self, mut count: usize) {
        while count > 0 {
            let Some(head) = self.block_counts.front_mut() else {
                break;
            };
            let taken = count.min(*head);
            *head -= taken;
            count -= taken;
            if *head == 0 {
                self.block_counts.pop_front();
            }
        }
    }
}
