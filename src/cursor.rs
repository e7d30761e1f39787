//! Cursor: a stateful representation of the device that actions are applied to, in order.
//!
//! A cursor buffers issued actions, applies them on request and keeps the absolute state that
//! results. A successfully applied action is forwarded to the child cursor, if there is one, so
//! that a chain of cursors advances stage by stage. The failed action is logged, its effect is
//! discarded and it is not forwarded.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, trace, warn};

use crate::action::{Action, ActionId, ActionKind, IdGenerator};
use crate::action_buffer::ActionBuffer;
use crate::config::{CursorConfig, InitialState};
use crate::cursor_state::CursorState;
use crate::motion_error::{IoKind, MotionError};
use crate::settings::SettingsStack;

/// Receives actions applied by the parent cursor.
pub trait ActionListener: Send + Sync {
    fn on_applied(&self, action: &Arc<Action>) -> Result<(), MotionError>;
}

/// What a batch apply call has done.
#[derive(Debug, Default)]
pub struct ReleaseReport {
    /// Actions applied and forwarded, in order.
    pub applied: Vec<Arc<Action>>,
    /// Actions that could not be applied, with the reason.
    pub failed: Vec<(Arc<Action>, MotionError)>,
}

impl ReleaseReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total number of actions taken from the buffer.
    pub fn len(&self) -> usize {
        self.applied.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which pending actions a batch apply takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Everything pending.
    All,
    /// The first block, or everything pending if no block is set.
    Block,
    /// Everything up to and including the action with this id.
    UpTo(ActionId),
}

struct Inner {
    initialized: bool,
    buffer: ActionBuffer,
    settings: SettingsStack,
    state: CursorState,
}

pub struct Cursor {
    name: String,
    /// Apply every action as soon as it is issued.
    apply_immediately: bool,
    child: Option<Arc<dyn ActionListener>>,
    inner: Mutex<Inner>,
}

impl Cursor {
    pub fn new(
        name: &str,
        config: &CursorConfig,
        apply_immediately: bool,
        child: Option<Arc<dyn ActionListener>>,
    ) -> Self {
        Cursor {
            name: name.to_string(),
            apply_immediately,
            child,
            inner: Mutex::new(Inner {
                initialized: false,
                buffer: ActionBuffer::new(),
                settings: SettingsStack::new(config.settings_stack_depth),
                state: CursorState::new(config),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, MotionError> {
        self.inner
            .lock()
            .map_err(|_| MotionError::Compromised(self.name.clone()))
    }

    /// Set the starting state. Until this is done, no actions are accepted. A position given
    /// without rotation (or the other way around) is refused and leaves the cursor as it was.
    pub fn initialize(&self, initial: &InitialState) -> Result<(), MotionError> {
        let mut inner = self.lock()?;
        inner.state.initialize(initial)?;
        inner.initialized = true;
        info!("Cursor \"{}\" initialized", self.name);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().map(|inner| inner.initialized).unwrap_or(false)
    }

    /// Buffer the action, and apply it at once if this cursor does so.
    pub fn issue(&self, action: Arc<Action>) -> Result<(), MotionError> {
        let mut inner = self.lock()?;
        if !inner.initialized {
            return Err(MotionError::NotInitialized(self.name.clone()));
        }
        self.enqueue(&mut inner, action)
    }

    /// Create the action with the next id from the generator and issue it. The id is taken while
    /// the cursor is locked so buffer order always matches id order, even if several threads
    /// issue at once. No id is consumed if the cursor does not accept the action.
    pub fn issue_with(&self, ids: &IdGenerator, kind: ActionKind) -> Result<Arc<Action>, MotionError> {
        let mut inner = self.lock()?;
        if !inner.initialized {
            return Err(MotionError::NotInitialized(self.name.clone()));
        }
        let action = Action::issue(ids, kind);
        self.enqueue(&mut inner, action.clone())?;
        Ok(action)
    }

    fn enqueue(&self, inner: &mut Inner, action: Arc<Action>) -> Result<(), MotionError> {
        trace!("{}: issued {}", self.name, action);
        inner.buffer.add(action);
        if self.apply_immediately {
            if let Some(next) = inner.buffer.get_next() {
                self.apply(inner, &next)?;
                self.forward(&next)?;
            }
        }
        Ok(())
    }

    /// Apply the next pending action and return it, or None if nothing is pending. The action
    /// is taken from the buffer even if it fails, the error is returned then.
    pub fn apply_next(&self) -> Result<Option<Arc<Action>>, MotionError> {
        let mut inner = self.lock()?;
        match inner.buffer.get_next() {
            Some(action) => {
                self.apply(&mut inner, &action)?;
                self.forward(&action)?;
                Ok(Some(action))
            }
            None => Ok(None),
        }
    }

    /// Apply every pending action.
    pub fn apply_all(&self) -> Result<ReleaseReport, MotionError> {
        self.apply_release(Release::All)
    }

    /// Apply pending actions up to the next block boundary, or all of them if none is set.
    pub fn apply_block(&self) -> Result<ReleaseReport, MotionError> {
        self.apply_release(Release::Block)
    }

    /// Apply pending actions up to and including the one with the given id.
    ///
    /// # Panics
    ///
    /// If the id is pending but is not the last of the range taken, see
    /// [`ActionBuffer::count_up_to_id`].
    pub fn apply_up_to(&self, id: ActionId) -> Result<ReleaseReport, MotionError> {
        self.apply_release(Release::UpTo(id))
    }

    /// Apply the given range of pending actions.
    pub fn apply_release(&self, release: Release) -> Result<ReleaseReport, MotionError> {
        let mut inner = self.lock()?;
        self.apply_batch(&mut inner, release)
    }

    /// Same as [`Cursor::apply_release`], also returning the state the batch started from. Both
    /// are taken under one lock, so the state always matches the first released action.
    pub fn apply_release_from(&self, release: Release) -> Result<(CursorState, ReleaseReport), MotionError> {
        let mut inner = self.lock()?;
        let start = inner.state.clone();
        let report = self.apply_batch(&mut inner, release)?;
        Ok((start, report))
    }

    /// Failed actions go to the report. A child that cannot take an action stops the batch: that
    /// action stays applied here, the actions after it stay pending.
    fn apply_batch(&self, inner: &mut Inner, release: Release) -> Result<ReleaseReport, MotionError> {
        let count = match release {
            Release::All => inner.buffer.actions_pending(),
            Release::Block => inner.buffer.block_len(),
            Release::UpTo(id) => inner.buffer.count_up_to_id(id),
        };

        let mut report = ReleaseReport::default();
        for _ in 0..count {
            let Some(action) = inner.buffer.get_next() else {
                break;
            };
            match self.apply(inner, &action) {
                Ok(()) => {
                    self.forward(&action)?;
                    report.applied.push(action);
                }
                Err(e) => report.failed.push((action, e)),
            }
        }
        if !report.is_empty() {
            info!(
                "{}: released {} action(s), {} failed",
                self.name,
                report.len(),
                report.failed.len()
            );
        }
        Ok(report)
    }

    fn apply(&self, inner: &mut Inner, action: &Arc<Action>) -> Result<(), MotionError> {
        match inner.state.apply(action, &mut inner.settings) {
            Ok(()) => {
                debug!("{}: applied {}", self.name, action);
                Ok(())
            }
            Err(e) => {
                warn!("{}: cannot apply {}: {}", self.name, action, e);
                Err(e)
            }
        }
    }

    fn forward(&self, action: &Arc<Action>) -> Result<(), MotionError> {
        match &self.child {
            Some(child) => child.on_applied(action),
            None => Ok(()),
        }
    }

    /// Everything pending at the next apply will be released in one block.
    pub fn set_block(&self) -> Result<(), MotionError> {
        self.lock()?.buffer.set_block();
        Ok(())
    }

    /// The most recently released action, whether it applied or not.
    pub fn get_last(&self) -> Result<Option<Arc<Action>>, MotionError> {
        Ok(self.lock()?.buffer.get_last())
    }

    pub fn set_io_name(&self, name: &str, pin: usize, kind: IoKind) -> Result<(), MotionError> {
        self.lock()?.state.set_io_name(name, pin, kind)
    }

    /// Copy of the current state.
    pub fn state(&self) -> Result<CursorState, MotionError> {
        Ok(self.lock()?.state.clone())
    }

    pub fn released_actions(&self) -> Result<Vec<Arc<Action>>, MotionError> {
        Ok(self.lock()?.buffer.released().to_vec())
    }

    pub fn pending_actions(&self) -> Result<Vec<Arc<Action>>, MotionError> {
        Ok(self.lock()?.buffer.pending().cloned().collect())
    }

    pub fn actions_pending(&self) -> Result<usize, MotionError> {
        Ok(self.lock()?.buffer.actions_pending())
    }

    /// Drop all buffered actions. The state stays as it is.
    pub fn flush(&self) -> Result<(), MotionError> {
        self.lock()?.buffer.flush();
        Ok(())
    }
}

impl ActionListener for Cursor {
    fn on_applied(&self, action: &Arc<Action>) -> Result<(), MotionError> {
        self.issue(action.clone())
    }
}
