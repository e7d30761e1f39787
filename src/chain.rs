//! Three cursors replaying the same actions at different stages of their life.
//!
//! The virtual cursor applies every action as soon as it is issued, so the client always sees
//! where the device will be. Applied actions are queued in the write cursor until they are
//! released for compiling and sending, then queued in the motion cursor until the device
//! reports them executed.

use std::sync::Arc;

use tracing::info;

use crate::action::{Action, ActionId, ActionKind, IdGenerator};
use crate::compiler::Compiler;
use crate::config::{CursorConfig, InitialState, SessionConfig};
use crate::config_error::ConfigError;
use crate::cursor::{Cursor, Release, ReleaseReport};
use crate::motion_error::{IoKind, MotionError};

pub struct CursorChain {
    ids: IdGenerator,
    virtual_cursor: Arc<Cursor>,
    write_cursor: Arc<Cursor>,
    motion_cursor: Arc<Cursor>,
}

impl CursorChain {
    /// Build the chain. Cursors still need to be initialized.
    pub fn new(config: &CursorConfig) -> Self {
        let motion_cursor = Arc::new(Cursor::new("motion", config, false, None));
        let write_cursor = Arc::new(Cursor::new("write", config, false, Some(motion_cursor.clone())));
        let virtual_cursor = Arc::new(Cursor::new("virtual", config, true, Some(write_cursor.clone())));
        CursorChain {
            ids: IdGenerator::new(),
            virtual_cursor,
            write_cursor,
            motion_cursor,
        }
    }

    /// Validate the configuration and build the chain from it, initialized with its initial
    /// state.
    pub fn with_config(config: &SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let chain = CursorChain::new(&config.cursor);
        for cursor in chain.cursors() {
            // Fresh cursors, the lock cannot be poisoned yet
            if let Err(e) = cursor.initialize(&config.initial) {
                return Err(ConfigError::invalid("initial", e.to_string()));
            }
        }
        Ok(chain)
    }

    /// Initialize every cursor of the chain with the same state.
    pub fn initialize(&self, initial: &InitialState) -> Result<(), MotionError> {
        for cursor in self.cursors() {
            cursor.initialize(initial)?;
        }
        info!("Cursor chain initialized, {} actions issued so far", self.ids.last_id());
        Ok(())
    }

    fn cursors(&self) -> [&Arc<Cursor>; 3] {
        [&self.motion_cursor, &self.write_cursor, &self.virtual_cursor]
    }

    /// Issue the action to the chain. It is applied to the virtual cursor at once and, if this
    /// succeeds, queued for writing.
    pub fn issue(&self, kind: ActionKind) -> Result<Arc<Action>, MotionError> {
        self.virtual_cursor.issue_with(&self.ids, kind)
    }

    /// Close the block of actions issued since the previous one.
    pub fn set_block(&self) -> Result<(), MotionError> {
        self.write_cursor.set_block()
    }

    /// Release everything queued for writing.
    pub fn release_all(&self) -> Result<ReleaseReport, MotionError> {
        self.write_cursor.apply_all()
    }

    /// Release the oldest block queued for writing.
    pub fn release_block(&self) -> Result<ReleaseReport, MotionError> {
        self.write_cursor.apply_block()
    }

    /// Release actions queued for writing up to and including `id`.
    pub fn release_up_to(&self, id: ActionId) -> Result<ReleaseReport, MotionError> {
        self.write_cursor.apply_up_to(id)
    }

    /// Compile everything queued for writing and release it.
    pub fn export(&self, compiler: &dyn Compiler) -> Result<Vec<String>, MotionError> {
        self.export_release(compiler, Release::All)
    }

    /// Compile the given range of actions queued for writing and release it. The listing starts
    /// from the write state right before the range, even if other threads release concurrently.
    pub fn export_release(&self, compiler: &dyn Compiler, release: Release) -> Result<Vec<String>, MotionError> {
        let (start, report) = self.write_cursor.apply_release_from(release)?;
        Ok(compiler.compile(&start, &report.applied))
    }

    /// The device reports it has executed everything up to and including `id`.
    pub fn on_executed(&self, id: ActionId) -> Result<ReleaseReport, MotionError> {
        self.motion_cursor.apply_up_to(id)
    }

    /// Name the pin on every cursor of the chain.
    pub fn set_io_name(&self, name: &str, pin: usize, kind: IoKind) -> Result<(), MotionError> {
        for cursor in self.cursors() {
            cursor.set_io_name(name, pin, kind)?;
        }
        Ok(())
    }

    /// The most recently applied action of the virtual cursor.
    pub fn get_last(&self) -> Result<Option<Arc<Action>>, MotionError> {
        self.virtual_cursor.get_last()
    }

    /// Id of the most recently issued action, 0 if none.
    pub fn last_id(&self) -> ActionId {
        self.ids.last_id()
    }

    pub fn virtual_cursor(&self) -> &Cursor {
        &self.virtual_cursor
    }

    pub fn write_cursor(&self) -> &Cursor {
        &self.write_cursor
    }

    pub fn motion_cursor(&self) -> &Cursor {
        &self.motion_cursor
    }
}
