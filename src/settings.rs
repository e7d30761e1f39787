//! Save and restore of the motion settings (push/pop actions).

use crate::action::{MotionType, ReferenceCS};

/// Default depth of the settings stack.
pub const SETTINGS_STACK_DEPTH: usize = 32;

/// Snapshot of the settings a push action saves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub speed: f64,
    pub acceleration: f64,
    pub rotation_speed: f64,
    pub joint_speed: f64,
    pub joint_acceleration: f64,
    pub precision: f64,
    pub motion_type: MotionType,
    pub reference_cs: ReferenceCS,
    pub extrusion_rate: f64,
}

/// Bounded LIFO of settings snapshots.
#[derive(Debug)]
pub struct SettingsStack {
    stack: Vec<Settings>,
    limit: usize,
}

impl Default for SettingsStack {
    fn default() -> Self {
        SettingsStack::new(SETTINGS_STACK_DEPTH)
    }
}

impl SettingsStack {
    pub fn new(limit: usize) -> Self {
        SettingsStack {
            stack: Vec::with_capacity(limit),
            limit,
        }
    }

    /// Saves the snapshot.
    ///
    /// # Panics
    ///
    /// If the stack already holds `limit` snapshots. Pushes that are never popped are a bug in
    /// the program being built, not something to recover from.
    pub fn push(&mut self, settings: Settings) {
        if self.stack.len() >= self.limit {
            panic!(
                "Settings stack overflow: {} pushes without pop, the limit is {}",
                self.stack.len() + 1,
                self.limit
            );
        }
        self.stack.push(settings);
    }

    /// The most recently pushed snapshot, None if the stack is empty.
    pub fn pop(&mut self) -> Option<Settings> {
        self.stack.pop()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
