//! Vendor neutral action engine for programming industrial robots and other motion devices.
//!
//! The client describes what the device should do as a sequence of actions: moves, rotations,
//! joint moves, speed and precision changes, tool changes, I/O, process control (extrusion,
//! temperatures) and so on. Every action gets a unique, increasing id and is applied to a
//! [`cursor::Cursor`], a state machine that tracks the absolute state of the device as it will be
//! after that action.
//!
//! # Features
//!
//! - Cartesian (position and orientation) and joint representations of the pose are kept
//!   mutually consistent: an action that changes one of them invalidates the other, and relative
//!   actions that need an unknown representation fail instead of working on stale data.
//! - Relative rotations and translations in the world or in the local (tool) frame.
//! - Tools can be attached and detached, moving the tracked point between flange and TCP.
//! - Settings can be saved and restored with push/pop, up to a bounded depth.
//! - Failed actions are logged and discarded; they never leave the state partially changed.
//! - [`chain::CursorChain`] replays the same actions through three cursors: virtual (applied
//!   immediately), write (applied when released for compiling) and motion (applied when the
//!   device reports execution).
//!
//! Logging is done with `tracing`; the library never installs a subscriber.
//!
//! ## Example
//!
//! ```
//! use rs_motion_cursor::action::{ActionKind, ReferenceCS};
//! use rs_motion_cursor::chain::CursorChain;
//! use rs_motion_cursor::config::SessionConfig;
//! use nalgebra::Vector3;
//!
//! let chain = CursorChain::with_config(&SessionConfig::default()).unwrap();
//! chain.issue(ActionKind::translate(10.0, 0.0, 0.0)).unwrap();
//! chain.issue(ActionKind::rotate(Vector3::z(), 90.0)).unwrap();
//! chain.issue(ActionKind::ReferenceFrame(ReferenceCS::Local)).unwrap();
//! chain.issue(ActionKind::translate(0.0, 10.0, 0.0)).unwrap();
//!
//! let position = chain.virtual_cursor().state().unwrap().position().unwrap();
//! assert!(position.norm() < 1E-9);
//! ```

pub mod pose;

pub mod action;

pub mod action_buffer;

pub mod settings;

pub mod tool;

pub mod motion_error;

pub mod config;
pub mod config_error;

#[cfg(feature = "allow_filesystem")]
mod config_from_file;

pub mod cursor_state;

pub mod cursor;

pub mod chain;

pub mod compiler;

#[path = "utils/utils.rs"]
pub mod utils;

#[cfg(test)]
mod tests;
