//! Recoverable failures of applying or issuing actions.
//!
//! All of these leave the cursor state unchanged. Sequencing bugs of the caller (settings stack
//! overflow, releasing up to an id that does not land on a buffer boundary) are not reported
//! through this type: they panic, which also poisons the cursor lock so that every later call
//! returns [`MotionError::Compromised`].

use std::fmt;
use thiserror::Error;

/// Digital or analog output bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoKind {
    Digital,
    Analog,
}

impl fmt::Display for IoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoKind::Digital => write!(f, "digital"),
            IoKind::Analog => write!(f, "analog"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionError {
    #[error("cursor \"{0}\" is not initialized")]
    NotInitialized(String),

    #[error("position is unknown")]
    UnknownPosition,

    #[error("rotation is unknown")]
    UnknownRotation,

    #[error("joint values are unknown")]
    UnknownJoints,

    #[error("position and rotation must be known together")]
    PartialPose,

    #[error("arm angle is unknown")]
    UnknownArmAngle,

    #[error("external axis {0} value is unknown")]
    UnknownExternalAxis(usize),

    #[error("external axis {0} does not exist, must be 1 to 6")]
    ExternalAxisOutOfRange(usize),

    #[error("no tool is attached")]
    NoToolAttached,

    #[error("{kind} pin {pin} is out of range, {len} pins available")]
    PinOutOfRange { pin: usize, len: usize, kind: IoKind },

    #[error("settings stack is empty, nothing to restore")]
    EmptySettingsStack,

    #[error("cursor \"{0}\" is compromised by an earlier fatal error")]
    Compromised(String),
}
