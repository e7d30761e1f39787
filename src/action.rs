//! Actions are the declarative requests issued to the device: move, rotate, change speed,
//! attach a tool, write an output and the like. An action never changes after construction and
//! the same instance (shared as `Arc<Action>`) travels through every cursor of the chain.

extern crate nalgebra as na;

use bitflags::bitflags;
use na::{Unit, UnitQuaternion, Vector3};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::pose::{Joints, Orientation, Position};
use crate::tool::Tool;
use crate::utils::{format_joints, format_orientation as rotation, format_position as vector};

/// Identifier of an action, strictly increasing in the order of creation.
pub type ActionId = u64;

/// Hands out action ids. Owned by the session so that sequences are reproducible; the first
/// id handed out is 1.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        IdGenerator { last: AtomicU64::new(0) }
    }

    /// Next id. Safe to call from multiple threads, ids are never repeated.
    pub fn next_id(&self) -> ActionId {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The most recently handed out id, 0 if none yet.
    pub fn last_id(&self) -> ActionId {
        self.last.load(Ordering::SeqCst)
    }
}

/// Interpolation used for pose changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum MotionType {
    /// TCP moves on a straight line.
    Linear,
    /// Joints are interpolated, TCP path is not a line.
    Joint,
}

/// Frame in which relative deltas are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ReferenceCS {
    /// Fixed world frame. Rotations are premultiplied.
    World,
    /// Current TCP frame. Rotations are postmultiplied, translations follow the TCP orientation.
    Local,
}

/// Heated parts of a fabrication device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DevicePart {
    Extruder,
    Bed,
    Chamber,
}

bitflags! {
    /// What part of the cursor state an action touches.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ActionFlags: u32 {
        /// Changes the TCP pose or joint values.
        const MOTION =         0b0000_0001;

        /// Changes speeds, precision, motion type or reference frame.
        const SETTINGS =       0b0000_0010;

        /// Defines, attaches or detaches a tool.
        const TOOLING =        0b0000_0100;

        /// Writes digital or analog outputs.
        const IO =             0b0000_1000;

        /// Changes temperatures, extrusion or device start-up state.
        const PROCESS =        0b0001_0000;

        /// Arm angle and external axes.
        const EXTERNAL_AXES =  0b0010_0000;

        /// Waits, messages, comments and custom code. No state change.
        const META =           0b0100_0000;
    }
}

/// The requested state change.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionKind {
    Translation { delta: Position, relative: bool },
    Rotation { delta: Orientation, relative: bool },
    Transformation {
        translation: Position,
        rotation: Orientation,
        relative: bool,
        /// If set, the translation is interpreted in the orientation before the rotation.
        translation_first: bool,
    },
    Axes { joints: Joints, relative: bool },

    Speed { value: f64, relative: bool },
    Acceleration { value: f64, relative: bool },
    RotationSpeed { value: f64, relative: bool },
    JointSpeed { value: f64, relative: bool },
    JointAcceleration { value: f64, relative: bool },
    Precision { value: f64, relative: bool },
    MotionMode(MotionType),
    ReferenceFrame(ReferenceCS),
    PushPop { push: bool },

    Wait { millis: u64 },
    Message(String),
    Comment(String),
    CustomCode { statement: String, is_declaration: bool },

    DefineTool(Arc<Tool>),
    Attach(Arc<Tool>),
    Detach,

    IODigital { pin: usize, on: bool },
    IOAnalog { pin: usize, value: f64 },

    Temperature { part: DevicePart, value: f64, relative: bool, wait: bool },
    Extrusion { on: bool },
    ExtrusionRate { rate: f64, relative: bool },
    Initialization { start: bool },

    ArmAngle { value: f64, relative: bool },
    ExternalAxis { axis: usize, value: f64, relative: bool },
}

impl ActionKind {
    /// Relative move by the given vector.
    pub fn translate(x: f64, y: f64, z: f64) -> Self {
        ActionKind::Translation { delta: Vector3::new(x, y, z), relative: true }
    }

    /// Absolute move to the given position.
    pub fn translate_to(x: f64, y: f64, z: f64) -> Self {
        ActionKind::Translation { delta: Vector3::new(x, y, z), relative: false }
    }

    /// Relative rotation about the axis, angle in degrees.
    pub fn rotate(axis: Vector3<f64>, degrees: f64) -> Self {
        ActionKind::Rotation {
            delta: UnitQuaternion::from_axis_angle(&Unit::new_normalize(axis), degrees.to_radians()),
            relative: true,
        }
    }

    /// Absolute orientation.
    pub fn rotate_to(rotation: Orientation) -> Self {
        ActionKind::Rotation { delta: rotation, relative: false }
    }

    /// Relative joint move, degrees.
    pub fn axes(joints: Joints) -> Self {
        ActionKind::Axes { joints, relative: true }
    }

    /// Absolute joint move, degrees.
    pub fn axes_to(joints: Joints) -> Self {
        ActionKind::Axes { joints, relative: false }
    }

    pub fn category(&self) -> ActionFlags {
        match self {
            ActionKind::Translation { .. }
            | ActionKind::Rotation { .. }
            | ActionKind::Transformation { .. }
            | ActionKind::Axes { .. } => ActionFlags::MOTION,

            ActionKind::Speed { .. }
            | ActionKind::Acceleration { .. }
            | ActionKind::RotationSpeed { .. }
            | ActionKind::JointSpeed { .. }
            | ActionKind::JointAcceleration { .. }
            | ActionKind::Precision { .. }
            | ActionKind::MotionMode(_)
            | ActionKind::ReferenceFrame(_)
            | ActionKind::PushPop { .. } => ActionFlags::SETTINGS,

            ActionKind::DefineTool(_) | ActionKind::Attach(_) | ActionKind::Detach => {
                ActionFlags::TOOLING
            }

            ActionKind::IODigital { .. } | ActionKind::IOAnalog { .. } => ActionFlags::IO,

            ActionKind::Temperature { .. }
            | ActionKind::Extrusion { .. }
            | ActionKind::ExtrusionRate { .. }
            | ActionKind::Initialization { .. } => ActionFlags::PROCESS,

            ActionKind::ArmAngle { .. } | ActionKind::ExternalAxis { .. } => {
                ActionFlags::EXTERNAL_AXES
            }

            ActionKind::Wait { .. }
            | ActionKind::Message(_)
            | ActionKind::Comment(_)
            | ActionKind::CustomCode { .. } => ActionFlags::META,
        }
    }
}

/// Identified, immutable request to change the device state.
#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    pub id: ActionId,
    pub kind: ActionKind,
}

impl Action {
    pub fn new(id: ActionId, kind: ActionKind) -> Self {
        Action { id, kind }
    }

    /// New shared action with the next id of the generator.
    pub fn issue(ids: &IdGenerator, kind: ActionKind) -> Arc<Self> {
        Arc::new(Action::new(ids.next_id(), kind))
    }

    pub fn category(&self) -> ActionFlags {
        self.kind.category()
    }
}

fn by_or_to(relative: bool) -> &'static str {
    if relative { "by" } else { "to" }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Translation { delta, relative: true } => {
                write!(f, "Move {:.3} mm along {}", delta.norm(), vector(delta))
            }
            ActionKind::Translation { delta, relative: false } => {
                write!(f, "Move to {} mm", vector(delta))
            }
            ActionKind::Rotation { delta, relative: true } => write!(f, "Rotate {}", rotation(delta)),
            ActionKind::Rotation { delta, relative: false } => {
                write!(f, "Rotate to {}", rotation(delta))
            }
            ActionKind::Transformation { translation, rotation: r, relative, translation_first } => {
                let order = if *translation_first { "translate, rotate" } else { "rotate, translate" };
                write!(
                    f,
                    "Transform {} {} and {} ({})",
                    by_or_to(*relative),
                    vector(translation),
                    rotation(r),
                    order
                )
            }
            ActionKind::Axes { joints, relative } => {
                write!(f, "Axes {} {} deg", by_or_to(*relative), format_joints(joints))
            }
            ActionKind::Speed { value, relative } => {
                write!(f, "Speed {} {:.2} mm/s", by_or_to(*relative), value)
            }
            ActionKind::Acceleration { value, relative } => {
                write!(f, "Acceleration {} {:.2} mm/s^2", by_or_to(*relative), value)
            }
            ActionKind::RotationSpeed { value, relative } => {
                write!(f, "Rotation speed {} {:.2} deg/s", by_or_to(*relative), value)
            }
            ActionKind::JointSpeed { value, relative } => {
                write!(f, "Joint speed {} {:.2} deg/s", by_or_to(*relative), value)
            }
            ActionKind::JointAcceleration { value, relative } => {
                write!(f, "Joint acceleration {} {:.2} deg/s^2", by_or_to(*relative), value)
            }
            ActionKind::Precision { value, relative } => {
                write!(f, "Precision {} {:.2} mm", by_or_to(*relative), value)
            }
            ActionKind::MotionMode(m) => write!(f, "Motion mode {:?}", m),
            ActionKind::ReferenceFrame(r) => write!(f, "Reference frame {:?}", r),
            ActionKind::PushPop { push: true } => write!(f, "Push settings"),
            ActionKind::PushPop { push: false } => write!(f, "Pop settings"),
            ActionKind::Wait { millis } => write!(f, "Wait {} ms", millis),
            ActionKind::Message(text) => write!(f, "Message \"{}\"", text),
            ActionKind::Comment(text) => write!(f, "Comment \"{}\"", text),
            ActionKind::CustomCode { statement, is_declaration } => {
                let what = if *is_declaration { "declaration" } else { "statement" };
                write!(f, "Custom {} \"{}\"", what, statement)
            }
            ActionKind::DefineTool(tool) => write!(f, "Define tool \"{}\"", tool.name),
            ActionKind::Attach(tool) => write!(f, "Attach tool \"{}\"", tool.name),
            ActionKind::Detach => write!(f, "Detach tool"),
            ActionKind::IODigital { pin, on } => {
                write!(f, "Digital output {} {}", pin, if *on { "on" } else { "off" })
            }
            ActionKind::IOAnalog { pin, value } => write!(f, "Analog output {} to {:.3}", pin, value),
            ActionKind::Temperature { part, value, relative, wait } => write!(
                f,
                "{:?} temperature {} {:.1} C{}",
                part,
                by_or_to(*relative),
                value,
                if *wait { " and wait" } else { "" }
            ),
            ActionKind::Extrusion { on } => {
                write!(f, "Extrusion {}", if *on { "on" } else { "off" })
            }
            ActionKind::ExtrusionRate { rate, relative } => {
                write!(f, "Extrusion rate {} {:.3} mm/mm", by_or_to(*relative), rate)
            }
            ActionKind::Initialization { start: true } => write!(f, "Start up device"),
            ActionKind::Initialization { start: false } => write!(f, "Shut down device"),
            ActionKind::ArmAngle { value, relative } => {
                write!(f, "Arm angle {} {:.2} deg", by_or_to(*relative), value)
            }
            ActionKind::ExternalAxis { axis, value, relative } => {
                write!(f, "External axis {} {} {:.3}", axis, by_or_to(*relative), value)
            }
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.kind)
    }
}
