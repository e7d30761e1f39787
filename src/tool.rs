//! Provides the tool that can be attached to the flange of the device.
//! Attaching the tool moves the tracked pose from the flange to the tool center point (TCP),
//! detaching moves it back, so the cursor always reports where the working point is:
//! ```
//! use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
//! use rs_motion_cursor::tool::Tool;
//!
//! // Tool extends 100 mm in the Z direction, envisioning something like a pen
//! let pen = Tool::new("pen", Vector3::new(0.0, 0.0, 100.0), UnitQuaternion::identity());
//!
//! // Flange pointing down (180 degrees about X)
//! let flange = Isometry3::from_parts(
//!     Translation3::new(300.0, 0.0, 500.0),
//!     UnitQuaternion::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI),
//! );
//!
//! let tcp = pen.attach_to(&flange);
//! assert!((tcp.translation.z - 400.0).abs() < 1E-9);
//! ```

extern crate nalgebra as na;

use na::{Isometry3, Translation3};
use std::fmt;

use crate::pose::{Orientation, Position};

/// Defines the fixed tool that can be attached to the flange of the device.
/// The tool moves with the device, providing additional translation and, if needed,
/// rotation between the flange and the tool center point.
#[derive(Clone, PartialEq)]
pub struct Tool {
    /// Name of the tool, as code generators declare it.
    pub name: String,

    /// Transformation from the flange to the tool's TCP.
    pub tcp: Isometry3<f64>,

    /// Weight in kg, zero if not relevant.
    pub weight: f64,

    /// Center of gravity relative to the flange.
    pub center_of_gravity: Position,
}

impl Tool {
    pub fn new(name: &str, tcp_position: Position, tcp_orientation: Orientation) -> Self {
        Tool {
            name: name.to_string(),
            tcp: Isometry3::from_parts(Translation3::from(tcp_position), tcp_orientation),
            weight: 0.0,
            center_of_gravity: Position::zeros(),
        }
    }

    /// Same tool with the mass properties set.
    pub fn with_mass(mut self, weight: f64, center_of_gravity: Position) -> Self {
        self.weight = weight;
        self.center_of_gravity = center_of_gravity;
        self
    }

    pub fn tcp_position(&self) -> Position {
        self.tcp.translation.vector
    }

    pub fn tcp_orientation(&self) -> Orientation {
        self.tcp.rotation
    }

    /// Pose of the TCP when the flange is at the given pose: the TCP offset is rotated into
    /// the world by the flange orientation, and the flange orientation is postmultiplied by the
    /// tool orientation.
    pub fn attach_to(&self, flange: &Isometry3<f64>) -> Isometry3<f64> {
        flange * self.tcp
    }

    /// Exact inverse of [`Tool::attach_to`]: the flange pose for the given TCP pose.
    pub fn detach_from(&self, tcp: &Isometry3<f64>) -> Isometry3<f64> {
        tcp * self.tcp.inverse()
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.tcp.translation.vector;
        let q = self.tcp.rotation;
        write!(
            formatter,
            "Tool \"{}\": tcp [{:.3}, {:.3}, {:.3}], quat {{ w: {:.3}, i: {:.3}, j: {:.3}, k: {:.3} }}, {:.3} kg",
            self.name, t.x, t.y, t.z, q.w, q.i, q.j, q.k, self.weight
        )
    }
}
