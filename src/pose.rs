//! Pose of the device as tracked by a cursor.
//!
//! No forward or inverse kinematics is computed anywhere in this crate, so a cursor can only
//! know the Cartesian pose of the TCP or the joint values of the arm, whichever was written
//! last. Both are known together only right after initialization, when the device reported them.

extern crate nalgebra as na;

use na::{Isometry3, Translation3, UnitQuaternion, Vector3};

use crate::motion_error::MotionError;

/// Values of the six robot joints, in degrees as issued by the client.
pub type Joints = [f64; 6];

/// Position of the TCP in world coordinates
pub type Position = Vector3<f64>;

/// Orientation of the TCP in world coordinates
/// ```
/// extern crate nalgebra as na;
/// use na::{UnitQuaternion, Vector3};
///
/// // 90 degrees about Z
/// let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 90.0_f64.to_radians());
/// let rotated = rotation * Vector3::new(1.0, 0.0, 0.0);
/// assert!((rotated - Vector3::new(0.0, 1.0, 0.0)).norm() < 1E-9);
/// ```
pub type Orientation = UnitQuaternion<f64>;

/// Pose of the cursor. Writing the Cartesian pose makes joints unknown and writing joints makes
/// the Cartesian pose unknown, as nothing here relates one to another.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Pose {
    /// Nothing is known (uninitialized cursor).
    #[default]
    Unknown,

    /// Position and orientation of the TCP are known, joints are not.
    Cartesian {
        position: Position,
        rotation: Orientation,
    },

    /// Joint values are known, the Cartesian pose is not.
    Joint { joints: Joints },

    /// Both representations are known. Only produced by initialization.
    Synced {
        position: Position,
        rotation: Orientation,
        joints: Joints,
    },
}

impl Pose {
    /// Build the pose from whatever the device reported. Position without rotation (or the other
    /// way around) is not a Cartesian pose and is refused with [`MotionError::PartialPose`].
    pub fn from_parts(
        position: Option<Position>,
        rotation: Option<Orientation>,
        joints: Option<Joints>,
    ) -> Result<Self, MotionError> {
        Ok(match (position, rotation, joints) {
            (Some(position), Some(rotation), Some(joints)) => Pose::Synced {
                position,
                rotation,
                joints,
            },
            (Some(position), Some(rotation), None) => Pose::Cartesian { position, rotation },
            (None, None, Some(joints)) => Pose::Joint { joints },
            (None, None, None) => Pose::Unknown,
            _ => return Err(MotionError::PartialPose),
        })
    }

    pub fn cartesian(position: Position, rotation: Orientation) -> Self {
        Pose::Cartesian { position, rotation }
    }

    pub fn from_isometry(isometry: &Isometry3<f64>) -> Self {
        Pose::Cartesian {
            position: isometry.translation.vector,
            rotation: isometry.rotation,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            Pose::Cartesian { position, .. } | Pose::Synced { position, .. } => Some(*position),
            _ => None,
        }
    }

    pub fn rotation(&self) -> Option<Orientation> {
        match self {
            Pose::Cartesian { rotation, .. } | Pose::Synced { rotation, .. } => Some(*rotation),
            _ => None,
        }
    }

    pub fn joints(&self) -> Option<Joints> {
        match self {
            Pose::Joint { joints } | Pose::Synced { joints, .. } => Some(*joints),
            _ => None,
        }
    }

    /// Cartesian pose as a rigid transform, if known.
    pub fn isometry(&self) -> Option<Isometry3<f64>> {
        Some(Isometry3::from_parts(
            Translation3::from(self.position()?),
            self.rotation()?,
        ))
    }
}
