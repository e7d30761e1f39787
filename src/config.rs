//! Defines the session configuration: sizes of the cursor resources and the state every cursor
//! of the chain starts from.

extern crate nalgebra as na;

use na::{UnitQuaternion, Vector3};

use crate::action::{MotionType, ReferenceCS};
use crate::config_error::ConfigError;
use crate::pose::{Joints, Orientation, Position};
use crate::settings::SETTINGS_STACK_DEPTH;

/// Sizes of the per-cursor resources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorConfig {
    /// How many settings snapshots may be pushed without popping.
    pub settings_stack_depth: usize,

    /// Number of digital outputs of the device.
    pub digital_outputs: usize,

    /// Number of analog outputs of the device.
    pub analog_outputs: usize,
}

impl Default for CursorConfig {
    fn default() -> Self {
        CursorConfig {
            settings_stack_depth: SETTINGS_STACK_DEPTH,
            digital_outputs: 16,
            analog_outputs: 16,
        }
    }
}

/// State of the device when the session starts, as reported by the device or assumed by the
/// client. Every cursor of the chain must be initialized with it before actions are issued.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialState {
    pub position: Option<Position>,
    pub rotation: Option<Orientation>,
    pub joints: Option<Joints>,

    /// TCP speed, mm/s
    pub speed: f64,
    /// TCP acceleration, mm/s^2
    pub acceleration: f64,
    /// Joint speed, deg/s
    pub joint_speed: f64,
    /// Joint acceleration, deg/s^2
    pub joint_acceleration: f64,
    /// TCP rotation speed, deg/s
    pub rotation_speed: f64,
    /// Blend radius, mm
    pub precision: f64,
    pub motion_type: MotionType,
    pub reference_cs: ReferenceCS,
}

impl Default for InitialState {
    fn default() -> Self {
        InitialState {
            position: Some(Vector3::zeros()),
            rotation: Some(UnitQuaternion::identity()),
            joints: None,
            speed: 20.0,
            acceleration: 0.0,
            joint_speed: 0.0,
            joint_acceleration: 0.0,
            rotation_speed: 0.0,
            precision: 5.0,
            motion_type: MotionType::Linear,
            reference_cs: ReferenceCS::World,
        }
    }
}

/// Complete configuration of a cursor chain.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionConfig {
    pub cursor: CursorConfig,
    pub initial: InitialState,
}

impl SessionConfig {
    /// Check that the values make sense before any cursor is built from them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cursor.settings_stack_depth == 0 {
            return Err(ConfigError::invalid("settings_stack_depth", "must be at least 1"));
        }

        let i = &self.initial;
        let non_negative = [
            ("speed", i.speed),
            ("acceleration", i.acceleration),
            ("joint_speed", i.joint_speed),
            ("joint_acceleration", i.joint_acceleration),
            ("rotation_speed", i.rotation_speed),
            ("precision", i.precision),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::invalid(field, format!("{} is not a non-negative number", value)));
            }
        }

        match (i.position, i.rotation) {
            (Some(_), None) => {
                return Err(ConfigError::invalid("rotation", "must be given together with position"));
            }
            (None, Some(_)) => {
                return Err(ConfigError::invalid("position", "must be given together with rotation"));
            }
            _ => {}
        }
        if let Some(p) = i.position {
            if !p.iter().all(|v| v.is_finite()) {
                return Err(ConfigError::invalid("position", "must be finite"));
            }
        }
        if let Some(j) = i.joints {
            if !j.iter().all(|v| v.is_finite()) {
                return Err(ConfigError::invalid("joints", "must be finite"));
            }
        }
        Ok(())
    }

    /// Convert to string yaml representation (quick viewing, etc).
    pub fn to_yaml(&self) -> String {
        fn list(values: &[f64]) -> String {
            values.iter().map(|v| format!("{:?}", v)).collect::<Vec<_>>().join(", ")
        }

        let i = &self.initial;
        let mut yaml = format!(
            "cursor:\n  \
              settings_stack_depth: {}\n  \
              digital_outputs: {}\n  \
              analog_outputs: {}\n\
            initial:\n",
            self.cursor.settings_stack_depth, self.cursor.digital_outputs, self.cursor.analog_outputs
        );
        if let Some(p) = i.position {
            yaml.push_str(&format!("  position: [{}]\n", list(&[p.x, p.y, p.z])));
        }
        if let Some(q) = i.rotation {
            // [x, y, z, w] ordering
            yaml.push_str(&format!("  quaternion: [{}]\n", list(&[q.i, q.j, q.k, q.w])));
        }
        if let Some(j) = i.joints {
            yaml.push_str(&format!("  joints: [{}]\n", list(&j)));
        }
        yaml.push_str(&format!(
            "  speed: {:?}\n  \
              acceleration: {:?}\n  \
              joint_speed: {:?}\n  \
              joint_acceleration: {:?}\n  \
              rotation_speed: {:?}\n  \
              precision: {:?}\n  \
              motion_type: {:?}\n  \
              reference_cs: {:?}\n",
            i.speed,
            i.acceleration,
            i.joint_speed,
            i.joint_acceleration,
            i.rotation_speed,
            i.precision,
            i.motion_type,
            i.reference_cs
        ));
        yaml
    }
}
