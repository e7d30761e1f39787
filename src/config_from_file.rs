//! Supports reading the session configuration from YAML file (optional)

extern crate nalgebra as na;

use na::{Quaternion, UnitQuaternion, Vector3};
use serde::Deserialize;
use std::path::Path;

use crate::action::{MotionType, ReferenceCS};
use crate::config::{CursorConfig, InitialState, SessionConfig};
use crate::config_error::ConfigError;

#[derive(Deserialize)]
#[serde(default)]
struct CursorYaml {
    settings_stack_depth: usize,
    digital_outputs: usize,
    analog_outputs: usize,
}

impl Default for CursorYaml {
    fn default() -> Self {
        let d = CursorConfig::default();
        CursorYaml {
            settings_stack_depth: d.settings_stack_depth,
            digital_outputs: d.digital_outputs,
            analog_outputs: d.analog_outputs,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct InitialYaml {
    position: Option<[f64; 3]>,
    /// Quaternion in [x, y, z, w] ordering
    quaternion: Option<[f64; 4]>,
    joints: Option<[f64; 6]>,
    speed: f64,
    acceleration: f64,
    joint_speed: f64,
    joint_acceleration: f64,
    rotation_speed: f64,
    precision: f64,
    motion_type: MotionType,
    reference_cs: ReferenceCS,
}

impl Default for InitialYaml {
    fn default() -> Self {
        let d = InitialState::default();
        InitialYaml {
            position: d.position.map(|p| [p.x, p.y, p.z]),
            quaternion: d.rotation.map(|q| [q.i, q.j, q.k, q.w]),
            joints: d.joints,
            speed: d.speed,
            acceleration: d.acceleration,
            joint_speed: d.joint_speed,
            joint_acceleration: d.joint_acceleration,
            rotation_speed: d.rotation_speed,
            precision: d.precision,
            motion_type: d.motion_type,
            reference_cs: d.reference_cs,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Root {
    cursor: CursorYaml,
    initial: InitialYaml,
}

impl SessionConfig {
    /// Read the session configuration from YAML file. YAML file like this is supported:
    /// ```yaml
    /// cursor:
    ///   settings_stack_depth: 32
    ///   digital_outputs: 16
    ///   analog_outputs: 8
    /// initial:
    ///   position: [300.0, 0.0, 500.0]
    ///   quaternion: [1.0, 0.0, 0.0, 0.0] # [x, y, z, w], pointing down
    ///   joints: [0.0, 0.0, 90.0, 0.0, 90.0, 0.0]
    ///   speed: 20.0
    ///   precision: 5.0
    ///   motion_type: Linear
    ///   reference_cs: World
    /// ```
    /// Every field is optional, missing ones take the defaults. The result is validated.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Same as [`SessionConfig::from_yaml_file`] for the already read content.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let root: Root = serde_saphyr::from_str(contents)
            .map_err(|e| ConfigError::ParseError(format!("{}", e)))?;

        let rotation = match root.initial.quaternion {
            Some([x, y, z, w]) => {
                let q = Quaternion::new(w, x, y, z);
                if !(q.norm() > 1E-9) {
                    return Err(ConfigError::invalid("quaternion", "must not be zero"));
                }
                Some(UnitQuaternion::from_quaternion(q))
            }
            None => None,
        };

        let i = root.initial;
        let config = SessionConfig {
            cursor: CursorConfig {
                settings_stack_depth: root.cursor.settings_stack_depth,
                digital_outputs: root.cursor.digital_outputs,
                analog_outputs: root.cursor.analog_outputs,
            },
            initial: InitialState {
                position: i.position.map(|[x, y, z]| Vector3::new(x, y, z)),
                rotation,
                joints: i.joints,
                speed: i.speed,
                acceleration: i.acceleration,
                joint_speed: i.joint_speed,
                joint_acceleration: i.joint_acceleration,
                rotation_speed: i.rotation_speed,
                precision: i.precision,
                motion_type: i.motion_type,
                reference_cs: i.reference_cs,
            },
        };
        config.validate()?;
        Ok(config)
    }
}
