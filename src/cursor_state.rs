//! State tracked by a cursor and the rules applying each kind of action to it.
//!
//! Every rule checks its preconditions before touching anything, so a failed action leaves the
//! state exactly as it was.

extern crate nalgebra as na;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use na::Isometry3;
use tracing::warn;

use crate::action::{Action, ActionFlags, ActionKind, DevicePart, MotionType, ReferenceCS};
use crate::config::{CursorConfig, InitialState};
use crate::motion_error::{IoKind, MotionError};
use crate::pose::{Joints, Orientation, Pose, Position};
use crate::settings::{Settings, SettingsStack};
use crate::tool::Tool;

/// Number of external axes a device may have.
pub const EXTERNAL_AXES: usize = 6;

/// Absolute state of the device as it will be after the actions applied so far.
#[derive(Clone, Debug)]
pub struct CursorState {
    pub pose: Pose,
    /// Pose before the last pose change.
    pub prev_pose: Pose,

    pub speed: f64,
    pub acceleration: f64,
    pub rotation_speed: f64,
    pub joint_speed: f64,
    pub joint_acceleration: f64,
    pub precision: f64,
    pub motion_type: MotionType,
    pub reference_cs: ReferenceCS,

    /// Currently attached tool, the pose is that of its TCP.
    pub tool: Option<Arc<Tool>>,
    /// Tools defined so far, by name.
    pub available_tools: BTreeMap<String, Arc<Tool>>,

    pub digital_outputs: Vec<bool>,
    pub digital_names: Vec<String>,
    pub analog_outputs: Vec<f64>,
    pub analog_names: Vec<String>,

    pub is_extruding: bool,
    /// Length of filament per unit of travelled distance.
    pub extrusion_rate: f64,
    pub extruded_length: f64,
    pub prev_extruded_length: f64,
    pub temperatures: HashMap<DevicePart, f64>,
    /// Set by start-up, cleared by shut-down.
    pub is_running: bool,

    /// Elbow angle of 7-axis arms, None until set.
    pub arm_angle: Option<f64>,
    pub external_axes: [Option<f64>; EXTERNAL_AXES],

    pub last_action: Option<Arc<Action>>,
}

impl CursorState {
    pub fn new(config: &CursorConfig) -> Self {
        let initial = InitialState::default();
        CursorState {
            pose: Pose::Unknown,
            prev_pose: Pose::Unknown,
            speed: initial.speed,
            acceleration: initial.acceleration,
            rotation_speed: initial.rotation_speed,
            joint_speed: initial.joint_speed,
            joint_acceleration: initial.joint_acceleration,
            precision: initial.precision,
            motion_type: initial.motion_type,
            reference_cs: initial.reference_cs,
            tool: None,
            available_tools: BTreeMap::new(),
            digital_outputs: vec![false; config.digital_outputs],
            digital_names: (0..config.digital_outputs).map(|i| format!("D{}", i)).collect(),
            analog_outputs: vec![0.0; config.analog_outputs],
            analog_names: (0..config.analog_outputs).map(|i| format!("A{}", i)).collect(),
            is_extruding: false,
            extrusion_rate: 0.0,
            extruded_length: 0.0,
            prev_extruded_length: 0.0,
            temperatures: HashMap::new(),
            is_running: false,
            arm_angle: None,
            external_axes: [None; EXTERNAL_AXES],
            last_action: None,
        }
    }

    /// Take the starting state. Nothing changes if the initial pose is refused.
    pub(crate) fn initialize(&mut self, initial: &InitialState) -> Result<(), MotionError> {
        self.pose = Pose::from_parts(initial.position, initial.rotation, initial.joints)?;
        self.prev_pose = self.pose;
        self.speed = initial.speed;
        self.acceleration = initial.acceleration;
        self.joint_speed = initial.joint_speed;
        self.joint_acceleration = initial.joint_acceleration;
        self.rotation_speed = initial.rotation_speed;
        self.precision = initial.precision;
        self.motion_type = initial.motion_type;
        self.reference_cs = initial.reference_cs;
        Ok(())
    }

    pub fn position(&self) -> Option<Position> {
        self.pose.position()
    }

    pub fn rotation(&self) -> Option<Orientation> {
        self.pose.rotation()
    }

    pub fn joints(&self) -> Option<Joints> {
        self.pose.joints()
    }

    /// Snapshot of the settings saved by a push.
    pub fn settings(&self) -> Settings {
        Settings {
            speed: self.speed,
            acceleration: self.acceleration,
            rotation_speed: self.rotation_speed,
            joint_speed: self.joint_speed,
            joint_acceleration: self.joint_acceleration,
            precision: self.precision,
            motion_type: self.motion_type,
            reference_cs: self.reference_cs,
            extrusion_rate: self.extrusion_rate,
        }
    }

    fn restore(&mut self, settings: Settings) {
        self.speed = settings.speed;
        self.acceleration = settings.acceleration;
        self.rotation_speed = settings.rotation_speed;
        self.joint_speed = settings.joint_speed;
        self.joint_acceleration = settings.joint_acceleration;
        self.precision = settings.precision;
        self.motion_type = settings.motion_type;
        self.reference_cs = settings.reference_cs;
        self.extrusion_rate = settings.extrusion_rate;
    }

    pub(crate) fn set_io_name(&mut self, name: &str, pin: usize, kind: IoKind) -> Result<(), MotionError> {
        let names = match kind {
            IoKind::Digital => &mut self.digital_names,
            IoKind::Analog => &mut self.analog_names,
        };
        let len = names.len();
        let slot = names.get_mut(pin).ok_or(MotionError::PinOutOfRange { pin, len, kind })?;
        *slot = name.to_string();
        Ok(())
    }

    /// Apply the action. On failure nothing is changed.
    pub(crate) fn apply(&mut self, action: &Arc<Action>, stack: &mut SettingsStack) -> Result<(), MotionError> {
        match &action.kind {
            ActionKind::Translation { delta, relative } => self.apply_translation(delta, *relative),
            ActionKind::Rotation { delta, relative } => self.apply_rotation(delta, *relative),
            ActionKind::Transformation { translation, rotation, relative, translation_first } => {
                self.apply_transformation(translation, rotation, *relative, *translation_first)
            }
            ActionKind::Axes { joints, relative } => self.apply_axes(joints, *relative),

            ActionKind::Speed { value, relative } => {
                self.speed = non_negative(self.speed, *value, *relative, "Speed");
                Ok(())
            }
            ActionKind::Acceleration { value, relative } => {
                self.acceleration = non_negative(self.acceleration, *value, *relative, "Acceleration");
                Ok(())
            }
            ActionKind::RotationSpeed { value, relative } => {
                self.rotation_speed = non_negative(self.rotation_speed, *value, *relative, "Rotation speed");
                Ok(())
            }
            ActionKind::JointSpeed { value, relative } => {
                self.joint_speed = non_negative(self.joint_speed, *value, *relative, "Joint speed");
                Ok(())
            }
            ActionKind::JointAcceleration { value, relative } => {
                self.joint_acceleration =
                    non_negative(self.joint_acceleration, *value, *relative, "Joint acceleration");
                Ok(())
            }
            ActionKind::Precision { value, relative } => {
                self.precision = non_negative(self.precision, *value, *relative, "Precision");
                Ok(())
            }
            ActionKind::MotionMode(motion_type) => {
                self.motion_type = *motion_type;
                Ok(())
            }
            ActionKind::ReferenceFrame(reference_cs) => {
                self.reference_cs = *reference_cs;
                Ok(())
            }
            ActionKind::PushPop { push: true } => {
                stack.push(self.settings());
                Ok(())
            }
            ActionKind::PushPop { push: false } => {
                let settings = stack.pop().ok_or(MotionError::EmptySettingsStack)?;
                self.restore(settings);
                Ok(())
            }

            ActionKind::Wait { .. }
            | ActionKind::Message(_)
            | ActionKind::Comment(_)
            | ActionKind::CustomCode { .. } => Ok(()),

            ActionKind::DefineTool(tool) => {
                self.define_tool(tool);
                Ok(())
            }
            ActionKind::Attach(tool) => self.apply_attach(tool),
            ActionKind::Detach => self.apply_detach(),

            ActionKind::IODigital { pin, on } => {
                let len = self.digital_outputs.len();
                let output = self.digital_outputs.get_mut(*pin).ok_or(MotionError::PinOutOfRange {
                    pin: *pin,
                    len,
                    kind: IoKind::Digital,
                })?;
                *output = *on;
                Ok(())
            }
            ActionKind::IOAnalog { pin, value } => {
                let len = self.analog_outputs.len();
                let output = self.analog_outputs.get_mut(*pin).ok_or(MotionError::PinOutOfRange {
                    pin: *pin,
                    len,
                    kind: IoKind::Analog,
                })?;
                *output = *value;
                Ok(())
            }

            ActionKind::Temperature { part, value, relative, .. } => {
                let current = self.temperatures.get(part).copied().unwrap_or(0.0);
                let target = if *relative { current + value } else { *value };
                self.temperatures.insert(*part, target);
                Ok(())
            }
            ActionKind::Extrusion { on } => {
                self.is_extruding = *on;
                Ok(())
            }
            ActionKind::ExtrusionRate { rate, relative } => {
                self.extrusion_rate = non_negative(self.extrusion_rate, *rate, *relative, "Extrusion rate");
                Ok(())
            }
            ActionKind::Initialization { start } => {
                self.is_running = *start;
                Ok(())
            }

            ActionKind::ArmAngle { value, relative } => {
                self.arm_angle = Some(if *relative {
                    self.arm_angle.ok_or(MotionError::UnknownArmAngle)? + value
                } else {
                    *value
                });
                Ok(())
            }
            ActionKind::ExternalAxis { axis, value, relative } => {
                self.apply_external_axis(*axis, *value, *relative)
            }
        }?;

        if action.category().contains(ActionFlags::MOTION) {
            self.compute_extruded_length();
        }
        self.last_action = Some(action.clone());
        Ok(())
    }

    fn set_pose(&mut self, pose: Pose) {
        self.prev_pose = self.pose;
        self.pose = pose;
    }

    /// Replace the Cartesian pose keeping joints if known: used by tool changes that move the
    /// tracked point but not the device.
    fn shift_tcp(&mut self, tcp: Isometry3<f64>) {
        let pose = match self.pose.joints() {
            Some(joints) => Pose::Synced {
                position: tcp.translation.vector,
                rotation: tcp.rotation,
                joints,
            },
            None => Pose::from_isometry(&tcp),
        };
        self.set_pose(pose);
    }

    fn apply_translation(&mut self, delta: &Position, relative: bool) -> Result<(), MotionError> {
        let position = if relative {
            let position = self.position().ok_or(MotionError::UnknownPosition)?;
            let rotation = self.rotation().ok_or(MotionError::UnknownRotation)?;
            match self.reference_cs {
                ReferenceCS::World => position + delta,
                ReferenceCS::Local => position + rotation * delta,
            }
        } else {
            *delta
        };
        let rotation = self.rotation().ok_or(MotionError::UnknownRotation)?;
        self.set_pose(Pose::cartesian(position, rotation));
        Ok(())
    }

    fn apply_rotation(&mut self, delta: &Orientation, relative: bool) -> Result<(), MotionError> {
        let position = self.position().ok_or(MotionError::UnknownPosition)?;
        let rotation = if relative {
            let current = self.rotation().ok_or(MotionError::UnknownRotation)?;
            match self.reference_cs {
                ReferenceCS::World => delta * current,
                ReferenceCS::Local => current * delta,
            }
        } else {
            *delta
        };
        self.set_pose(Pose::cartesian(position, rotation));
        Ok(())
    }

    fn apply_transformation(
        &mut self,
        translation: &Position,
        rotation: &Orientation,
        relative: bool,
        translation_first: bool,
    ) -> Result<(), MotionError> {
        let pose = if relative {
            let p = self.position().ok_or(MotionError::UnknownPosition)?;
            let r = self.rotation().ok_or(MotionError::UnknownRotation)?;
            match self.reference_cs {
                // Translation is world-absolute, order does not matter
                ReferenceCS::World => Pose::cartesian(p + translation, rotation * r),
                ReferenceCS::Local if translation_first => {
                    Pose::cartesian(p + r * translation, r * rotation)
                }
                ReferenceCS::Local => {
                    let rotated = r * rotation;
                    Pose::cartesian(p + rotated * translation, rotated)
                }
            }
        } else {
            Pose::cartesian(*translation, *rotation)
        };
        self.set_pose(pose);
        Ok(())
    }

    fn apply_axes(&mut self, delta: &Joints, relative: bool) -> Result<(), MotionError> {
        let joints = if relative {
            let current = self.joints().ok_or(MotionError::UnknownJoints)?;
            std::array::from_fn(|i| current[i] + delta[i])
        } else {
            *delta
        };
        self.set_pose(Pose::Joint { joints });
        Ok(())
    }

    fn define_tool(&mut self, tool: &Arc<Tool>) {
        if let Some(previous) = self.available_tools.insert(tool.name.clone(), tool.clone()) {
            if previous != *tool {
                warn!("Tool \"{}\" redefined", tool.name);
            }
        }
    }

    fn apply_attach(&mut self, tool: &Arc<Tool>) -> Result<(), MotionError> {
        let mut flange = self.pose.isometry().ok_or(MotionError::UnknownPosition)?;
        if let Some(attached) = &self.tool {
            // Back to the flange before the new tool goes on
            flange = attached.detach_from(&flange);
        }
        self.shift_tcp(tool.attach_to(&flange));
        if !self.available_tools.contains_key(&tool.name) {
            self.define_tool(tool);
        }
        self.tool = Some(tool.clone());
        Ok(())
    }

    fn apply_detach(&mut self) -> Result<(), MotionError> {
        let tool = self.tool.clone().ok_or(MotionError::NoToolAttached)?;
        let tcp = self.pose.isometry().ok_or(MotionError::UnknownPosition)?;
        self.shift_tcp(tool.detach_from(&tcp));
        self.tool = None;
        Ok(())
    }

    fn apply_external_axis(&mut self, axis: usize, value: f64, relative: bool) -> Result<(), MotionError> {
        if !(1..=EXTERNAL_AXES).contains(&axis) {
            return Err(MotionError::ExternalAxisOutOfRange(axis));
        }
        let slot = &mut self.external_axes[axis - 1];
        *slot = Some(if relative {
            slot.ok_or(MotionError::UnknownExternalAxis(axis))? + value
        } else {
            value
        });
        Ok(())
    }

    /// Accumulate filament used by the last move, if extruding and both ends are known.
    fn compute_extruded_length(&mut self) {
        self.prev_extruded_length = self.extruded_length;
        if !self.is_extruding {
            return;
        }
        if let (Some(from), Some(to)) = (self.prev_pose.position(), self.pose.position()) {
            self.extruded_length += self.extrusion_rate * (to - from).norm();
        }
    }
}

/// Set or increment the value that cannot go below zero.
fn non_negative(current: f64, value: f64, relative: bool, what: &str) -> f64 {
    let target = if relative { current + value } else { value };
    if target < 0.0 {
        warn!("{} cannot be negative ({}), set to zero", what, target);
        0.0
    } else {
        target
    }
}
