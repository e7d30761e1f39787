//! Helper functions

use crate::cursor_state::CursorState;
use crate::pose::{Joints, Orientation, Pose, Position};

/// Vector as [x, y, z] with three decimals.
pub fn format_position(v: &Position) -> String {
    format!("[{:.3}, {:.3}, {:.3}]", v.x, v.y, v.z)
}

/// Orientation as angle around axis, degrees.
pub fn format_orientation(q: &Orientation) -> String {
    match q.axis_angle() {
        Some((axis, angle)) => format!(
            "{:.3} deg around {}",
            angle.to_degrees(),
            format_position(&axis)
        ),
        None => "0.000 deg".to_string(),
    }
}

pub fn format_joints(joints: &Joints) -> String {
    let mut row_str = String::new();
    for joint in joints {
        row_str.push_str(&format!("{:.2} ", joint));
    }
    format!("[{}]", row_str.trim_end())
}

pub fn format_pose(pose: &Pose) -> String {
    match pose {
        Pose::Unknown => "unknown".to_string(),
        Pose::Cartesian { position, rotation } => format!(
            "position {}, rotation {}",
            format_position(position),
            format_orientation(rotation)
        ),
        Pose::Joint { joints } => format!("joints {}", format_joints(joints)),
        Pose::Synced { position, rotation, joints } => format!(
            "position {}, rotation {}, joints {}",
            format_position(position),
            format_orientation(rotation),
            format_joints(joints)
        ),
    }
}

/// Print the cursor state in a readable form.
pub fn dump_state(state: &CursorState) {
    println!("Pose: {}", format_pose(&state.pose));
    println!(
        "Speed {:.2} mm/s, acceleration {:.2} mm/s^2, precision {:.2} mm, {:?}, {:?}",
        state.speed, state.acceleration, state.precision, state.motion_type, state.reference_cs
    );
    match &state.tool {
        Some(tool) => println!("Tool: {:?}", tool),
        None => println!("No tool"),
    }
    let on: Vec<&str> = state
        .digital_outputs
        .iter()
        .zip(&state.digital_names)
        .filter(|(on, _)| **on)
        .map(|(_, name)| name.as_str())
        .collect();
    println!("Digital outputs on: [{}]", on.join(", "));
    if state.is_extruding || state.extruded_length > 0.0 {
        println!(
            "Extruding: {}, rate {:.3}, extruded {:.3} mm",
            state.is_extruding, state.extrusion_rate, state.extruded_length
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{UnitQuaternion, Vector3};

    #[test]
    fn test_format_pose() {
        assert_eq!(format_pose(&Pose::Unknown), "unknown");
        let pose = Pose::cartesian(
            Vector3::new(1.0, 2.0, 3.0),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 90.0_f64.to_radians()),
        );
        assert_eq!(
            format_pose(&pose),
            "position [1.000, 2.000, 3.000], rotation 90.000 deg around [1.000, 0.000, 0.000]"
        );
        assert_eq!(
            format_pose(&Pose::Joint { joints: [0.0, 10.0, 20.0, 30.0, 40.0, 50.5] }),
            "joints [0.00 10.00 20.00 30.00 40.00 50.50]"
        );
    }

    #[test]
    fn test_identity_orientation() {
        assert_eq!(format_orientation(&UnitQuaternion::identity()), "0.000 deg");
    }
}
