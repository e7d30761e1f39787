#[cfg(test)]
mod tests {
    use nalgebra::{UnitQuaternion, Vector3};
    use std::f64::consts::PI;

    use crate::action::{ActionKind, MotionType, ReferenceCS};
    use crate::pose::Pose;
    use crate::tests::test_utils::{assert_near, default_chain};

    #[test]
    fn test_square_in_local_frame_returns_home() {
        let chain = default_chain().expect("Chain");
        chain.issue(ActionKind::translate(10.0, 0.0, 0.0)).expect("World move");
        chain.issue(ActionKind::rotate(Vector3::z(), 90.0)).expect("World rotation");
        chain.issue(ActionKind::ReferenceFrame(ReferenceCS::Local)).expect("Frame");
        chain.issue(ActionKind::translate(0.0, 10.0, 0.0)).expect("Local move");

        // Local +Y after 90 deg around Z is world -X
        let state = chain.virtual_cursor().state().expect("State");
        assert_near(state.position(), [0.0, 0.0, 0.0], 1E-9);
        let expected = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), PI / 2.0);
        assert!(state.rotation().expect("Rotation").angle_to(&expected) < 1E-9);
    }

    #[test]
    fn test_world_and_local_rotation_differ() {
        let tilt = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), PI / 4.0);
        let turn = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), PI / 3.0);

        let rotated = |frame: ReferenceCS| {
            let chain = default_chain().expect("Chain");
            chain.issue(ActionKind::rotate_to(tilt)).expect("Absolute");
            chain.issue(ActionKind::ReferenceFrame(frame)).expect("Frame");
            chain.issue(ActionKind::rotate(Vector3::z(), 60.0)).expect("Relative");
            chain.virtual_cursor().state().expect("State").rotation().expect("Known")
        };

        let world = rotated(ReferenceCS::World);
        let local = rotated(ReferenceCS::Local);
        assert!(world.angle_to(&(turn * tilt)) < 1E-9);
        assert!(local.angle_to(&(tilt * turn)) < 1E-9);
        assert!(world.angle_to(&local) > 1E-3);
    }

    #[test]
    fn test_representations_are_exclusive() {
        let chain = default_chain().expect("Chain");
        chain.issue(ActionKind::axes_to([0.0, 10.0, 20.0, 0.0, 30.0, 0.0])).expect("Joints");
        let state = chain.virtual_cursor().state().expect("State");
        assert!(state.position().is_none() && state.rotation().is_none());

        assert!(chain.issue(ActionKind::translate(1.0, 0.0, 0.0)).is_err());
        assert!(chain.issue(ActionKind::rotate(Vector3::x(), 5.0)).is_err());
        chain.issue(ActionKind::axes([0.0, 0.0, 0.0, 0.0, 0.0, 5.0])).expect("Relative joints");

        assert!(chain.issue(ActionKind::translate_to(1.0, 2.0, 3.0)).is_err(), "Rotation is still unknown");
        chain
            .issue(ActionKind::Transformation {
                translation: Vector3::new(1.0, 2.0, 3.0),
                rotation: UnitQuaternion::identity(),
                relative: false,
                translation_first: true,
            })
            .expect("Absolute transformation");
        let state = chain.virtual_cursor().state().expect("State");
        assert_eq!(state.joints(), None);
        assert!(chain.issue(ActionKind::axes([1.0; 6])).is_err());
    }

    #[test]
    fn test_push_pop_restores_everything() {
        let chain = default_chain().expect("Chain");
        let before = chain.virtual_cursor().state().expect("State").settings();

        chain.issue(ActionKind::PushPop { push: true }).expect("Push");
        chain.issue(ActionKind::PushPop { push: true }).expect("Nested push");
        chain.issue(ActionKind::Speed { value: 500.0, relative: false }).expect("Speed");
        chain.issue(ActionKind::MotionMode(MotionType::Joint)).expect("Mode");
        chain.issue(ActionKind::PushPop { push: false }).expect("Pop");
        chain.issue(ActionKind::Acceleration { value: 10.0, relative: true }).expect("Accel");
        chain.issue(ActionKind::ReferenceFrame(ReferenceCS::Local)).expect("Frame");
        chain.issue(ActionKind::PushPop { push: false }).expect("Pop");

        assert_eq!(chain.virtual_cursor().state().expect("State").settings(), before);
        assert!(chain.issue(ActionKind::PushPop { push: false }).is_err());
    }

    #[test]
    fn test_extruded_length_follows_motion() {
        let chain = default_chain().expect("Chain");
        chain.issue(ActionKind::ExtrusionRate { rate: 0.1, relative: false }).expect("Rate");
        chain.issue(ActionKind::Extrusion { on: true }).expect("On");
        for _ in 0..4 {
            chain.issue(ActionKind::translate(25.0, 0.0, 0.0)).expect("Move");
        }
        // Rotation alone moves nothing
        chain.issue(ActionKind::rotate(Vector3::z(), 45.0)).expect("Rotate");
        chain.issue(ActionKind::axes_to([0.0; 6])).expect("Joints");

        let state = chain.virtual_cursor().state().expect("State");
        assert!((state.extruded_length - 10.0).abs() < 1E-9);

        // Write and motion cursors reach the same figure when replaying
        chain.release_all().expect("Release");
        chain.on_executed(chain.last_id()).expect("Executed");
        let motion = chain.motion_cursor().state().expect("State");
        assert!((motion.extruded_length - 10.0).abs() < 1E-9);
        assert!(matches!(motion.pose, Pose::Joint { .. }));
    }
}
