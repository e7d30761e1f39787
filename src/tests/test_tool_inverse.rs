#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use nalgebra::{UnitQuaternion, Vector3};
    use rand::Rng;

    use crate::action::{ActionKind, IdGenerator};
    use crate::config::{CursorConfig, InitialState};
    use crate::cursor::Cursor;
    use crate::tool::Tool;

    const CASES: usize = 200;

    fn random_orientation<R: Rng>(rng: &mut R) -> UnitQuaternion<f64> {
        UnitQuaternion::from_euler_angles(
            rng.gen_range(-3.1..3.1),
            rng.gen_range(-1.5..1.5),
            rng.gen_range(-3.1..3.1),
        )
    }

    fn random_vector<R: Rng>(rng: &mut R, range: f64) -> Vector3<f64> {
        Vector3::new(
            rng.gen_range(-range..range),
            rng.gen_range(-range..range),
            rng.gen_range(-range..range),
        )
    }

    #[test]
    fn test_attach_then_detach_is_identity() {
        let mut rng = rand::thread_rng();
        let ids = IdGenerator::new();
        let cursor = Cursor::new("tooling", &CursorConfig::default(), true, None);
        cursor.initialize(&InitialState::default()).expect("Initialize");

        for case in 0..CASES {
            let position = random_vector(&mut rng, 1000.0);
            let rotation = random_orientation(&mut rng);
            cursor
                .issue_with(&ids, ActionKind::Transformation {
                    translation: position,
                    rotation,
                    relative: false,
                    translation_first: true,
                })
                .expect("Absolute pose");

            let tool = Arc::new(Tool::new(
                &format!("tool {}", case),
                random_vector(&mut rng, 300.0),
                random_orientation(&mut rng),
            ));
            cursor.issue_with(&ids, ActionKind::Attach(tool)).expect("Attach");
            cursor.issue_with(&ids, ActionKind::Detach).expect("Detach");

            let state = cursor.state().expect("State");
            let p = state.position().expect("Position known");
            let r = state.rotation().expect("Rotation known");
            assert!(
                (p - position).norm() < 1E-6,
                "Case {}: position off by {}",
                case,
                (p - position).norm()
            );
            assert!(r.angle_to(&rotation) < 1E-9, "Case {}: rotation off by {}", case, r.angle_to(&rotation));
        }
    }

    #[test]
    fn test_tool_swap_and_moves() {
        let mut rng = rand::thread_rng();
        let ids = IdGenerator::new();
        let cursor = Cursor::new("tooling", &CursorConfig::default(), true, None);
        cursor.initialize(&InitialState::default()).expect("Initialize");

        for _ in 0..CASES / 10 {
            let first = Arc::new(Tool::new("first", random_vector(&mut rng, 200.0), random_orientation(&mut rng)));
            let second = Arc::new(Tool::new("second", random_vector(&mut rng, 200.0), random_orientation(&mut rng)));
            let flange = cursor.state().expect("State").pose;

            // Replacing a tool passes through the flange, so only the last one counts
            cursor.issue_with(&ids, ActionKind::Attach(first)).expect("Attach first");
            cursor.issue_with(&ids, ActionKind::Attach(second.clone())).expect("Attach second");
            let tcp = cursor.state().expect("State").pose.isometry().expect("Known");
            let expected = second.attach_to(&flange.isometry().expect("Known"));
            assert!((tcp.translation.vector - expected.translation.vector).norm() < 1E-6);

            // A move of the TCP is the same move of the flange in the world frame
            let delta = random_vector(&mut rng, 50.0);
            cursor
                .issue_with(&ids, ActionKind::translate(delta.x, delta.y, delta.z))
                .expect("Move");
            cursor.issue_with(&ids, ActionKind::Detach).expect("Detach");
            let after = cursor.state().expect("State").position().expect("Known");
            let before = flange.position().expect("Known");
            assert!((after - (before + delta)).norm() < 1E-6);
        }
    }
}
