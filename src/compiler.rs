//! Turning released actions into program text.
//!
//! The text format is the business of the target device, so only the interface and a
//! readable listing are provided here.

use std::sync::Arc;

use crate::action::{Action, ActionFlags, ActionKind, MotionType};
use crate::cursor_state::CursorState;
use crate::utils::format_pose;

pub trait Compiler {
    /// Produce the program lines for `actions`, which were released in this order starting
    /// from the `initial` state.
    fn compile(&self, initial: &CursorState, actions: &[Arc<Action>]) -> Vec<String>;
}

/// Numbered listing of the actions, one per line.
#[derive(Debug, Clone, Default)]
pub struct HumanCompiler {
    /// Name printed in the header.
    pub program_name: String,
}

impl HumanCompiler {
    pub fn new(program_name: &str) -> Self {
        HumanCompiler { program_name: program_name.to_string() }
    }
}

impl Compiler for HumanCompiler {
    fn compile(&self, initial: &CursorState, actions: &[Arc<Action>]) -> Vec<String> {
        let mut lines = Vec::with_capacity(actions.len() + 3);
        lines.push(format!("PROGRAM {}", self.program_name));
        lines.push(format!("START AT {}", format_pose(&initial.pose)));

        let mut motion_type = initial.motion_type;
        for action in actions {
            if let ActionKind::MotionMode(m) = &action.kind {
                motion_type = *m;
            }
            let line = match &action.kind {
                ActionKind::Comment(text) => format!("// {}", text),
                ActionKind::CustomCode { statement, .. } => statement.clone(),
                _ if action.category().contains(ActionFlags::MOTION) => {
                    let how = match motion_type {
                        MotionType::Linear => "LIN",
                        MotionType::Joint => "PTP",
                    };
                    format!("{:>5}: {} {}", action.id, how, action.kind)
                }
                _ => format!("{:>5}: {}", action.id, action.kind),
            };
            lines.push(line);
        }

        lines.push(format!("END {} ({} actions)", self.program_name, actions.len()));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::IdGenerator;
    use crate::config::CursorConfig;

    #[test]
    fn test_listing() {
        let ids = IdGenerator::new();
        let actions = vec![
            Action::issue(&ids, ActionKind::Comment("start".into())),
            Action::issue(&ids, ActionKind::translate(3.0, 4.0, 0.0)),
            Action::issue(&ids, ActionKind::MotionMode(MotionType::Joint)),
            Action::issue(&ids, ActionKind::axes_to([0.0; 6])),
            Action::issue(&ids, ActionKind::CustomCode { statement: "WAIT SEC 1".into(), is_declaration: false }),
        ];
        let lines = HumanCompiler::new("demo").compile(&CursorState::new(&CursorConfig::default()), &actions);

        assert_eq!(lines.len(), actions.len() + 3);
        assert_eq!(lines[0], "PROGRAM demo");
        assert_eq!(lines[1], "START AT unknown");
        assert_eq!(lines[2], "// start");
        assert!(lines[3].starts_with("    2: LIN Move 5.000 mm"), "{}", lines[3]);
        assert!(lines[5].starts_with("    4: PTP "), "{}", lines[5]);
        assert_eq!(lines[6], "WAIT SEC 1");
        assert_eq!(lines[7], "END demo (5 actions)");
    }
}
