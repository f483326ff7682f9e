use crate::domain::DeploymentStatus;
use crate::error::CoreError;

pub struct DeploymentStateMachine;

impl DeploymentStateMachine {
    /// Checks a status write. Writing the current status again is a progress
    /// note and is only allowed while the deployment is not terminal.
    pub fn validate_transition(
        from: &DeploymentStatus,
        to: &DeploymentStatus,
    ) -> Result<(), CoreError> {
        if from == to && !from.is_terminal() {
            return Ok(());
        }

        if Self::allowed_transitions(from).contains(to) {
            Ok(())
        } else {
            Err(CoreError::InvalidStatusTransition {
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
            })
        }
    }

    fn allowed_transitions(from: &DeploymentStatus) -> Vec<DeploymentStatus> {
        use DeploymentStatus::*;

        match from {
            Queued => vec![Connecting, Failed],
            Connecting => vec![Installing, Failed],
            Installing => vec![Scaffolding, Failed],
            Scaffolding => vec![Building, Failed],
            Building => vec![Starting, Failed],
            Starting => vec![Verifying, Failed],
            Verifying => vec![Completed, Failed],
            Completed | Failed => vec![],
        }
    }

    pub fn can_transition(from: &DeploymentStatus, to: &DeploymentStatus) -> bool {
        Self::validate_transition(from, to).is_ok()
    }

    pub fn next_status(current: &DeploymentStatus) -> Option<DeploymentStatus> {
        use DeploymentStatus::*;

        match current {
            Queued => Some(Connecting),
            Connecting => Some(Installing),
            Installing => Some(Scaffolding),
            Scaffolding => Some(Building),
            Building => Some(Starting),
            Starting => Some(Verifying),
            Verifying => Some(Completed),
            Completed | Failed => None,
        }
    }

    /// True when `visited` walks a prefix of the forward order and, if it
    /// ends terminally, ends in exactly one terminal status.
    pub fn is_valid_history(visited: &[DeploymentStatus]) -> bool {
        let Some((first, rest)) = visited.split_first() else {
            return true;
        };
        if *first != DeploymentStatus::Queued {
            return false;
        }

        let mut current = *first;
        for next in rest {
            if current.is_terminal() || current == *next {
                return false;
            }
            if !Self::can_transition(&current, next) {
                return false;
            }
            current = *next;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DeploymentStatus::*;

    #[test]
    fn test_valid_transitions() {
        assert!(DeploymentStateMachine::can_transition(&Queued, &Connecting));
        assert!(DeploymentStateMachine::can_transition(&Scaffolding, &Building));
        assert!(DeploymentStateMachine::can_transition(&Verifying, &Completed));
    }

    #[test]
    fn test_failed_reachable_from_every_non_terminal() {
        for status in DeploymentStatus::FORWARD.iter().filter(|s| !s.is_terminal()) {
            assert!(
                DeploymentStateMachine::can_transition(status, &Failed),
                "{status} should be able to fail"
            );
        }
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!DeploymentStateMachine::can_transition(&Queued, &Installing));
        assert!(!DeploymentStateMachine::can_transition(&Building, &Scaffolding));
        assert!(!DeploymentStateMachine::can_transition(&Completed, &Failed));
        assert!(!DeploymentStateMachine::can_transition(&Failed, &Queued));
    }

    #[test]
    fn test_progress_note_only_while_active() {
        assert!(DeploymentStateMachine::can_transition(&Installing, &Installing));
        assert!(!DeploymentStateMachine::can_transition(&Completed, &Completed));
        assert!(!DeploymentStateMachine::can_transition(&Failed, &Failed));
    }

    #[test]
    fn test_next_status_walks_forward_order() {
        let mut walked = vec![Queued];
        while let Some(next) = DeploymentStateMachine::next_status(walked.last().unwrap()) {
            walked.push(next);
        }
        assert_eq!(walked, DeploymentStatus::FORWARD.to_vec());
        assert_eq!(DeploymentStateMachine::next_status(&Failed), None);
    }

    #[test]
    fn test_history_validation() {
        assert!(DeploymentStateMachine::is_valid_history(&DeploymentStatus::FORWARD));
        assert!(DeploymentStateMachine::is_valid_history(&[
            Queued, Connecting, Installing, Failed
        ]));
        assert!(!DeploymentStateMachine::is_valid_history(&[
            Queued, Connecting, Installing, Connecting
        ]));
        assert!(!DeploymentStateMachine::is_valid_history(&[Queued, Failed, Failed]));
        assert!(!DeploymentStateMachine::is_valid_history(&[Connecting]));
    }
}
