use crate::state::ctrl::TournamentCtrl;

/// User actions the side panel can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Join,
    Withdraw,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::Join => "Join Tournament",
            Action::Withdraw => "Withdraw",
        }
    }

    pub fn key_hint(&self) -> &'static str {
        match self {
            Action::Join => "J",
            Action::Withdraw => "W",
        }
    }
}

/// Join before the start; withdraw while running, and only for a known viewer.
pub fn available_actions(ctrl: &TournamentCtrl) -> Vec<Action> {
    let mut actions = Vec::with_capacity(1);
    if ctrl.is_created() {
        actions.push(Action::Join);
    }
    if ctrl.is_started() && ctrl.viewer_id().is_some() {
        actions.push(Action::Withdraw);
    }
    actions
}

/// Issue the intent behind `action` if it is currently on offer.
pub fn perform(ctrl: &TournamentCtrl, action: Action) -> bool {
    if !available_actions(ctrl).contains(&action) {
        log::debug!("{} is not available right now", action.label());
        return false;
    }
    match action {
        Action::Join => ctrl.join(),
        Action::Withdraw => ctrl.withdraw(),
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ctrl::tests::{Recorder, snapshot};
    use official_api::protocol::Intent;

    #[test]
    fn join_only_before_start() {
        let recorder = Recorder::default();
        assert_eq!(available_actions(&recorder.ctrl(snapshot("swiss", "created"), None)), vec![Action::Join]);
        assert!(available_actions(&recorder.ctrl(snapshot("swiss", "finished"), Some("alice"))).is_empty());
    }

    #[test]
    fn withdraw_needs_a_viewer() {
        let recorder = Recorder::default();
        assert!(available_actions(&recorder.ctrl(snapshot("arena", "started"), None)).is_empty());
        assert_eq!(
            available_actions(&recorder.ctrl(snapshot("arena", "started"), Some("alice"))),
            vec![Action::Withdraw]
        );
    }

    #[test]
    fn perform_checks_availability_first() {
        let recorder = Recorder::default();
        let ctrl = recorder.ctrl(snapshot("knockout", "started"), Some("alice"));

        assert!(!perform(&ctrl, Action::Join));
        assert!(recorder.sent().is_empty());

        assert!(perform(&ctrl, Action::Withdraw));
        assert_eq!(recorder.sent(), vec![Intent::Withdraw]);
    }
}
