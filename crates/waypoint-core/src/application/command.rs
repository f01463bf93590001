use crate::domain::coordinator_id::CoordinatorId;
use crate::domain::step::Step;

/// Messages processed, one at a time, by a coordinator's dispatch task
#[derive(Debug)]
pub(crate) enum Command {
    /// Resolve a step with the coordinated flow
    Step(Step),

    /// A child flow ended: release the child, then resolve its step
    ChildEnded {
        child_id: CoordinatorId,
        step: Step,
    },

    /// A child coordinator was disposed and must be released
    ChildDetached(CoordinatorId),
}
