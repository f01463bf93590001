//! Visibility gating of stepper subscriptions
//!
//! A gate forwards a stepper's steps into a coordinator's command channel while
//! the gating presentable is displayed, drops them while it is not, and ends
//! when the presentable is dismissed.

use futures::StreamExt;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{trace, warn};

use crate::application::command::Command;
use crate::domain::coordinator_id::CoordinatorId;
use crate::domain::presentable::{Artifact, Presentable};
use crate::domain::step::Step;
use crate::domain::stepper::StepStream;
use crate::signals::{Dismissal, VisibilityStream};

/// The signals a subscription is gated by
pub(crate) struct Gate {
    visibility: VisibilityStream,
    dismissed: Dismissal,
    ungated: usize,
}

impl Gate {
    /// Gate on a contributed artifact: every emission is checked
    pub(crate) fn for_artifact(artifact: &Artifact) -> Self {
        Self {
            visibility: artifact.visible(),
            dismissed: artifact.dismissed(),
            ungated: 0,
        }
    }

    /// Gate on a flow root: the first `ungated` emissions pass unconditionally
    pub(crate) fn for_root(root: &dyn Presentable, ungated: usize) -> Self {
        Self {
            visibility: root.visible(),
            dismissed: root.dismissed(),
            ungated,
        }
    }
}

/// Forward `steps` into `sink` until the stepper ends, faults, the gate is
/// dismissed or the sink is closed
pub(crate) async fn forward(
    coordinator_id: CoordinatorId,
    mut steps: StepStream,
    gate: Gate,
    sink: UnboundedSender<Command>,
) {
    let Gate {
        mut visibility,
        mut dismissed,
        mut ungated,
    } = gate;

    // Closed until the first visibility value arrives
    let mut visible = false;
    let mut visibility_open = true;

    loop {
        tokio::select! {
            biased;

            _ = &mut dismissed => {
                trace!(coordinator = %coordinator_id, "Gate dismissed, ending subscription");
                break;
            }

            value = visibility.next(), if visibility_open => match value {
                Some(value) => visible = value,
                None => visibility_open = false,
            },

            item = steps.next() => {
                let step = match item {
                    Some(Ok(step)) => step,
                    Some(Err(fault)) => {
                        warn!(
                            coordinator = %coordinator_id,
                            error = %fault,
                            "Stepper faulted, substituting a terminal none step"
                        );
                        let _ = sink.send(Command::Step(Step::none()));
                        break;
                    }
                    None => break,
                };

                if ungated > 0 {
                    ungated -= 1;
                } else if !visible {
                    trace!(
                        coordinator = %coordinator_id,
                        step = ?step,
                        "Presentable hidden, dropping step"
                    );
                    continue;
                }

                if step.is_none() {
                    continue;
                }

                if sink.send(Command::Step(step)).is_err() {
                    break;
                }
            }
        }
    }
}
