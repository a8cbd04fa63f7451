//! Time-bounded activation: `node >> Time::seconds(n) | domain` schedules
//! an eventual unbind instead of an immediate one.
//!
//! Grounded on the fluent construction API's general shape and the
//! original's lack of an equivalent (the C++ source unbinds nodes
//! explicitly; `>>` is added here as sugar for "bind for a duration").
//! [`Routine`](maya_scheduler::Routine) bodies only see a
//! [`maya_scheduler::RoutineCx`] (clock position and a value store) and
//! have no way to reach a `NodeGraph`, so a temporal activation cannot be
//! a self-contained scheduled routine. Instead `TemporalActivation` is a
//! passive record an external poll loop (the facade engine's
//! `on_block`/`on_frame`) checks against `Scheduler::current_units` and
//! acts on by calling `NodeGraph::remove_node` itself.

use maya_core::tokens::TaskToken;
use maya_core::{Domain, MayaError};
use maya_graph::NodeId;

use crate::creator::Creator;

/// A duration, expressed in seconds, a node should remain bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Time {
    pub seconds: f64,
}

impl Time {
    pub fn seconds(seconds: f64) -> Self {
        Self { seconds }
    }
}

/// An already-placed node awaiting a domain to schedule its eventual
/// unbind against. Produced by [`crate::handle::CreationHandle::for_duration`].
pub struct TemporalWrapper<'c, 'a> {
    creator: &'c mut Creator<'a>,
    node: NodeId,
    time: Time,
}

impl<'c, 'a> TemporalWrapper<'c, 'a> {
    pub(crate) fn new(creator: &'c mut Creator<'a>, node: NodeId, time: Time) -> Self {
        Self { creator, node, time }
    }

    /// Schedules the activation against `domain`'s task token, returning
    /// the record an external poll loop watches. Errors if the task token
    /// has no registered clock (there is nothing to count the duration
    /// against).
    pub fn bind(self, domain: Domain) -> Result<TemporalActivation, MayaError> {
        let token = domain.task_token();
        let start = self
            .creator
            .scheduler
            .current_units(token)
            .ok_or_else(|| MayaError::lifecycle("no clock registered for this task token"))?;
        let duration_units = self
            .creator
            .scheduler
            .seconds_to_units(token, self.time.seconds)
            .ok_or_else(|| MayaError::lifecycle("no clock registered for this task token"))?;
        Ok(TemporalActivation {
            node: self.node,
            task_token: token,
            deadline_units: start + duration_units,
        })
    }
}

impl<'c, 'a> core::ops::BitOr<Domain> for TemporalWrapper<'c, 'a> {
    type Output = Result<TemporalActivation, MayaError>;
    fn bitor(self, domain: Domain) -> Self::Output {
        self.bind(domain)
    }
}

/// A scheduled unbind: `node` should be removed from the graph once
/// `Scheduler::current_units(task_token)` reaches `deadline_units`. Not
/// self-enforcing — an external poll loop owns the graph and scheduler
/// together and is the only thing that can act on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalActivation {
    pub node: NodeId,
    pub task_token: TaskToken,
    pub deadline_units: u64,
}

impl TemporalActivation {
    /// Whether `current_units` has reached this activation's deadline.
    pub fn is_due(&self, current_units: u64) -> bool {
        current_units >= self.deadline_units
    }
}
