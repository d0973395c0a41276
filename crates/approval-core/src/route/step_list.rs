//! Ordered, type-partitioned step list
//!
//! Steps are partitioned by `StepType`. Inside each partition `order` runs
//! 1..n without gaps; every mutation renumbers only the partitions it touches.

use super::step::{ApprovalStep, MemberId, StepId};
use crate::directory::DirectoryMember;
use approval_types::StepType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Direction for nudging a step inside its partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Result of an add attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepChange {
    Added(StepId),
    /// Reviewer already present somewhere in the route; list left unchanged
    DuplicateApprover,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepList(Vec<ApprovalStep>);

impl StepList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Wrap steps as given; call `normalize` if their numbering is not trusted
    pub fn from_steps(steps: Vec<ApprovalStep>) -> Self {
        Self(steps)
    }

    pub fn steps(&self) -> &[ApprovalStep] {
        &self.0
    }

    pub fn into_steps(self) -> Vec<ApprovalStep> {
        self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ApprovalStep> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, step_id: &StepId) -> Option<&ApprovalStep> {
        self.0.iter().find(|s| &s.id == step_id)
    }

    pub fn contains_approver(&self, approver_id: &MemberId) -> bool {
        self.0.iter().any(|s| &s.approver_id == approver_id)
    }

    pub fn count_of(&self, step_type: StepType) -> usize {
        self.0.iter().filter(|s| s.step_type == step_type).count()
    }

    /// Steps of one partition sorted by `order`
    pub fn of_type(&self, step_type: StepType) -> Vec<&ApprovalStep> {
        let mut steps: Vec<&ApprovalStep> = self
            .0
            .iter()
            .filter(|s| s.step_type == step_type)
            .collect();
        steps.sort_by_key(|s| s.order);
        steps
    }

    /// Append `candidate` at the end of the `step_type` partition
    pub fn add_step(&mut self, candidate: &DirectoryMember, step_type: StepType) -> StepChange {
        if self.contains_approver(&candidate.id) {
            log::debug!(
                "Approver {} is already part of the route, ignoring {} assignment",
                candidate.id,
                step_type
            );
            return StepChange::DuplicateApprover;
        }

        let order = self.count_of(step_type) as u32 + 1;
        let step = ApprovalStep::for_member(candidate, step_type, order);
        let step_id = step.id.clone();
        self.0.push(step);

        StepChange::Added(step_id)
    }

    /// Remove a step and close the gap in its partition
    pub fn remove_step(&mut self, step_id: &StepId) -> Option<ApprovalStep> {
        let index = self.0.iter().position(|s| &s.id == step_id)?;
        let removed = self.0.remove(index);
        self.renumber(removed.step_type);
        Some(removed)
    }

    /// Remove whichever step assigns `approver_id`
    pub fn remove_approver(&mut self, approver_id: &MemberId) -> Option<ApprovalStep> {
        let step_id = self
            .0
            .iter()
            .find(|s| &s.approver_id == approver_id)
            .map(|s| s.id.clone())?;
        self.remove_step(&step_id)
    }

    /// Swap a step with its neighbor inside the same partition.
    /// Returns false at partition boundaries or for unknown ids.
    pub fn reorder(&mut self, step_id: &StepId, direction: Direction) -> bool {
        let Some(index) = self.0.iter().position(|s| &s.id == step_id) else {
            return false;
        };

        let step_type = self.0[index].step_type;
        let order = self.0[index].order;
        let neighbor_order = match direction {
            Direction::Up if order > 1 => order - 1,
            Direction::Down => order + 1,
            Direction::Up => return false,
        };

        let Some(neighbor) = self
            .0
            .iter()
            .position(|s| s.step_type == step_type && s.order == neighbor_order)
        else {
            return false;
        };

        self.0[index].order = neighbor_order;
        self.0[neighbor].order = order;
        self.0.swap(index, neighbor);
        true
    }

    /// Move a step into another partition, appending it there
    pub fn change_type(&mut self, step_id: &StepId, new_type: StepType) -> bool {
        let Some(index) = self.0.iter().position(|s| &s.id == step_id) else {
            return false;
        };

        let old_type = self.0[index].step_type;
        if old_type == new_type {
            return false;
        }

        let order = self.count_of(new_type) as u32 + 1;
        let step = &mut self.0[index];
        step.step_type = new_type;
        step.order = order;
        step.is_required = new_type.is_required_by_default();
        step.final_order = None;

        self.renumber(old_type);
        true
    }

    /// Renumber every partition to 1..n, keeping relative order
    pub fn normalize(&mut self) {
        for step_type in StepType::ALL {
            self.renumber(step_type);
        }
    }

    /// Cooperation steps then approval steps, each carrying a fresh `final_order`.
    /// Notify-only types are not part of the sequence.
    pub fn compute_final_order(&self) -> Vec<ApprovalStep> {
        self.of_type(StepType::Cooperation)
            .into_iter()
            .chain(self.of_type(StepType::Approval))
            .enumerate()
            .map(|(i, step)| ApprovalStep {
                final_order: Some(i as u32 + 1),
                ..step.clone()
            })
            .collect()
    }

    pub fn is_submittable(&self) -> bool {
        self.count_of(StepType::Approval) >= 1
    }

    /// Keep only the first step of every approver, then renumber.
    /// Returns how many steps were dropped.
    pub fn dedup_approvers(&mut self) -> usize {
        let mut seen = HashSet::new();
        let before = self.0.len();

        self.0.retain(|step| {
            let first = seen.insert(step.approver_id.clone());
            if !first {
                log::debug!(
                    "Dropping {} step of approver {}, already part of the route",
                    step.step_type,
                    step.approver_id
                );
            }
            first
        });

        let dropped = before - self.0.len();
        if dropped > 0 {
            self.normalize();
        }
        dropped
    }

    fn renumber(&mut self, step_type: StepType) {
        let mut indices: Vec<usize> = self
            .0
            .iter()
            .enumerate()
            .filter(|(_, s)| s.step_type == step_type)
            .map(|(i, _)| i)
            .collect();
        // stable: ties keep list position
        indices.sort_by_key(|&i| self.0[i].order);

        for (position, index) in indices.into_iter().enumerate() {
            self.0[index].order = position as u32 + 1;
        }
    }
}

impl<'a> IntoIterator for &'a StepList {
    type Item = &'a ApprovalStep;
    type IntoIter = std::slice::Iter<'a, ApprovalStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
