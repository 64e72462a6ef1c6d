//! Project lifecycle state
//!
//! Defines the fine-grained steps a project moves through, the coarse status
//! derived from them, and the transition table that guards every move.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fine-grained project step
///
/// The first six variants form the primary linear chain. `TargetSelection`
/// and `GeneratingDocs` are extension steps layered after `Complete`; their
/// payload lives in `ProjectMetadata::generation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStep {
    /// Initial questionnaire
    Questions,
    /// Original PRD derived and shown for review
    PrdPreview,
    /// Manual editing of the original PRD
    PrdEdit,
    /// Answering the refinement question batch
    RefinementQuestions,
    /// Refined PRD being synthesized
    Processing,
    /// Refined PRD available
    Complete,
    /// Choosing a downstream target
    TargetSelection,
    /// Generating target documentation files
    GeneratingDocs,
}

const PRIMARY_CHAIN: &[ProjectStep] = &[
    ProjectStep::Questions,
    ProjectStep::PrdPreview,
    ProjectStep::PrdEdit,
    ProjectStep::RefinementQuestions,
    ProjectStep::Processing,
    ProjectStep::Complete,
];

impl ProjectStep {
    /// Get the primary steps in order
    pub fn primary() -> &'static [ProjectStep] {
        PRIMARY_CHAIN
    }

    /// Whether this step belongs to the primary linear chain
    pub fn is_primary(&self) -> bool {
        self.index().is_some()
    }

    /// Position within the primary chain (0-based), `None` for extension steps
    pub fn index(&self) -> Option<usize> {
        PRIMARY_CHAIN.iter().position(|s| s == self)
    }

    /// Next primary step, if any
    pub fn next(&self) -> Option<ProjectStep> {
        self.index().and_then(|i| PRIMARY_CHAIN.get(i + 1).copied())
    }

    /// Previous step. Extension steps fall back to `Complete`.
    pub fn previous(&self) -> Option<ProjectStep> {
        match self.index() {
            Some(0) => None,
            Some(i) => PRIMARY_CHAIN.get(i - 1).copied(),
            None => Some(ProjectStep::Complete),
        }
    }

    /// Coarse status derived from this step
    pub fn status(&self) -> ProjectStatus {
        match self {
            ProjectStep::Questions => ProjectStatus::Draft,
            ProjectStep::PrdPreview => ProjectStatus::PrdPreview,
            ProjectStep::PrdEdit | ProjectStep::RefinementQuestions => ProjectStatus::Refining,
            ProjectStep::Processing => ProjectStatus::Processing,
            ProjectStep::Complete | ProjectStep::TargetSelection | ProjectStep::GeneratingDocs => {
                ProjectStatus::Complete
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStep::Questions => "questions",
            ProjectStep::PrdPreview => "prd-preview",
            ProjectStep::PrdEdit => "prd-edit",
            ProjectStep::RefinementQuestions => "refinement-questions",
            ProjectStep::Processing => "processing",
            ProjectStep::Complete => "complete",
            ProjectStep::TargetSelection => "target-selection",
            ProjectStep::GeneratingDocs => "generating-docs",
        }
    }
}

impl Default for ProjectStep {
    fn default() -> Self {
        ProjectStep::Questions
    }
}

impl fmt::Display for ProjectStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PRIMARY_CHAIN
            .iter()
            .chain([ProjectStep::TargetSelection, ProjectStep::GeneratingDocs].iter())
            .copied()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| format!("Unknown project step: {}", s))
    }
}

/// Coarse project status, always recomputed from the current step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Draft,
    PrdPreview,
    Refining,
    Processing,
    Complete,
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Draft
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StepTransitionError {
    #[error("Cannot move from step '{from}' to '{to}'")]
    Unreachable { from: ProjectStep, to: ProjectStep },

    #[error("Cannot start generating documents before a target is selected")]
    NoTargetSelected,
}

/// Validates if a project can move from one step to another
///
/// `has_target` reports whether a target is recorded in the generation
/// sub-record; generation cannot start without one.
pub fn can_transition(from: ProjectStep, to: ProjectStep, has_target: bool) -> bool {
    transition_step(from, to, has_target).is_ok()
}

/// Validates a step transition and returns the step to apply
pub fn transition_step(
    from: ProjectStep,
    to: ProjectStep,
    has_target: bool,
) -> Result<ProjectStep, StepTransitionError> {
    use ProjectStep::*;

    let reachable = match (from, to) {
        // Same step is always allowed (no-op)
        (a, b) if a == b => true,

        // Free movement along the primary chain; editing may go back
        (a, b) if a.is_primary() && b.is_primary() => true,

        (Complete, TargetSelection) | (GeneratingDocs, TargetSelection) => true,
        (TargetSelection, GeneratingDocs) => {
            if !has_target {
                return Err(StepTransitionError::NoTargetSelected);
            }
            true
        }

        // Leaving the extension back into the primary chain
        (TargetSelection | GeneratingDocs, b) if b.is_primary() => true,

        _ => false,
    };

    if reachable {
        Ok(to)
    } else {
        Err(StepTransitionError::Unreachable { from, to })
    }
}
