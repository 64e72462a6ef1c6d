// Data models for projects and their artifacts

pub mod docs;
pub mod project;
pub mod refinement;
pub mod target;

pub use docs::{DocFileState, DocGenerationResult, DocStatus, GeneratedDocFile};
pub use project::{
    GenerationState, InitialAnswers, Project, ProjectAggregate, ProjectAnswers, ProjectMetadata,
    RefinementProgress,
};
pub use refinement::{
    CompletionStatus, QuestionCategory, QuestionPriority, RefinementAnswer, RefinementQuestion,
    RefinementSet, REFINEMENT_QUESTION_COUNT,
};
pub use target::{Target, TargetInfo};
