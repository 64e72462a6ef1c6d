// Refinement question/answer records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of questions in every refinement batch
pub const REFINEMENT_QUESTION_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Technical,
    Ux,
    Security,
    Market,
    Resources,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionPriority {
    High,
    Medium,
    Low,
}

/// A clarifying question generated from the original PRD
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefinementQuestion {
    pub id: u32,
    pub question: String,
    pub category: QuestionCategory,
    pub priority: QuestionPriority,
}

/// The user's response to one refinement question, or an explicit skip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementAnswer {
    pub question_id: u32,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub skipped: bool,
    pub timestamp: DateTime<Utc>,
}

impl RefinementAnswer {
    /// Answered: not skipped and carrying non-blank text
    pub fn is_answered(&self) -> bool {
        !self.skipped && !self.answer.trim().is_empty()
    }
}

/// The fixed question batch for a project plus the latest saved answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementSet {
    pub project_id: String,
    pub questions: Vec<RefinementQuestion>,
    #[serde(default)]
    pub answers: Vec<RefinementAnswer>,
    pub generated_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RefinementSet {
    pub fn new(project_id: &str, questions: Vec<RefinementQuestion>, now: DateTime<Utc>) -> Self {
        Self {
            project_id: project_id.to_string(),
            questions,
            answers: Vec::new(),
            generated_at: now,
            updated_at: now,
        }
    }

    /// Latest answer entry for each question id
    pub fn latest_answers(&self) -> HashMap<u32, &RefinementAnswer> {
        let mut latest = HashMap::new();
        for answer in &self.answers {
            latest.insert(answer.question_id, answer);
        }
        latest
    }

    pub fn completion(&self) -> CompletionStatus {
        let latest = self.latest_answers();
        let mut status = CompletionStatus {
            total: self.questions.len(),
            ..CompletionStatus::default()
        };
        for question in &self.questions {
            match latest.get(&question.id) {
                Some(a) if a.skipped => status.skipped += 1,
                Some(a) if a.is_answered() => status.answered += 1,
                _ => {}
            }
        }
        status.is_complete = status.answered + status.skipped == status.total;
        status
    }

    /// Ids in `answers` that do not match any question
    pub fn unknown_question_ids(&self, answers: &[RefinementAnswer]) -> Vec<u32> {
        let mut unknown: Vec<u32> = answers
            .iter()
            .map(|a| a.question_id)
            .filter(|id| !self.questions.iter().any(|q| q.id == *id))
            .collect();
        unknown.sort_unstable();
        unknown.dedup();
        unknown
    }
}

/// Answered/skipped counts for a refinement set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionStatus {
    pub answered: usize,
    pub skipped: usize,
    pub total: usize,
    pub is_complete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions() -> Vec<RefinementQuestion> {
        (1..=10)
            .map(|id| RefinementQuestion {
                id,
                question: format!("Question {}?", id),
                category: QuestionCategory::Technical,
                priority: QuestionPriority::Medium,
            })
            .collect()
    }

    fn answer(id: u32, text: &str, skipped: bool) -> RefinementAnswer {
        RefinementAnswer {
            question_id: id,
            answer: text.to_string(),
            skipped,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_six_answered_four_skipped_is_complete() {
        let mut set = RefinementSet::new("p1", questions(), Utc::now());
        set.answers = (1..=10)
            .map(|id| {
                if id <= 6 {
                    answer(id, "yes", false)
                } else {
                    answer(id, "", true)
                }
            })
            .collect();

        let status = set.completion();
        assert_eq!(status.answered, 6);
        assert_eq!(status.skipped, 4);
        assert_eq!(status.total, 10);
        assert!(status.is_complete);
    }

    #[test]
    fn test_blank_unskipped_answer_counts_as_neither() {
        let mut set = RefinementSet::new("p1", questions(), Utc::now());
        set.answers = (1..=10).map(|id| answer(id, "ok", false)).collect();
        set.answers[3].answer = "   ".to_string();

        let status = set.completion();
        assert_eq!(status.answered, 9);
        assert_eq!(status.skipped, 0);
        assert!(!status.is_complete);
    }

    #[test]
    fn test_latest_entry_wins() {
        let mut set = RefinementSet::new("p1", questions(), Utc::now());
        set.answers = vec![answer(1, "first", false), answer(1, "", true)];
        let status = set.completion();
        assert_eq!(status.answered, 0);
        assert_eq!(status.skipped, 1);
    }

    #[test]
    fn test_skipped_answer_text_is_ignored() {
        let skipped = answer(2, "some leftover text", true);
        assert!(!skipped.is_answered());
        let mut set = RefinementSet::new("p1", questions(), Utc::now());
        set.answers = vec![skipped];
        assert_eq!(set.completion().skipped, 1);
        assert_eq!(set.completion().answered, 0);
    }

    #[test]
    fn test_unknown_question_ids() {
        let set = RefinementSet::new("p1", questions(), Utc::now());
        let answers = vec![answer(3, "a", false), answer(42, "b", false), answer(42, "c", false)];
        assert_eq!(set.unknown_question_ids(&answers), vec![42]);
    }

    #[test]
    fn test_wire_shape() {
        let set = RefinementSet::new("p1", questions(), Utc::now());
        let value = serde_json::to_value(&set).unwrap();
        assert_eq!(value["projectId"], "p1");
        assert_eq!(value["questions"][0]["category"], "technical");
        assert_eq!(value["questions"][0]["priority"], "medium");
        assert!(value["answers"].as_array().unwrap().is_empty());
        assert!(value.get("generatedAt").is_some());
        assert!(value.get("updatedAt").is_some());
    }
}
