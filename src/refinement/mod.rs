//! Refinement question decoding and answer rendering
//!
//! The model reply may wrap the question array in prose or a code fence, so
//! the outermost `[ ... ]` span is located first. That span is then decoded
//! strictly: exact field set, known enum values, exactly
//! [`REFINEMENT_QUESTION_COUNT`] items with unique ids. Anything else is a
//! parse error and nothing is salvaged.

use crate::error::{AppError, AppResult};
use crate::models::{RefinementQuestion, RefinementSet, REFINEMENT_QUESTION_COUNT};
use serde::Serialize;
use std::collections::HashSet;

/// Marker used in prompts for questions the user chose to skip
pub const SKIPPED_MARKER: &str = "[SKIPPED]";

/// Decode a model reply into the fixed question batch
pub fn decode_questions(raw: &str) -> AppResult<Vec<RefinementQuestion>> {
    let span = extract_array_span(raw)
        .ok_or_else(|| AppError::Parse("response does not contain a JSON array".to_string()))?;

    let questions: Vec<RefinementQuestion> = serde_json::from_str(span)
        .map_err(|e| AppError::Parse(format!("invalid question array: {}", e)))?;

    if questions.len() != REFINEMENT_QUESTION_COUNT {
        return Err(AppError::Parse(format!(
            "expected exactly {} questions, got {}",
            REFINEMENT_QUESTION_COUNT,
            questions.len()
        )));
    }

    let mut seen = HashSet::new();
    for question in &questions {
        if !seen.insert(question.id) {
            return Err(AppError::Parse(format!("duplicate question id {}", question.id)));
        }
        if question.question.trim().is_empty() {
            return Err(AppError::Parse(format!("question {} has no text", question.id)));
        }
    }

    Ok(questions)
}

fn extract_array_span(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

/// One answered or skipped question as shown to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptAnswer {
    pub number: usize,
    pub question: String,
    pub answer: String,
}

/// Render every question with its latest answer, marking skips explicitly
pub fn prompt_answers(set: &RefinementSet) -> Vec<PromptAnswer> {
    let latest = set.latest_answers();
    set.questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let answer = match latest.get(&question.id) {
                Some(a) if !a.skipped => a.answer.trim().to_string(),
                _ => SKIPPED_MARKER.to_string(),
            };
            PromptAnswer {
                number: i + 1,
                question: question.question.clone(),
                answer,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QuestionCategory, QuestionPriority, RefinementAnswer};
    use chrono::Utc;
    use serde_json::json;

    fn question_json(count: usize) -> serde_json::Value {
        let categories = ["technical", "ux", "security", "market", "resources"];
        let priorities = ["high", "medium", "low"];
        json!((1..=count)
            .map(|i| json!({
                "id": i,
                "question": format!("Question {}?", i),
                "category": categories[i % categories.len()],
                "priority": priorities[i % priorities.len()],
            }))
            .collect::<Vec<_>>())
    }

    #[test]
    fn test_decodes_plain_array() {
        let raw = question_json(10).to_string();
        let questions = decode_questions(&raw).unwrap();
        assert_eq!(questions.len(), 10);
        assert_eq!(questions[0].id, 1);
        assert_eq!(questions[0].category, QuestionCategory::Ux);
        assert_eq!(questions[0].priority, QuestionPriority::Medium);
    }

    #[test]
    fn test_decodes_array_inside_prose_and_fence() {
        let raw = format!(
            "Here are your questions:\n```json\n{}\n```\nGood luck!",
            serde_json::to_string_pretty(&question_json(10)).unwrap()
        );
        assert_eq!(decode_questions(&raw).unwrap().len(), 10);
    }

    #[test]
    fn test_rejects_wrong_count() {
        let err = decode_questions(&question_json(9).to_string()).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
        assert!(err.to_string().contains("got 9"));
        assert!(decode_questions(&question_json(11).to_string()).is_err());
    }

    #[test]
    fn test_rejects_unknown_enum_and_extra_fields() {
        let mut value = question_json(10);
        value[3]["category"] = json!("legal");
        assert!(matches!(
            decode_questions(&value.to_string()),
            Err(AppError::Parse(_))
        ));

        let mut value = question_json(10);
        value[0]["hint"] = json!("extra");
        assert!(decode_questions(&value.to_string()).is_err());
    }

    #[test]
    fn test_rejects_duplicate_ids_and_missing_array() {
        let mut value = question_json(10);
        value[9]["id"] = json!(1);
        assert!(decode_questions(&value.to_string()).is_err());

        assert!(decode_questions("I could not think of any questions.").is_err());
        assert!(decode_questions("] nope [").is_err());
    }

    #[test]
    fn test_prompt_answers_mark_skips() {
        let questions = decode_questions(&question_json(10).to_string()).unwrap();
        let mut set = RefinementSet::new("p1", questions, Utc::now());
        set.answers = vec![
            RefinementAnswer {
                question_id: 1,
                answer: " Postgres ".into(),
                skipped: false,
                timestamp: Utc::now(),
            },
            RefinementAnswer {
                question_id: 2,
                answer: "ignored".into(),
                skipped: true,
                timestamp: Utc::now(),
            },
        ];

        let rendered = prompt_answers(&set);
        assert_eq!(rendered.len(), 10);
        assert_eq!(rendered[0].number, 1);
        assert_eq!(rendered[0].answer, "Postgres");
        assert_eq!(rendered[1].answer, SKIPPED_MARKER);
        assert_eq!(rendered[9].question, "Question 10?");
    }
}
