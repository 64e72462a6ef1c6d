// Built-in prompt and document templates

/// Built-in template names
pub const ORIGINAL_PRD: &str = "original_prd";
pub const REFINEMENT_QUESTIONS_SYSTEM: &str = "refinement_questions_system";
pub const REFINEMENT_QUESTIONS_USER: &str = "refinement_questions_user";
pub const PROCESS_REFINEMENT_SYSTEM: &str = "process_refinement_system";
pub const PROCESS_REFINEMENT_USER: &str = "process_refinement_user";
pub const GENERATE_DOCS_SYSTEM: &str = "generate_docs_system";
pub const GENERATE_DOCS_USER: &str = "generate_docs_user";

/// Get a specific built-in template
pub fn get_builtin_template(name: &str) -> Option<&'static str> {
    match name {
        ORIGINAL_PRD => Some(ORIGINAL_PRD_TEMPLATE),
        REFINEMENT_QUESTIONS_SYSTEM => Some(REFINEMENT_QUESTIONS_SYSTEM_TEMPLATE),
        REFINEMENT_QUESTIONS_USER => Some(REFINEMENT_QUESTIONS_USER_TEMPLATE),
        PROCESS_REFINEMENT_SYSTEM => Some(PROCESS_REFINEMENT_SYSTEM_TEMPLATE),
        PROCESS_REFINEMENT_USER => Some(PROCESS_REFINEMENT_USER_TEMPLATE),
        GENERATE_DOCS_SYSTEM => Some(GENERATE_DOCS_SYSTEM_TEMPLATE),
        GENERATE_DOCS_USER => Some(GENERATE_DOCS_USER_TEMPLATE),
        _ => None,
    }
}

/// List all built-in template names
pub fn list_builtin_templates() -> Vec<&'static str> {
    vec![
        ORIGINAL_PRD,
        REFINEMENT_QUESTIONS_SYSTEM,
        REFINEMENT_QUESTIONS_USER,
        PROCESS_REFINEMENT_SYSTEM,
        PROCESS_REFINEMENT_USER,
        GENERATE_DOCS_SYSTEM,
        GENERATE_DOCS_USER,
    ]
}

// =============================================================================
// Original PRD
// =============================================================================

const ORIGINAL_PRD_TEMPLATE: &str = r#"# Product Requirements Document
## {{ project_name }}

### Project Overview
**Project Name**: {{ answers_name }}
**Project Type**: {{ project_type }}
**Target Audience**: {{ target_audience }}
**Description**: {{ description }}
{% if complexity %}**Complexity**: {{ complexity }}
{% endif %}{% if timeline %}**Timeline**: {{ timeline }}
{% endif %}
### Technical Architecture

#### Tech Stack
- **Frontend**: Next.js, Tailwind CSS, shadcn/ui
- **Backend**: {% if is_web3 %}Smart Contracts{% else %}API/Serverless{% endif %}
{% if uses_auth %}- **Authentication**: Clerk
{% endif %}{% if is_web3 %}- **Smart Contract Language**: {{ smart_contract_language }}

#### Web3 Configuration
- **Wallet Integration**: {{ wallet_integration }}
{% if multi_chain_support %}- **Multi-Chain Support**: {{ multi_chain_support }}
{% endif %}{% if cross_chain_solution %}- **Cross-Chain Solution**: {{ cross_chain_solution }}
{% endif %}{% endif %}
### Core Features
{{ core_features }}

### Development Phases

#### Phase 1
{{ phase1 }}

#### Phase 2
{{ phase2 }}

#### Phase 3
{{ phase3 }}

### User Experience Design

#### User Journeys & Page Structure
{{ user_journeys }}

#### Key User Flows
- **Landing Page**: User's first impression and entry point
- **Navigation**: How users move between pages and features
- **Core Actions**: Primary user interactions and goals
- **Onboarding**: New user experience and feature discovery

### Target Audience
**Primary Audience**: {{ target_audience }}
{% if additional_context %}
### Additional Context & Requirements
{{ additional_context }}
{% endif %}"#;

// =============================================================================
// Refinement questions
// =============================================================================

const REFINEMENT_QUESTIONS_SYSTEM_TEMPLATE: &str = r#"You are a senior product manager reviewing a draft Product Requirements Document.

Identify the gaps, ambiguities and risky assumptions in the document and ask clarifying questions that would most improve it.

Respond with a JSON array of exactly 10 objects and nothing else. Each object has exactly these fields:
- "id": integer from 1 to 10, unique
- "question": the question text
- "category": one of "technical", "ux", "security", "market", "resources"
- "priority": one of "high", "medium", "low"

Example element:
{"id": 1, "question": "Which browsers must be supported at launch?", "category": "technical", "priority": "medium"}"#;

const REFINEMENT_QUESTIONS_USER_TEMPLATE: &str = r#"Please analyze this PRD and generate refinement questions:

{{ prd }}

Generate exactly 10 questions in JSON format as specified in the system prompt."#;

// =============================================================================
// Refinement processing
// =============================================================================

const PROCESS_REFINEMENT_SYSTEM_TEMPLATE: &str = r#"You are a senior product manager. You receive an original Product Requirements Document and the author's answers to a set of clarifying questions.

Rewrite the PRD so that it incorporates every answer. Keep the original structure where it still fits, resolve contradictions in favour of the answers, and keep questions marked [SKIPPED] as open items in a final "Open Questions" section.

Return only the complete refined PRD in Markdown."#;

const PROCESS_REFINEMENT_USER_TEMPLATE: &str = r#"Original PRD:
{{ prd }}

Refinement Answers:
{% for item in answers %}
Question {{ item.number }}: {{ item.question }}
Answer: {{ item.answer }}
{% endfor %}"#;

// =============================================================================
// Target documentation
// =============================================================================

const GENERATE_DOCS_SYSTEM_TEMPLATE: &str = r#"You are a staff engineer preparing context files for an AI coding assistant.

Given a refined Product Requirements Document and the original questionnaire answers, write the requested documentation file. The file must be self-contained Markdown that the assistant can follow while implementing the project:
- Implementation.md: staged implementation plan with tasks and dependencies
- project_structure.md: directory layout and module responsibilities
- UI_UX_doc.md: design system, screens and interaction patterns
- Bug_tracking.md: template and conventions for recording and resolving issues

Return only the file content."#;

const GENERATE_DOCS_USER_TEMPLATE: &str = r#"PRD Content:
{{ prd }}

Project Answers:
{{ answers_json }}

Please generate the {{ filename }} file for {{ target_name }} based on the above PRD and project context."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_template_exists() {
        for name in list_builtin_templates() {
            assert!(get_builtin_template(name).is_some(), "missing {}", name);
        }
        assert!(get_builtin_template("nope").is_none());
    }
}
