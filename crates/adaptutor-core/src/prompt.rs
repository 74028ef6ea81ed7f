//! Prompt composition for question and study-plan generation.
//!
//! Composition is pure: the same inputs always produce the same text, and
//! nothing here talks to a provider.

use std::fmt::Write;

use crate::model::{Grade, Subject, Tier};
use crate::progress::PerformanceSummary;

/// Questions requested per round.
pub const DEFAULT_QUESTION_COUNT: usize = 5;

const MATH_BEGINNER: &[&str] = &[
    "Basic Addition and Subtraction",
    "Simple Multiplication",
    "Basic Fractions",
];
const MATH_INTERMEDIATE: &[&str] = &[
    "Large Numbers",
    "Decimals",
    "Simple Geometry",
    "Time and Money",
];
const MATH_ADVANCED: &[&str] = &[
    "Factors and Multiples",
    "H.C.F and L.C.M",
    "Percentages",
    "Mensuration",
    "Profit and Loss",
];

const ENGLISH_BEGINNER: &[&str] = &["Basic Vocabulary", "Simple Sentences", "Common Words"];
const ENGLISH_INTERMEDIATE: &[&str] = &["Reading Comprehension", "Grammar Basics", "Story Writing"];
const ENGLISH_ADVANCED: &[&str] = &["Advanced Grammar", "Essay Writing", "Literature Analysis"];

/// Math topics taught at a tier.
pub fn math_topics(tier: Tier) -> &'static [&'static str] {
    match tier {
        Tier::Beginner => MATH_BEGINNER,
        Tier::Intermediate => MATH_INTERMEDIATE,
        Tier::Advanced => MATH_ADVANCED,
    }
}

/// English topics taught at a tier.
pub fn english_topics(tier: Tier) -> &'static [&'static str] {
    match tier {
        Tier::Beginner => ENGLISH_BEGINNER,
        Tier::Intermediate => ENGLISH_INTERMEDIATE,
        Tier::Advanced => ENGLISH_ADVANCED,
    }
}

/// All catalogue topics for a subject at a tier, Math first.
pub fn topic_catalogue(subject: Subject, tier: Tier) -> Vec<&'static str> {
    let mut topics = Vec::new();
    if subject.includes_math() {
        topics.extend_from_slice(math_topics(tier));
    }
    if subject.includes_english() {
        topics.extend_from_slice(english_topics(tier));
    }
    topics
}

/// Inputs for an adaptive question request.
#[derive(Debug, Clone)]
pub struct QuestionPrompt<'a> {
    pub grade: Grade,
    pub subject: Subject,
    pub tier: Tier,
    pub question_count: usize,
    /// Prior performance, `None` for a first assessment.
    pub previous: Option<&'a PerformanceSummary>,
}

/// Build the adaptive question-generation prompt.
pub fn compose_question_prompt(input: &QuestionPrompt<'_>) -> String {
    let QuestionPrompt {
        grade,
        subject,
        tier,
        question_count,
        previous,
    } = input;

    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "You are a friendly tutor for students in grade {grade}, many of them in rural India."
    );
    let _ = writeln!(prompt);
    let _ = writeln!(
        prompt,
        "Generate {question_count} adaptive multiple-choice questions for {} at {tier} level.",
        subject.describe()
    );
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Keep the examples close to the students' daily life:");
    if subject.includes_math() {
        let _ = writeln!(
            prompt,
            "- Math: rupees, kilograms, metres, village markets, farms, cricket"
        );
    }
    if subject.includes_english() {
        let _ = writeln!(
            prompt,
            "- English: short stories about village life, animals, festivals, family"
        );
    }

    if let Some(previous) = previous {
        let _ = writeln!(prompt);
        let _ = writeln!(prompt, "Previous performance:");
        let _ = writeln!(
            prompt,
            "- Score: {}/{}",
            previous.last_score, previous.last_total
        );
        let _ = writeln!(
            prompt,
            "- Weak areas: {}",
            join_or(&previous.weak_areas, "None identified")
        );
        let _ = writeln!(
            prompt,
            "- Strong areas: {}",
            join_or(&previous.strong_areas, "None identified")
        );
        if !previous.weak_areas.is_empty() {
            let _ = writeln!(prompt);
            let _ = writeln!(
                prompt,
                "IMPORTANT: Focus most questions on the weak areas ({}) so the student can improve.",
                previous.weak_areas.join(", ")
            );
        }
    }

    let _ = writeln!(prompt);
    if subject.includes_math() {
        let _ = writeln!(
            prompt,
            "Math topic areas to cover: {}",
            math_topics(*tier).join(", ")
        );
    }
    if subject.includes_english() {
        let _ = writeln!(
            prompt,
            "English topic areas to cover: {}",
            english_topics(*tier).join(", ")
        );
    }

    let _ = writeln!(prompt);
    let _ = writeln!(
        prompt,
        "Format the output STRICTLY as a JSON array of exactly {question_count} objects with this structure:"
    );
    let _ = writeln!(prompt, "{}", question_schema(*tier));
    let _ = writeln!(prompt);
    let _ = writeln!(
        prompt,
        "Every \"correctAnswer\" must be copied exactly from \"options\". Use a short, specific \"topic\" name."
    );
    let _ = write!(
        prompt,
        "Make the questions engaging and age-appropriate for grade {grade}."
    );

    prompt
}

fn question_schema(tier: Tier) -> String {
    format!(
        r#"[
  {{
    "id": 1,
    "question": "Question text in simple English",
    "questionHindi": "Question in Hindi (Devanagari script)",
    "options": ["Option A", "Option B", "Option C", "Option D"],
    "optionsHindi": ["विकल्प A", "विकल्प B", "विकल्प C", "विकल्प D"],
    "correctAnswer": "Option A",
    "topic": "Specific topic name",
    "difficulty": "{tier}",
    "explanation": "Simple explanation of the answer",
    "explanationHindi": "उत्तर की सरल व्याख्या"
  }}
]"#
    )
}

/// Inputs for a personalized study-plan request.
#[derive(Debug, Clone)]
pub struct PlanPrompt<'a> {
    pub grade: Grade,
    pub subject: Subject,
    pub tier: Tier,
    pub learner_name: Option<&'a str>,
    pub previous: Option<&'a PerformanceSummary>,
}

/// Build the weekly study-plan prompt.
pub fn compose_plan_prompt(input: &PlanPrompt<'_>) -> String {
    let name = input.learner_name.unwrap_or("the student");
    let (score, strengths, weaknesses) = match input.previous {
        Some(p) => (
            format!("{}/{}", p.last_score, p.last_total),
            join_or(&p.strong_areas, "To be identified"),
            join_or(&p.weak_areas, "To be identified"),
        ),
        None => (
            "No assessment yet".to_string(),
            "To be identified".to_string(),
            "To be identified".to_string(),
        ),
    };

    format!(
        r#"You are a friendly tutor creating a personalized weekly learning plan for {name}, a grade {grade} student in rural India.

Assessment results:
- Subject: {subject}
- Score: {score}
- Strengths: {strengths}
- Weaknesses: {weaknesses}
- Current level: {tier}
- Suggested topics for this level: {catalogue}

Create an engaging weekly plan that:
1. Focuses on improving weak areas while reinforcing strengths
2. Uses examples from village life, local festivals, and farming
3. Works offline
4. Builds difficulty progressively through the week

Format the output STRICTLY as a JSON object:
{{
  "greeting": "Friendly greeting in English",
  "greetingHindi": "Friendly greeting in Hindi",
  "weekTitle": "Engaging week theme",
  "motivationalMessage": "Encouraging message based on performance",
  "days": [
    {{
      "day": "Monday",
      "topic": "Main topic for the day",
      "activities": ["Specific task", "Practice exercise", "Fun challenge"],
      "resources": ["Offline resource"],
      "estimatedTime": "30 minutes",
      "difficultyLevel": "{tier}"
    }}
  ],
  "weekendChallenge": {{
    "title": "Fun weekend project",
    "description": "What to do",
    "example": "Example to guide the student"
  }},
  "parentGuidance": {{
    "english": "Tips for parents",
    "hindi": "माता-पिता के लिए मार्गदर्शन"
  }}
}}"#,
        grade = input.grade,
        subject = input.subject,
        tier = input.tier,
        catalogue = topic_catalogue(input.subject, input.tier).join(", "),
    )
}

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(weak: &[&str], strong: &[&str]) -> PerformanceSummary {
        PerformanceSummary {
            last_score: 2,
            last_total: 5,
            weak_areas: weak.iter().map(|s| s.to_string()).collect(),
            strong_areas: strong.iter().map(|s| s.to_string()).collect(),
            current_tier: Tier::Beginner,
        }
    }

    fn base(previous: Option<&PerformanceSummary>) -> QuestionPrompt<'_> {
        QuestionPrompt {
            grade: Grade::new(3).unwrap(),
            subject: Subject::Math,
            tier: Tier::Intermediate,
            question_count: DEFAULT_QUESTION_COUNT,
            previous,
        }
    }

    #[test]
    fn question_prompt_encodes_tier_and_schema() {
        let prompt = compose_question_prompt(&base(None));
        assert!(prompt.contains("at intermediate level"));
        assert!(prompt.contains("\"difficulty\": \"intermediate\""));
        assert!(prompt.contains("JSON array of exactly 5 objects"));
        assert!(prompt.contains("Decimals"));
        assert!(!prompt.contains("English topic areas"));
        assert!(!prompt.contains("Previous performance"));
    }

    #[test]
    fn question_prompt_biases_toward_weak_areas() {
        let prev = summary(&["Fractions"], &["Addition"]);
        let prompt = compose_question_prompt(&base(Some(&prev)));
        assert!(prompt.contains("Score: 2/5"));
        assert!(prompt.contains("weak areas (Fractions)"));
        assert!(prompt.contains("Strong areas: Addition"));
    }

    #[test]
    fn question_prompt_without_weak_areas_has_no_focus_line() {
        let prev = summary(&[], &["Addition"]);
        let prompt = compose_question_prompt(&base(Some(&prev)));
        assert!(prompt.contains("Weak areas: None identified"));
        assert!(!prompt.contains("IMPORTANT"));
    }

    #[test]
    fn question_prompt_is_deterministic() {
        let prev = summary(&["Fractions"], &[]);
        assert_eq!(
            compose_question_prompt(&base(Some(&prev))),
            compose_question_prompt(&base(Some(&prev)))
        );
    }

    #[test]
    fn catalogue_for_both_mixes_subjects() {
        let topics = topic_catalogue(Subject::Both, Tier::Beginner);
        assert!(topics.contains(&"Simple Multiplication"));
        assert!(topics.contains(&"Basic Vocabulary"));
    }

    #[test]
    fn plan_prompt_mentions_weaknesses() {
        let prev = summary(&["Grammar Basics"], &[]);
        let prompt = compose_plan_prompt(&PlanPrompt {
            grade: Grade::new(4).unwrap(),
            subject: Subject::English,
            tier: Tier::Intermediate,
            learner_name: Some("Asha"),
            previous: Some(&prev),
        });
        assert!(prompt.contains("for Asha, a grade 4 student"));
        assert!(prompt.contains("Weaknesses: Grammar Basics"));
        assert!(prompt.contains("Strengths: To be identified"));
    }
}
