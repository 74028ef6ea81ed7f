//! Built-in content served when generation is unavailable or unusable.

use crate::model::{Question, Subject, Tier};
use crate::plan::{ParentGuidance, PlanDay, StudyPlan, WeekendChallenge};
use crate::prompt::topic_catalogue;

struct Template {
    question: &'static str,
    options: [&'static str; 4],
    correct: &'static str,
    topic: &'static str,
    explanation: &'static str,
}

static MATH: [Template; 5] = [
    Template {
        question: "Ravi buys 3 mangoes for 5 rupees each. How many rupees does he pay?",
        options: ["8", "15", "10", "20"],
        correct: "15",
        topic: "Multiplication",
        explanation: "3 mangoes x 5 rupees = 15 rupees.",
    },
    Template {
        question: "What is 27 + 15?",
        options: ["32", "42", "41", "52"],
        correct: "42",
        topic: "Addition",
        explanation: "27 + 15 = 42.",
    },
    Template {
        question: "A farmer had 50 kg of rice and sold 18 kg. How much is left?",
        options: ["22 kg", "32 kg", "38 kg", "68 kg"],
        correct: "32 kg",
        topic: "Subtraction",
        explanation: "50 - 18 = 32.",
    },
    Template {
        question: "What is half of 20 rupees?",
        options: ["5 rupees", "10 rupees", "15 rupees", "40 rupees"],
        correct: "10 rupees",
        topic: "Fractions",
        explanation: "Half means dividing into 2 equal parts: 20 / 2 = 10.",
    },
    Template {
        question: "How many sides does a square have?",
        options: ["2", "3", "4", "5"],
        correct: "4",
        topic: "Geometry",
        explanation: "A square has 4 equal sides.",
    },
];

static ENGLISH: [Template; 5] = [
    Template {
        question: "Which word is a noun?",
        options: ["Run", "Blue", "Cat", "Quickly"],
        correct: "Cat",
        topic: "Grammar",
        explanation: "A noun names a person, place, animal, or thing.",
    },
    Template {
        question: "What is the past tense of 'run'?",
        options: ["Runned", "Ran", "Running", "Runs"],
        correct: "Ran",
        topic: "Grammar",
        explanation: "'Run' is irregular: today I run, yesterday I ran.",
    },
    Template {
        question: "Choose the correct spelling:",
        options: ["Happyness", "Happiness", "Hapiness", "Happines"],
        correct: "Happiness",
        topic: "Spelling",
        explanation: "The 'y' in happy changes to 'i' before '-ness'.",
    },
    Template {
        question: "Which word means the opposite of 'big'?",
        options: ["Large", "Tall", "Small", "Huge"],
        correct: "Small",
        topic: "Vocabulary",
        explanation: "Opposites are called antonyms; big and small are antonyms.",
    },
    Template {
        question: "Which sentence is correct?",
        options: [
            "She go to school.",
            "She goes to school.",
            "She going to school.",
            "She gone to school.",
        ],
        correct: "She goes to school.",
        topic: "Sentences",
        explanation: "With 'she', the verb takes an 's': she goes.",
    },
];

/// Exactly five schema-valid questions for `subject`, tagged with `tier`.
pub fn fallback_questions(subject: Subject, tier: Tier) -> Vec<Question> {
    let templates: Vec<&Template> = match subject {
        Subject::Math => MATH.iter().collect(),
        Subject::English => ENGLISH.iter().collect(),
        Subject::Both => vec![&MATH[1], &ENGLISH[0], &MATH[2], &ENGLISH[2], &MATH[4]],
    };

    templates
        .into_iter()
        .enumerate()
        .map(|(i, t)| Question {
            id: (i + 1).to_string(),
            question: t.question.to_string(),
            question_hindi: None,
            options: t.options.iter().map(|o| o.to_string()).collect(),
            options_hindi: Vec::new(),
            correct_answer: t.correct.to_string(),
            topic: t.topic.to_string(),
            difficulty: tier,
            explanation: Some(t.explanation.to_string()),
            explanation_hindi: None,
        })
        .collect()
}

const WEEKDAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// A plan focused on `weaknesses`, or on the tier's catalogue when there are none.
pub fn fallback_plan(subject: Subject, tier: Tier, weaknesses: &[String]) -> StudyPlan {
    let topics: Vec<String> = if weaknesses.is_empty() {
        topic_catalogue(subject, tier)
            .into_iter()
            .map(str::to_string)
            .collect()
    } else {
        weaknesses.to_vec()
    };

    let days = WEEKDAYS
        .iter()
        .zip(topics.iter().cycle())
        .map(|(day, topic)| PlanDay {
            day: day.to_string(),
            topic: topic.clone(),
            activities: vec![
                format!("Read and talk through one example of {topic}"),
                format!("Solve five practice problems on {topic}"),
                "Explain one answer to a family member".to_string(),
            ],
            resources: vec!["School textbook".to_string(), "Notebook".to_string()],
            estimated_time: Some("30 minutes".to_string()),
            difficulty_level: Some(tier.to_string()),
        })
        .collect();

    StudyPlan {
        greeting: Some("Hello! Here is your plan for this week.".to_string()),
        greeting_hindi: Some("नमस्ते! इस सप्ताह की आपकी योजना यह है।".to_string()),
        week_title: format!("{subject} Practice Week"),
        motivational_message: Some("A little practice every day adds up!".to_string()),
        days,
        weekend_challenge: Some(WeekendChallenge {
            title: "Teach it back".to_string(),
            description: "Pick your favourite topic from this week and teach it to a friend."
                .to_string(),
            example: None,
        }),
        parent_guidance: Some(ParentGuidance {
            english: "Ask your child to explain one thing they learned each day.".to_string(),
            hindi: "अपने बच्चे से हर दिन सीखी एक बात समझाने को कहें।".to_string(),
        }),
    }
}
