//! The `adaptutor evaluate` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use adaptutor_core::engine::EvaluationSummary;
use adaptutor_core::model::{AnswerSet, Question, Subject};

use super::{build_engine, print_json, GlobalArgs};

/// Either a bare question array or a saved question set.
#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionFile {
    Set { questions: Vec<Question> },
    List(Vec<Question>),
}

pub async fn execute(
    global: &GlobalArgs,
    learner: String,
    grade: u8,
    subject: Subject,
    questions_path: PathBuf,
    answers_path: Option<PathBuf>,
    answer_args: Vec<String>,
) -> Result<()> {
    let questions = read_questions(&questions_path)?;

    let mut answers = match &answers_path {
        Some(path) => read_answers(path)?,
        None => AnswerSet::new(),
    };
    for arg in &answer_args {
        let (id, option) = parse_answer_arg(arg)?;
        answers.insert(id, option);
    }

    let engine = build_engine(global, None, None)?;
    let summary = engine
        .evaluate_and_adapt(&learner, &questions, &answers, grade, subject)
        .await?;

    print_summary(&summary);
    print_json(&summary)
}

fn read_questions(path: &Path) -> Result<Vec<Question>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read questions: {}", path.display()))?;
    let file: QuestionFile = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse questions: {}", path.display()))?;
    Ok(match file {
        QuestionFile::Set { questions } | QuestionFile::List(questions) => questions,
    })
}

fn read_answers(path: &Path) -> Result<AnswerSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answers: {}", path.display()))
}

fn parse_answer_arg(arg: &str) -> Result<(String, String)> {
    let (id, option) = arg
        .split_once('=')
        .with_context(|| format!("expected ID=OPTION, got '{arg}'"))?;
    anyhow::ensure!(!id.trim().is_empty(), "answer '{arg}' has an empty question id");
    Ok((id.trim().to_string(), option.to_string()))
}

fn print_summary(summary: &EvaluationSummary) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Topic", "Correct", "Total", "Score"]);
    for (topic, tally) in &summary.topic_breakdown {
        table.add_row(vec![
            Cell::new(topic),
            Cell::new(tally.correct),
            Cell::new(tally.total),
            Cell::new(format!("{:.0}%", tally.percentage())),
        ]);
    }

    eprintln!("\n{table}");
    eprintln!(
        "Score: {}% ({}/{}), next level: {}",
        summary.score, summary.correct_answers, summary.total_questions, summary.current_tier
    );
    eprintln!("{}", summary.encouragement.english);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_args() {
        assert_eq!(
            parse_answer_arg("3=32 kg").unwrap(),
            ("3".to_string(), "32 kg".to_string())
        );
        assert_eq!(
            parse_answer_arg("q1=a=b").unwrap(),
            ("q1".to_string(), "a=b".to_string())
        );
        assert!(parse_answer_arg("no-separator").is_err());
        assert!(parse_answer_arg("=x").is_err());
    }

    #[test]
    fn question_file_shapes() {
        let question = r#"{"id": 1, "question": "Q", "options": ["a", "b"], "correctAnswer": "a", "topic": "T"}"#;

        let set: QuestionFile =
            serde_json::from_str(&format!(r#"{{"questions": [{question}], "source": "fallback"}}"#))
                .unwrap();
        assert!(matches!(set, QuestionFile::Set { questions } if questions[0].id == "1"));

        let list: QuestionFile = serde_json::from_str(&format!("[{question}]")).unwrap();
        assert!(matches!(list, QuestionFile::List(questions) if questions.len() == 1));
    }
}
