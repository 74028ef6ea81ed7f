//! The `adaptutor progress` command.

use anyhow::Result;

use adaptutor_core::model::Subject;
use adaptutor_core::progress::LearnerProgressRecord;

use super::{build_engine, print_json, GlobalArgs};

pub async fn execute(
    global: &GlobalArgs,
    learner: String,
    subject: Option<Subject>,
    json: bool,
) -> Result<()> {
    let engine = build_engine(global, None, None)?;
    let subjects = match subject {
        Some(subject) => vec![subject],
        None => vec![Subject::Math, Subject::English, Subject::Both],
    };

    let mut records = Vec::new();
    for subject in subjects {
        if let Some(record) = engine.get_progress(&learner, subject).await? {
            records.push(record);
        }
    }

    if json {
        return print_json(&records);
    }

    if records.is_empty() {
        println!("No progress recorded for {learner} yet.");
        return Ok(());
    }

    for record in &records {
        print_record(record);
    }
    Ok(())
}

fn print_record(record: &LearnerProgressRecord) {
    use comfy_table::{Cell, Table};

    println!(
        "{} / {}: level {}, {} round(s)",
        record.learner_id,
        record.subject,
        record.tier(),
        record.history.len()
    );
    println!("  Strengths:  {}", join_or_dash(record.strengths.iter()));
    println!("  Weaknesses: {}", join_or_dash(record.weaknesses.iter()));

    let mut table = Table::new();
    table.set_header(vec!["When", "Score", "Level played"]);
    for entry in &record.history {
        table.add_row(vec![
            Cell::new(entry.timestamp.format("%Y-%m-%d %H:%M")),
            Cell::new(format!("{}/{}", entry.score, entry.total_questions)),
            Cell::new(entry.difficulty),
        ]);
    }
    println!("{table}\n");
}

fn join_or_dash<'a>(items: impl Iterator<Item = &'a String>) -> String {
    let joined = items.map(String::as_str).collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined
    }
}
