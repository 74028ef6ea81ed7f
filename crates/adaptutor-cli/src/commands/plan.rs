//! The `adaptutor plan` command.

use anyhow::Result;

use adaptutor_core::engine::StudyPlanResponse;
use adaptutor_core::model::Subject;

use super::{build_engine, print_json, GlobalArgs};

pub async fn execute(
    global: &GlobalArgs,
    learner: String,
    grade: u8,
    subject: Subject,
    name: Option<String>,
    provider: Option<String>,
    model: Option<String>,
) -> Result<()> {
    let engine = build_engine(global, provider.as_deref(), model.as_deref())?;
    let response = engine
        .generate_study_plan(&learner, grade, subject, name.as_deref())
        .await?;

    print_days(&response);
    print_json(&response)
}

fn print_days(response: &StudyPlanResponse) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Day", "Topic", "Time"]);
    for day in &response.plan.days {
        table.add_row(vec![
            Cell::new(&day.day),
            Cell::new(&day.topic),
            Cell::new(day.estimated_time.as_deref().unwrap_or("-")),
        ]);
    }

    eprintln!(
        "\n{} ({} level, {:?})",
        response.plan.week_title, response.difficulty_tier, response.source
    );
    eprintln!("{table}");
}
