//! The `adaptutor init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("adaptutor.toml").exists() {
        println!("adaptutor.toml already exists, skipping.");
    } else {
        std::fs::write("adaptutor.toml", SAMPLE_CONFIG)?;
        println!("Created adaptutor.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set GEMINI_API_KEY (or edit adaptutor.toml)");
    println!("  2. Run: adaptutor questions --learner asha --grade 3 --subject math --output round.json");
    println!("  3. Run: adaptutor evaluate --learner asha --grade 3 --subject math --questions round.json --answer 1=15");
    println!("  4. Run: adaptutor progress --learner asha");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# adaptutor configuration

default_provider = "gemini"
default_model = "gemini-2.5-flash"
default_temperature = 0.7
question_count = 5
generation_timeout_secs = 30
max_retries = 2
data_dir = "./adaptutor-data"

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.offline]
type = "offline"
"#;
