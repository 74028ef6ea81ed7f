//! adaptutor CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use adaptutor_core::model::Subject;

mod commands;

use commands::GlobalArgs;

#[derive(Parser)]
#[command(name = "adaptutor", version, about = "Adaptive assessments for school learners")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding learner progress (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an adaptive question set for a learner
    Questions {
        /// Learner identifier
        #[arg(long)]
        learner: String,

        /// School grade (1-12)
        #[arg(long)]
        grade: u8,

        /// Math, English, or Both
        #[arg(long)]
        subject: Subject,

        /// Provider name from the config file
        #[arg(long)]
        provider: Option<String>,

        /// Model to generate with
        #[arg(long)]
        model: Option<String>,

        /// Also write the question set to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Score a completed round and update the learner's progress
    Evaluate {
        /// Learner identifier
        #[arg(long)]
        learner: String,

        /// School grade (1-12)
        #[arg(long)]
        grade: u8,

        /// Math, English, or Both
        #[arg(long)]
        subject: Subject,

        /// Question set JSON (as written by `questions --output`)
        #[arg(long)]
        questions: PathBuf,

        /// JSON object mapping question id to the chosen option
        #[arg(long)]
        answers: Option<PathBuf>,

        /// A single answer as ID=OPTION (repeatable)
        #[arg(long = "answer", value_name = "ID=OPTION")]
        answer: Vec<String>,
    },

    /// Show a learner's progress
    Progress {
        /// Learner identifier
        #[arg(long)]
        learner: String,

        /// Limit to one subject
        #[arg(long)]
        subject: Option<Subject>,

        /// Print raw JSON records
        #[arg(long)]
        json: bool,
    },

    /// Build a weekly study plan from the learner's progress
    Plan {
        /// Learner identifier
        #[arg(long)]
        learner: String,

        /// School grade (1-12)
        #[arg(long)]
        grade: u8,

        /// Math, English, or Both
        #[arg(long)]
        subject: Subject,

        /// Learner's display name for the plan greeting
        #[arg(long)]
        name: Option<String>,

        /// Provider name from the config file
        #[arg(long)]
        provider: Option<String>,

        /// Model to generate with
        #[arg(long)]
        model: Option<String>,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,
    },

    /// Create a starter config
    Init,
}

#[tokio::main]
async fn main() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "adaptutor=info".parse::<tracing_subscriber::filter::Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let global = GlobalArgs {
        config: cli.config,
        data_dir: cli.data_dir,
    };

    let result = match cli.command {
        Commands::Questions {
            learner,
            grade,
            subject,
            provider,
            model,
            output,
        } => {
            commands::questions::execute(&global, learner, grade, subject, provider, model, output)
                .await
        }
        Commands::Evaluate {
            learner,
            grade,
            subject,
            questions,
            answers,
            answer,
        } => {
            commands::evaluate::execute(
                &global, learner, grade, subject, questions, answers, answer,
            )
            .await
        }
        Commands::Progress {
            learner,
            subject,
            json,
        } => commands::progress::execute(&global, learner, subject, json).await,
        Commands::Plan {
            learner,
            grade,
            subject,
            name,
            provider,
            model,
        } => commands::plan::execute(&global, learner, grade, subject, name, provider, model).await,
        Commands::ListModels { provider } => commands::list_models::execute(&global, provider),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
