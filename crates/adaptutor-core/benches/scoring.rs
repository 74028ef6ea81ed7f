use criterion::{black_box, criterion_group, criterion_main, Criterion};

use adaptutor_core::model::{AnswerSet, Question, Tier};
use adaptutor_core::scoring::{aggregate, classify, next_tier};

const TOPICS: [&str; 6] = [
    "Addition",
    "Subtraction",
    "Fractions",
    "Grammar",
    "Spelling",
    "Vocabulary",
];

fn make_round(n: usize) -> (Vec<Question>, AnswerSet) {
    let questions: Vec<Question> = (0..n)
        .map(|i| Question {
            id: (i + 1).to_string(),
            question: format!("Question {i}"),
            question_hindi: None,
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            options_hindi: vec![],
            correct_answer: "a".into(),
            topic: TOPICS[i % TOPICS.len()].to_string(),
            difficulty: Tier::Intermediate,
            explanation: None,
            explanation_hindi: None,
        })
        .collect();
    let answers = questions
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 3 != 0)
        .map(|(i, q)| (q.id.clone(), if i % 4 == 0 { "b" } else { "a" }.to_string()))
        .collect();
    (questions, answers)
}

fn bench_round_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_scoring");

    for n in [5usize, 50, 500] {
        let (questions, answers) = make_round(n);
        group.bench_function(format!("{n}_questions"), |b| {
            b.iter(|| {
                let round = aggregate(black_box(&questions), black_box(&answers));
                let classification = classify(&round.topics);
                let tier = next_tier(round.score_percentage().unwrap_or(0.0));
                (classification, tier)
            })
        });
    }

    group.finish();
}

fn bench_next_tier(c: &mut Criterion) {
    c.bench_function("next_tier", |b| {
        b.iter(|| {
            for pct in [0.0, 49.9, 60.0, 79.9, 80.0, 100.0] {
                black_box(next_tier(black_box(pct)));
            }
        })
    });
}

criterion_group!(benches, bench_round_scoring, bench_next_tier);
criterion_main!(benches);
