use criterion::{black_box, criterion_group, criterion_main, Criterion};

use adaptutor_core::model::Tier;
use adaptutor_core::parser::{parse_questions, parse_study_plan};

fn question_array(n: usize) -> String {
    let items: Vec<String> = (1..=n)
        .map(|i| {
            format!(
                r#"{{"id": {i}, "question": "What is {i} + {i}?", "options": ["{a}", "{b}", "{c}", "{d}"], "correctAnswer": "{b}", "topic": "Addition", "difficulty": "beginner", "explanation": "{i} + {i} = {b}"}}"#,
                a = 2 * i - 1,
                b = 2 * i,
                c = 2 * i + 1,
                d = 2 * i + 2,
            )
        })
        .collect();
    format!("[{}]", items.join(",\n"))
}

fn bench_parse_questions(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_questions");

    let clean = question_array(5);
    let fenced = format!("```json\n{clean}\n```");
    let noisy = format!("Sure! Here are your questions:\n\n{clean}\n\nGood luck to the students!");
    let large = question_array(200);

    group.bench_function("clean", |b| {
        b.iter(|| parse_questions(black_box(&clean), Tier::Beginner, 5))
    });

    group.bench_function("fenced", |b| {
        b.iter(|| parse_questions(black_box(&fenced), Tier::Beginner, 5))
    });

    group.bench_function("noisy", |b| {
        b.iter(|| parse_questions(black_box(&noisy), Tier::Beginner, 5))
    });

    group.bench_function("200_questions", |b| {
        b.iter(|| parse_questions(black_box(&large), Tier::Beginner, 200))
    });

    group.finish();
}

fn bench_parse_plan(c: &mut Criterion) {
    let plan = r#"{"weekTitle": "Fractions Week", "days": [
        {"day": "Monday", "topic": "Halves", "activities": ["Cut a roti in half"]},
        {"day": "Tuesday", "topic": "Quarters", "activities": ["Share 4 mangoes"]},
        {"day": "Wednesday", "topic": "Comparing", "activities": ["Which is bigger?"]}
    ]}"#;

    c.bench_function("parse_study_plan", |b| {
        b.iter(|| parse_study_plan(black_box(plan)))
    });
}

criterion_group!(benches, bench_parse_questions, bench_parse_plan);
criterion_main!(benches);
