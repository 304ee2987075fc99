//! Example: classify against a replacement knowledge base.
//! Run with: cargo run --example custom_rules path/to/knowledge.json "problem text"

use nettriage::knowledge::load_from_file;
use nettriage::{Classifier, ScoringConfig, StrategyKind};
use std::path::Path;
use std::sync::Arc;

fn main() -> Result<(), nettriage::TriageError> {
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .unwrap_or_else(|| "tests/fixtures/office_knowledge.json".to_string());
    let problem = args.collect::<Vec<_>>().join(" ");
    let path = Path::new(&path);

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example custom_rules [path/to/knowledge.json] [problem]");
        std::process::exit(1);
    }

    let kb = Arc::new(load_from_file(path)?);
    let scoring = ScoringConfig {
        max_solutions: 3,
        ..ScoringConfig::default()
    };

    for kind in [StrategyKind::Signal, StrategyKind::Keyword] {
        let classifier = Classifier::new(kb.clone(), scoring.clone()).with_strategy(kind.build());
        let diagnosis = classifier.classify(&problem);
        println!(
            "[{}] {} ({}%)",
            kind,
            diagnosis.detected_issues.join(", "),
            diagnosis.confidence
        );
        for step in &diagnosis.solutions {
            println!("    - {}", step);
        }
    }
    Ok(())
}
