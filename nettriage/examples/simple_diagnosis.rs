//! Example: diagnose a problem with the built-in rules.
//! Run with: cargo run --example simple_diagnosis -- "my phone keeps dropping wifi"

use nettriage::prelude::*;

fn main() -> Result<(), TriageError> {
    let problem = std::env::args()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ");
    let problem = if problem.trim().is_empty() {
        "My laptop wifi is really slow".to_string()
    } else {
        problem
    };

    let troubleshooter = Troubleshooter::builtin()?;
    let diagnosis = troubleshooter.diagnose_offline(&problem);

    println!("Problem: {}", problem);
    println!("Detected: {}", diagnosis.detected_issues.join(", "));
    for (i, step) in diagnosis.solutions.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
    println!("Confidence: {}%", diagnosis.confidence);
    for question in &diagnosis.follow_up_questions {
        println!("  ? {}", question);
    }
    Ok(())
}
