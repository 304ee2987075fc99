pub const SYSTEM_PROMPT: &str = "You are a helpful network troubleshooting assistant. \
When given a user's problem, return a JSON object with fields: \
solutions (array of short, practical step-by-step actions), \
reasoning (short plain-text explanation), \
confidence (number 0-100), \
followUpQuestions (array of up to 3 questions), \
detectedIssues (array of short tags). \
Only return valid JSON.";

pub fn build_user_prompt(problem: &str) -> String {
    format!(
        r#"Problem: "{}"

Respond only with JSON matching the schema: {{"solutions": [..], "reasoning": "..", "confidence": <number>, "followUpQuestions": [..], "detectedIssues": [..] }}"#,
        problem.trim()
    )
}
