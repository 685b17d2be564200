use crate::error::{RagError, Result};
use crate::store::Hit;

pub const LEGAL_PROMPT_TEMPLATE: &str = "\
You are a senior legal expert in Indian law.

You must:
- Base every answer ONLY on the provided context (legal documents).
- Identify the relevant Act(s) and Section(s) of Indian law.
- Explain why that section applies.
- If the context is insufficient, say so clearly and suggest what information is missing.

Context:
{context}

Question:
{question}

Answer in this structure:
1. Brief conclusion
2. Applicable Act(s) and Section(s)
3. Reasoning (step-by-step)
4. Disclaimer that this is informational, not professional legal advice.
";

/// The template must contain `{context}` and `{question}` exactly once each
/// and nothing else brace-delimited.
pub fn validate_template(template: &str) -> Result<()> {
    let mut context = 0usize;
    let mut question = 0usize;
    for (_, _, name) in placeholders(template) {
        match name {
            "context" => context += 1,
            "question" => question += 1,
            other => {
                return Err(RagError::Template(format!(
                    "unexpected placeholder '{{{}}}'",
                    other
                )))
            }
        }
    }
    if context != 1 {
        return Err(RagError::Template(format!(
            "placeholder '{{context}}' must appear exactly once, found {}",
            context
        )));
    }
    if question != 1 {
        return Err(RagError::Template(format!(
            "placeholder '{{question}}' must appear exactly once, found {}",
            question
        )));
    }
    Ok(())
}

/// Substitute both slots in one pass so placeholder-looking text inside the
/// context or question is never re-expanded.
pub fn render_prompt(template: &str, context: &str, question: &str) -> Result<String> {
    validate_template(template)?;
    let mut out = String::with_capacity(template.len() + context.len() + question.len());
    let mut cursor = 0usize;
    for (start, end, name) in placeholders(template) {
        out.push_str(&template[cursor..start]);
        match name {
            "context" => out.push_str(context),
            "question" => out.push_str(question),
            _ => unreachable!("validated above"),
        }
        cursor = end;
    }
    out.push_str(&template[cursor..]);
    Ok(out)
}

/// Plain join of the retrieved texts, in retrieval order.
pub fn join_context(hits: &[Hit]) -> String {
    hits.iter().map(|h| h.text.as_str()).collect::<Vec<_>>().join("\n\n")
}

/// Byte spans (inclusive of braces) and names of `{...}` placeholders.
fn placeholders(template: &str) -> Vec<(usize, usize, &str)> {
    let mut spans = Vec::new();
    let mut i = 0usize;
    while i < template.len() {
        match template[i..].find('{') {
            None => break,
            Some(offset) => {
                let start = i + offset;
                match template[start..].find('}') {
                    None => break,
                    Some(close) => {
                        let end = start + close + 1;
                        spans.push((start, end, &template[start + 1..end - 1]));
                        i = end;
                    }
                }
            }
        }
    }
    spans
}
