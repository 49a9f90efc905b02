/// Fixed template for the grounded-answer generation call.
///
/// The matcher never depends on this content; changing the wording only
/// changes the shape of the generated explanation.
pub fn grounded_answer_prompt(query: &str, narrative: &str) -> String {
    format!(
        "You are a sociology teaching assistant. A student asked:\n\
         \"{query}\"\n\n\
         The most relevant first-person narrative from our corpus is below.\n\
         Using ONLY this narrative, respond with three labeled sections:\n\
         1. Quote: a short direct quote from the narrative that best \
         illustrates the student's question.\n\
         2. Summary: a two to three sentence summary of the narrative.\n\
         3. Concept: name and describe the sociological concept the \
         narrative illustrates, connecting it to the question.\n\n\
         Narrative:\n{narrative}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_query_and_narrative() {
        let p = grounded_answer_prompt("pay among genders", "I was paid less than him.");
        assert!(p.contains("\"pay among genders\""));
        assert!(p.ends_with("I was paid less than him."));
        assert!(p.contains("Quote:"));
        assert!(p.contains("Concept:"));
    }
}
