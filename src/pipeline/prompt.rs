//! Question synthesis, context formatting, and the analysis prompt.

use crate::retrieval::Passage;

/// System prompt carrying the classification contract. The precedence
/// rules are ordered: added sugar is checked before anything else and caps
/// the verdict at MODERATE regardless of what else the list contains.
pub const ANALYSIS_SYSTEM_PROMPT: &str = "\
You are a pediatric nutrition expert analyzing children's cereal ingredients. You ground every \
claim in the provided food-labeling guidelines and you are honest about trade-offs.

Classify the ingredient list using these rules, applied in order:

1. If the ingredients contain ANY added sugar (sugar, cane sugar, brown sugar, corn syrup, \
high-fructose corn syrup, honey, molasses, or an equivalent sweetener), the verdict is at most \
MODERATE, never GOOD. You must explicitly name the added sugar as a concern.
2. Otherwise, if the ingredients contain an artificial color or flavor, a chemical \
preservative, or a highly processed ingredient, the verdict is BAD.
3. Otherwise, the verdict is GOOD.

Your response MUST begin with exactly one of these lines:

## VERDICT: GOOD ✅
## VERDICT: MODERATE ⚠️
## VERDICT: BAD ❌

After the verdict line, structure your response as:

## Quick Summary
Two or three sentences a parent can act on.

## Detailed Analysis
Go ingredient by ingredient: what it is, why it is in the cereal, and what the guidelines say \
about it for children. Flag allergens. Explain vague terms like \"Natural Flavors\".

## Recommendations
Practical guidance: serving considerations and what to look for in a better alternative.";

/// Build the retrieval question from the ingredient list. The question is
/// fixed-form; only the ingredients vary.
pub fn synthesize_question(ingredients: &str) -> String {
    format!(
        "Are these cereal ingredients safe and healthy for children: {ingredients}? \
Are there any concerning additives, preservatives, or artificial ingredients? \
What do vague terms like \"Natural Flavors\" actually mean? \
Are there common allergens? \
What are the nutritional benefits and concerns?"
    )
}

/// Render passages as numbered sources, in retrieval order, 1-based.
pub fn format_context(passages: &[Passage]) -> String {
    passages
        .iter()
        .enumerate()
        .map(|(i, passage)| format!("Source {}:\n{}", i + 1, passage.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Assemble the user prompt handed to the chat model.
pub fn build_analysis_prompt(
    cereal_name: &str,
    ingredients: &str,
    question: &str,
    passages: &[Passage],
) -> String {
    format!(
        "Cereal Product: {cereal_name}\n\n\
Ingredients List:\n{ingredients}\n\n\
Question:\n{question}\n\n\
Relevant Food Labeling Guidelines:\n{context}\n\n\
Analyze the ingredients against the guidelines above. Remember: your response must begin \
with the `## VERDICT:` line.",
        context = format_context(passages)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passages(contents: &[&str]) -> Vec<Passage> {
        contents
            .iter()
            .map(|c| Passage {
                content: c.to_string(),
                score: 0.5,
            })
            .collect()
    }

    #[test]
    fn system_prompt_states_precedence() {
        assert!(ANALYSIS_SYSTEM_PROMPT.contains("at most MODERATE, never GOOD"));
        assert!(ANALYSIS_SYSTEM_PROMPT.contains("high-fructose corn syrup"));
        assert!(ANALYSIS_SYSTEM_PROMPT.contains("## VERDICT: GOOD ✅"));
        assert!(ANALYSIS_SYSTEM_PROMPT.contains("## VERDICT: MODERATE ⚠️"));
        assert!(ANALYSIS_SYSTEM_PROMPT.contains("## VERDICT: BAD ❌"));
    }

    #[test]
    fn sugar_rule_comes_before_additive_rule() {
        let sugar = ANALYSIS_SYSTEM_PROMPT.find("ANY added sugar").unwrap();
        let additives = ANALYSIS_SYSTEM_PROMPT.find("artificial color").unwrap();
        assert!(sugar < additives);
    }

    #[test]
    fn question_embeds_ingredients() {
        let q = synthesize_question("Oats, Sugar, Salt");
        assert!(q.contains("Oats, Sugar, Salt"));
        assert!(q.contains("Natural Flavors"));
        assert!(q.contains("allergens"));
    }

    #[test]
    fn context_sources_are_one_based_and_ordered() {
        let rendered = format_context(&passages(&["first passage", "second passage"]));
        let first = rendered.find("Source 1:\nfirst passage").unwrap();
        let second = rendered.find("Source 2:\nsecond passage").unwrap();
        assert!(first < second);
        assert!(!rendered.contains("Source 0"));
    }

    #[test]
    fn empty_context_renders_empty() {
        assert_eq!(format_context(&[]), "");
    }

    #[test]
    fn prompt_contains_all_sections() {
        let prompt = build_analysis_prompt(
            "Sugar Puffs",
            "Corn, Sugar",
            "Is this safe?",
            &passages(&["guideline text"]),
        );
        assert!(prompt.contains("Cereal Product: Sugar Puffs"));
        assert!(prompt.contains("Ingredients List:\nCorn, Sugar"));
        assert!(prompt.contains("Question:\nIs this safe?"));
        assert!(prompt.contains("Source 1:\nguideline text"));
        assert!(prompt.contains("## VERDICT:"));
    }
}
