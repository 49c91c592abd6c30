/// Registered name of the quiz prompt inside the render stage's template registry.
pub const QUIZ_PROMPT_TEMPLATE_NAME: &str = "quiz_prompt";

/// Handlebars template rendered against `TemplateVariables`.
///
/// The answer-key labels below are instructions for the model only; nothing downstream parses them.
pub const QUIZ_PROMPT_TEMPLATE: &str = "
Generate a medical quiz based on the given articles.

For each document, create:
1. A multiple-choice question (MCQ) with four options, focused on **clinical decision-making or disease pathophysiology**. Explain why the correct answer is right.
2. A case-based scenario question.
3. A short-answer question requiring concise medical reasoning.

If there's no relevant content, generate a question based on general medical knowledge.

**Topic:** {{topic}}

**Articles:**
{{#each records}}
  {{content}}
  keywords: {{keywords}}
  title: {{title}}
{{/each}}

**Multiple-choice (MCQ):**  
Q: <clinical or pathophysiology-based question>  
A. <option1>  
B. <option2>  
C. <option3>  
D. <option4>  
**Correct answer:** <correct option>  
**Explanation:** <why the answer is correct, include relevant medical reasoning>  

**Case-based scenario:**  
A 45-year-old male patient presents with <symptoms>. He has a history of <relevant medical history>. Based on the given information, what is the most appropriate next step in management?  
**Answer:** <correct management approach>  

**Short-answer:**  
Q: <Short but conceptually challenging medical question>  
**Answer:** <concise and precise medical response>  

  ";

pub const DEFAULT_TOPIC: &str = "Generate a quiz on COVID-19 treatments.";

pub const EXAMPLE_TOPICS: &[&str] = &[
    "Generate a quiz on COVID-19 treatments.",
    "Generate a quiz on Autoimmune Disorders.",
    "Create a quiz about Pneumonia.",
    "Give me practice questions on Diabetes.",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_carries_structural_labels() {
        for label in [
            "**Multiple-choice (MCQ):**",
            "**Case-based scenario:**",
            "**Short-answer:**",
            "**Correct answer:**",
            "**Explanation:**",
            "**Answer:**",
        ] {
            assert!(QUIZ_PROMPT_TEMPLATE.contains(label), "missing {}", label);
        }
    }

    #[test]
    fn test_default_topic_is_first_example() {
        assert_eq!(EXAMPLE_TOPICS.first(), Some(&DEFAULT_TOPIC));
    }
}
