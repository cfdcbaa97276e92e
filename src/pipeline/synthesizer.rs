use crate::llm::LLMClient;
use crate::types::Result;
use tracing::debug;

/// Every fact the model returns must start with this sentence.
pub const FACT_PREFIX: &str = "The team has decided to";

/// Worked example embedded in the prompt: three calls where later calls
/// revise earlier decisions, and the facts that survive.
const WORKED_EXAMPLE: &str = r#"Call Log 1

1
00:01:11,430 --> 00:01:40,520
John: Hello, everybody. Let's start with the product design discussion. I think we should go with a modular design for our product. It will allow us to easily add or remove features as needed.

2
00:01:41,450 --> 00:01:49,190
Sara: I agree with John. A modular design will provide us with the flexibility we need. Also, I suggest we use a responsive design to ensure our product works well on all devices. Finally, I think we should use websockets to improve latency and provide real-time updates.

3
00:01:49,340 --> 00:01:50,040
Mike: Sounds good to me. I also propose we use a dark theme for the user interface. It's trendy and reduces eye strain for users. Let's hold off on the websockets for now since it's a little bit too much work.

Call Log 2

1
00:01:11,430 --> 00:01:40,520
John: After giving it some more thought, I believe we should also consider a light theme option for the user interface. This will cater to users who prefer a brighter interface.

2
00:01:41,450 --> 00:01:49,190
Sara: That's a great idea, John. A light theme will provide an alternative to users who find the dark theme too intense.

3
00:01:49,340 --> 00:01:50,040
Mike: I'm on board with that.

Call Log 3

1
00:01:11,430 --> 00:01:40,520
John: I've been thinking about our decision on the responsive design. While it's important to ensure our product works well on all devices, I think we should focus on desktop first. Our primary users will be using our product on desktops.

2
00:01:41,450 --> 00:01:49,190
Sara: I see your point, John. Focusing on desktop first will allow us to better cater to our primary users. I agree with this change.

3
00:01:49,340 --> 00:01:50,040
Mike: I agree as well. I also think the idea of using a modular design doesn't make sense. Let's not make that decision yet.

Question: "What are our product design decisions?"

The team has decided to focus on a desktop-first design
The team has decided to provide both dark and light theme options for the user interface."#;

/// Build the single instruction sent to the completion model.
pub fn build_prompt(question: &str, combined_documents: &str) -> String {
    format!(
        r#"Question: {question}

Documents: {combined_documents}


You are given a question and the call logs of a series of meetings. The call logs are ordered from the oldest call to the most recent one.

Answer the question with the final list of facts, following these rules:
- Write each fact on its own line, in simple and clear language.
- Do not start a line with a dash, a number or any other bullet character.
- Put exactly one fact on each line and never repeat a fact.
- Leave out facts that do not answer the question.
- Later calls take precedence: when a call changes or reverses an earlier decision, keep only the most recent outcome.
- Start every fact with '{prefix}'.

Desired output format:
Fact 1
Fact 2
and so on

Example START:
{example}
Example END"#,
        prefix = FACT_PREFIX,
        example = WORKED_EXAMPLE,
    )
}

/// Split a completion into facts: one per non-blank line, trimmed, in order.
pub fn parse_facts(completion: &str) -> Vec<String> {
    completion
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Turns the fetched call logs and the question into a list of facts.
///
/// Recency weighting and conflict resolution are left to the model; the
/// synthesizer only controls input order and output parsing.
pub struct FactSynthesizer {
    llm: Box<dyn LLMClient>,
}

impl FactSynthesizer {
    pub fn new(llm: Box<dyn LLMClient>) -> Self {
        Self { llm }
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    pub async fn synthesize(
        &self,
        question: &str,
        combined_documents: &str,
    ) -> Result<Vec<String>> {
        let prompt = build_prompt(question, combined_documents);
        debug!(
            model = self.llm.model_name(),
            prompt_chars = prompt.len(),
            "Requesting facts"
        );

        let completion = self.llm.generate(&prompt).await?;
        let facts = parse_facts(&completion);

        debug!(facts = facts.len(), "Parsed facts from completion");
        Ok(facts)
    }
}
