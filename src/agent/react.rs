use crate::agent::ReasoningLoop;
use crate::agent::prompt::react_prompt;
use crate::errors::AgentError;
use crate::llm::LlmClient;
use crate::tools::{ToolGateway, ToolId};
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};

const FINAL_ANSWER: &str = "Final Answer:";

/// Where the model must stop so the loop can supply the observation
const STOP_SEQUENCE: &str = "\nObservation:";

static ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
        .expect("action pattern")
});
static ACTION_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Action\s*\d*\s*:").expect("action-only pattern"));
static ACTION_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Action\s*\d*\s*Input\s*\d*\s*:").expect("action input pattern")
});

/// One parsed model turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Action { tool: String, input: String },
    Finish(String),
    /// Unparseable output; the message is fed back as the observation
    Invalid(String),
}

/// Parse a Thought/Action/Action Input or Final Answer turn
pub fn parse_step(output: &str) -> Step {
    let includes_answer = output.contains(FINAL_ANSWER);

    if let Some(caps) = ACTION.captures(output) {
        if includes_answer {
            return Step::Invalid(format!(
                "Parsing LLM output produced both a final answer and a parse-able action: {}",
                output.trim()
            ));
        }
        return Step::Action {
            tool: caps[1].trim().to_string(),
            input: caps[2].trim_matches(' ').trim_matches('"').to_string(),
        };
    }

    if let Some((_, answer)) = output.rsplit_once(FINAL_ANSWER) {
        return Step::Finish(answer.trim().to_string());
    }

    if !ACTION_ONLY.is_match(output) {
        Step::Invalid("Invalid Format: Missing 'Action:' after 'Thought:'".to_string())
    } else if !ACTION_INPUT.is_match(output) {
        Step::Invalid("Invalid Format: Missing 'Action Input:' after 'Action:'".to_string())
    } else {
        Step::Invalid(format!("Could not parse LLM output: `{}`", output.trim()))
    }
}

/// ReAct loop: the model reasons in text and calls tools through the gateway
pub struct ReactLoop {
    llm: Arc<dyn LlmClient>,
    gateway: Arc<ToolGateway>,
}

impl ReactLoop {
    pub fn new(llm: Arc<dyn LlmClient>, gateway: Arc<ToolGateway>) -> Self {
        Self { llm, gateway }
    }

    async fn observe(&self, step: &Step) -> String {
        match step {
            Step::Action { tool, input } => match tool.parse::<ToolId>() {
                Ok(tool) => self.gateway.invoke(tool, input).await,
                Err(name) => format!(
                    "{} is not a valid tool, try one of [{}].",
                    name,
                    ToolId::ALL.map(|tool| tool.name()).join(", ")
                ),
            },
            Step::Invalid(message) => message.clone(),
            Step::Finish(_) => String::new(),
        }
    }
}

#[async_trait]
impl ReasoningLoop for ReactLoop {
    async fn run(&self, task: &str, max_steps: usize) -> Result<String, AgentError> {
        let mut scratchpad = String::new();

        for step_number in 1..=max_steps {
            let prompt = react_prompt(task, &scratchpad);
            let mut output = self.llm.complete(&prompt, &[STOP_SEQUENCE]).await?;
            // some endpoints ignore stop sequences
            if let Some(end) = output.find(STOP_SEQUENCE) {
                output.truncate(end);
            }

            let step = parse_step(&output);
            match &step {
                Step::Finish(answer) => {
                    ::log::info!(
                        "Agent finished after {} steps ({} characters)",
                        step_number,
                        answer.len()
                    );
                    return Ok(answer.clone());
                }
                Step::Action { tool, input } => {
                    ::log::info!("Step {}: {} <- {}", step_number, tool, input)
                }
                Step::Invalid(message) => {
                    ::log::warn!("Step {}: unparseable output: {}", step_number, message)
                }
            }

            let observation = self.observe(&step).await;
            ::log::debug!("Observation: {}", observation);

            scratchpad.push_str(&output);
            scratchpad.push_str("\nObservation: ");
            scratchpad.push_str(&observation);
            scratchpad.push_str("\nThought: ");
        }

        ::log::warn!("Agent reached the step limit of {}", max_steps);
        Err(AgentError::StepLimit(max_steps))
    }
}
