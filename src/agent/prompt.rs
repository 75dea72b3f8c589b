use crate::tools::ToolId;
use url::Url;

/// Build the instruction handed to the reasoning loop for one target page
pub fn task_description(url: &Url) -> String {
    format!(
        "Browse the website {url} and analyze its structure.

Please:
1. Load the page and analyze its structure
2. Extract key information (title, links count, navigation elements)
3. Based on your analysis, generate 3-5 realistic user behavior patterns

Each pattern should include:
- Navigation sequence (e.g., \"Click on a link → Wait 2 seconds → Scroll down\")
- Timing delays (realistic human delays)
- Scroll behavior

Format your final answer as follows:
- Start with the page structure as a JSON object with the keys \"title\", \
\"links_count\", \"sample_links\", \"sample_buttons\", \"has_navigation\", \
\"has_main_content\" and \"page_type\".
- Then list each pattern as **Pattern N: Title**, followed by one line per \
step starting with \"- \", and a line \"Expected outcome: ...\"."
    )
}

/// Render the ReAct prompt for `input` with the tool list and the transcript so far
pub fn react_prompt(input: &str, scratchpad: &str) -> String {
    let tools = ToolId::ALL
        .iter()
        .map(|tool| format!("{}: {}", tool.name(), tool.description()))
        .collect::<Vec<_>>()
        .join("\n");
    let tool_names = ToolId::ALL
        .iter()
        .map(|tool| tool.name())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are a helpful assistant that can browse websites and analyze their structure.

You have access to the following tools:
{tools}

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Begin!

Question: {input}
Thought:{scratchpad}"
    )
}
