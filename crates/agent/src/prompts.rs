//! Instruction texts sent as system prompts.

use inkloop_tools::ActionRegistry;

/// Stop sequence the text-directive loop asks the model to emit after an
/// action line.
pub const PAUSE: &str = "<PAUSE>";

/// System prompt for [`crate::ActionAgent`], listing the actions in `registry`.
pub fn action_prompt(registry: &ActionRegistry) -> String {
    format!(
        "You run in a loop of Thought, Action, {PAUSE}, Observation.
At the end of the loop you output an Answer.
Use Thought to describe your thoughts about the question you have been asked.
Use Action to run one of the actions available to you, then return {PAUSE}.
Observation will be the result of running those actions.

Your available actions are:

{actions}

If available, always call a tool to inform your decisions, never use your parametric knowledge when a tool can be called.

When you have decided that you need to call a tool, output {PAUSE} and stop thereafter!

Example session:

Question: How much does a Bulldog weigh?
Thought: I should look the dogs weight using average_dog_weight
Action: average_dog_weight: Bulldog
{PAUSE}
----- execution stops here -----
You will be called again with this:

Observation: A Bulldog weights 51 lbs

You then output:

Answer: A bulldog weights 51 lbs",
        actions = registry.describe()
    )
}

/// System prompt for [`crate::ToolCallingAgent`].
pub const RESEARCH_ASSISTANT: &str = "You are a smart research assistant. Use the search engine to look up information. \
You are allowed to make multiple calls (either together or in sequence). \
Whenever you can, try to call multiple tools at once, to bring down inference time! \
Only look up information when you are sure of what you want. \
If you need to look up some information before asking a follow up question, you are allowed to do that!";

pub const PLAN: &str = "You are an expert writer tasked with writing a high level outline of an essay. \
Write such an outline for the user provided topic. Give an outline of the essay along with any relevant notes \
or instructions for the sections.";

pub const REFLECTION: &str = "You are a teacher grading an essay submission. \
Generate critique and recommendations for the user's submission. \
Provide detailed recommendations, including requests for length, depth, style, etc.";

pub const RESEARCH_PLAN: &str = "You are a researcher charged with providing information that can \
be used when writing the following essay. Generate a list of search queries that will gather \
any relevant information. Only generate 3 queries max.";

pub const RESEARCH_CRITIQUE: &str = "You are a researcher charged with providing information that can \
be used when making any requested revisions (as outlined below). \
Generate a list of search queries that will gather any relevant information. Only generate 3 queries max.";

/// Writer system prompt with the research snippets inlined.
pub fn writer(content: &str) -> String {
    format!(
        "You are an essay assistant tasked with writing excellent 5-paragraph essays. \
Generate the best essay possible for the user's request and the initial outline. \
If the user provides critique, respond with a revised version of your previous attempts. \
Utilize all the information below as needed:
------
<content>
{content}
</content>"
    )
}

/// How the research steps ask for `{"queries": [...]}`.
pub const QUERY_FORMAT: &str = r#"The output should be formatted as a JSON instance that conforms to the JSON schema below.

As an example, for the schema {"properties": {"foo": {"type": "array", "items": {"type": "string"}}}, "required": ["foo"]}
the object {"foo": ["bar", "baz"]} is a well-formatted instance of the schema. The object {"properties": {"foo": ["bar", "baz"]}} is not well-formatted.

Here is the output schema:
```
{"properties": {"queries": {"description": "List of research queries", "type": "array", "items": {"type": "string"}}}, "required": ["queries"]}
```"#;

/// User turn of the ResearchPlan step.
pub fn research_plan_request(task: &str) -> String {
    format!("Generate research queries based on the given task.\n{QUERY_FORMAT}\nTask: {task}\n")
}

/// User turn of the ResearchCritique step.
pub fn research_critique_request(critique: &str) -> String {
    format!(
        "Generate research queries based on the given critique.\n{QUERY_FORMAT}\nCritique: {critique}\n"
    )
}

/// User turn of the Generate step.
pub fn draft_request(task: &str, plan: &str) -> String {
    format!("{task}\n\nHere is my plan:\n\n{plan}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_prompt_lists_registry() {
        let prompt = action_prompt(&ActionRegistry::builtin());
        assert!(prompt.contains("calculate:\ne.g. calculate: 4 * 7 / 3"));
        assert!(prompt.contains("average_dog_weight:\ne.g. average_dog_weight: Collie"));
        assert!(prompt.contains("Action: average_dog_weight: Bulldog\n<PAUSE>"));
    }

    #[test]
    fn writer_inlines_content() {
        let prompt = writer("a\n\nb");
        assert!(prompt.ends_with("<content>\na\n\nb\n</content>"));
    }

    #[test]
    fn draft_request_layout() {
        assert_eq!(
            draft_request("Write about X", "1. Intro"),
            "Write about X\n\nHere is my plan:\n\n1. Intro"
        );
    }

    #[test]
    fn research_requests_carry_schema() {
        let req = research_plan_request("agents");
        assert!(req.starts_with("Generate research queries based on the given task.\n"));
        assert!(req.ends_with("Task: agents\n"));
        assert!(research_critique_request("too short").contains("\"queries\""));
    }
}
