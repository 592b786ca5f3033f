//! Delegation-prompt builder.
//!
//! Pure functions from registered sub-agent descriptors to the text the
//! orchestrator sees: one policy line per agent, plus the name, description
//! and schema of the delegation tool that reaches it. Output depends only on
//! the input order and content.

use serde_json::json;

use super::truncate_chars;
use super::types::{AgentDescriptor, ToolHandle};

/// Policy text used when no sub-agent registered.
pub const NO_AGENTS_POLICY: &str = "No specialized agents are currently available.";

/// Tools listed by name and description in each policy line.
const LISTED_TOOLS: usize = 3;

/// Description characters kept per listed tool.
const DESCRIPTION_CHARS: usize = 50;

/// Name of the sub-agent backed by tool server `server`.
pub fn sub_agent_name(server: &str) -> String {
    format!("{server}_agent")
}

/// Name of the orchestrator tool that delegates to `agent_name`.
pub fn delegation_tool_name(agent_name: &str) -> String {
    format!("delegate_to_{agent_name}")
}

/// Tool description telling the orchestrator what `agent` can do.
pub fn delegation_tool_description(agent: &AgentDescriptor) -> String {
    let tools_summary = if agent.tools.is_empty() {
        "various tools".to_string()
    } else {
        agent
            .tools
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "Delegate a query to the {name} specialized MCP agent. \
         This agent has access to: {tools_summary}. \
         Use this when the user's request involves {topic} related tasks.",
        name = agent.name,
        topic = agent.name.replace('_', " "),
    )
}

/// The orchestrator-side tool that delegates to `agent`.
pub fn delegation_tool(agent: &AgentDescriptor) -> ToolHandle {
    ToolHandle {
        name: delegation_tool_name(&agent.name),
        description: delegation_tool_description(agent),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The question or task to delegate"
                }
            },
            "required": ["query"]
        }),
    }
}

/// Build the delegation policy: one line per agent naming its capabilities
/// and the tool that reaches it.
pub fn build_delegation_policy(agents: &[AgentDescriptor]) -> String {
    if agents.is_empty() {
        return NO_AGENTS_POLICY.to_string();
    }

    agents
        .iter()
        .map(policy_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn policy_line(agent: &AgentDescriptor) -> String {
    let tool_name = delegation_tool_name(&agent.name);
    if agent.tools.is_empty() {
        return format!(
            "- For general tasks that may fit {} domain, use {tool_name}",
            agent.name.replace('_', " ")
        );
    }

    let mut capabilities = agent
        .tools
        .iter()
        .take(LISTED_TOOLS)
        .map(describe_tool)
        .collect::<Vec<_>>()
        .join(", ");
    if agent.tools.len() > LISTED_TOOLS {
        capabilities.push_str(&format!(
            " and {} more tools",
            agent.tools.len() - LISTED_TOOLS
        ));
    }

    format!("- For tasks involving {capabilities}, use {tool_name}")
}

fn describe_tool(tool: &ToolHandle) -> String {
    if tool.description.is_empty() {
        return tool.name.clone();
    }
    let short = truncate_chars(&tool.description, DESCRIPTION_CHARS);
    let ellipsis = if short.len() < tool.description.len() {
        "..."
    } else {
        ""
    };
    format!("{} ({short}{ellipsis})", tool.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::types::{ModelSpec, Provider};

    fn tool(name: &str, description: &str) -> ToolHandle {
        ToolHandle {
            name: name.to_string(),
            description: description.to_string(),
            input_schema: json!({"type": "object"}),
        }
    }

    fn agent(server: &str, tools: Vec<ToolHandle>) -> AgentDescriptor {
        AgentDescriptor {
            name: sub_agent_name(server),
            server: server.to_string(),
            model: ModelSpec {
                provider: Provider::OpenAi,
                model: "gpt-4o-mini".to_string(),
                temperature: 0.0,
                max_tokens: 2000,
            },
            tools,
        }
    }

    #[test]
    fn empty_agent_set_yields_placeholder() {
        assert_eq!(build_delegation_policy(&[]), NO_AGENTS_POLICY);
    }

    #[test]
    fn one_line_per_agent_in_input_order() {
        let agents = vec![
            agent("search_web", vec![tool("tavily_search", "Search the web")]),
            agent("doc_retriever", vec![tool("search_documents", "")]),
        ];

        let policy = build_delegation_policy(&agents);
        let lines: Vec<&str> = policy.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "- For tasks involving tavily_search (Search the web), use delegate_to_search_web_agent"
        );
        assert_eq!(
            lines[1],
            "- For tasks involving search_documents, use delegate_to_doc_retriever_agent"
        );
    }

    #[test]
    fn long_descriptions_are_truncated() {
        let long = "x".repeat(80);
        let agents = vec![agent("web", vec![tool("fetch", &long)])];

        let policy = build_delegation_policy(&agents);

        assert!(policy.contains(&format!("fetch ({}...)", "x".repeat(50))));
        assert!(!policy.contains(&"x".repeat(51)));
    }

    #[test]
    fn lists_three_tools_and_counts_the_rest() {
        let tools = (1..=5)
            .map(|i| tool(&format!("tool_{i}"), ""))
            .collect();
        let policy = build_delegation_policy(&[agent("kit", tools)]);

        assert_eq!(
            policy,
            "- For tasks involving tool_1, tool_2, tool_3 and 2 more tools, use delegate_to_kit_agent"
        );
    }

    #[test]
    fn policy_is_deterministic() {
        let agents = vec![
            agent("a", vec![tool("one", "first tool")]),
            agent("b", vec![tool("two", "second tool"), tool("three", "")]),
        ];
        assert_eq!(
            build_delegation_policy(&agents),
            build_delegation_policy(&agents.clone())
        );
    }

    #[test]
    fn delegation_tool_mentions_agent_tools() {
        let descriptor = agent(
            "search_web",
            vec![tool("tavily_search", ""), tool("tavily_extract", "")],
        );
        let handle = delegation_tool(&descriptor);

        assert_eq!(handle.name, "delegate_to_search_web_agent");
        assert!(handle.description.contains("tavily_search, tavily_extract"));
        assert!(handle.description.contains("search web agent related tasks"));
        assert_eq!(handle.input_schema["required"][0], "query");
    }
}
