//! Tools the reasoning roles may call, and their execution.

use crate::error::Result;
use crate::role::Role;
use crate::store::FindingStore;
use crate::transcript::ToolResponse;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use specaudit_index::Resolver;
use specaudit_oracle::{ToolCall, ToolSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    QueryName,
    QueryCaller,
    WriteInconsistency,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::QueryName, Tool::QueryCaller, Tool::WriteInconsistency];

    pub fn name(self) -> &'static str {
        match self {
            Tool::QueryName => "query_name",
            Tool::QueryCaller => "query_caller",
            Tool::WriteInconsistency => "write_inconsistency",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// Both reasoning roles query; only the Critic writes verdicts
    pub fn permitted_for(self, role: Role) -> bool {
        match self {
            Tool::QueryName | Tool::QueryCaller => role.is_reasoning(),
            Tool::WriteInconsistency => role == Role::Critic,
        }
    }

    pub fn spec(self) -> ToolSpec {
        let (description, parameters) = match self {
            Tool::QueryName => (
                "Query function/macro/type definition",
                json!({
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "description": "Function, macro or type name" }
                    },
                    "required": ["name"]
                }),
            ),
            Tool::QueryCaller => (
                "Find caller functions",
                json!({
                    "type": "object",
                    "properties": {
                        "function_name": { "type": "string", "description": "Function whose callers to fetch" }
                    },
                    "required": ["function_name"]
                }),
            ),
            Tool::WriteInconsistency => (
                "Record a confirmed inconsistency and its fix, ending the review",
                json!({
                    "type": "object",
                    "properties": {
                        "inconsistency_summary": { "type": "string" },
                        "proposed_fix": { "type": "string" }
                    },
                    "required": ["inconsistency_summary", "proposed_fix"]
                }),
            ),
        };

        ToolSpec {
            name: self.name().to_string(),
            description: description.to_string(),
            parameters,
        }
    }
}

/// Tool signatures advertised to `role`
pub fn tool_specs(role: Role) -> Vec<ToolSpec> {
    Tool::ALL
        .into_iter()
        .filter(|tool| tool.permitted_for(role))
        .map(Tool::spec)
        .collect()
}

#[derive(Deserialize)]
struct QueryNameArgs {
    name: String,
}

#[derive(Deserialize)]
struct QueryCallerArgs {
    function_name: String,
}

#[derive(Deserialize)]
struct WriteInconsistencyArgs {
    inconsistency_summary: String,
    proposed_fix: String,
}

impl WriteInconsistencyArgs {
    fn is_blank(&self) -> bool {
        self.inconsistency_summary.trim().is_empty() && self.proposed_fix.trim().is_empty()
    }
}

/// Result of running one tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub response: ToolResponse,
    /// A verdict was written to the finding store
    pub verdict: bool,
}

/// Runs tool calls against the index and the finding store
pub struct ToolExecutor<'a> {
    resolver: Resolver<'a>,
}

impl<'a> ToolExecutor<'a> {
    pub fn new(resolver: Resolver<'a>) -> Self {
        Self { resolver }
    }

    /// Run `call` on behalf of `proposer`.
    ///
    /// Unknown tools, tools the proposer may not use, and undecodable
    /// arguments produce an error text for the oracle to read; only store
    /// I/O failures are errors.
    pub fn execute(
        &self,
        call: &ToolCall,
        proposer: Role,
        store: &mut FindingStore,
    ) -> Result<Execution> {
        let mut verdict = false;

        let content = match Tool::from_name(&call.name) {
            None => {
                log::warn!("{proposer} called unknown tool {}", call.name);
                format!("Error: unknown tool `{}`", call.name)
            }
            Some(tool) if !tool.permitted_for(proposer) => {
                log::warn!("{proposer} is not allowed to call {}", call.name);
                format!("Error: tool `{}` is not available to the {proposer}", call.name)
            }
            Some(Tool::QueryName) => match parse_args::<QueryNameArgs>(call) {
                Ok(args) => {
                    log::debug!("query_name({})", args.name);
                    self.resolver
                        .query_name(&args.name)
                        .unwrap_or_else(|| format!("No definition found for `{}`", args.name))
                }
                Err(message) => message,
            },
            Some(Tool::QueryCaller) => match parse_args::<QueryCallerArgs>(call) {
                Ok(args) => {
                    log::debug!("query_caller({})", args.function_name);
                    let callers = self.resolver.resolve_caller(&args.function_name);
                    if callers.is_empty() {
                        format!("No callers found for `{}`", args.function_name)
                    } else {
                        callers
                    }
                }
                Err(message) => message,
            },
            Some(Tool::WriteInconsistency) => {
                match parse_args::<WriteInconsistencyArgs>(call) {
                    Ok(args) if args.is_blank() => {
                        log::warn!("{proposer} wrote an empty inconsistency");
                        format!(
                            "Error: invalid arguments for `{}`: inconsistency_summary and proposed_fix are both empty",
                            call.name
                        )
                    }
                    Ok(args) => {
                        verdict =
                            store.record_verdict(&args.inconsistency_summary, &args.proposed_fix)?;
                        if verdict {
                            log::info!("Inconsistency recorded: {}", args.inconsistency_summary);
                            "Inconsistency recorded.".to_string()
                        } else {
                            "Error: no finding to record the inconsistency in".to_string()
                        }
                    }
                    Err(message) => message,
                }
            }
        };

        Ok(Execution {
            response: ToolResponse {
                call_id: call.id.clone(),
                name: call.name.clone(),
                content,
            },
            verdict,
        })
    }
}

fn parse_args<T: DeserializeOwned>(call: &ToolCall) -> std::result::Result<T, String> {
    serde_json::from_str(&call.arguments).map_err(|e| {
        log::warn!("Bad arguments for {}: {}", call.name, e);
        format!("Error: invalid arguments for `{}`: {}", call.name, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tools_are_advertised_per_role() {
        let names = |role| {
            tool_specs(role)
                .into_iter()
                .map(|spec| spec.name)
                .collect::<Vec<_>>()
        };

        assert_eq!(names(Role::Analyst), vec!["query_name", "query_caller"]);
        assert_eq!(
            names(Role::Critic),
            vec!["query_name", "query_caller", "write_inconsistency"]
        );
        assert!(names(Role::Executor).is_empty());
        assert!(names(Role::Initializer).is_empty());
    }

    #[test]
    fn looks_tools_up_by_name() {
        assert_eq!(Tool::from_name("query_caller"), Some(Tool::QueryCaller));
        assert_eq!(Tool::from_name("rm_rf"), None);
    }
}
