use crate::role::Role;
use serde::{Deserialize, Serialize};
use specaudit_oracle::{ChatMessage, ToolCall};

/// Output of one executed tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub call_id: String,
    pub name: String,
    pub content: String,
}

/// One entry of the shared transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Role,
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_responses: Vec<ToolResponse>,
}

impl Turn {
    pub fn said(speaker: Role, content: impl Into<String>) -> Self {
        Self {
            speaker,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_responses: Vec::new(),
        }
    }

    pub fn proposed(speaker: Role, content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            speaker,
            content,
            tool_calls,
            tool_responses: Vec::new(),
        }
    }

    pub fn executed(tool_responses: Vec<ToolResponse>) -> Self {
        Self {
            speaker: Role::Executor,
            content: None,
            tool_calls: Vec::new(),
            tool_responses,
        }
    }

    pub fn has_pending_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    pub fn mentions(&self, needle: &str) -> bool {
        self.content.as_deref().is_some_and(|c| c.contains(needle))
    }

    /// Plain-text form, as another participant sees this turn
    pub fn render(&self) -> String {
        let mut parts = Vec::new();
        if let Some(content) = self.content.as_deref().filter(|c| !c.trim().is_empty()) {
            parts.push(content.trim().to_string());
        }
        for call in &self.tool_calls {
            parts.push(format!("[calls {}({})]", call.name, call.arguments));
        }
        for response in &self.tool_responses {
            parts.push(format!("[{} returned]\n{}", response.name, response.content));
        }
        parts.join("\n")
    }
}

/// Ordered record of every turn in a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The conversation from `viewer`'s seat.
    ///
    /// The viewer's own turns are assistant messages, and the Executor's
    /// answers to them are tool messages. Everyone else's turns arrive as
    /// named user messages.
    pub fn messages_for(&self, viewer: Role) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.turns.len());
        let mut previous: Option<Role> = None;

        for turn in &self.turns {
            if turn.speaker == Role::Executor && previous == Some(viewer) {
                for response in &turn.tool_responses {
                    messages.push(ChatMessage::tool(
                        response.call_id.clone(),
                        response.content.clone(),
                    ));
                }
            } else if turn.speaker == viewer {
                let content = match &turn.content {
                    Some(content) => Some(content.clone()),
                    None if turn.tool_calls.is_empty() => Some(String::new()),
                    None => None,
                };
                messages.push(ChatMessage::assistant(content, turn.tool_calls.clone()));
            } else {
                messages.push(ChatMessage::user(turn.render()).named(turn.speaker.as_str()));
            }
            previous = Some(turn.speaker);
        }

        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use specaudit_oracle::ChatRole;

    fn sample() -> Transcript {
        let mut transcript = Transcript::new();
        transcript.push(Turn::said(Role::Initializer, "check foo"));
        transcript.push(Turn::proposed(
            Role::Analyst,
            None,
            vec![ToolCall::new("c1", "query_name", json!({"name": "foo"}))],
        ));
        transcript.push(Turn::executed(vec![ToolResponse {
            call_id: "c1".into(),
            name: "query_name".into(),
            content: "int foo(void);".into(),
        }]));
        transcript.push(Turn::said(Role::Analyst, "foo never checks its input"));
        transcript
    }

    #[test]
    fn own_calls_come_back_as_tool_messages() {
        let messages = sample().messages_for(Role::Analyst);
        let roles: Vec<_> = messages.iter().map(|m| m.role).collect();

        assert_eq!(
            roles,
            vec![ChatRole::User, ChatRole::Assistant, ChatRole::Tool, ChatRole::Assistant]
        );
        assert_eq!(messages[0].name.as_deref(), Some("initializer"));
        assert_eq!(messages[1].tool_calls.len(), 1);
        assert_eq!(messages[2].tool_call_id.as_deref(), Some("c1"));
    }

    #[test]
    fn other_roles_see_rendered_text() {
        let messages = sample().messages_for(Role::Critic);

        assert!(messages.iter().all(|m| m.role == ChatRole::User));
        assert_eq!(
            messages[1].content.as_deref(),
            Some(r#"[calls query_name({"name":"foo"})]"#)
        );
        assert_eq!(
            messages[2].content.as_deref(),
            Some("[query_name returned]\nint foo(void);")
        );
        assert_eq!(messages[2].name.as_deref(), Some("executor"));
    }
}
