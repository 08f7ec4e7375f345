//! The bounded four-role verification loop.

use crate::error::Result;
use crate::prompts::{analyst_prompt, critic_prompt, task_prompt};
use crate::role::Role;
use crate::store::FindingStore;
use crate::tools::{tool_specs, ToolExecutor};
use crate::transcript::{Transcript, Turn};
use crate::transition::{next_speaker, ProtocolViolation, Transition};
use specaudit_index::Resolver;
use specaudit_oracle::{ChatMessage, ChatRequest, Oracle};

pub const DEFAULT_MAX_TURNS: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Upper bound on transcript length, the Initializer's turn included
    pub max_turns: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The Critic recorded an inconsistency
    Confirmed,
    /// The Critic closed the session without recording anything
    Dismissed,
    /// The turn bound was reached first
    Exhausted,
    /// The transcript broke the speaking order
    Abandoned(ProtocolViolation),
}

impl SessionOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, SessionOutcome::Confirmed)
    }
}

#[derive(Debug, Clone)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    pub transcript: Transcript,
}

/// Verifies chunks one at a time against a resolver, recording findings.
pub struct VerificationSession<'a> {
    oracle: &'a dyn Oracle,
    executor: ToolExecutor<'a>,
    config: SessionConfig,
}

impl<'a> VerificationSession<'a> {
    pub fn new(oracle: &'a dyn Oracle, resolver: Resolver<'a>, config: SessionConfig) -> Self {
        Self {
            oracle,
            executor: ToolExecutor::new(resolver),
            config,
        }
    }

    /// Run one chunk to a verdict, a dismissal or the turn bound.
    ///
    /// A new finding is appended to `store` before the first turn, and
    /// every tool response is added to it as soon as it is produced. Oracle
    /// failures abort the session with an error; the finding keeps the
    /// context gathered so far.
    pub async fn verify(
        &self,
        chunk: &str,
        code: &str,
        store: &mut FindingStore,
    ) -> Result<SessionReport> {
        store.begin(chunk, code)?;
        let mut transcript = Transcript::new();

        let outcome = loop {
            let role = match next_speaker(transcript.turns()) {
                Ok(Transition::Next(role)) => role,
                Ok(Transition::Terminate) => {
                    break if store.last().is_some_and(|f| f.has_verdict()) {
                        SessionOutcome::Confirmed
                    } else {
                        SessionOutcome::Dismissed
                    };
                }
                Err(violation) => {
                    log::error!("Protocol violation, abandoning session: {violation}");
                    break SessionOutcome::Abandoned(violation);
                }
            };

            if transcript.len() >= self.config.max_turns {
                log::warn!(
                    "Turn limit of {} reached without a verdict",
                    self.config.max_turns
                );
                break SessionOutcome::Exhausted;
            }

            log::debug!("Turn {}: {role}", transcript.len() + 1);
            match role {
                Role::Initializer => transcript.push(Turn::said(role, task_prompt(code, chunk))),
                Role::Analyst | Role::Critic => {
                    let turn = self.reason(role, &transcript).await?;
                    transcript.push(turn);
                }
                Role::Executor => {
                    if self.execute_pending(&mut transcript, store)? {
                        break SessionOutcome::Confirmed;
                    }
                }
            }
        };

        log::info!(
            "Verification finished after {} turns: {:?}",
            transcript.len(),
            outcome
        );
        Ok(SessionReport {
            outcome,
            transcript,
        })
    }

    async fn reason(&self, role: Role, transcript: &Transcript) -> Result<Turn> {
        let system = match role {
            Role::Critic => critic_prompt(),
            _ => analyst_prompt(),
        };

        let mut messages = vec![ChatMessage::system(system)];
        messages.extend(transcript.messages_for(role));
        let request = ChatRequest::new(messages).with_tools(tool_specs(role));

        let reply = self.oracle.chat(&request).await?;
        for call in &reply.tool_calls {
            log::info!("{role} calls {}({})", call.name, call.arguments);
        }
        Ok(Turn::proposed(role, reply.content, reply.tool_calls))
    }

    /// Execute the calls of the last turn. Returns `true` once a verdict
    /// has been written.
    fn execute_pending(&self, transcript: &mut Transcript, store: &mut FindingStore) -> Result<bool> {
        let Some(proposal) = transcript.last() else {
            return Ok(false);
        };
        let proposer = proposal.speaker;

        let mut responses = Vec::with_capacity(proposal.tool_calls.len());
        let mut verdict = false;
        for call in &proposal.tool_calls {
            let execution = self.executor.execute(call, proposer, store)?;
            store.append_context(&execution.response.content)?;
            verdict |= execution.verdict;
            responses.push(execution.response);
        }

        transcript.push(Turn::executed(responses));
        Ok(verdict)
    }
}
