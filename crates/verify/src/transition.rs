//! Speaker selection for a verification session.

use crate::role::Role;
use crate::transcript::Turn;
use specaudit_oracle::TERMINATE;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Next(Role),
    /// The Critic closed the session
    Terminate,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolViolation {
    #[error("executor spoke without a proposing role before it (previous speaker: {0:?})")]
    ExecutorWithoutProposer(Option<Role>),
}

/// Who speaks after the last turn of `transcript`.
///
/// - nobody yet: Initializer
/// - Initializer: Analyst
/// - Analyst: Executor with pending tool calls, else Critic
/// - Executor: back to whichever of Analyst or Critic proposed the calls,
///   or Terminate when that was a Critic turn carrying the sentinel
/// - Critic: Executor with pending tool calls, Terminate on the sentinel,
///   else Analyst
pub fn next_speaker(transcript: &[Turn]) -> Result<Transition, ProtocolViolation> {
    let Some(last) = transcript.last() else {
        return Ok(Transition::Next(Role::Initializer));
    };

    let next = match last.speaker {
        Role::Initializer => Transition::Next(Role::Analyst),
        Role::Analyst if last.has_pending_calls() => Transition::Next(Role::Executor),
        Role::Analyst => Transition::Next(Role::Critic),
        Role::Critic if last.has_pending_calls() => Transition::Next(Role::Executor),
        Role::Critic if last.mentions(TERMINATE) => Transition::Terminate,
        Role::Critic => Transition::Next(Role::Analyst),
        Role::Executor => {
            let proposer = transcript.len().checked_sub(2).map(|i| &transcript[i]);
            match proposer {
                Some(turn) if turn.speaker == Role::Critic && turn.mentions(TERMINATE) => {
                    Transition::Terminate
                }
                Some(turn) if turn.speaker.is_reasoning() => Transition::Next(turn.speaker),
                other => {
                    return Err(ProtocolViolation::ExecutorWithoutProposer(
                        other.map(|t| t.speaker),
                    ))
                }
            }
        }
    };

    Ok(next)
}
