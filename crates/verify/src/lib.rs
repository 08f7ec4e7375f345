//! # Spec Audit Verify
//!
//! Role-based verification of extracted source code against one
//! specification chunk.
//!
//! ## Speaking order
//!
//! ```text
//! Initializer ──> Analyst ──(tool calls)──> Executor ──> Analyst
//!                    │
//!                    └──(conclusion)──> Critic ──(tool calls)──> Executor ──> Critic
//!                                         │
//!                                         ├──(more to check)──> Analyst
//!                                         └──(TERMINATE / write_inconsistency)──> end
//! ```
//!
//! The order is decided by [`next_speaker`], a pure function of the
//! transcript. A session is bounded by [`SessionConfig::max_turns`]; the
//! only way to record a verdict is the Critic's `write_inconsistency` tool.
//!
//! ## Example
//!
//! ```no_run
//! use specaudit_index::{PreferencePath, Resolver, SourceIndex};
//! use specaudit_oracle::Oracle;
//! use specaudit_verify::{FindingStore, SessionConfig, VerificationSession};
//!
//! # async fn demo(oracle: &dyn Oracle) -> specaudit_verify::Result<()> {
//! let index = SourceIndex::build("/path/to/project").unwrap();
//! let prefer = PreferencePath::new("/path/to/project/net");
//! let mut store = FindingStore::create(FindingStore::file_name("tcp"))?;
//!
//! let session = VerificationSession::new(oracle, Resolver::new(&index, &prefer), SessionConfig::default());
//! let report = session.verify("3.1 Connection setup ...", "int tcp_open(void) { ... }", &mut store).await?;
//! println!("{:?}", report.outcome);
//! # Ok(())
//! # }
//! ```

mod error;
mod prompts;
mod role;
mod session;
mod store;
mod tools;
mod transcript;
mod transition;

pub use error::{Result, VerifyError};
pub use prompts::{analyst_prompt, critic_prompt, task_prompt};
pub use role::Role;
pub use session::{
    SessionConfig, SessionOutcome, SessionReport, VerificationSession, DEFAULT_MAX_TURNS,
};
pub use store::{Finding, FindingStore};
pub use tools::{tool_specs, Execution, Tool, ToolExecutor};
pub use transcript::{ToolResponse, Transcript, Turn};
pub use transition::{next_speaker, ProtocolViolation, Transition};
