use once_cell::sync::Lazy;
use regex::Regex;

/// Sentinel an oracle uses to say nothing matches
pub const TERMINATE: &str = "TERMINATE";

static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\[(.*?)\]").expect("valid regex"));
static QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]+)"|'([^']+)'"#).expect("valid regex"));

/// A selection reply, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleReply {
    /// Names picked by the oracle, in reply order
    Selection(Vec<String>),

    /// The oracle said nothing matches
    Empty,

    /// No bracketed list could be found; carries the raw reply
    Malformed(String),
}

impl OracleReply {
    /// Classify a free-text reply that was asked for a bracketed,
    /// quote-delimited list such as `["a.c", 'net']`.
    ///
    /// When `allow_sentinel` is set, a reply mentioning `TERMINATE` (in any
    /// case) is `Empty` regardless of anything else it contains.
    pub fn parse(reply: &str, allow_sentinel: bool) -> Self {
        if allow_sentinel && reply.to_uppercase().contains(TERMINATE) {
            return OracleReply::Empty;
        }

        let Some(inner) = BRACKETED.captures(reply).and_then(|caps| caps.get(1)) else {
            return OracleReply::Malformed(reply.to_string());
        };

        let names: Vec<String> = QUOTED
            .captures_iter(inner.as_str())
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str().to_string())
            .collect();

        if names.is_empty() {
            OracleReply::Empty
        } else {
            OracleReply::Selection(names)
        }
    }

    /// Selected names; empty for `Empty` and `Malformed`
    pub fn into_names(self) -> Vec<String> {
        match self {
            OracleReply::Selection(names) => names,
            OracleReply::Empty | OracleReply::Malformed(_) => Vec::new(),
        }
    }
}
