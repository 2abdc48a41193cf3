use std::fmt;

use thiserror::Error;

use crate::http::HttpError;

/// Pipeline stage a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Membership,
    Boards,
    Lists,
    Cards,
    Checklists,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Membership => "membership",
            Stage::Boards => "boards",
            Stage::Lists => "lists",
            Stage::Cards => "cards",
            Stage::Checklists => "checklists",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single remote read or write that did not succeed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },

    #[error("API error: {0}")]
    Api(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("This user is not a member of any organization")]
    NoMembership,

    #[error("No {stage} matching '{pattern}'")]
    NoMatch { stage: Stage, pattern: String },

    #[error("Failed to fetch {stage} from Trello")]
    FetchStage {
        stage: Stage,
        #[source]
        source: FetchError,
    },

    #[error("Invalid pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl PipelineError {
    pub fn fetch(stage: Stage) -> impl FnOnce(FetchError) -> Self {
        move |source| Self::FetchStage { stage, source }
    }
}

#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("negotiation protocol error: {0}")]
    Protocol(String),

    #[error("negotiation transport error")]
    Transport(#[from] HttpError),

    #[error(
        "Kerberos based auth has been forbidden by {host}. You might not have enough rights \
         or an incompatible Kerberos implementation (macOS)"
    )]
    Forbidden { host: String },

    #[error("security context error: {0}")]
    Context(String),
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Issue {key} is a {issue_type}, not an Epic")]
    EpicTypeMismatch { key: String, issue_type: String },

    #[error("Jira instance has no '{field}' field")]
    MissingCapability { field: String },

    #[error("Jira request failed")]
    Fetch(#[from] FetchError),

    #[error("Unable to negotiate a Jira session")]
    Negotiation(#[from] NegotiationError),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_match_names_stage_and_pattern() {
        let err = PipelineError::NoMatch {
            stage: Stage::Lists,
            pattern: "MUST PER BUILD".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("lists"));
        assert!(msg.contains("MUST PER BUILD"));
    }

    #[test]
    fn fetch_stage_keeps_underlying_error_as_source() {
        let err = PipelineError::fetch(Stage::Cards)(FetchError::Api("boom".into()));
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("API error: boom"));
        assert!(err.to_string().contains("cards"));
    }

    #[test]
    fn forbidden_hints_at_incompatibility() {
        let err = NegotiationError::Forbidden {
            host: "issues.example.com".into(),
        };
        assert!(err.to_string().contains("incompatible"));
    }
}
