use serde::{Deserialize, Serialize};

/// A field definition as listed by the tracker.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub custom: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFields {
    pub issuetype: IssueType,
    pub project: ProjectRef,
    #[serde(default)]
    pub fix_versions: Vec<VersionRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueType {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionRef {
    pub id: String,
}

/// Response of an issue creation call.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIssue {
    pub key: String,
}

/// An issue created by a sync run, linked to its epic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerIssue {
    pub key: String,
    pub epic: String,
}
