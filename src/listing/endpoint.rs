//! # List Endpoint Catalog
//!
//! Declarative list endpoints. An endpoint names a collection, the fields
//! a search term is matched against, the parameters allowed as filters,
//! and optionally a custom pipeline that switches it to the aggregation
//! builder.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::query::{Condition, Lookup, ProjectField, Stage, DEFAULT_LIMIT};

/// One list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEndpoint {
    /// URL segment, unique within a catalog
    pub name: String,

    /// Collection the read starts from
    pub collection: String,

    /// Field holding the tenant; set means every request must name one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_field: Option<String>,

    #[serde(default)]
    pub search_fields: Vec<String>,

    /// Allow-list of equality filters
    #[serde(default)]
    pub filter_fields: Vec<String>,

    #[serde(default = "default_limit")]
    pub default_limit: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_limit: Option<u64>,

    /// Stages run before search, filter, sort and paging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<Vec<Stage>>,
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

impl ListEndpoint {
    /// Endpoint over a plain collection with no scope
    pub fn new(name: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collection: collection.into(),
            scope_field: None,
            search_fields: Vec::new(),
            filter_fields: Vec::new(),
            default_limit: DEFAULT_LIMIT,
            max_limit: None,
            pipeline: None,
        }
    }

    pub fn scoped_by(mut self, field: impl Into<String>) -> Self {
        self.scope_field = Some(field.into());
        self
    }

    pub fn searching(mut self, fields: &[&str]) -> Self {
        self.search_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn filtering(mut self, fields: &[&str]) -> Self {
        self.filter_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_limits(mut self, default_limit: u64, max_limit: Option<u64>) -> Self {
        self.default_limit = default_limit;
        self.max_limit = max_limit;
        self
    }

    pub fn with_pipeline(mut self, stages: Vec<Stage>) -> Self {
        self.pipeline = Some(stages);
        self
    }

    pub(crate) fn search_field_refs(&self) -> Vec<&str> {
        self.search_fields.iter().map(String::as_str).collect()
    }

    pub(crate) fn filter_field_refs(&self) -> Vec<&str> {
        self.filter_fields.iter().map(String::as_str).collect()
    }
}

/// An ordered set of endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    endpoints: Vec<ListEndpoint>,
}

impl Catalog {
    pub fn new(endpoints: Vec<ListEndpoint>) -> Self {
        Self { endpoints }
    }

    /// Endpoints of the school backend
    pub fn builtin() -> Self {
        Self::new(vec![
            schools(),
            teachers(),
            students(),
            ListEndpoint::new("subjects", "subjects")
                .scoped_by("schoolId")
                .searching(&["subjectName"]),
            ListEndpoint::new("announcements", "announcements")
                .scoped_by("schoolId")
                .searching(&["title"]),
            ListEndpoint::new("grade-systems", "gradeSystems").scoped_by("schoolId"),
            ListEndpoint::new("notifications", "notifications")
                .scoped_by("receiver")
                .filtering(&["isRead"]),
            payments(),
            conversations(),
        ])
    }

    pub fn get(&self, name: &str) -> Option<&ListEndpoint> {
        self.endpoints.iter().find(|e| e.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.endpoints.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ListEndpoint> {
        self.endpoints.iter()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// School accounts with their school profile and headcounts
fn schools() -> ListEndpoint {
    ListEndpoint::new("schools", "users")
        .searching(&["name", "school.schoolName"])
        .with_pipeline(vec![
            Stage::Match(Condition::eq("role", json!("school"))),
            Stage::Lookup(Lookup::new("schools", "_id", "userId", "school")),
            Stage::unwind_preserving("school"),
            Stage::Lookup(Lookup::new("students", "schoolId", "schoolId", "students")),
            Stage::Lookup(Lookup::new("teachers", "schoolId", "schoolId", "teachers")),
            Stage::Project(vec![
                ProjectField::include("name"),
                ProjectField::include("phoneNumber"),
                ProjectField::include("image"),
                ProjectField::include("school"),
                ProjectField::include("createdAt"),
                ProjectField::size("teachers", "teachers"),
                ProjectField::size("students", "students"),
            ]),
        ])
}

/// Teachers of one school, flattened with their user account
fn teachers() -> ListEndpoint {
    ListEndpoint::new("teachers", "teachers")
        .scoped_by("schoolId")
        .searching(&["name"])
        .filtering(&["status"])
        .with_pipeline(vec![
            Stage::Lookup(Lookup::new("users", "userId", "_id", "teacher")),
            Stage::unwind_preserving("teacher"),
            Stage::Project(vec![
                ProjectField::exclude("_id"),
                ProjectField::path("name", "teacher.name"),
                ProjectField::path("phoneNumber", "teacher.phoneNumber"),
                ProjectField::path("status", "teacher.status"),
                ProjectField::path("image", "teacher.image"),
                ProjectField::path("teacherId", "_id"),
                ProjectField::path("userId", "teacher._id"),
                ProjectField::path("subject", "subjectName"),
                ProjectField::include("createdAt"),
            ]),
        ])
}

/// Students of one school with their user account
fn students() -> ListEndpoint {
    ListEndpoint::new("students", "students")
        .scoped_by("schoolId")
        .searching(&["userInfo.name", "className"])
        .filtering(&["classId", "section"])
        .with_pipeline(vec![
            Stage::Lookup(Lookup::new("users", "userId", "_id", "userInfo")),
            Stage::unwind_preserving("userInfo"),
        ])
}

/// Payments with payer and subscription attached
fn payments() -> ListEndpoint {
    ListEndpoint::new("payments", "payments")
        .searching(&["user.name"])
        .filtering(&["paymentStatus"])
        .with_pipeline(vec![
            Stage::Lookup(Lookup::new("users", "userId", "_id", "user")),
            Stage::unwind_preserving("user"),
            Stage::Lookup(Lookup::new("subscriptions", "subscriptionId", "_id", "subscription")),
            Stage::unwind_preserving("subscription"),
        ])
}

/// Conversations a user takes part in, with participant accounts
fn conversations() -> ListEndpoint {
    ListEndpoint::new("conversations", "conversations")
        .scoped_by("users")
        .searching(&["participants.name"])
        .with_pipeline(vec![Stage::Lookup(Lookup::new(
            "users",
            "users",
            "_id",
            "participants",
        ))])
}
