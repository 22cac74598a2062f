//! # Ownership File Compiler
//!
//! Reviewers are declared once, as named groups, and file patterns refer to
//! those groups instead of listing usernames directly:
//!
//! ```yaml
//! codeowners:
//!   reviewers:
//!     defaults: [alice]
//!     backend: [bob, carol]
//!     docs: dave
//!   patterns:
//!     - pattern: "*"
//!       owners: [defaults]
//!     - pattern: "/src/"
//!       owners: [backend, defaults]
//! ```
//!
//! [`OwnershipModel::compile`] resolves every pattern into a concrete,
//! deduplicated owner list and [`CompiledOwnership::render`] produces the
//! `CODEOWNERS` text, one `<pattern> @owner1 @owner2` line per pattern.
//!
//! ## Resolution rules
//!
//! - Groups are one level deep: a group is a single username or a list of
//!   usernames, never a list of other groups.
//! - An owner reference is looked up as a group name first. A username that
//!   belongs to any group also resolves to itself. Anything else falls back to
//!   the members of the `defaults` group (or to nobody if that group is not
//!   declared).
//! - Owners are concatenated across references in declaration order and
//!   deduplicated keeping the first occurrence.
//! - Patterns keep their declaration order; a pattern without owners is not
//!   rendered.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Group used when an owner reference matches neither a group nor a reviewer.
pub const DEFAULT_GROUP: &str = "defaults";

/// Path of the generated file inside the new repository.
pub const CODEOWNERS_PATH: &str = ".github/CODEOWNERS";

/// Members of a reviewer group: one username or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReviewerGroup {
    Single(String),
    Many(Vec<String>),
}

impl ReviewerGroup {
    /// Normalized usernames of the group, first occurrence kept.
    pub fn members(&self) -> Vec<String> {
        let raw: Vec<&String> = match self {
            ReviewerGroup::Single(name) => vec![name],
            ReviewerGroup::Many(names) => names.iter().collect(),
        };
        let mut members = Vec::new();
        for name in raw {
            push_unique(&mut members, normalize(name));
        }
        members
    }
}

/// A file pattern and the groups (or usernames) that own it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipPattern {
    pub pattern: String,
    #[serde(default)]
    pub owners: Vec<String>,
}

/// Declarative reviewer model: named groups plus ordered patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipModel {
    #[serde(default)]
    pub reviewers: BTreeMap<String, ReviewerGroup>,
    #[serde(default)]
    pub patterns: Vec<OwnershipPattern>,
}

/// One resolved line of the ownership file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipRule {
    pub pattern: String,
    pub owners: Vec<String>,
}

/// Result of [`OwnershipModel::compile`]: every pattern, in declaration order,
/// with its resolved owners. Rules may have no owners; they are dropped when
/// rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledOwnership {
    pub rules: Vec<OwnershipRule>,
}

impl OwnershipModel {
    /// An empty model declares no patterns; nothing is generated and owner
    /// reviews are not enforced because of it.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Resolves every pattern into its concrete owner list.
    pub fn compile(&self) -> CompiledOwnership {
        let index = ReviewerIndex::new(self);
        let rules = self
            .patterns
            .iter()
            .map(|pattern| OwnershipRule {
                pattern: pattern.pattern.clone(),
                owners: index.resolve_all(&pattern.owners),
            })
            .collect();
        CompiledOwnership { rules }
    }

    /// Every username reachable through any group.
    ///
    /// Used to check that each reviewer exists before the ownership file is
    /// committed.
    pub fn list_reviewers(&self) -> BTreeSet<String> {
        self.reviewers
            .values()
            .flat_map(ReviewerGroup::members)
            .collect()
    }
}

impl CompiledOwnership {
    /// Renders the ownership file text.
    ///
    /// Patterns with no owners are omitted. The text ends with a newline
    /// unless it is empty.
    pub fn render(&self) -> String {
        let mut text = String::new();
        for rule in self.rules.iter().filter(|rule| !rule.owners.is_empty()) {
            text.push_str(&rule.pattern);
            for owner in &rule.owners {
                text.push_str(" @");
                text.push_str(owner);
            }
            text.push('\n');
        }
        text
    }

    /// Whether rendering would produce at least one line.
    pub fn has_owners(&self) -> bool {
        self.rules.iter().any(|rule| !rule.owners.is_empty())
    }
}

/// Lookup table built once per compilation.
struct ReviewerIndex {
    groups: HashMap<String, Vec<String>>,
    reviewers: HashSet<String>,
    defaults: Vec<String>,
}

impl ReviewerIndex {
    fn new(model: &OwnershipModel) -> Self {
        let groups: HashMap<String, Vec<String>> = model
            .reviewers
            .iter()
            .map(|(name, group)| (normalize(name), group.members()))
            .collect();
        let reviewers = groups.values().flatten().cloned().collect();
        let defaults = groups.get(DEFAULT_GROUP).cloned().unwrap_or_default();
        Self {
            groups,
            reviewers,
            defaults,
        }
    }

    fn resolve(&self, reference: &str) -> Vec<String> {
        let reference = normalize(reference);
        if let Some(members) = self.groups.get(&reference) {
            return members.clone();
        }
        if self.reviewers.contains(&reference) {
            return vec![reference];
        }
        self.defaults.clone()
    }

    fn resolve_all(&self, references: &[String]) -> Vec<String> {
        let mut owners = Vec::new();
        for reference in references {
            for owner in self.resolve(reference) {
                push_unique(&mut owners, owner);
            }
        }
        owners
    }
}

/// Usernames may be written with or without the leading `@`.
fn normalize(name: &str) -> String {
    name.trim().trim_start_matches('@').to_string()
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !value.is_empty() && !list.contains(&value) {
        list.push(value);
    }
}
