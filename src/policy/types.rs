use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BLOCK_THRESHOLD, PERMISSIVE_THRESHOLD};
use crate::evidence::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    Pass,
    Warn,
    Block,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Pass => "pass",
            Action::Warn => "warn",
            Action::Block => "block",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One policy entry. Categories are unique within a loaded policy set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub category: Category,
    pub risk_threshold: u32,
    pub action: Action,
    #[serde(default, alias = "label_cn")]
    pub display_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
}

impl PolicyRule {
    pub fn new(category: Category, risk_threshold: u32, action: Action) -> Self {
        let display_label = category.to_string();
        Self {
            category,
            risk_threshold,
            action,
            display_label,
            rule_id: None,
        }
    }

    /// Rule installed when no policy could be loaded: nothing crosses its threshold.
    pub fn permissive() -> Self {
        Self::new(Category::Normal, PERMISSIVE_THRESHOLD, Action::Pass)
    }

    /// `Normal` entry added when a policy file omits one.
    pub fn default_normal() -> Self {
        Self::new(Category::Normal, DEFAULT_BLOCK_THRESHOLD, Action::Pass)
    }

    pub fn display_label(mut self, label: impl Into<String>) -> Self {
        self.display_label = label.into();
        self
    }

    pub fn rule_id(mut self, id: impl Into<String>) -> Self {
        self.rule_id = Some(id.into());
        self
    }

    /// Label for reasons and logs, falling back to the category name.
    pub fn label(&self) -> &str {
        if self.display_label.trim().is_empty() {
            self.category.as_str()
        } else {
            &self.display_label
        }
    }
}

/// Policy file body: either `rules: [...]` or a bare list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum PolicyDocument {
    Wrapped { rules: Vec<PolicyRule> },
    Bare(Vec<PolicyRule>),
}

impl PolicyDocument {
    pub(crate) fn into_rules(self) -> Vec<PolicyRule> {
        match self {
            PolicyDocument::Wrapped { rules } | PolicyDocument::Bare(rules) => rules,
        }
    }
}
