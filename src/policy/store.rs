use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use super::error::{PolicyError, PolicyResult};
use super::types::{PolicyDocument, PolicyRule};
use crate::evidence::Category;

pub type PolicyMap = HashMap<Category, PolicyRule>;

/// Category → rule lookup. Readers clone an `Arc` snapshot; [`PolicyStore::reload`] swaps it whole.
#[derive(Debug)]
pub struct PolicyStore {
    path: Option<PathBuf>,
    rules: RwLock<Arc<PolicyMap>>,
}

impl PolicyStore {
    /// Loads `path`, falling back to the permissive policy on any error.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let rules = match Self::try_load(path) {
            Ok(rules) => {
                info!(path = %path.display(), rules = rules.len(), "Policy loaded");
                rules
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Policy load failed, using permissive default");
                permissive_map()
            }
        };

        Self {
            path: Some(path.to_path_buf()),
            rules: RwLock::new(Arc::new(rules)),
        }
    }

    pub fn try_load(path: impl AsRef<Path>) -> PolicyResult<PolicyMap> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| PolicyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    /// Parses a YAML policy document, rejecting duplicate categories and adding `Normal` if absent.
    pub fn parse(yaml: &str) -> PolicyResult<PolicyMap> {
        let document: PolicyDocument = serde_yaml::from_str(yaml)?;
        build_map(document.into_rules())
    }

    /// In-memory store with no backing file.
    pub fn from_rules(rules: Vec<PolicyRule>) -> PolicyResult<Self> {
        Ok(Self {
            path: None,
            rules: RwLock::new(Arc::new(build_map(rules)?)),
        })
    }

    pub fn from_yaml_str(yaml: &str) -> PolicyResult<Self> {
        Ok(Self {
            path: None,
            rules: RwLock::new(Arc::new(Self::parse(yaml)?)),
        })
    }

    /// Store holding only the permissive `Normal` rule.
    pub fn permissive() -> Self {
        Self {
            path: None,
            rules: RwLock::new(Arc::new(permissive_map())),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn snapshot(&self) -> Arc<PolicyMap> {
        self.rules.read().clone()
    }

    /// Exact rule for `category`, if the policy names it.
    pub fn rule_for(&self, category: &Category) -> Option<PolicyRule> {
        self.rules.read().get(category).cloned()
    }

    /// Rule for `category`, falling back to the `Normal` rule.
    pub fn get(&self, category: &Category) -> PolicyRule {
        let rules = self.snapshot();
        rules
            .get(category)
            .or_else(|| rules.get(&Category::Normal))
            .cloned()
            .unwrap_or_else(PolicyRule::permissive)
    }

    /// Re-reads the backing file. On failure the current rules stay in place.
    pub fn reload(&self) -> PolicyResult<usize> {
        let path = self.path.as_deref().ok_or(PolicyError::NoSource)?;
        let rules = Self::try_load(path)?;
        let count = rules.len();
        *self.rules.write() = Arc::new(rules);
        info!(path = %path.display(), rules = count, "Policy reloaded");
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }
}

fn build_map(rules: Vec<PolicyRule>) -> PolicyResult<PolicyMap> {
    let mut map = PolicyMap::with_capacity(rules.len() + 1);
    for rule in rules {
        if map.contains_key(&rule.category) {
            return Err(PolicyError::DuplicateCategory {
                category: rule.category,
            });
        }
        map.insert(rule.category.clone(), rule);
    }
    map.entry(Category::Normal)
        .or_insert_with(PolicyRule::default_normal);
    Ok(map)
}

fn permissive_map() -> PolicyMap {
    PolicyMap::from([(Category::Normal, PolicyRule::permissive())])
}
