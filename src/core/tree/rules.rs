//! Inclusion rules.
//!
//! A `RuleChain` is an ordered list of named predicates combined by logical
//! AND. A node is included in the rename only when every rule agrees.

use std::fmt;
use std::path::Path;

use crate::local_files::FileSystem;

use super::TreeNode;

type Predicate = Box<dyn Fn(&TreeNode, &dyn FileSystem) -> bool + Send + Sync>;

/// A named predicate over a tree node. The name is for diagnostics only.
pub struct Rule {
    name: String,
    predicate: Predicate,
}

impl Rule {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&TreeNode, &dyn FileSystem) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn evaluate(&self, node: &TreeNode, fs: &dyn FileSystem) -> bool {
        (self.predicate)(node, fs)
    }

    pub fn always_true() -> Self {
        Self::new("True", |_, _| true)
    }

    pub fn not_git() -> Self {
        Self::new("Not Git", |node, _| {
            !directory_or_file_contains(node.path(), ".git")
        })
    }

    pub fn not_dll() -> Self {
        Self::new("Not DLL", |node, _| {
            !extension_contains(node.path(), "dll") && !extension_contains(node.path(), "exe")
        })
    }

    pub fn not_bin_or_obj() -> Self {
        Self::new("Not bin or obj", |node, _| {
            !directory_or_file_contains(node.path(), "bin")
                && !directory_or_file_contains(node.path(), "obj")
        })
    }

    pub fn not_nuget() -> Self {
        Self::new("Not Nuget", |node, _| {
            !directory_or_file_contains(node.path(), "packages")
        })
    }

    pub fn not_dbmdl() -> Self {
        Self::new("Not DBMDL", |node, _| {
            !extension_contains(node.path(), "dbmdl")
        })
    }

    pub fn not_cache() -> Self {
        Self::new("Not .cache", |node, _| {
            !extension_contains(node.path(), "cache")
        })
    }

    pub fn not_pdb() -> Self {
        Self::new("Not PDB", |node, _| !extension_contains(node.path(), "pdb"))
    }

    pub fn not_suo() -> Self {
        Self::new("Not SUO", |node, _| !extension_contains(node.path(), "suo"))
    }

    pub fn not_image() -> Self {
        Self::new("Not Image", |node, _| {
            !extension_contains(node.path(), "png")
                && !extension_contains(node.path(), "gif")
                && !extension_contains(node.path(), "jpg")
        })
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Ordered rules combined by AND. Starts anchored with `Rule::always_true`,
/// so an otherwise empty chain includes everything.
#[derive(Debug)]
pub struct RuleChain {
    rules: Vec<Rule>,
}

impl Default for RuleChain {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleChain {
    pub fn new() -> Self {
        Self {
            rules: vec![Rule::always_true()],
        }
    }

    /// Append a rule to the end of the chain.
    pub fn then(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// The chain used for .NET solution folders.
    pub fn standard() -> Self {
        Self::new()
            .then(Rule::not_git())
            .then(Rule::not_dll())
            .then(Rule::not_bin_or_obj())
            .then(Rule::not_nuget())
            .then(Rule::not_dbmdl())
            .then(Rule::not_cache())
            .then(Rule::not_pdb())
            .then(Rule::not_suo())
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(Rule::name).collect()
    }

    /// Number of rules added after the anchor.
    pub fn len(&self) -> usize {
        self.rules.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every rule is evaluated; the result is the AND of all of them.
    pub fn is_satisfied_by(&self, node: &TreeNode, fs: &dyn FileSystem) -> bool {
        self.rules
            .iter()
            .fold(true, |acc, rule| rule.evaluate(node, fs) & acc)
    }
}

/// True when the lower-cased path contains a separator immediately followed
/// by `pattern`, anywhere in the path. Either separator style matches.
pub fn directory_or_file_contains(path: &Path, pattern: &str) -> bool {
    let haystack = path.to_string_lossy().to_lowercase();
    let needle = pattern
        .trim_start_matches(['\\', '/'])
        .to_lowercase();

    haystack.contains(&format!("/{}", needle)) || haystack.contains(&format!("\\{}", needle))
}

/// True when the lower-cased extension (with its dot) contains `.<ext>`.
pub fn extension_contains(path: &Path, ext: &str) -> bool {
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();
    let needle = format!(".{}", ext.trim_start_matches('.').to_lowercase());

    extension.contains(&needle)
}
