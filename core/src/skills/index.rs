use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::manifest::{SKILL_FILE, SkillMetadata};
use super::roots::{DirectoryResolver, Scope, SkillRoot};
use crate::error::{Result, SkillError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillEntry {
    /// Directory name; the key used to load the skill.
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub path: PathBuf,
    pub scope: Scope,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    pub skills: Vec<SkillEntry>,
    pub searched: Vec<PathBuf>,
}

impl Catalog {
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn get(&self, name: &str) -> Option<&SkillEntry> {
        self.skills.iter().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedSkill {
    pub skill_name: String,
    pub base_dir: PathBuf,
    pub content: String,
}

/// Finds skill bundles across the resolver's roots. Nothing is cached: every
/// call walks the filesystem again.
#[derive(Debug, Clone)]
pub struct SkillIndex {
    resolver: DirectoryResolver,
    require_description: bool,
}

impl SkillIndex {
    pub fn new(resolver: DirectoryResolver) -> Self {
        Self {
            resolver,
            require_description: false,
        }
    }

    /// Leave bundles without a description out of the catalog. They stay
    /// loadable by name.
    pub fn with_require_description(mut self, require: bool) -> Self {
        self.require_description = require;
        self
    }

    pub fn resolver(&self) -> &DirectoryResolver {
        &self.resolver
    }

    pub fn catalog(&self) -> Result<Catalog> {
        let roots = self.resolver.resolve()?;
        let mut seen = HashSet::new();
        let mut skills = Vec::new();
        let mut skipped = 0usize;

        for root in &roots {
            for entry in WalkDir::new(&root.path)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        tracing::warn!(root = %root.path.display(), "cannot read skill root: {e}");
                        continue;
                    }
                };

                let file_type = entry.file_type();
                if !(file_type.is_dir() || file_type.is_symlink()) {
                    continue;
                }

                let Some(name) = entry.file_name().to_str() else {
                    continue;
                };
                if seen.contains(name) {
                    continue;
                }

                let skill_path = entry.path().join(SKILL_FILE);
                if !skill_path.is_file() {
                    continue;
                }
                seen.insert(name.to_string());

                match self.read_entry(root, name, entry.path().to_path_buf()) {
                    Ok(Some(skill)) => skills.push(skill),
                    Ok(None) => skipped += 1,
                    Err(e) => {
                        tracing::warn!("skipping {}: {e}", skill_path.display());
                        skipped += 1;
                    }
                }
            }
        }

        tracing::debug!(
            roots = roots.len(),
            skills = skills.len(),
            skipped,
            "skill catalog built"
        );

        Ok(Catalog {
            skills,
            searched: roots.into_iter().map(|r| r.path).collect(),
        })
    }

    fn read_entry(
        &self,
        root: &SkillRoot,
        name: &str,
        path: PathBuf,
    ) -> Result<Option<SkillEntry>> {
        let content = read_document(&path)?;
        let meta = SkillMetadata::parse(&content);

        if self.require_description && meta.description.is_none() {
            tracing::debug!(skill = name, "no description, left out of catalog");
            return Ok(None);
        }

        Ok(Some(SkillEntry {
            name: name.to_string(),
            display_name: meta.name.unwrap_or_else(|| name.to_string()),
            description: meta.description.unwrap_or_default(),
            path,
            scope: root.scope,
        }))
    }

    /// Directory of the highest-priority bundle named `name`.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        if !is_single_component(name) {
            return Err(SkillError::NotFound(name.to_string()));
        }

        self.resolver
            .resolve()?
            .into_iter()
            .map(|root| root.path.join(name))
            .find(|dir| dir.join(SKILL_FILE).is_file())
            .ok_or_else(|| SkillError::NotFound(name.to_string()))
    }

    pub fn load(&self, name: &str) -> Result<LoadedSkill> {
        let base_dir = self.resolve(name)?;
        let content = read_document(&base_dir)?;

        tracing::debug!(skill = name, base_dir = %base_dir.display(), "skill loaded");

        Ok(LoadedSkill {
            skill_name: name.to_string(),
            base_dir,
            content: content.trim().to_string(),
        })
    }
}

/// Skill names are directory names: exactly one normal path component.
fn is_single_component(name: &str) -> bool {
    if name.trim().is_empty() || name.contains('\0') {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Bundle documents are decoded lossily; a stray non-UTF-8 byte must not
/// hide the skill.
fn read_document(bundle_dir: &Path) -> Result<String> {
    let bytes = fs::read(bundle_dir.join(SKILL_FILE))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
