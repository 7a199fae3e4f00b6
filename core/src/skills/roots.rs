use anyhow::Context;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::SkillDirs;
use crate::error::{Result, SkillError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Project,
    Global,
}

/// Where a skill root came from: the working directory or the home directory,
/// and whether it sits on the universal lookup path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scope {
    pub location: Location,
    pub universal: bool,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = match self.location {
            Location::Project => "project",
            Location::Global => "global",
        };
        if self.universal {
            write!(f, "{location} (universal)")
        } else {
            write!(f, "{location}")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillRoot {
    pub path: PathBuf,
    pub scope: Scope,
}

/// Produces the ordered list of directories searched for skill bundles,
/// highest priority first.
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    cwd: PathBuf,
    home: Option<PathBuf>,
    dirs: SkillDirs,
    explicit: Option<String>,
}

impl DirectoryResolver {
    pub fn new(cwd: impl Into<PathBuf>, home: Option<PathBuf>, dirs: SkillDirs) -> Self {
        Self {
            cwd: cwd.into(),
            home,
            dirs,
            explicit: None,
        }
    }

    pub fn from_env(dirs: SkillDirs) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        Ok(Self::new(cwd, dirs::home_dir(), dirs))
    }

    /// Search only `path` instead of the well-known locations.
    pub fn with_explicit(mut self, path: impl Into<String>) -> Self {
        self.explicit = Some(path.into());
        self
    }

    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// The well-known roots in priority order, before the existence filter.
    pub fn candidates(&self) -> Vec<SkillRoot> {
        let families = [(&self.dirs.universal, true), (&self.dirs.standard, false)];
        let mut roots = Vec::with_capacity(4);

        for (relative, universal) in families {
            roots.push(SkillRoot {
                path: self.cwd.join(relative),
                scope: Scope {
                    location: Location::Project,
                    universal,
                },
            });
            if let Some(home) = &self.home {
                roots.push(SkillRoot {
                    path: home.join(relative),
                    scope: Scope {
                        location: Location::Global,
                        universal,
                    },
                });
            }
        }

        roots
    }

    pub fn resolve(&self) -> Result<Vec<SkillRoot>> {
        if let Some(raw) = &self.explicit {
            return self.resolve_explicit(raw).map(|root| vec![root]);
        }

        let roots: Vec<SkillRoot> = self
            .candidates()
            .into_iter()
            .filter(|root| {
                let exists = root.path.is_dir();
                if !exists {
                    tracing::debug!(path = %root.path.display(), "skill root absent");
                }
                exists
            })
            .collect();

        Ok(roots)
    }

    fn resolve_explicit(&self, raw: &str) -> Result<SkillRoot> {
        let path = self.cwd.join(self.expand_home(raw));
        if !path.is_dir() {
            return Err(SkillError::DirectoryNotFound(path));
        }
        let scope = self.classify(&path);
        Ok(SkillRoot { path, scope })
    }

    /// Replace a leading `~` with the home directory.
    pub fn expand_home(&self, raw: &str) -> PathBuf {
        if let Some(home) = &self.home {
            if raw == "~" {
                return home.clone();
            }
            if let Some(rest) = raw.strip_prefix("~/") {
                return home.join(rest);
            }
        }
        PathBuf::from(raw)
    }

    pub fn classify(&self, path: &Path) -> Scope {
        let under_home = self
            .home
            .as_deref()
            .is_some_and(|home| path.starts_with(home));
        let location = if under_home && !path.starts_with(&self.cwd) {
            Location::Global
        } else {
            Location::Project
        };

        Scope {
            location,
            universal: path.ends_with(&self.dirs.universal),
        }
    }
}
