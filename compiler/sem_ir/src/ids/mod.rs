//! Entity and module identifiers.
//!
//! An [`EntityId`] names a declaration inside a module. Before resolution,
//! source code refers to entities through an [`EntityRef`], which may carry
//! a partial module qualifier. The resolver turns those into
//! [`ResolvedEntityRef`]s, which pin the exact defining module and are the
//! only form the interpreter dispatches on.

use std::fmt;

use thiserror::Error;

/// Malformed identifier input.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("an entity id needs at least one non-empty segment, got '{0}'")]
    InvalidEntityId(String),
    #[error("invalid {part} '{name}' in module name")]
    InvalidModuleName { part: &'static str, name: String },
    #[error("module reference '{0}' has a version but no group")]
    VersionWithoutGroup(String),
}

/// Dotted, namespaced name of a declaration, e.g. `List.get`.
#[derive(Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct EntityId {
    segments: Vec<String>,
}

impl EntityId {
    /// Build an id from trusted dotted text such as `"Integer.plus"`.
    pub fn of(dotted: &str) -> Self {
        EntityId {
            segments: dotted.split('.').map(str::to_string).collect(),
        }
    }

    /// Build an id from untrusted segments.
    pub fn new(segments: Vec<String>) -> Result<Self, IdError> {
        if segments.is_empty() || segments.iter().any(String::is_empty) {
            return Err(IdError::InvalidEntityId(segments.join(".")));
        }
        Ok(EntityId { segments })
    }

    /// Parse untrusted dotted text.
    pub fn parse(dotted: &str) -> Result<Self, IdError> {
        Self::new(dotted.split('.').map(str::to_string).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The sole segment, when the id is a plain unqualified name.
    pub fn single_segment(&self) -> Option<&str> {
        match self.segments.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// A new id with `name` appended as a last segment.
    #[must_use]
    pub fn child(&self, name: &str) -> EntityId {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        EntityId { segments }
    }

    /// The id without its last segment; `None` for single-segment ids.
    pub fn parent(&self) -> Option<EntityId> {
        match self.segments.split_last() {
            Some((_, rest)) if !rest.is_empty() => Some(EntityId {
                segments: rest.to_vec(),
            }),
            _ => None,
        }
    }

    pub fn last_segment(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// An unqualified reference to this id.
    pub fn to_entity_ref(&self) -> EntityRef {
        EntityRef {
            module_ref: None,
            id: self.clone(),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// `[0-9a-zA-Z]+([_.-][0-9a-zA-Z]+)*`
fn is_valid_module_part(part: &str) -> bool {
    let mut previous_was_separator = true;
    for c in part.chars() {
        if c.is_ascii_alphanumeric() {
            previous_was_separator = false;
        } else if matches!(c, '_' | '.' | '-') {
            if previous_was_separator {
                return false;
            }
            previous_was_separator = true;
        } else {
            return false;
        }
    }
    !previous_was_separator
}

/// Group and module name of a module, e.g. `semlang:lang`.
#[derive(Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct ModuleName {
    pub group: String,
    pub module: String,
}

impl ModuleName {
    pub fn new(group: impl Into<String>, module: impl Into<String>) -> Result<Self, IdError> {
        let group = group.into();
        let module = module.into();
        if !is_valid_module_part(&group) {
            return Err(IdError::InvalidModuleName {
                part: "group",
                name: group,
            });
        }
        if !is_valid_module_part(&module) {
            return Err(IdError::InvalidModuleName {
                part: "module",
                name: module,
            });
        }
        Ok(ModuleName { group, module })
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.module)
    }
}

/// A module name pinned to one content version.
#[derive(Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct ModuleUniqueId {
    pub name: ModuleName,
    pub fake0_version: String,
}

impl ModuleUniqueId {
    pub fn new(name: ModuleName, fake0_version: impl Into<String>) -> Self {
        ModuleUniqueId {
            name,
            fake0_version: fake0_version.into(),
        }
    }
}

impl fmt::Display for ModuleUniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.fake0_version)
    }
}

/// Module qualifier written in source; any prefix of group, module, version.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ModuleRef {
    pub group: Option<String>,
    pub module: String,
    pub version: Option<String>,
}

impl ModuleRef {
    pub fn new(
        group: Option<String>,
        module: impl Into<String>,
        version: Option<String>,
    ) -> Result<Self, IdError> {
        let module = module.into();
        if group.is_none() && version.is_some() {
            return Err(IdError::VersionWithoutGroup(module));
        }
        Ok(ModuleRef {
            group,
            module,
            version,
        })
    }

    /// Whether a module with the given identity satisfies this qualifier.
    pub fn matches(&self, id: &ModuleUniqueId) -> bool {
        if self.module != id.name.module {
            return false;
        }
        if let Some(group) = &self.group {
            if *group != id.name.group {
                return false;
            }
        }
        match &self.version {
            Some(version) => *version == id.fake0_version,
            None => true,
        }
    }
}

impl fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(group) = &self.group {
            write!(f, "{group}:")?;
        }
        f.write_str(&self.module)?;
        if let Some(version) = &self.version {
            write!(f, ":{version}")?;
        }
        Ok(())
    }
}

/// An entity as written in source, before resolution.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct EntityRef {
    pub module_ref: Option<ModuleRef>,
    pub id: EntityId,
}

impl EntityRef {
    pub fn new(module_ref: Option<ModuleRef>, id: EntityId) -> Self {
        EntityRef { module_ref, id }
    }

    /// Unqualified reference from trusted dotted text.
    pub fn of(dotted: &str) -> Self {
        EntityId::of(dotted).to_entity_ref()
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.module_ref {
            Some(module_ref) => write!(f, "{module_ref}:{}", self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

/// An entity pinned to its defining module.
///
/// Built by the entity resolver (and by the native library for its own
/// entities); everything downstream of validation dispatches on these.
#[derive(Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct ResolvedEntityRef {
    pub module: ModuleUniqueId,
    pub id: EntityId,
}

impl ResolvedEntityRef {
    pub fn new(module: ModuleUniqueId, id: EntityId) -> Self {
        ResolvedEntityRef { module, id }
    }
}

impl fmt::Display for ResolvedEntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.id)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
