//! In-memory symbol index built from parsed Java units
//!
//! The index knows every type declared in the workspace, its supertypes and
//! the deprecation state of its members. It is built once and then only
//! read; updating it means building a modified copy.

use crate::resolver::{ResolutionFailure, SymbolResolver};
use deprecheck_core::{MemberKind, SymbolMetadata, TypeRef, UnitId};
use deprecheck_java::{Deprecation, MemberDeclKind, SourceUnit, TypeDecl};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// One declaration of a member (methods may have several overloads)
#[derive(Debug, Clone, PartialEq, Eq)]
struct MemberEntry {
    deprecation: Option<Deprecation>,
}

#[derive(Debug, Clone)]
struct TypeEntry {
    unit: UnitId,
    supertypes: Vec<TypeRef>,
    members: HashMap<(String, MemberKind), Vec<MemberEntry>>,
}

/// Index statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub units: usize,
    pub types: usize,
    pub members: usize,
    pub deprecated: usize,
}

/// Symbol table over the declarations of a set of source units
#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    /// Types by qualified name
    types: HashMap<String, TypeEntry>,

    /// Types declared by each unit
    units: HashMap<UnitId, Vec<String>>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from parsed units
    pub fn from_units<'a>(units: impl IntoIterator<Item = &'a SourceUnit>) -> Self {
        let mut index = Self::new();
        for unit in units {
            index.add_unit(unit);
        }
        tracing::debug!(types = index.types.len(), units = index.units.len(), "Symbol index built");
        index
    }

    /// Add (or replace) the declarations of one unit
    pub fn add_unit(&mut self, unit: &SourceUnit) {
        self.remove_unit(unit.id());

        let mut declared = Vec::with_capacity(unit.declarations().len());
        for decl in unit.declarations() {
            if self.types.contains_key(&decl.qualified_name) {
                tracing::debug!(
                    type_name = %decl.qualified_name,
                    unit = %unit.id(),
                    "Type declared more than once, keeping the latest"
                );
            }
            self.types.insert(decl.qualified_name.clone(), entry(unit.id(), decl));
            declared.push(decl.qualified_name.clone());
        }

        self.units.insert(unit.id().clone(), declared);
    }

    /// Drop the declarations contributed by a unit
    pub fn remove_unit(&mut self, unit: &UnitId) {
        for name in self.units.remove(unit).unwrap_or_default() {
            if self.types.get(&name).is_some_and(|entry| &entry.unit == unit) {
                self.types.remove(&name);
            }
        }
    }

    pub fn contains_type(&self, qualified_name: &str) -> bool {
        self.types.contains_key(qualified_name)
    }

    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats {
            units: self.units.len(),
            types: self.types.len(),
            ..IndexStats::default()
        };
        for overloads in self.types.values().flat_map(|t| t.members.values()) {
            stats.members += overloads.len();
            stats.deprecated += overloads.iter().filter(|m| m.deprecation.is_some()).count();
        }
        stats
    }

    /// Every indexed member, sorted by qualified name
    ///
    /// Overloads that disagree on deprecation are listed as deprecated.
    pub fn symbols(&self) -> Vec<SymbolMetadata> {
        let mut symbols = BTreeMap::new();

        for (type_name, entry) in &self.types {
            for ((member, kind), overloads) in &entry.members {
                let qualified_name = format!("{}.{}", type_name, member);
                let metadata = match overloads.iter().find_map(|m| m.deprecation.as_ref()) {
                    Some(deprecation) => deprecated_metadata(qualified_name.clone(), *kind, deprecation),
                    None => SymbolMetadata::new(qualified_name.clone(), *kind),
                };
                symbols.insert((qualified_name, *kind), metadata);
            }
        }

        symbols.into_values().collect()
    }

    /// Qualified name of the type a reference denotes
    pub fn lookup_type(&self, ty: &TypeRef) -> Result<&str, ResolutionFailure> {
        match ty {
            TypeRef::Qualified { name } => self
                .types
                .get_key_value(name.as_str())
                .map(|(key, _)| key.as_str())
                .ok_or_else(|| ResolutionFailure::UnknownType(name.clone())),
            TypeRef::Simple { name, packages } => {
                let candidates = ty.candidates();

                // The unit's own package shadows on-demand imports
                if let Some(own) = packages.first().map(|p| qualify(p, name)) {
                    if let Some((key, _)) = self.types.get_key_value(own.as_str()) {
                        return Ok(key.as_str());
                    }
                }

                let found: Vec<&str> = candidates
                    .iter()
                    .filter_map(|c| self.types.get_key_value(c.as_str()).map(|(key, _)| key.as_str()))
                    .collect();

                match found.as_slice() {
                    [] => Err(ResolutionFailure::UnknownType(name.clone())),
                    [single] => Ok(*single),
                    _ => Err(ResolutionFailure::AmbiguousType {
                        name: name.clone(),
                        candidates: found.iter().map(|s| s.to_string()).collect(),
                    }),
                }
            }
        }
    }
}

impl SymbolResolver for SymbolIndex {
    fn resolve(&self, receiver: &TypeRef, member: &str, kind: MemberKind) -> Result<SymbolMetadata, ResolutionFailure> {
        let owner = self.lookup_type(receiver)?;

        let mut queue = VecDeque::from([owner.to_string()]);
        let mut visited = HashSet::new();

        while let Some(type_name) = queue.pop_front() {
            if !visited.insert(type_name.clone()) {
                continue;
            }
            let Some(entry) = self.types.get(&type_name) else {
                continue;
            };

            if let Some(overloads) = entry.members.get(&(member.to_string(), kind)) {
                return overload_metadata(&type_name, member, kind, overloads);
            }

            // Supertypes outside the index are simply not searched
            for supertype in &entry.supertypes {
                if let Ok(name) = self.lookup_type(supertype) {
                    queue.push_back(name.to_string());
                }
            }
        }

        Err(ResolutionFailure::UnknownMember {
            owner: owner.to_string(),
            member: member.to_string(),
        })
    }
}

fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", package, name)
    }
}

fn entry(unit: &UnitId, decl: &TypeDecl) -> TypeEntry {
    let mut members: HashMap<(String, MemberKind), Vec<MemberEntry>> = HashMap::new();

    for member in &decl.members {
        if member.kind == MemberDeclKind::Constructor {
            continue;
        }
        members
            .entry((member.name.clone(), member.kind.member_kind()))
            .or_default()
            .push(MemberEntry {
                deprecation: member.deprecation.clone(),
            });
    }

    TypeEntry {
        unit: unit.clone(),
        supertypes: decl.supertypes.clone(),
        members,
    }
}

fn deprecated_metadata(qualified_name: String, kind: MemberKind, deprecation: &Deprecation) -> SymbolMetadata {
    let metadata = SymbolMetadata::new(qualified_name, kind).deprecated(deprecation.replacement.clone());
    if deprecation.for_removal {
        metadata.for_removal()
    } else {
        metadata
    }
}

fn overload_metadata(
    type_name: &str,
    member: &str,
    kind: MemberKind,
    overloads: &[MemberEntry],
) -> Result<SymbolMetadata, ResolutionFailure> {
    let qualified_name = format!("{}.{}", type_name, member);
    let deprecated = overloads.iter().filter(|m| m.deprecation.is_some()).count();

    if deprecated == 0 {
        Ok(SymbolMetadata::new(qualified_name, kind))
    } else if deprecated == overloads.len() {
        let deprecation = overloads
            .iter()
            .find_map(|m| m.deprecation.as_ref())
            .cloned()
            .unwrap_or_default();
        Ok(deprecated_metadata(qualified_name, kind, &deprecation))
    } else {
        Err(ResolutionFailure::AmbiguousOverload(qualified_name))
    }
}
