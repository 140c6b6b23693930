//! Auto-mapping validator.
//!
//! Produces the ordered member-mapping list for a [`MappingConfiguration`] in
//! one deterministic pass:
//!
//! 1. Replay the recorded ignores, overrides and resets in call order,
//!    resolving every name under the active comparer to member positions.
//! 2. Index eligible source members (not ignored, readable) and eligible
//!    target members (not ignored, writable) by normalized name. Two distinct
//!    members sharing a name is an [`MapError::AmbiguousMember`].
//! 3. Walk the target members in declaration order. An explicit override
//!    always wins; otherwise the same-named eligible source member is paired
//!    and consumed. A target left without a source is fatal when the mode
//!    requires all targets.
//! 4. When the mode requires all sources, every unconsumed eligible source
//!    member must be read statically by some emitted override.
//!
//! The pass keeps no state between runs.

use std::any::type_name;
use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use indexmap::map::Entry;
use memberwise_model::{Member, short_type_name};

use crate::config::{Directive, MappingConfiguration};
use crate::error::{MapError, Result};
use crate::mapping::{Binding, MemberMapping, SourceComputation};
use crate::options::NameComparer;

/// Ignore sets and overrides after replaying the configuration calls.
struct Resolved<'a, S> {
    ignored_sources: HashSet<usize>,
    ignored_targets: HashSet<usize>,
    /// Overrides keyed by target position; the last call for a target wins.
    overrides: HashMap<usize, &'a Binding<S>>,
}

/// Runs the validator over `config`.
pub(crate) fn validate<S: 'static, T: 'static>(
    config: &MappingConfiguration<S, T>,
) -> Result<Vec<MemberMapping<S, T>>> {
    let options = config.options;
    let comparer = options.name_comparer;
    let source_owner = owner_label(&config.source_members);
    let target_owner = owner_label(&config.target_members);

    let Resolved {
        ignored_sources,
        ignored_targets,
        overrides,
    } = replay(config, comparer)?;

    let mut sources = index_members(&config.source_members, comparer, |index, member| {
        member.can_read() && !ignored_sources.contains(&index)
    })?;
    let targets = index_members(&config.target_members, comparer, |index, member| {
        member.can_write() && !ignored_targets.contains(&index)
    })?;

    let mut mappings = Vec::with_capacity(config.target_members.len());
    let mut read_by_overrides = HashSet::new();

    for (index, target) in config.target_members.iter().enumerate() {
        if let Some(binding) = overrides.get(&index) {
            let source = bind_source(binding, &config.source_members, comparer)?;
            read_by_overrides.extend(
                source
                    .reads()
                    .iter()
                    .map(|member| comparer.normalize(member.name())),
            );
            tracing::trace!(member = %target, computation = %source, "Explicit override");
            mappings.push(MemberMapping::new(
                source,
                target.clone(),
                options.nullable_behavior,
            )?);
            continue;
        }

        let key = comparer.normalize(target.name());
        // Ineligible targets and repeated listings of one member are skipped.
        match targets.get(&key) {
            Some(indexed) if std::ptr::eq(*indexed, target) => {}
            _ => continue,
        }
        match sources.shift_remove(&key) {
            Some(source) => {
                mappings.push(MemberMapping::between(
                    source.clone(),
                    target.clone(),
                    options.nullable_behavior,
                )?);
            }
            None if options.mode.requires_all_targets() => {
                return Err(MapError::UnmappedTargetMember {
                    owner: target_owner,
                    member: target.name().to_string(),
                });
            }
            None => {
                tracing::trace!(member = %target, "No source member, skipped");
            }
        }
    }

    if options.mode.requires_all_sources() {
        if let Some(unmapped) = sources
            .iter()
            .find(|(key, _)| !read_by_overrides.contains(*key))
            .map(|(_, member)| member)
        {
            return Err(MapError::UnmappedSourceMember {
                owner: source_owner,
                member: unmapped.name().to_string(),
            });
        }
    }

    tracing::debug!(
        source_owner = %source_owner,
        target_owner = %target_owner,
        mode = %options.mode,
        mappings = mappings.len(),
        overrides = overrides.len(),
        "Validated member mappings"
    );
    Ok(mappings)
}

/// Replays the configuration calls in order under `comparer`.
fn replay<'a, S: 'static, T: 'static>(
    config: &'a MappingConfiguration<S, T>,
    comparer: NameComparer,
) -> Result<Resolved<'a, S>> {
    let sources = &config.source_members;
    let targets = &config.target_members;
    let mut resolved = Resolved {
        ignored_sources: HashSet::new(),
        ignored_targets: HashSet::new(),
        overrides: HashMap::new(),
    };

    for directive in &config.directives {
        match directive {
            Directive::IgnoreSource(name) => {
                resolved.ignored_sources.extend(positions(sources, name, comparer));
            }
            Directive::IgnoreTarget(name) => {
                for index in positions(targets, name, comparer) {
                    resolved.overrides.remove(&index);
                    resolved.ignored_targets.insert(index);
                }
            }
            Directive::Bind(name, binding) => {
                let (index, _) = find_member(targets, name, comparer)?;
                resolved.ignored_targets.remove(&index);
                resolved.overrides.insert(index, binding);
            }
            Directive::Reset(name) => {
                for index in positions(sources, name, comparer) {
                    resolved.ignored_sources.remove(&index);
                }
                for index in positions(targets, name, comparer) {
                    resolved.ignored_targets.remove(&index);
                    resolved.overrides.remove(&index);
                }
            }
        }
    }
    Ok(resolved)
}

/// Owner label for diagnostics, taken from the member list when possible.
fn owner_label<O: 'static>(members: &[Member<O>]) -> String {
    let owner = members.first().map_or(type_name::<O>(), Member::owner);
    short_type_name(owner).to_string()
}

/// Members called `name`: exact matches when there are any, otherwise the
/// matches under `comparer`.
fn named<'a, O: 'static>(
    members: &'a [Member<O>],
    name: &str,
    comparer: NameComparer,
) -> Vec<(usize, &'a Member<O>)> {
    let exact: Vec<_> = members
        .iter()
        .enumerate()
        .filter(|(_, member)| member.name() == name)
        .collect();
    if !exact.is_empty() {
        return exact;
    }
    let key = comparer.normalize(name);
    members
        .iter()
        .enumerate()
        .filter(|(_, member)| comparer.normalize(member.name()) == key)
        .collect()
}

/// Positions of the members called `name`. Names matching nothing yield
/// nothing.
fn positions<O: 'static>(members: &[Member<O>], name: &str, comparer: NameComparer) -> Vec<usize> {
    named(members, name, comparer)
        .into_iter()
        .map(|(index, _)| index)
        .collect()
}

fn index_members<'a, O: 'static>(
    members: &'a [Member<O>],
    comparer: NameComparer,
    eligible: impl Fn(usize, &Member<O>) -> bool,
) -> Result<IndexMap<String, &'a Member<O>>> {
    let mut index: IndexMap<String, &Member<O>> = IndexMap::with_capacity(members.len());
    for (position, member) in members.iter().enumerate() {
        if !eligible(position, member) {
            continue;
        }
        match index.entry(comparer.normalize(member.name())) {
            Entry::Vacant(entry) => {
                entry.insert(member);
            }
            // The same member listed twice is not ambiguous.
            Entry::Occupied(entry) if *entry.get() == member => {}
            Entry::Occupied(entry) => {
                return Err(MapError::AmbiguousMember {
                    owner: owner_label(members),
                    first: entry.get().name().to_string(),
                    second: member.name().to_string(),
                    normalized: entry.key().clone(),
                });
            }
        }
    }
    Ok(index)
}

/// Looks up the one member called `name`, with its position.
fn find_member<'a, O: 'static>(
    members: &'a [Member<O>],
    name: &str,
    comparer: NameComparer,
) -> Result<(usize, &'a Member<O>)> {
    let found = named(members, name, comparer);
    let Some(&(index, first)) = found.first() else {
        return Err(MapError::MemberNotFound {
            owner: owner_label(members),
            member: name.to_string(),
        });
    };
    if let Some((_, other)) = found.iter().find(|(_, member)| *member != first) {
        return Err(MapError::AmbiguousMember {
            owner: owner_label(members),
            first: first.name().to_string(),
            second: other.name().to_string(),
            normalized: comparer.normalize(name),
        });
    }
    Ok((index, first))
}

/// Resolves an override against all source members, ignored ones included.
fn bind_source<S: 'static>(
    binding: &Binding<S>,
    members: &[Member<S>],
    comparer: NameComparer,
) -> Result<SourceComputation<S>> {
    let mut lookup = |name: &str| find_member(members, name, comparer).map(|(_, member)| member.clone());
    match binding {
        Binding::Member(name) => Ok(SourceComputation::Member(lookup(name)?)),
        Binding::Expression(expr) => Ok(SourceComputation::Expression(expr.bind(&mut lookup)?)),
        Binding::Delegate(delegate) => Ok(SourceComputation::Delegate(delegate.clone())),
    }
}
