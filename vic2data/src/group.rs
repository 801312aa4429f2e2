//! Group entities and the deferred member/back-reference fix-up.
//!
//! While a group block is being read its members go straight into the flat
//! member table, but the group only records their indices. Once the whole
//! file is read, [`resolve_groups`] links both directions in one pass.

use std::path::Path;

use crate::db::Database;
use crate::error::{Diagnostics, LoadError};
use crate::fields::{Context, Fallback, Field, read_fields};
use crate::table::{Idx, Named, Table};

/// A group holding references into a member table.
pub trait GroupOf<M> {
    fn members(&self) -> &[Idx<M>];
    fn push_member(&mut self, member: Idx<M>);
}

/// A member pointing back at its group.
pub trait MemberOf<G> {
    fn group(&self) -> Option<Idx<G>>;
    fn set_group(&mut self, group: Idx<G>);
}

macro_rules! grouped {
    ($group:ty => $member:ty) => {
        impl $crate::group::GroupOf<$member> for $group {
            fn members(&self) -> &[$crate::table::Idx<$member>] {
                &self.members
            }

            fn push_member(&mut self, member: $crate::table::Idx<$member>) {
                self.members.push(member);
            }
        }

        impl $crate::group::MemberOf<$group> for $member {
            fn group(&self) -> Option<$crate::table::Idx<$group>> {
                self.group
            }

            fn set_group(&mut self, group: $crate::table::Idx<$group>) {
                self.group = Some(group);
            }
        }
    };
}

/// Members read for one group, not yet linked.
#[derive(Debug)]
pub struct PendingGroup<G, M> {
    pub group: Idx<G>,
    members: Vec<Idx<M>>,
}

impl<G, M> PendingGroup<G, M> {
    pub fn new(group: Idx<G>) -> Self {
        Self {
            group,
            members: Vec::new(),
        }
    }

    pub fn record(&mut self, member: Idx<M>) {
        self.members.push(member);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Links every pending member to its group.
///
/// A member's back-reference is set exactly once; finding it already set, or
/// an index outside the member table, is an internal consistency error.
pub fn resolve_groups<G, M>(
    groups: &mut Table<G>,
    members: &mut Table<M>,
    pending: Vec<PendingGroup<G, M>>,
) -> Result<(), LoadError>
where
    G: GroupOf<M>,
    M: MemberOf<G>,
{
    let kind = members.kind();
    for batch in pending {
        if groups.get(batch.group).is_none() {
            return Err(LoadError::Invariant(format!(
                "{} index {} is out of range",
                groups.kind(),
                batch.group.index()
            )));
        }
        for idx in batch.members {
            let member = members.get_mut(idx).ok_or_else(|| {
                LoadError::Invariant(format!("{} index {} is out of range", kind, idx.index()))
            })?;
            if member.group().is_some() {
                return Err(LoadError::Invariant(format!(
                    "{} {} already belongs to a group",
                    kind,
                    idx.index() + 1
                )));
            }
            member.set_group(batch.group);
            groups[batch.group].push_member(idx);
        }
    }
    Ok(())
}

/// Shape of a `group = { member = { field = value ... } ... }` file.
pub(crate) struct GroupedFile<G: 'static, M: 'static> {
    pub tables: fn(&mut Database) -> (&mut Table<G>, &mut Table<M>),
    pub new_group: fn(&str) -> G,
    pub new_member: fn(&str) -> M,
    pub fields: &'static [Field<M>],
    pub fallback: Fallback<M>,
}

/// Reads a two-level group file, then links members and groups and freezes
/// both tables.
///
/// Every top-level entry and every member must be a named block; duplicate
/// group or member names are errors.
pub(crate) fn load_grouped<G, M>(
    db: &mut Database,
    path: &Path,
    kind: &GroupedFile<G, M>,
) -> Result<(), LoadError>
where
    G: Named + GroupOf<M>,
    M: Named + MemberOf<G>,
{
    let file = path.display().to_string();
    let mut diag = Diagnostics::new(file.clone());
    let root = diag.parse(path)?;
    let mut pending = Vec::new();

    for group_l in &root.children {
        if !group_l.is_named_group() {
            diag.error(format_args!("Expected a named group, found '{}'", group_l.name()));
            continue;
        }
        let group_name = group_l.name();
        let (groups, _) = (kind.tables)(db);
        if groups.find(&group_name).is_some() {
            diag.error(format_args!("Duplicate {} '{}'", groups.kind(), group_name));
            continue;
        }
        let group = groups.add((kind.new_group)(&group_name))?;
        let mut batch = PendingGroup::new(group);

        for member_l in &group_l.children {
            if !member_l.is_named_group() {
                diag.error(format_args!(
                    "Expected a named block in '{}', found '{}'",
                    group_name,
                    member_l.name()
                ));
                continue;
            }
            let name = member_l.name();
            let (_, members) = (kind.tables)(db);
            if members.find(&name).is_some() {
                diag.error(format_args!("Duplicate {} '{}'", members.kind(), name));
                continue;
            }
            let mut member = (kind.new_member)(&name);
            let cx = Context::new(db, &file);
            read_fields(kind.fields, kind.fallback, &mut member, &cx, member_l, &name, &mut diag);
            let (_, members) = (kind.tables)(db);
            batch.record(members.add(member)?);
        }
        pending.push(batch);
    }

    let (groups, members) = (kind.tables)(db);
    resolve_groups(groups, members, pending)?;
    log::info!(
        "Loaded {} {} entries into {} groups",
        members.len(),
        members.kind(),
        groups.len()
    );
    groups.freeze();
    members.freeze();
    diag.finish()
}
