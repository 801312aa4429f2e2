use std::path::Path;

use serde::Serialize;
use vic2txt::Lexeme;

use crate::db::Database;
use crate::error::{Diagnostics, LoadError};
use crate::group::{PendingGroup, resolve_groups};
use crate::table::Idx;

pub const ISSUES_FILE: &str = "common/issues.txt";

const PARTY_ISSUES: &str = "party_issues";

keyword_enum! {
    /// Category of a reform group, named by its top-level block.
    pub enum ReformKind {
        Political => "political_reforms",
        Social => "social_reforms",
        Economic => "economic_reforms",
        Military => "military_reforms",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IssueGroup {
    pub name: String,
    pub members: Vec<Idx<Issue>>,
}

/// A stance a party can take inside an issue group.
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub name: String,
    pub group: Option<Idx<IssueGroup>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReformGroup {
    pub name: String,
    pub kind: ReformKind,
    pub next_step_only: bool,
    pub administrative: bool,
    pub members: Vec<Idx<Reform>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reform {
    pub name: String,
    pub group: Option<Idx<ReformGroup>>,
}

named!(IssueGroup, Issue, ReformGroup, Reform);
grouped!(IssueGroup => Issue);
grouped!(ReformGroup => Reform);

/// Loads `common/issues.txt`: the party issue groups and the four reform
/// categories. Issue and reform effects are not interpreted.
pub fn load_issues(db: &mut Database, path: &Path) -> Result<(), LoadError> {
    let mut diag = Diagnostics::for_path(path);
    let root = diag.parse(path)?;
    let mut issue_batches = Vec::new();
    let mut reform_batches = Vec::new();

    for parent in &root.children {
        if !parent.is_named_group() {
            diag.error(format_args!("Expected an issue or reform category, found '{}'", parent.name()));
            continue;
        }
        let category = parent.name();
        if category == PARTY_ISSUES {
            read_issue_groups(db, parent, &mut issue_batches, &mut diag)?;
        } else if let Some(kind) = ReformKind::from_keyword(&category) {
            read_reform_groups(db, parent, kind, &mut reform_batches, &mut diag)?;
        } else {
            diag.error(format_args!("Unrecognised issue category '{}'", category));
        }
    }

    resolve_groups(&mut db.issue_groups, &mut db.issues, issue_batches)?;
    resolve_groups(&mut db.reform_groups, &mut db.reforms, reform_batches)?;
    log::info!(
        "Loaded {} issues in {} groups and {} reforms in {} groups",
        db.issues.len(),
        db.issue_groups.len(),
        db.reforms.len(),
        db.reform_groups.len()
    );
    db.issue_groups.freeze();
    db.issues.freeze();
    db.reform_groups.freeze();
    db.reforms.freeze();
    diag.finish()
}

fn read_issue_groups(
    db: &mut Database,
    parent: &Lexeme,
    batches: &mut Vec<PendingGroup<IssueGroup, Issue>>,
    diag: &mut Diagnostics,
) -> Result<(), LoadError> {
    for group_l in &parent.children {
        if !group_l.is_named_group() {
            diag.error(format_args!("Expected an issue group, found '{}'", group_l.name()));
            continue;
        }
        let group_name = group_l.name();
        if db.issue_groups.find(&group_name).is_some() {
            diag.error(format_args!("Duplicate issue group '{}'", group_name));
            continue;
        }
        let group = db.issue_groups.add(IssueGroup {
            name: group_name.clone(),
            members: Vec::new(),
        })?;
        let mut batch = PendingGroup::new(group);
        for issue_l in &group_l.children {
            if !issue_l.is_named_group() {
                diag.error(format_args!(
                    "Expected an issue block in '{}', found '{}'",
                    group_name,
                    issue_l.name()
                ));
                continue;
            }
            let name = issue_l.name();
            if db.issues.find(&name).is_some() {
                diag.error(format_args!("Duplicate issue '{}'", name));
                continue;
            }
            batch.record(db.issues.add(Issue { name, group: None })?);
        }
        batches.push(batch);
    }
    Ok(())
}

fn read_reform_groups(
    db: &mut Database,
    parent: &Lexeme,
    kind: ReformKind,
    batches: &mut Vec<PendingGroup<ReformGroup, Reform>>,
    diag: &mut Diagnostics,
) -> Result<(), LoadError> {
    for group_l in &parent.children {
        if !group_l.is_named_group() {
            diag.error(format_args!("Expected a {} group, found '{}'", kind, group_l.name()));
            continue;
        }
        let group_name = group_l.name();
        if db.reform_groups.find(&group_name).is_some() {
            diag.error(format_args!("Duplicate reform group '{}'", group_name));
            continue;
        }
        let mut group = ReformGroup {
            name: group_name.clone(),
            kind,
            next_step_only: false,
            administrative: false,
            members: Vec::new(),
        };
        let mut reforms = Vec::new();
        for reform_l in &group_l.children {
            match reform_l.key_text() {
                Some("next_step_only") => match reform_l.as_bool() {
                    Ok(v) => group.next_step_only = v,
                    Err(e) => diag.error(format_args!("{}: {}", group_name, e)),
                },
                Some("administrative") => match reform_l.as_bool() {
                    Ok(v) => group.administrative = v,
                    Err(e) => diag.error(format_args!("{}: {}", group_name, e)),
                },
                _ if reform_l.is_named_group() => {
                    let name = reform_l.name();
                    if db.reforms.find(&name).is_some() || reforms.contains(&name) {
                        diag.error(format_args!("Duplicate reform '{}'", name));
                    } else {
                        reforms.push(name);
                    }
                }
                _ => diag.error(format_args!(
                    "Expected a reform block in '{}', found '{}'",
                    group_name,
                    reform_l.name()
                )),
            }
        }
        let mut batch = PendingGroup::new(db.reform_groups.add(group)?);
        for name in reforms {
            batch.record(db.reforms.add(Reform { name, group: None })?);
        }
        batches.push(batch);
    }
    Ok(())
}
