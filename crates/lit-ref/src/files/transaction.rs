//! Atomic commit of a [`RefTransaction`] against the loose-refs backend.

use std::io::Write as _;
use std::path::Path;

use lit_hash::ObjectId;
use lit_utils::date::Signature;
use lit_utils::lockfile::LockFile;

use crate::error::RefError;
use crate::files::loose::LooseRefs;
use crate::name::RefName;
use crate::reflog::{self, ReflogEntry};
use crate::store::{RefTransaction, RefUpdate, RefUpdateAction};
use crate::Reference;

/// One ref update mid-transaction: its lock is held, its pre-image oid is
/// known, and it's waiting to be written and finalized.
struct Pending {
    lock: LockFile,
    name: RefName,
    action: RefUpdateAction,
    reflog_message: Option<String>,
    before: Option<ObjectId>,
}

/// Commit a ref transaction atomically:
/// 1. Acquire a lock on every ref being updated, checking its CAS condition.
/// 2. Write new values into the lock files.
/// 3. Commit (or, for deletes, roll back and remove the target) every lock.
/// 4. Append reflog entries for updates that asked for one.
///
/// Any failure in step 1 drops the locks already taken, rolling them back.
pub(crate) fn commit_transaction(lit_dir: &Path, transaction: RefTransaction, committer: Option<&Signature>) -> Result<(), RefError> {
    if transaction.is_empty() {
        return Ok(());
    }

    let refs = LooseRefs::new(lit_dir);
    let pending = acquire_and_verify(&refs, transaction.updates())?;
    let pending = write_new_values(pending)?;
    finalize(lit_dir, &refs, pending, committer)
}

fn acquire_and_verify(refs: &LooseRefs<'_>, updates: &[RefUpdate]) -> Result<Vec<Pending>, RefError> {
    let mut pending = Vec::with_capacity(updates.len());

    for update in updates {
        let lock_path = refs.path_for(&update.name);
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RefError::IoPath { path: parent.to_path_buf(), source: e })?;
        }
        let lock = LockFile::acquire(&lock_path)?;

        let before = resolve_current(refs, &update.name, 10)?;
        verify_cas(&update.name, &update.action, before.as_ref())?;

        pending.push(Pending {
            lock,
            name: update.name.clone(),
            action: clone_action(&update.action),
            reflog_message: update.reflog_message.clone(),
            before,
        });
    }

    Ok(pending)
}

fn clone_action(action: &RefUpdateAction) -> RefUpdateAction {
    match action {
        RefUpdateAction::Create { new_target } => RefUpdateAction::Create { new_target: *new_target },
        RefUpdateAction::Update { old_target, new_target } => RefUpdateAction::Update {
            old_target: *old_target,
            new_target: *new_target,
        },
        RefUpdateAction::Delete { old_target } => RefUpdateAction::Delete { old_target: *old_target },
        RefUpdateAction::SetSymbolic { target } => RefUpdateAction::SetSymbolic { target: target.clone() },
    }
}

fn write_new_values(mut pending: Vec<Pending>) -> Result<Vec<Pending>, RefError> {
    for item in &mut pending {
        let content = match &item.action {
            RefUpdateAction::Create { new_target } | RefUpdateAction::Update { new_target, .. } => {
                Some(format!("{}\n", new_target.to_hex()))
            }
            RefUpdateAction::SetSymbolic { target } => Some(format!("ref: {target}\n")),
            RefUpdateAction::Delete { .. } => None,
        };

        if let Some(content) = content {
            item.lock
                .write_all(content.as_bytes())
                .map_err(|e| RefError::IoPath { path: item.lock.path().to_path_buf(), source: e })?;
        }
    }
    Ok(pending)
}

fn finalize(lit_dir: &Path, refs: &LooseRefs<'_>, pending: Vec<Pending>, committer: Option<&Signature>) -> Result<(), RefError> {
    let mut after_oids = Vec::with_capacity(pending.len());

    for item in pending {
        let Pending { lock, name, action, reflog_message, before } = item;

        let after = match &action {
            RefUpdateAction::Delete { .. } => {
                lock.rollback()?;
                refs.delete(&name)?;
                ObjectId::NULL
            }
            RefUpdateAction::Create { new_target } | RefUpdateAction::Update { new_target, .. } => {
                lock.commit()?;
                *new_target
            }
            RefUpdateAction::SetSymbolic { .. } => {
                lock.commit()?;
                ObjectId::NULL
            }
        };

        after_oids.push((name, action, reflog_message, before, after));
    }

    let Some(sig) = committer else { return Ok(()) };

    for (name, action, reflog_message, before, after) in after_oids {
        let Some(message) = reflog_message else { continue };
        if matches!(action, RefUpdateAction::SetSymbolic { .. }) {
            continue;
        }

        let entry = ReflogEntry {
            old_oid: before.unwrap_or(ObjectId::NULL),
            new_oid: after,
            identity: sig.clone(),
            message: message.as_str().into(),
        };
        reflog::append_reflog_entry(lit_dir, &name, &entry)?;
    }

    Ok(())
}

fn verify_cas(name: &RefName, action: &RefUpdateAction, current: Option<&ObjectId>) -> Result<(), RefError> {
    match action {
        RefUpdateAction::Create { .. } => {
            if current.is_some() {
                return Err(RefError::AlreadyExists(name.to_string()));
            }
        }
        RefUpdateAction::Update { old_target, .. } | RefUpdateAction::Delete { old_target } => {
            let actual = current.ok_or_else(|| RefError::NotFound(name.to_string()))?;
            if actual != old_target {
                return Err(RefError::CasFailed {
                    name: name.to_string(),
                    expected: *old_target,
                    actual: *actual,
                });
            }
        }
        RefUpdateAction::SetSymbolic { .. } => {}
    }
    Ok(())
}

/// Follow a symbolic ref chain to its OID, bounded by `max_depth`.
fn resolve_current(refs: &LooseRefs<'_>, name: &RefName, max_depth: usize) -> Result<Option<ObjectId>, RefError> {
    if max_depth == 0 {
        return Err(RefError::SymrefLoop(name.to_string()));
    }

    match refs.read(name)? {
        Some(Reference::Direct { target, .. }) => Ok(Some(target)),
        Some(Reference::Symbolic { target, .. }) => resolve_current(refs, &target, max_depth - 1),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RefTransaction;
    use bstr::BString;
    use lit_utils::date::LitDate;

    fn test_sig() -> Signature {
        Signature {
            name: BString::from("Test User"),
            email: BString::from("test@example.com"),
            date: LitDate::new(1234567890, 0),
        }
    }

    #[test]
    fn create_single_ref() {
        let dir = tempfile::tempdir().unwrap();
        let lit_dir = dir.path();
        let refs = LooseRefs::new(lit_dir);

        let mut tx = RefTransaction::new();
        let name = RefName::new("refs/heads/main").unwrap();
        let oid = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();
        tx.create(name.clone(), oid, "branch: Created from HEAD");

        commit_transaction(lit_dir, tx, Some(&test_sig())).unwrap();

        match refs.read(&name).unwrap().unwrap() {
            Reference::Direct { target, .. } => assert_eq!(target, oid),
            _ => panic!("expected Direct ref"),
        }
    }

    #[test]
    fn update_ref_with_cas() {
        let dir = tempfile::tempdir().unwrap();
        let lit_dir = dir.path();
        let refs = LooseRefs::new(lit_dir);

        let name = RefName::new("refs/heads/main").unwrap();
        let old_oid = ObjectId::from_hex("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        let new_oid = ObjectId::from_hex("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb").unwrap();

        refs.write(&name, &old_oid).unwrap();

        let mut tx = RefTransaction::new();
        tx.update(name.clone(), old_oid, new_oid, "commit: second commit");
        commit_transaction(lit_dir, tx, Some(&test_sig())).unwrap();

        match refs.read(&name).unwrap().unwrap() {
            Reference::Direct { target, .. } => assert_eq!(target, new_oid),
            _ => panic!("expected Direct ref"),
        }
    }

    #[test]
    fn update_ref_cas_failure() {
        let dir = tempfile::tempdir().unwrap();
        let lit_dir = dir.path();
        let refs = LooseRefs::new(lit_dir);

        let name = RefName::new("refs/heads/main").unwrap();
        let actual_oid = ObjectId::from_hex("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        let wrong_old = ObjectId::from_hex("cccccccccccccccccccccccccccccccccccccccc").unwrap();
        let new_oid = ObjectId::from_hex("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb").unwrap();

        refs.write(&name, &actual_oid).unwrap();

        let mut tx = RefTransaction::new();
        tx.update(name, wrong_old, new_oid, "should fail");

        let result = commit_transaction(lit_dir, tx, Some(&test_sig()));
        assert!(matches!(result, Err(RefError::CasFailed { .. })));
    }

    #[test]
    fn delete_ref_transaction() {
        let dir = tempfile::tempdir().unwrap();
        let lit_dir = dir.path();
        let refs = LooseRefs::new(lit_dir);

        let name = RefName::new("refs/heads/main").unwrap();
        let oid = ObjectId::from_hex("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        refs.write(&name, &oid).unwrap();

        let mut tx = RefTransaction::new();
        tx.delete(name.clone(), oid, "branch: deleted");
        commit_transaction(lit_dir, tx, Some(&test_sig())).unwrap();

        assert!(refs.read(&name).unwrap().is_none());
    }

    #[test]
    fn create_already_exists() {
        let dir = tempfile::tempdir().unwrap();
        let lit_dir = dir.path();
        let refs = LooseRefs::new(lit_dir);

        let name = RefName::new("refs/heads/main").unwrap();
        let oid = ObjectId::from_hex("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        refs.write(&name, &oid).unwrap();

        let mut tx = RefTransaction::new();
        tx.create(name, oid, "should fail");

        let result = commit_transaction(lit_dir, tx, Some(&test_sig()));
        assert!(matches!(result, Err(RefError::AlreadyExists(_))));
    }

    #[test]
    fn set_symbolic_ref() {
        let dir = tempfile::tempdir().unwrap();
        let lit_dir = dir.path();
        let refs = LooseRefs::new(lit_dir);

        let name = RefName::new("HEAD").unwrap();
        let target = RefName::new("refs/heads/main").unwrap();

        let mut tx = RefTransaction::new();
        tx.set_symbolic(name.clone(), target.clone(), "checkout: moving to main");
        commit_transaction(lit_dir, tx, Some(&test_sig())).unwrap();

        match refs.read(&name).unwrap().unwrap() {
            Reference::Symbolic { target: found, .. } => assert_eq!(found, target),
            _ => panic!("expected Symbolic ref"),
        }
    }

    #[test]
    fn transaction_creates_reflog() {
        let dir = tempfile::tempdir().unwrap();
        let lit_dir = dir.path();

        let name = RefName::new("refs/heads/main").unwrap();
        let oid = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();

        let mut tx = RefTransaction::new();
        tx.create(name.clone(), oid, "branch: Created");
        commit_transaction(lit_dir, tx, Some(&test_sig())).unwrap();

        let entries = reflog::read_reflog(lit_dir, &name).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].old_oid.is_null());
        assert_eq!(entries[0].new_oid, oid);
        assert_eq!(entries[0].message, BString::from("branch: Created"));
    }

    #[test]
    fn no_reflog_without_committer() {
        let dir = tempfile::tempdir().unwrap();
        let lit_dir = dir.path();

        let name = RefName::new("refs/heads/main").unwrap();
        let oid = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();

        let mut tx = RefTransaction::new();
        tx.create(name.clone(), oid, "branch: Created");
        commit_transaction(lit_dir, tx, None).unwrap();

        assert!(reflog::read_reflog(lit_dir, &name).unwrap().is_empty());
    }
}
