//! Executor (§4.6).
//!
//! Applies a [`Plan`] against a projected-filesystem overlay: before
//! anything runs, every `Rename`/`Unstash` destination in the whole plan
//! is pre-marked "will exist" so stash-name generation never collides with
//! a path a later step is about to create. Renames create missing parent
//! directories; deletes treat "not found" as success once the overlay
//! already considers the path gone; everything else aborts the remaining
//! plan with a diagnostic.

use std::collections::HashMap;
use std::path::Path;

use crate::error::VidirError;
use crate::planner::{Action, Plan};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Overlay {
    Exists,
    Deleted,
}

/// The disk operations the executor needs. A flat capability set (per the
/// spec's platform-abstraction design note), not a trait hierarchy, so a
/// test can substitute an in-memory fake without implementing unrelated
/// capabilities like directory listing or editor launch.
pub trait Platform {
    fn path_exists(&self, path: &str) -> bool;
    fn rename(&mut self, src: &str, dst: &str) -> std::io::Result<()>;
    fn delete(&mut self, path: &str) -> std::io::Result<()>;
    fn mkdir_p(&mut self, path: &str) -> std::io::Result<()>;
}

pub struct RealPlatform;

impl Platform for RealPlatform {
    fn path_exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }

    fn rename(&mut self, src: &str, dst: &str) -> std::io::Result<()> {
        std::fs::rename(src, dst)
    }

    fn delete(&mut self, path: &str) -> std::io::Result<()> {
        let p = Path::new(path);
        if p.is_dir() {
            std::fs::remove_dir(p)
        } else {
            std::fs::remove_file(p)
        }
    }

    fn mkdir_p(&mut self, path: &str) -> std::io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

struct ProjectedFs<'a, P: Platform> {
    platform: &'a P,
    overlay: HashMap<String, Overlay>,
}

impl<'a, P: Platform> ProjectedFs<'a, P> {
    fn exists(&self, path: &str) -> bool {
        match self.overlay.get(path) {
            Some(Overlay::Exists) => true,
            Some(Overlay::Deleted) => false,
            None => self.platform.path_exists(path),
        }
    }

    fn mark_exists(&mut self, path: &str) {
        self.overlay.insert(path.to_string(), Overlay::Exists);
    }

    fn mark_deleted(&mut self, path: &str) {
        self.overlay.insert(path.to_string(), Overlay::Deleted);
    }
}

/// Execute `plan`, calling `narrate` once per action *after* it succeeds
/// when `verbose` output is wanted (the executor doesn't decide whether to
/// narrate; it just offers the line, matching §4.6 "emits one line per
/// action ... after the action succeeds").
///
/// Returns `Ok(had_delete_errors)`: delete failures never abort the plan,
/// they only make the caller exit non-zero at the end (§7).
pub fn execute<P: Platform>(
    plan: &Plan,
    platform: &mut P,
    mut narrate: impl FnMut(&Action),
) -> Result<bool, VidirError> {
    let mut fs = ProjectedFs {
        platform,
        overlay: HashMap::new(),
    };
    for action in plan {
        match action {
            Action::Rename { dst, .. } | Action::Unstash { dst } => fs.mark_exists(dst),
            Action::Delete { .. } | Action::Stash { .. } => {}
        }
    }

    let mut stash_stack: Vec<String> = Vec::new();
    let mut had_delete_errors = false;

    for action in plan {
        match action {
            Action::Stash { src } => {
                let stash_name = generate_stash_name(src, &fs);
                fs.platform
                    .rename(src, &stash_name)
                    .map_err(|source| VidirError::RenameFailed {
                        src: src.into(),
                        dst: stash_name.clone().into(),
                        source,
                    })?;
                fs.mark_deleted(src);
                fs.mark_exists(&stash_name);
                stash_stack.push(stash_name);
                narrate(action);
            }
            Action::Rename { src, dst } => {
                ensure_parent_dir(&mut fs, dst)?;
                fs.platform
                    .rename(src, dst)
                    .map_err(|source| VidirError::RenameFailed {
                        src: src.into(),
                        dst: dst.into(),
                        source,
                    })?;
                fs.mark_deleted(src);
                fs.mark_exists(dst);
                narrate(action);
            }
            Action::Unstash { dst } => {
                let stashed = stash_stack.pop().expect("unstash without matching stash");
                ensure_parent_dir(&mut fs, dst)?;
                fs.platform
                    .rename(&stashed, dst)
                    .map_err(|source| VidirError::RenameFailed {
                        src: stashed.clone().into(),
                        dst: dst.into(),
                        source,
                    })?;
                fs.mark_deleted(&stashed);
                fs.mark_exists(dst);
                narrate(action);
            }
            Action::Delete { src } => {
                match fs.platform.delete(src) {
                    Ok(()) => {
                        fs.mark_deleted(src);
                        narrate(action);
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound && !fs.exists(src) => {
                        narrate(action);
                    }
                    Err(e) => {
                        eprintln!("vidir: could not delete {src}: {e}");
                        had_delete_errors = true;
                    }
                }
            }
        }
    }

    Ok(had_delete_errors)
}

fn ensure_parent_dir<P: Platform>(fs: &mut ProjectedFs<P>, path: &str) -> Result<(), VidirError> {
    let Some(parent) = Path::new(path).parent() else {
        return Ok(());
    };
    let parent = parent.to_string_lossy().to_string();
    if parent.is_empty() || fs.exists(&parent) {
        return Ok(());
    }
    fs.platform
        .mkdir_p(&parent)
        .map_err(|source| VidirError::MkdirFailed {
            path: parent.clone().into(),
            source,
        })?;
    fs.mark_exists(&parent);
    Ok(())
}

fn generate_stash_name<P: Platform>(src: &str, fs: &ProjectedFs<P>) -> String {
    let first = format!("{src}~");
    if !fs.exists(&first) {
        return first;
    }
    let mut n = 1u64;
    loop {
        let candidate = format!("{src}~{n}");
        if !fs.exists(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Default)]
    struct FakePlatform {
        files: HashSet<String>,
        fail_rename: HashSet<String>,
    }

    impl Platform for FakePlatform {
        fn path_exists(&self, path: &str) -> bool {
            self.files.contains(path)
        }

        fn rename(&mut self, src: &str, dst: &str) -> std::io::Result<()> {
            if self.fail_rename.contains(src) {
                return Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"));
            }
            self.files.remove(src);
            self.files.insert(dst.to_string());
            Ok(())
        }

        fn delete(&mut self, path: &str) -> std::io::Result<()> {
            if self.files.remove(path) {
                Ok(())
            } else {
                Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))
            }
        }

        fn mkdir_p(&mut self, path: &str) -> std::io::Result<()> {
            self.files.insert(path.to_string());
            Ok(())
        }
    }

    #[test]
    fn simple_rename_executes() {
        let mut platform = FakePlatform::default();
        platform.files.insert("./a".to_string());
        let plan = vec![Action::Rename {
            src: "./a".into(),
            dst: "./b".into(),
        }];
        let had_errors = execute(&plan, &mut platform, |_| {}).unwrap();
        assert!(!had_errors);
        assert!(platform.files.contains("./b"));
        assert!(!platform.files.contains("./a"));
    }

    #[test]
    fn stash_unstash_round_trip() {
        let mut platform = FakePlatform::default();
        platform.files.insert("./a".to_string());
        platform.files.insert("./b".to_string());
        let plan = vec![
            Action::Stash { src: "./a".into() },
            Action::Rename {
                src: "./b".into(),
                dst: "./a".into(),
            },
            Action::Unstash { dst: "./b".into() },
        ];
        execute(&plan, &mut platform, |_| {}).unwrap();
        assert!(platform.files.contains("./a"));
        assert!(platform.files.contains("./b"));
    }

    #[test]
    fn delete_of_already_gone_path_is_not_fatal() {
        let mut platform = FakePlatform::default();
        let plan = vec![Action::Delete { src: "./a".into() }];
        // nothing marks ./a deleted in the overlay beforehand and the fake
        // reports NotFound; since the overlay doesn't know about it either
        // (never referenced), `fs.exists` falls through to `path_exists`
        // which is false, so this still counts as success.
        let had_errors = execute(&plan, &mut platform, |_| {}).unwrap();
        assert!(!had_errors);
    }

    #[test]
    fn rename_failure_aborts_the_plan() {
        let mut platform = FakePlatform::default();
        platform.files.insert("./a".to_string());
        platform.fail_rename.insert("./a".to_string());
        let plan = vec![
            Action::Rename {
                src: "./a".into(),
                dst: "./b".into(),
            },
            Action::Delete { src: "./never".into() },
        ];
        let err = execute(&plan, &mut platform, |_| {}).unwrap_err();
        assert!(matches!(err, VidirError::RenameFailed { .. }));
        // the plan aborted before the delete step ran
        assert!(!platform.files.contains("./b"));
    }

    #[test]
    fn delete_failure_is_recorded_but_not_fatal() {
        // simulate via a path whose delete always errors with something
        // other than NotFound-while-already-gone -> had_delete_errors true.
        struct AlwaysNotFound;
        impl Platform for AlwaysNotFound {
            fn path_exists(&self, _: &str) -> bool {
                true
            }
            fn rename(&mut self, _: &str, _: &str) -> std::io::Result<()> {
                Ok(())
            }
            fn delete(&mut self, _: &str) -> std::io::Result<()> {
                Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))
            }
            fn mkdir_p(&mut self, _: &str) -> std::io::Result<()> {
                Ok(())
            }
        }
        let mut platform = AlwaysNotFound;
        let plan = vec![Action::Delete { src: "./a".into() }];
        let had_errors = execute(&plan, &mut platform, |_| {}).unwrap();
        assert!(had_errors);
    }

    #[test]
    fn rename_creates_missing_parent_directory() {
        let mut platform = FakePlatform::default();
        platform.files.insert("./a".to_string());
        let plan = vec![Action::Rename {
            src: "./a".into(),
            dst: "./sub/a".into(),
        }];
        execute(&plan, &mut platform, |_| {}).unwrap();
        assert!(platform.files.contains("./sub"));
        assert!(platform.files.contains("./sub/a"));
    }

    #[test]
    fn identity_plan_performs_no_mutation() {
        let mut platform = FakePlatform::default();
        platform.files.insert("./a".to_string());
        let before = platform.files.clone();
        let plan: Plan = vec![];
        execute(&plan, &mut platform, |_| {}).unwrap();
        assert_eq!(platform.files, before);
    }
}
