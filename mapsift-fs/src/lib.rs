//! Capability-based filesystem helpers for archive inputs and database
//! outputs, built on `cap-std` and `camino`.
#![forbid(unsafe_code)]

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Whether `path` names an existing regular file.
///
/// The file is opened with ambient authority, so `..` components and
/// symlinks pointing anywhere on the filesystem resolve as the OS resolves
/// them. A missing file, or a missing parent directory, yields `Ok(false)`.
pub fn is_regular_file(path: &Utf8Path) -> io::Result<bool> {
    match fs_utf8::File::open_ambient(path, ambient_authority()) {
        Ok(file) => Ok(file.metadata()?.is_file()),
        Err(err)
            if matches!(
                err.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
            ) =>
        {
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

/// Create every missing directory above `path`.
///
/// The nearest existing ancestor is opened with ambient authority and the
/// missing tail is created beneath it, so parents reached through `..` or a
/// symlink work too.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() {
        return Ok(());
    }
    let (base, missing) = nearest_existing_dir(parent)?;
    if missing.as_str().is_empty() {
        return Ok(());
    }
    base.create_dir_all(&missing)
}

/// Open the deepest existing ancestor of `dir` (itself included) and return
/// it with the path of the missing directories below it.
fn nearest_existing_dir(dir: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let mut existing = dir;
    let mut missing = Vec::new();
    loop {
        match fs_utf8::Dir::open_ambient_dir(existing, ambient_authority()) {
            Ok(base) => {
                let tail = missing.into_iter().rev().collect::<Utf8PathBuf>();
                return Ok((base, tail));
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let (Some(name), Some(up)) = (existing.file_name(), existing.parent()) else {
                    return Err(err);
                };
                missing.push(name);
                existing = if up.as_str().is_empty() {
                    Utf8Path::new(".")
                } else {
                    up
                };
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn workspace() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp path");
        (dir, root)
    }

    #[rstest]
    fn creates_nested_parents(workspace: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workspace;
        let target = root.join("exports/2024/notes.sqlite");
        ensure_parent_dir(&target).expect("create parents");
        assert!(root.join("exports/2024").is_dir());
        ensure_parent_dir(&target).expect("second call is a no-op");
    }

    #[rstest]
    fn bare_file_name_needs_no_parent() {
        ensure_parent_dir(Utf8Path::new("notes.sqlite")).expect("nothing to create");
    }

    #[rstest]
    fn detects_regular_files(workspace: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workspace;
        let file = root.join("map.mbtiles");
        std::fs::write(&file, b"").expect("write file");

        assert!(is_regular_file(&file).expect("check file"));
        assert!(!is_regular_file(&root).expect("check directory"));
        assert!(!is_regular_file(&root.join("missing.mbtiles")).expect("check missing"));
        assert!(!is_regular_file(&root.join("nowhere/map.mbtiles")).expect("check missing dir"));
    }

    /// `target` spelled relative to the working directory, climbing to the
    /// root with `..` first.
    #[cfg(unix)]
    fn via_parent_dirs(target: &Utf8Path) -> Utf8PathBuf {
        let cwd = std::env::current_dir().expect("working directory");
        let mut relative: Utf8PathBuf = cwd.components().skip(1).map(|_| "..").collect();
        relative.push(target.strip_prefix("/").expect("absolute target"));
        relative
    }

    #[cfg(unix)]
    #[rstest]
    fn files_behind_parent_components_are_found(workspace: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workspace;
        let file = root.join("area.mbtiles");
        std::fs::write(&file, b"").expect("write file");

        let relative = via_parent_dirs(&file);
        assert!(relative.as_str().starts_with(".."));
        assert!(is_regular_file(&relative).expect("check relative file"));
        assert!(!is_regular_file(&via_parent_dirs(&root.join("gone.mbtiles"))).expect("check"));
    }

    #[cfg(unix)]
    #[rstest]
    fn parents_behind_parent_components_are_created(workspace: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workspace;
        let target = via_parent_dirs(&root.join("out/nested/db.sqlite"));
        ensure_parent_dir(&target).expect("create parents");
        assert!(root.join("out/nested").is_dir());
    }

    #[cfg(unix)]
    #[rstest]
    fn absolute_symlinks_resolve_to_their_target(workspace: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workspace;
        let file = root.join("real.mbtiles");
        std::fs::write(&file, b"").expect("write file");
        let link = root.join("link.mbtiles");
        std::os::unix::fs::symlink(&file, &link).expect("create symlink");
        let dangling = root.join("dangling.mbtiles");
        std::os::unix::fs::symlink(root.join("nothing"), &dangling).expect("create symlink");

        assert!(is_regular_file(&link).expect("check symlink"));
        assert!(!is_regular_file(&dangling).expect("check dangling symlink"));
    }

    #[cfg(unix)]
    #[rstest]
    fn parents_under_a_symlinked_directory_are_created(workspace: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workspace;
        std::fs::create_dir(root.join("real")).expect("create dir");
        std::os::unix::fs::symlink(root.join("real"), root.join("alias")).expect("symlink");

        ensure_parent_dir(&root.join("alias/exports/db.sqlite")).expect("create parents");
        assert!(root.join("real/exports").is_dir());
    }

    #[rstest]
    fn file_below_a_regular_file_is_not_found(workspace: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workspace;
        let file = root.join("plain");
        std::fs::write(&file, b"").expect("write file");
        assert!(!is_regular_file(&file.join("inner.mbtiles")).expect("check"));
    }
}
