use super::*;

fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[test]
fn finish_removes_directory_and_contents() {
    let root = tempfile::tempdir().unwrap();
    let work = WorkDir::new(Some(root.path())).unwrap();
    let written = work.write("img_000.png", b"bytes").unwrap();
    assert!(written.starts_with(root.path()));
    assert_eq!(std::fs::read(&written).unwrap(), b"bytes");
    assert!(
        work.path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("stillreel-")
    );

    work.finish();
    assert_eq!(entries(root.path()), 0);
}

#[test]
fn drop_also_cleans_up() {
    let root = tempfile::tempdir().unwrap();
    {
        let work = WorkDir::new(Some(root.path())).unwrap();
        work.write("seg_000.mkv", b"x").unwrap();
    }
    assert_eq!(entries(root.path()), 0);
}

#[test]
fn discard_is_best_effort() {
    let root = tempfile::tempdir().unwrap();
    let work = WorkDir::new(Some(root.path())).unwrap();
    let p = work.write("acc_001.mkv", b"x").unwrap();
    work.discard(&p);
    assert!(!p.exists());
    // Missing files only log.
    work.discard(&p);
}

#[test]
fn concurrent_jobs_get_isolated_directories() {
    let root = tempfile::tempdir().unwrap();
    let a = WorkDir::new(Some(root.path())).unwrap();
    let b = WorkDir::new(Some(root.path())).unwrap();
    assert_ne!(a.path(), b.path());
}

#[test]
fn absolute_paths_inside_the_directory_are_written_as_given() {
    let root = tempfile::tempdir().unwrap();
    let work = WorkDir::new(Some(root.path())).unwrap();
    let target = work.path().join("inputs.ffconcat");
    let written = work.write(&target, b"ffconcat version 1.0\n").unwrap();
    assert_eq!(written, target);
    assert_eq!(std::fs::read(&target).unwrap(), b"ffconcat version 1.0\n");
}

#[test]
fn staging_into_a_missing_directory_fails_the_write() {
    let root = tempfile::tempdir().unwrap();
    let work = WorkDir::new(Some(root.path())).unwrap();
    let err = work.write("missing/img_000.png", b"x").unwrap_err();
    assert_eq!(err.kind(), crate::foundation::error::ErrorKind::Io);
}
