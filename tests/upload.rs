use std::{fs, path::Path};

use sftp_mirror::{
    remote::{MemoryFs, RemoteFs, RemoteOp},
    walk::WalkOptions,
    Error, UploadOptions, UploadStep, Uploader,
};

fn sorted() -> UploadOptions {
    UploadOptions {
        walk: WalkOptions {
            sort_by_name: true,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn dir_all(path: &str) -> RemoteOp {
    RemoteOp::CreateDirAll(path.to_owned())
}

fn file(path: &str) -> RemoteOp {
    RemoteOp::CreateFile(path.to_owned())
}

fn write_tree(root: &Path) {
    fs::write(root.join("a.txt"), b"first file").unwrap();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub").join("b.txt"), b"second file").unwrap();
}

#[tokio::test]
async fn test_scenario_operation_order() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path());

    let remote = MemoryFs::new();
    let summary = Uploader::new(&remote, sorted())
        .upload(dir.path(), "/up")
        .await
        .unwrap();

    assert_eq!(
        remote.ops(),
        vec![
            dir_all("/up"),
            dir_all("/up"),
            file("/up/a.txt"),
            dir_all("/up/sub"),
            dir_all("/up/sub"),
            file("/up/sub/b.txt"),
        ]
    );
    assert_eq!(remote.file("/up/a.txt").unwrap(), b"first file");
    assert_eq!(remote.file("/up/sub/b.txt").unwrap(), b"second file");
    assert_eq!((summary.directories, summary.files), (2, 2));
    assert_eq!(summary.bytes, 21);
}

#[tokio::test]
async fn test_skip_parent_create_relies_on_walk_order() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path());

    let remote = MemoryFs::new();
    let options = UploadOptions {
        ensure_parent: false,
        ..sorted()
    };
    Uploader::new(&remote, options)
        .upload(dir.path(), "/up")
        .await
        .unwrap();

    assert_eq!(
        remote.ops(),
        vec![
            dir_all("/up"),
            file("/up/a.txt"),
            dir_all("/up/sub"),
            file("/up/sub/b.txt"),
        ]
    );
}

#[tokio::test]
async fn test_remote_file_failure_halts_without_rollback() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["a.txt", "b.txt", "c.txt"] {
        fs::write(dir.path().join(name), name.as_bytes()).unwrap();
    }

    let remote = MemoryFs::new();
    remote.fail_create_file("/up/b.txt");
    let err = Uploader::new(&remote, sorted())
        .upload(dir.path(), "/up")
        .await
        .unwrap_err();

    match &err {
        Error::Transfer {
            step,
            local,
            remote: target,
            ..
        } => {
            assert_eq!(*step, UploadStep::CreateRemoteFile);
            assert!(local.ends_with("b.txt"));
            assert_eq!(target, "/up/b.txt");
        }
        other => panic!("unexpected error: {other}"),
    }
    let message = err.to_string();
    assert!(message.contains("create remote file"));
    assert!(message.contains("b.txt"));

    assert_eq!(remote.file("/up/a.txt").unwrap(), b"a.txt");
    assert!(remote.file("/up/b.txt").is_none());
    assert!(remote.file("/up/c.txt").is_none());
    assert!(!remote.ops().contains(&file("/up/c.txt")));
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_local_file_creates_nothing_remotely() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"a").unwrap();
    std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("b.lnk")).unwrap();
    fs::write(dir.path().join("c.txt"), b"c").unwrap();

    let remote = MemoryFs::new();
    let err = Uploader::new(&remote, sorted())
        .upload(dir.path(), "/up")
        .await
        .unwrap_err();

    assert_eq!(err.step(), Some(UploadStep::OpenLocal));
    assert!(err.to_string().contains("b.lnk"));
    assert!(remote.file("/up/a.txt").is_some());
    assert!(!remote.ops().contains(&file("/up/b.lnk")));
    assert!(remote.file("/up/c.txt").is_none());
}

#[cfg(unix)]
#[tokio::test]
async fn test_walk_failure_mid_tree_halts_upload() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"a").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    std::os::unix::fs::symlink("..", dir.path().join("sub").join("loop")).unwrap();
    fs::write(dir.path().join("z.txt"), b"z").unwrap();

    let remote = MemoryFs::new();
    let options = UploadOptions {
        walk: WalkOptions {
            sort_by_name: true,
            follow_links: true,
        },
        ..Default::default()
    };
    let err = Uploader::new(&remote, options)
        .upload(dir.path(), "/up")
        .await
        .unwrap_err();

    match &err {
        Error::Walk { path, .. } => assert!(path.ends_with("sub/loop")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.step(), None);
    assert_eq!(remote.file("/up/a.txt").unwrap(), b"a");
    assert!(remote.is_dir("/up/sub"));
    assert!(!remote.ops().contains(&file("/up/z.txt")));
}

#[tokio::test]
async fn test_copy_failure_names_copy_step() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path());

    let remote = MemoryFs::new();
    remote.fail_write("/up/sub/b.txt");
    let err = Uploader::new(&remote, sorted())
        .upload(dir.path(), "/up")
        .await
        .unwrap_err();

    assert_eq!(err.step(), Some(UploadStep::Copy));
    assert!(err.to_string().contains("/up/sub/b.txt"));
}

#[tokio::test]
async fn test_missing_local_root_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");

    let remote = MemoryFs::new();
    let err = sftp_mirror::upload(&remote, &missing, "/up")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::LocalRoot { ref path, .. } if *path == missing));
    assert!(remote.ops().is_empty());
}

#[tokio::test]
async fn test_content_fidelity() {
    let dir = tempfile::tempdir().unwrap();
    let large: Vec<u8> = (0..(3 * sftp_mirror::upload::COPY_BUFFER_SIZE + 17))
        .map(|i| (i * 31 % 251) as u8)
        .collect();
    fs::write(dir.path().join("empty"), b"").unwrap();
    fs::write(dir.path().join("large.bin"), &large).unwrap();

    let remote = MemoryFs::new();
    let summary = sftp_mirror::upload(&remote, dir.path(), "/up").await.unwrap();

    assert_eq!(remote.file("/up/empty").unwrap(), b"");
    assert_eq!(remote.file("/up/large.bin").unwrap(), large);
    assert_eq!(summary.bytes, large.len() as u64);
}

#[tokio::test]
async fn test_rerun_overwrites_existing_files() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path());

    let remote = MemoryFs::new();
    sftp_mirror::upload(&remote, dir.path(), "/up").await.unwrap();

    fs::write(dir.path().join("a.txt"), b"new").unwrap();
    sftp_mirror::upload(&remote, dir.path(), "/up").await.unwrap();

    assert_eq!(remote.file("/up/a.txt").unwrap(), b"new");
    assert_eq!(remote.directories(), vec!["/up", "/up/sub"]);
}

#[tokio::test]
async fn test_close_is_recorded() {
    let remote = MemoryFs::new();
    remote.close().await.unwrap();
    assert_eq!(remote.ops(), vec![RemoteOp::Close]);
}
