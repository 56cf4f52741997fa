use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use vfstub::config::VfsConfig;
use vfstub::{Directory, File, LiveVirtualFileSystem, Platform};

fn open(path: &Path) -> LiveVirtualFileSystem {
    let mut config = VfsConfig::for_layout(path);
    config.tree.platform = Some(Platform::Linux);
    config.persistence.debounce_ms = 50;
    LiveVirtualFileSystem::open(&config).unwrap()
}

fn eventually(mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        thread::sleep(Duration::from_millis(25));
    }
    false
}

#[test]
fn two_instances_follow_each_other() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("layout.json");

    let first = open(&path);
    let second = open(&path);
    assert!(first.persistence().is_watching());

    first.directory().create_directory("/shared").unwrap();
    first
        .file()
        .write_all_text("/shared/from-first.txt", "one")
        .unwrap();
    assert!(
        eventually(|| second.file().read_all_text("/shared/from-first.txt").ok()
            == Some("one".to_string())),
        "second instance never saw the first instance's write"
    );

    second
        .file()
        .write_all_text("/shared/from-second.txt", "two")
        .unwrap();
    assert!(
        eventually(|| first.file().exists("/shared/from-second.txt")),
        "first instance never saw the second instance's write"
    );
    assert_eq!(
        first.file().read_all_text("/shared/from-first.txt").unwrap(),
        "one"
    );
}

#[test]
fn external_edit_is_reloaded() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("layout.json");
    let live = open(&path);
    assert!(!live.directory().exists("/imported"));

    std::fs::write(
        &path,
        r#"{"platform":"Linux","volumes":[{"name":"/","directories":[{"name":"imported"}]}]}"#,
    )
    .unwrap();
    assert!(eventually(|| live.directory().exists("/imported")));
}

#[test]
fn own_saves_do_not_reload() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("layout.json");
    let live = open(&path);

    live.directory().create_directory("/tmp").unwrap();
    live.file().write_all_text("/tmp/a", "a").unwrap();
    thread::sleep(Duration::from_millis(300));

    // An unsaved edit to the shared tree would be lost by a reload.
    {
        let mut tree = live.vfs().tree().write();
        tree.get_or_create("/tmp/unsaved", false).unwrap();
    }
    thread::sleep(Duration::from_millis(300));
    assert!(live.directory().exists("/tmp/unsaved"));
}
