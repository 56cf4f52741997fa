use std::io::{Read, Seek, SeekFrom, Write};
use vfstub::extensions::{greatest_common_directory, DirectoryExt};
use vfstub::stub::SearchOption;
use vfstub::{Directory, Drive, File, FileMode, Platform, VfsError, VirtualFileSystem};

fn windows() -> VirtualFileSystem {
    VirtualFileSystem::for_platform(Platform::Windows)
}

#[test]
fn seeded_file_is_listed_and_readable() {
    let vfs = windows().with_file(r"C:\a\b\c.txt", "hello").unwrap();
    assert_eq!(
        vfs.directory().get_files(r"C:\a\b").unwrap(),
        vec![r"C:\a\b\c.txt".to_string()]
    );
    assert_eq!(vfs.file().read_all_text(r"C:\a\b\c.txt").unwrap(), "hello");
}

#[test]
fn file_and_directory_lifecycles() {
    let vfs = windows().and_path(r"C:\work").unwrap();
    let (dir, file) = (vfs.directory(), vfs.file());

    file.write_all_text(r"C:\work\note.txt", "x").unwrap();
    assert!(file.exists(r"C:\work\note.txt"));
    file.delete(r"C:\work\note.txt").unwrap();
    assert!(!file.exists(r"C:\work\note.txt"));

    dir.create_directory(r"C:\work\empty").unwrap();
    assert!(dir.exists(r"C:\work\empty"));
    dir.delete(r"C:\work\empty").unwrap();
    assert!(!dir.exists(r"C:\work\empty"));
}

#[test]
fn non_empty_delete_needs_recursion() {
    let vfs = windows()
        .with_file(r"C:\tree\branch\leaf.txt", "")
        .unwrap();
    let dir = vfs.directory();

    assert!(matches!(
        dir.delete(r"C:\tree"),
        Err(VfsError::InvalidOperation(_))
    ));
    dir.delete_recursive(r"C:\tree", true).unwrap();
    assert!(!dir.exists(r"C:\tree"));
    assert!(!vfs.file().exists(r"C:\tree\branch\leaf.txt"));
}

#[test]
fn last_write_wins() {
    let vfs = windows().and_path(r"C:\t").unwrap();
    vfs.file().write_all_text(r"C:\t\f.txt", "A").unwrap();
    vfs.file().write_all_text(r"C:\t\f.txt", "B").unwrap();
    assert_eq!(vfs.file().read_all_text(r"C:\t\f.txt").unwrap(), "B");
}

#[test]
fn cross_parent_move_carries_descendants() {
    let vfs = windows()
        .with_file(r"C:\src\project\lib\mod.rs", "mod")
        .unwrap()
        .with_file(r"C:\src\project\README", "readme")
        .unwrap()
        .and_path(r"D:\archive")
        .unwrap();
    let dir = vfs.directory();

    dir.move_to(r"C:\src\project", r"D:\archive\project").unwrap();
    assert!(!dir.exists(r"C:\src\project"));
    assert_eq!(
        vfs.file().read_all_text(r"D:\archive\project\lib\mod.rs").unwrap(),
        "mod"
    );
    let mut files = dir
        .get_files_matching(r"D:\archive", "*", SearchOption::AllDirectories)
        .unwrap();
    files.sort();
    assert_eq!(
        files,
        vec![
            r"D:\archive\project\README".to_string(),
            r"D:\archive\project\lib\mod.rs".to_string()
        ]
    );

    let occupied = windows()
        .and_path(r"C:\one\x")
        .unwrap()
        .and_path(r"C:\two\x")
        .unwrap();
    assert!(matches!(
        occupied.directory().move_to(r"C:\one\x", r"C:\two\x"),
        Err(VfsError::AlreadyExists(_))
    ));
}

#[test]
fn stream_round_trip() {
    let vfs = windows().and_path(r"C:\logs").unwrap();
    {
        let mut stream = vfs.file().open(r"C:\logs\app.log", FileMode::CreateNew).unwrap();
        stream.write_all(b"first line\n").unwrap();
    }
    {
        let mut stream = vfs.file().open(r"C:\logs\app.log", FileMode::Append).unwrap();
        stream.write_all(b"second line\n").unwrap();
        stream.flush().unwrap();
    }
    let mut stream = vfs.file().open(r"C:\logs\app.log", FileMode::Open).unwrap();
    stream.seek(SeekFrom::Start(6)).unwrap();
    let mut rest = String::new();
    stream.read_to_string(&mut rest).unwrap();
    assert_eq!(rest, "line\nsecond line\n");

    assert!(matches!(
        vfs.file().open(r"C:\logs\app.log", FileMode::CreateNew),
        Err(VfsError::AlreadyExists(_))
    ));
}

#[test]
fn drives_and_helpers() {
    let vfs = windows()
        .with_files([
            r"C:\media\tv\Show\S1\e1.mkv",
            r"C:\media\TV\show\S2\e1.mkv",
            r"E:\backup\x.bin",
        ])
        .unwrap();
    assert_eq!(vfs.drive().get_drives(), vec!["C:", "E:"]);
    assert!(vfs.drive().get_volume_info(r"E:\").is_ok());

    let common = greatest_common_directory(
        &[r"C:\media\tv\Show\S1", r"C:\media\TV\show\S2"],
        '\\',
        vfstub::NameComparer::OrdinalIgnoreCase,
    );
    assert_eq!(common.as_deref(), Some(r"C:\media\tv\Show"));
    assert_eq!(vfs.directory().get_files_recursive(r"C:\media").len(), 2);
    assert!(!vfs.directory().folder_is_empty(r"C:\media"));
}
