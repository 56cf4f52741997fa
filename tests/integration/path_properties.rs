use proptest::prelude::*;
use vfstub::stub::Directory;
use vfstub::tree::path;
use vfstub::tree::{NodeTree, TreeOptions};
use vfstub::{Platform, VirtualFileSystem};

fn segment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_][A-Za-z0-9_ .-]{0,7}"
        .prop_filter("dot segments resolve away", |s| s != "." && s != "..")
}

fn windows_path() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["C:", "d:", r"\\host"]),
        prop::collection::vec(segment(), 1..5),
    )
        .prop_map(|(root, segments)| format!("{}\\{}", root, segments.join("\\")))
}

fn posix_path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..5).prop_map(|segments| format!("/{}", segments.join("/")))
}

fn flip_case(text: &str, mask: &[bool]) -> String {
    text.chars()
        .zip(mask.iter().cycle())
        .map(|(c, &upper)| {
            if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn trailing_separator_does_not_change_parse(p in windows_path()) {
        prop_assert_eq!(path::parse(&p, '\\'), path::parse(&format!("{}\\", p), '\\'));
    }

    #[test]
    fn trailing_separator_does_not_change_posix_parse(p in posix_path()) {
        prop_assert_eq!(path::parse(&p, '/'), path::parse(&format!("{}/", p), '/'));
    }

    #[test]
    fn parse_then_join_is_identity(p in windows_path()) {
        prop_assert_eq!(path::join(&path::parse(&p, '\\'), '\\'), p);
    }

    #[test]
    fn case_insensitive_castings_resolve_to_one_node(
        p in windows_path(),
        mask in prop::collection::vec(any::<bool>(), 1..16),
    ) {
        let mut tree = NodeTree::new(TreeOptions::new(Platform::Windows));
        let created = tree.get_or_create(&p, false).unwrap();
        let recast = flip_case(&p, &mask);
        prop_assert_eq!(tree.get(&recast), Some(created));
    }

    #[test]
    fn case_sensitive_castings_stay_distinct(p in posix_path()) {
        let upper = p.to_ascii_uppercase();
        prop_assume!(upper != p);
        let vfs = VirtualFileSystem::for_platform(Platform::Linux)
            .and_path(&p)
            .unwrap()
            .and_path(&upper)
            .unwrap();
        prop_assert!(vfs.directory().exists(&p));
        prop_assert!(vfs.directory().exists(&upper));
        let tree = vfs.tree().read();
        prop_assert_ne!(tree.get(&p), tree.get(&upper));
    }
}

#[test]
fn posix_mount_casing_depends_on_sensitivity() {
    let insensitive = VirtualFileSystem::new(
        TreeOptions::new(Platform::Linux).with_case_sensitivity(false),
    )
    .and_path("/mnt/x")
    .unwrap()
    .and_path("/mnt/X")
    .unwrap();
    assert_eq!(insensitive.directory().get_directories("/mnt").unwrap().len(), 1);

    let sensitive = VirtualFileSystem::for_platform(Platform::Linux)
        .and_path("/mnt/x")
        .unwrap()
        .and_path("/mnt/X")
        .unwrap();
    assert_eq!(sensitive.directory().get_directories("/mnt").unwrap().len(), 2);
}
