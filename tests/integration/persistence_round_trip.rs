use parking_lot::RwLock;
use std::sync::Arc;
use tempfile::TempDir;
use vfstub::config::PersistenceConfig;
use vfstub::persistence::{LayoutDocument, LayoutFilePersistence, Persistence};
use vfstub::tree::{NodeTree, TreeOptions};
use vfstub::{Platform, VirtualFileSystem};

fn settings() -> PersistenceConfig {
    PersistenceConfig {
        watch: false,
        ..PersistenceConfig::default()
    }
}

fn snapshot(tree: &NodeTree) -> Vec<(String, Vec<u8>)> {
    tree.files()
        .into_iter()
        .map(|id| {
            (
                tree.full_path(id),
                tree.node(id).contents().unwrap_or_default().to_vec(),
            )
        })
        .collect()
}

#[test]
fn save_then_load_reproduces_paths_and_contents() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("layout.json");
    let options = TreeOptions::new(Platform::Windows);

    let source = VirtualFileSystem::new(options)
        .with_file(r"C:\Users\dev\.profile", "export PATH")
        .unwrap()
        .with_file(r"C:\Users\dev\bin\tool.exe", [0x4du8, 0x5a, 0x90, 0x00])
        .unwrap()
        .with_file(r"\\fileserver\public\readme.txt", "")
        .unwrap()
        .and_path(r"D:\scratch\empty")
        .unwrap();
    LayoutFilePersistence::new(&path, source.tree().clone(), options, settings())
        .save()
        .unwrap();

    let target: Arc<RwLock<NodeTree>> = Arc::new(RwLock::new(NodeTree::new(options)));
    LayoutFilePersistence::new(&path, target.clone(), options, settings())
        .load()
        .unwrap();

    assert_eq!(snapshot(&target.read()), snapshot(&source.tree().read()));
    assert!(target.read().get(r"D:\scratch\empty").is_some());
}

#[test]
fn hand_written_document_with_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("layout.json");
    std::fs::write(
        &path,
        r#"{
  "platform": "OSX",
  "volumes": [
    {
      "name": "/",
      "directories": [
        {
          "name": "Applications",
          "creationTimeUtc": "2021-01-28T12:00:00.1234567Z",
          "files": [ { "name": "Safari.plist", "contents": "PHBsaXN0Lz4=" } ]
        }
      ]
    }
  ]
}"#,
    )
    .unwrap();

    let tree = Arc::new(RwLock::new(NodeTree::new(TreeOptions::new(Platform::Linux))));
    LayoutFilePersistence::new(&path, tree.clone(), TreeOptions::new(Platform::Linux), settings())
        .load()
        .unwrap();

    let tree = tree.read();
    assert_eq!(tree.platform(), Platform::OSX);
    let plist = tree.get("/applications/safari.PLIST").unwrap();
    assert_eq!(tree.node(plist).contents(), Some(&b"<plist/>"[..]));
    let apps = tree.get("/Applications").unwrap();
    assert_eq!(
        tree.node(apps).creation_time_utc().to_rfc3339(),
        "2021-01-28T12:00:00.123456700+00:00"
    );
}

#[test]
fn saved_document_is_camel_case_json() {
    let vfs = VirtualFileSystem::for_platform(Platform::Linux)
        .with_file("/etc/hostname", "box")
        .unwrap();
    let json = LayoutDocument::from_tree(&vfs.tree().read())
        .to_json(false)
        .unwrap();
    assert!(json.contains(r#""volumeInfo":{"rootPathName":"/""#));
    assert!(json.contains(r#""lastWriteTimeUtc""#));
    assert!(json.contains(r#""contents":"Ym94""#));
}
