use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vfstub::stub::{Directory, File};
use vfstub::tree::{NodeTree, TreeOptions};
use vfstub::{Platform, VirtualFileSystem};

fn populated(platform: Platform, width: usize) -> VirtualFileSystem {
    let root = if platform.is_windows() { r"C:" } else { "" };
    let separator = platform.directory_separator();
    let paths: Vec<String> = (0..width)
        .flat_map(|d| {
            (0..width).map(move |f| {
                format!("{root}{sep}dir{d:03}{sep}sub{sep}file{f:03}.txt", sep = separator)
            })
        })
        .collect();
    VirtualFileSystem::for_platform(platform)
        .with_files(&paths)
        .unwrap_or_else(|e| panic!("failed to seed tree: {}", e))
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("node_lookup");
    for platform in [Platform::Windows, Platform::Linux] {
        let vfs = populated(platform, 32);
        let target = if platform.is_windows() {
            r"c:\DIR031\sub\FILE031.TXT"
        } else {
            "/dir031/sub/file031.txt"
        };
        group.bench_with_input(BenchmarkId::new("exists", platform), &target, |b, path| {
            b.iter(|| vfs.file().exists(black_box(path)))
        });
        let directory = if platform.is_windows() { r"C:\dir016\sub" } else { "/dir016/sub" };
        group.bench_with_input(BenchmarkId::new("get_files", platform), &directory, |b, path| {
            b.iter(|| vfs.directory().get_files(black_box(path)).map(|files| files.len()))
        });
    }
    group.finish();
}

fn bench_get_or_create(c: &mut Criterion) {
    c.bench_function("get_or_create_deep", |b| {
        b.iter(|| {
            let mut tree = NodeTree::new(TreeOptions::new(Platform::Linux));
            for i in 0..64 {
                let path = format!("/a/b/c/d/{}", i);
                black_box(tree.get_or_create(&path, true).map(|id| id.index()).ok());
            }
        })
    });
}

criterion_group!(benches, bench_lookup, bench_get_or_create);
criterion_main!(benches);
