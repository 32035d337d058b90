use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use cts_fetch::checksum::sha256_bytes;
use cts_fetch::source::STAMP_FILE;
use cts_fetch::{
    run, Context, Downloader, FetchError, GitRepo, Manifest, Protocol, Source, SourceFile, SourcePackage,
};

const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

#[derive(Default)]
struct LocalDownloader {
    files: HashMap<String, Vec<u8>>,
    requests: Cell<usize>,
}

impl Downloader for LocalDownloader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.requests.set(self.requests.get() + 1);
        Ok(self.files.get(url).cloned().unwrap_or_default())
    }
}

fn temp_root(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("cts-fetch-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&root);
    fs::create_dir_all(&root).unwrap();
    root
}

fn context<'a>(root: &Path, downloader: &'a LocalDownloader) -> Context<'a> {
    Context {
        root: root.to_path_buf(),
        downloader,
        protocol: Protocol::Https,
    }
}

fn abc_file() -> SourceFile {
    SourceFile {
        url: "https://example.invalid/abc.txt".into(),
        filename: "abc.txt".into(),
        checksum: ABC_SHA256.into(),
        dst_dir: "data".into(),
    }
}

fn tar_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, contents) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, contents.as_bytes()).unwrap();
    }
    builder.into_inner().unwrap()
}

fn xz_bytes(data: &[u8]) -> Vec<u8> {
    let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

#[test]
fn file_is_downloaded_once() {
    let root = temp_root("file");
    let mut downloader = LocalDownloader::default();
    downloader.files.insert(abc_file().url, b"abc".to_vec());
    let ctx = context(&root, &downloader);

    abc_file().update(&ctx).unwrap();
    assert_eq!(fs::read(root.join("data/abc.txt")).unwrap(), b"abc");
    assert_eq!(downloader.requests.get(), 1);

    abc_file().update(&ctx).unwrap();
    assert_eq!(downloader.requests.get(), 1);

    abc_file().clean(&ctx).unwrap();
    assert!(!root.join("data/abc.txt").exists());
    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn corrupted_file_is_replaced() {
    let root = temp_root("corrupt");
    let mut downloader = LocalDownloader::default();
    downloader.files.insert(abc_file().url, b"abc".to_vec());
    fs::create_dir_all(root.join("data")).unwrap();
    fs::write(root.join("data/abc.txt"), b"abd").unwrap();

    abc_file().update(&context(&root, &downloader)).unwrap();
    assert_eq!(downloader.requests.get(), 1);
    assert_eq!(fs::read(root.join("data/abc.txt")).unwrap(), b"abc");
    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn checksum_mismatch_is_reported() {
    let root = temp_root("mismatch");
    let mut downloader = LocalDownloader::default();
    downloader.files.insert(abc_file().url, b"not abc".to_vec());

    match abc_file().update(&context(&root, &downloader)) {
        Err(FetchError::ChecksumMismatch {
            url,
            expected,
            actual,
        }) => {
            assert_eq!(url, "https://example.invalid/abc.txt");
            assert_eq!(expected, ABC_SHA256);
            assert_eq!(actual, sha256_bytes(b"not abc"));
        }
        other => panic!("{:?}", other),
    }
    assert!(!root.join("data/abc.txt").exists());
    fs::remove_dir_all(&root).unwrap();
}

fn package(filename: &str, data: &[u8]) -> SourcePackage {
    SourcePackage {
        url: format!("https://example.invalid/{}", filename),
        filename: filename.into(),
        checksum: sha256_bytes(data),
        dst_dir: "external/pkg".into(),
        strip_components: 1,
        cleanup: vec!["docs".into()],
    }
}

#[test]
fn tar_xz_package_is_extracted_and_stamped() {
    let root = temp_root("tarxz");
    let data = xz_bytes(&tar_bytes(&[
        ("pkg-1.0/src/a.c", "int a;\n"),
        ("pkg-1.0/docs/readme", "docs\n"),
        ("pkg-1.0/LICENSE", "MIT\n"),
    ]));
    let pkg = package("pkg-1.0.tar.xz", &data);
    let mut downloader = LocalDownloader::default();
    downloader.files.insert(pkg.url.clone(), data);
    let ctx = context(&root, &downloader);

    pkg.update(&ctx).unwrap();
    let dir = root.join("external/pkg");
    assert_eq!(fs::read_to_string(dir.join("src/a.c")).unwrap(), "int a;\n");
    assert_eq!(fs::read_to_string(dir.join("LICENSE")).unwrap(), "MIT\n");
    assert!(!dir.join("docs").exists());
    assert_eq!(fs::read_to_string(dir.join(STAMP_FILE)).unwrap(), pkg.checksum);
    assert!(root.join("packages/pkg-1.0.tar.xz").exists());

    // A stamped extraction is left alone, even if files were modified.
    fs::write(dir.join("LICENSE"), "edited").unwrap();
    pkg.update(&ctx).unwrap();
    assert_eq!(downloader.requests.get(), 1);
    assert_eq!(fs::read_to_string(dir.join("LICENSE")).unwrap(), "edited");

    // A missing stamp forces re-extraction from the cached archive.
    fs::remove_file(dir.join(STAMP_FILE)).unwrap();
    pkg.update(&ctx).unwrap();
    assert_eq!(downloader.requests.get(), 1);
    assert_eq!(fs::read_to_string(dir.join("LICENSE")).unwrap(), "MIT\n");

    pkg.clean(&ctx).unwrap();
    assert!(!dir.exists());
    assert!(!root.join("packages/pkg-1.0.tar.xz").exists());
    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn plain_tar_package() {
    let root = temp_root("tar");
    let data = tar_bytes(&[("top/file.txt", "x")]);
    let pkg = package("top.tar", &data);
    let mut downloader = LocalDownloader::default();
    downloader.files.insert(pkg.url.clone(), data);
    pkg.update(&context(&root, &downloader)).unwrap();
    assert_eq!(fs::read_to_string(root.join("external/pkg/file.txt")).unwrap(), "x");
    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn unsupported_archive() {
    let root = temp_root("zip");
    let pkg = package("pkg.zip", b"zip");
    let mut downloader = LocalDownloader::default();
    downloader.files.insert(pkg.url.clone(), b"zip".to_vec());
    let err = pkg.update(&context(&root, &downloader)).unwrap_err();
    assert!(matches!(err, FetchError::UnsupportedArchive(_)), "{:?}", err);
    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn git_commands() {
    let root = PathBuf::from("/work");
    let downloader = LocalDownloader::default();
    let repo = GitRepo {
        https_url: "https://example.invalid/glslang.git".into(),
        ssh_url: Some("ssh://git@example.invalid/glslang.git".into()),
        revision: "0123abcd".into(),
        dst_dir: "third_party/glslang".into(),
        remote: "origin".into(),
    };
    let mut ctx = context(&root, &downloader);
    let commands = repo.commands(&ctx, false);
    assert_eq!(commands.len(), 3);
    assert_eq!(
        commands[0],
        [
            "clone",
            "--no-checkout",
            "--origin",
            "origin",
            "https://example.invalid/glslang.git",
            "/work/third_party/glslang"
        ]
    );
    assert_eq!(
        commands[1],
        [
            "-C",
            "/work/third_party/glslang",
            "fetch",
            "--tags",
            "https://example.invalid/glslang.git",
            "+refs/heads/*:refs/remotes/origin/*"
        ]
    );
    assert_eq!(commands[2], ["-C", "/work/third_party/glslang", "checkout", "--quiet", "0123abcd"]);

    ctx.protocol = Protocol::Ssh;
    let upstream = GitRepo {
        remote: "upstream".into(),
        ..repo
    };
    let commands = upstream.commands(&ctx, true);
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0][4], "ssh://git@example.invalid/glslang.git");
    assert_eq!(commands[0][5], "+refs/heads/*:refs/remotes/upstream/*");
}

#[test]
fn manifest_run_and_clean() {
    let root = temp_root("manifest");
    let manifest = Manifest::from_ron(
        &format!(
            r#"(sources: [
                File((url: "https://example.invalid/abc.txt", filename: "abc.txt", checksum: "{}", dst_dir: "data")),
                Git((https_url: "https://example.invalid/r.git", revision: "main", dst_dir: "r")),
            ])"#,
            ABC_SHA256
        ),
        Path::new("sources.ron"),
    )
    .unwrap();
    assert_eq!(manifest.sources.len(), 2);

    let mut downloader = LocalDownloader::default();
    downloader.files.insert(abc_file().url, b"abc".to_vec());
    fs::create_dir_all(root.join("r")).unwrap();
    let ctx = context(&root, &downloader);
    run(&manifest, &ctx, true).unwrap();
    assert!(!root.join("r").exists());
    assert_eq!(downloader.requests.get(), 0);
    fs::remove_dir_all(&root).unwrap();
}
