//! Integration tests for composite filesystems.
//!
//! These tests verify that:
//! 1. Lookups resolve to the first layer that has a path
//! 2. Listings merge every contributing layer, and language-aware listings
//!    keep only the best variant of a file
//! 3. Composites are read-only and report configuration errors
//! 4. Decorated layers keep their provenance through the composite
//! 5. Real directories work as layers

use anyfs_composite::*;
use rstest::rstest;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

// =============================================================================
// Fixtures
// =============================================================================

fn mem(files: &[(&str, &str)]) -> Arc<dyn Fs> {
    let fs = files
        .iter()
        .fold(MemoryFs::new(), |fs, (path, data)| fs.with_file(path, data));
    Arc::new(fs)
}

fn layer(fs: Arc<dyn Fs>) -> FileMeta {
    FileMeta::new().with_fs(fs)
}

fn lang_layer(fs: Arc<dyn Fs>, lang: &str) -> FileMeta {
    layer(fs).with_lang(lang)
}

fn languages() -> Languages {
    ["en", "fr", "sv"].into_iter().collect()
}

/// Three overlapping layers: project, theme, module.
fn site() -> Arc<dyn Fs> {
    SliceFs::new(vec![
        layer(mem(&[
            ("layouts/index.html", "project index"),
            ("layouts/partials/head.html", "project head"),
        ])),
        layer(mem(&[
            ("layouts/index.html", "theme index"),
            ("layouts/single.html", "theme single"),
            ("layouts/partials/foot.html", "theme foot"),
        ])),
        layer(mem(&[("layouts/list.html", "module list")])),
    ])
    .unwrap()
}

/// Filesystem whose every operation is refused.
struct Locked;

fn locked(path: &Path, operation: &'static str) -> FsError {
    FsError::PermissionDenied {
        path: path.to_path_buf(),
        operation,
    }
}

impl FsRead for Locked {
    fn name(&self) -> &str {
        "Locked"
    }

    fn stat(&self, path: &Path) -> Result<FileInfo, FsError> {
        Err(locked(path, "stat"))
    }

    fn open(&self, path: &Path) -> Result<Box<dyn FsFile>, FsError> {
        Err(locked(path, "open"))
    }
}

impl FsWrite for Locked {
    fn write(&self, path: &Path, _: &[u8]) -> Result<(), FsError> {
        Err(locked(path, "write"))
    }
    fn open_file(&self, path: &Path, _: OpenFlags) -> Result<Box<dyn FsFile>, FsError> {
        Err(locked(path, "open_file"))
    }
    fn chmod(&self, path: &Path, _: Permissions) -> Result<(), FsError> {
        Err(locked(path, "chmod"))
    }
    fn chtimes(&self, path: &Path, _: SystemTime, _: SystemTime) -> Result<(), FsError> {
        Err(locked(path, "chtimes"))
    }
    fn create_dir(&self, path: &Path, _: Permissions) -> Result<(), FsError> {
        Err(locked(path, "create_dir"))
    }
    fn create_dir_all(&self, path: &Path, _: Permissions) -> Result<(), FsError> {
        Err(locked(path, "create_dir_all"))
    }
    fn remove(&self, path: &Path) -> Result<(), FsError> {
        Err(locked(path, "remove"))
    }
    fn remove_all(&self, path: &Path) -> Result<(), FsError> {
        Err(locked(path, "remove_all"))
    }
    fn rename(&self, from: &Path, _: &Path) -> Result<(), FsError> {
        Err(locked(from, "rename"))
    }
}

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn first_layer_with_path_wins() {
    let fs = site();
    let fi = fs.stat(Path::new("layouts/index.html")).unwrap();
    assert_eq!(fi.size, "project index".len() as u64);

    let fi = fs.stat(Path::new("layouts/list.html")).unwrap();
    assert_eq!(fi.size, "module list".len() as u64);
}

/// Everything a descriptor reports except the identity of its opener.
type Summary = (
    String,
    FileType,
    u64,
    SystemTime,
    Option<String>,
    Option<PathBuf>,
    Option<PathBuf>,
    Option<PathBuf>,
    Option<String>,
    i32,
);

fn summary(fi: &FileInfo) -> Summary {
    let meta = fi.meta();
    (
        fi.name.clone(),
        fi.file_type,
        fi.size,
        fi.modified,
        meta.and_then(FileMeta::fs).map(|fs| fs.name().to_string()),
        meta.and_then(FileMeta::opener).map(|o| o.name().to_path_buf()),
        meta.and_then(FileMeta::filename).map(Path::to_path_buf),
        meta.and_then(FileMeta::path).map(Path::to_path_buf),
        meta.and_then(FileMeta::lang).map(str::to_string),
        fi.weight(),
    )
}

#[test]
fn stat_is_idempotent() {
    let fs = site();
    for path in ["layouts", "layouts/single.html", "layouts/partials"] {
        let a = fs.stat(Path::new(path)).unwrap();
        let b = fs.stat(Path::new(path)).unwrap();
        assert_eq!(summary(&a), summary(&b), "{path}");
    }

    let dir = summary(&fs.stat(Path::new("layouts")).unwrap());
    assert_eq!(dir.4.as_deref(), Some("SliceFs"));
    assert_eq!(dir.5.as_deref(), Some(Path::new("layouts")));
}

#[test]
fn stat_is_idempotent_for_decorated_layers() {
    let raw: Arc<dyn Fs> = Arc::new(
        MemoryFs::new()
            .with_file("site/content/post.en.md", "post")
            .with_dir("site/content/blog"),
    );
    let decorated = DecoratorFs::base_path(Arc::new(BasePathFs::new(raw, "site"))).unwrap();
    let fs = SliceFs::new_language_fs(languages(), vec![lang_layer(decorated, "en")]).unwrap();

    for path in ["content/post.en.md", "content/blog"] {
        let a = summary(&fs.stat(Path::new(path)).unwrap());
        let b = summary(&fs.stat(Path::new(path)).unwrap());
        let rooted = summary(&fs.stat(&Path::new("/").join(path)).unwrap());
        assert_eq!(a, b, "{path}");
        assert_eq!(a, rooted, "{path} with leading separator");
    }

    let file = summary(&fs.stat(Path::new("content/post.en.md")).unwrap());
    assert_eq!(file.5.as_deref(), Some(Path::new("content/post.en.md")));
    assert_eq!(file.6.as_deref(), Some(Path::new("site/content/post.en.md")));
    assert_eq!(file.7.as_deref(), Some(Path::new("content/post.en.md")));

    let dir = summary(&fs.stat(Path::new("/content/blog")).unwrap());
    assert_eq!(dir.4.as_deref(), Some("SliceFs"));
    assert_eq!(dir.5.as_deref(), Some(Path::new("content/blog")));
    assert_eq!(dir.6.as_deref(), Some(Path::new("site/content/blog")));
}

#[test]
fn non_not_found_errors_abort_resolution() {
    let fs = SliceFs::new(vec![
        layer(mem(&[])),
        layer(Arc::new(Locked)),
        layer(mem(&[("a.txt", "a")])),
    ])
    .unwrap();
    assert!(matches!(
        fs.stat(Path::new("a.txt")),
        Err(FsError::PermissionDenied { .. })
    ));
}

#[test]
fn layer_error_during_merge_aborts_listing() {
    let fs = SliceFs::new(vec![layer(mem(&[("d/a", "a")])), layer(Arc::new(Locked))]).unwrap();
    assert!(matches!(
        fs.read_dir(Path::new("d")),
        Err(FsError::PermissionDenied { .. })
    ));
}

#[test]
fn missing_everywhere_is_not_found() {
    let err = site().stat(Path::new("layouts/nope.html")).unwrap_err();
    assert!(err.is_not_found());
    assert!(site().open(Path::new("nope")).err().unwrap().is_not_found());
}

// =============================================================================
// Merging
// =============================================================================

#[test]
fn plain_merge_lists_every_layer_entry() {
    let names = site().read_dir_names(Path::new("layouts")).unwrap();
    assert_eq!(
        names,
        [
            "index.html",
            "partials",
            "index.html",
            "partials",
            "single.html",
            "list.html",
        ]
    );
}

#[test]
fn subdirectory_listing_merges_through_composite() {
    let fs = site();
    let entries = fs.read_dir(Path::new("layouts")).unwrap();
    let partials = entries.iter().find(|fi| fi.name == "partials").unwrap();
    let mut dir = partials.meta().unwrap().open().unwrap();
    assert_eq!(dir.read_dir_names(-1).unwrap(), ["head.html", "foot.html"]);
}

#[test]
fn page_is_prefix_of_full_listing() {
    let fs = site();
    let full = fs.read_dir_names(Path::new("layouts")).unwrap();
    let mut dir = fs.open(Path::new("layouts")).unwrap();
    for n in 1..=full.len() {
        assert_eq!(dir.read_dir_names(n as isize).unwrap(), full[..n]);
    }
    assert_eq!(dir.read_dir_names(0).unwrap(), full);
}

#[test]
fn composite_of_composites() {
    let inner = site();
    let outer = SliceFs::new(vec![layer(mem(&[("layouts/extra.html", "x")])), layer(inner)])
        .unwrap();
    let names: BTreeSet<_> = outer
        .read_dir_names(Path::new("layouts"))
        .unwrap()
        .into_iter()
        .collect();
    assert!(names.contains("extra.html"));
    assert!(names.contains("list.html"));
}

#[test]
fn composite_is_shareable_across_threads() {
    let fs = site();
    std::thread::scope(|s| {
        for _ in 0..4 {
            let fs = &fs;
            s.spawn(move || {
                assert_eq!(fs.read_dir(Path::new("layouts")).unwrap().len(), 6);
            });
        }
    });
}

// =============================================================================
// Language-aware merging
// =============================================================================

fn multilingual() -> Arc<dyn Fs> {
    SliceFs::new_language_fs(
        languages(),
        vec![
            lang_layer(
                mem(&[
                    ("blog/post.en.md", "en in en"),
                    ("blog/about.md", "about en"),
                    ("blog/images/a.png", "a"),
                ]),
                "en",
            ),
            lang_layer(
                mem(&[
                    ("blog/post.en.md", "en in fr"),
                    ("blog/post.fr.md", "fr in fr"),
                    ("blog/images/b.png", "b"),
                ]),
                "fr",
            ),
        ],
    )
    .unwrap()
}

#[test]
fn duplicates_keep_highest_weight() {
    let entries = multilingual().read_dir(Path::new("blog")).unwrap();
    let posts: Vec<_> = entries.iter().filter(|fi| fi.name == "post.en.md").collect();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].weight(), 2);
    assert_eq!(posts[0].size, "en in en".len() as u64);
}

#[test]
fn language_metadata_is_attached() {
    let entries = multilingual().read_dir(Path::new("blog")).unwrap();
    let by_name = |name: &str| {
        entries
            .iter()
            .find(|fi| fi.name == name)
            .and_then(|fi| fi.meta())
            .unwrap()
            .clone()
    };

    let about = by_name("about.md");
    assert_eq!(about.lang(), Some("en"));
    assert_eq!(about.weight(), 0);
    assert_eq!(about.translation_base_name(), Some("about"));

    let fr = by_name("post.fr.md");
    assert_eq!(fr.lang(), Some("fr"));
    assert_eq!(fr.weight(), 2);
    assert_eq!(fr.translation_base_name(), Some("post"));
}

#[test]
fn directories_are_never_deduplicated() {
    let entries = multilingual().read_dir(Path::new("blog")).unwrap();
    let images = entries.iter().filter(|fi| fi.name == "images").count();
    assert_eq!(images, 2);
}

#[test]
fn dedup_survives_a_second_pass() {
    let entries = multilingual().read_dir(Path::new("blog")).unwrap();
    let again = LanguageAwareMerge::new(languages()).filter(entries.clone());
    let names = |v: &[FileInfo]| v.iter().map(|fi| fi.name.clone()).collect::<Vec<_>>();
    assert_eq!(names(&again), names(&entries));
}

#[test]
fn truncated_page_is_not_filtered() {
    let fs = multilingual();
    let mut dir = fs.open(Path::new("blog")).unwrap();
    // en layer has 3 entries; the 4th is the fr layer's post.en.md duplicate.
    let page = dir.read_dir_names(4).unwrap();
    assert_eq!(page, ["about.md", "images", "post.en.md", "images"]);
    let page = dir.read_dir_names(5).unwrap();
    assert_eq!(page[4], "post.en.md");
}

#[rstest]
#[case("article.sv.md", Some("sv"), "article")]
#[case("article.md", None, "article")]
#[case("article.xx.md", None, "article.xx")]
#[case("nested/dir/page.en.html", Some("en"), "page")]
#[case("README", None, "README")]
fn language_detection(
    #[case] name: &str,
    #[case] lang: Option<&str>,
    #[case] base: &str,
) {
    let info = lang_info_from(&languages(), name);
    assert_eq!(info.lang.as_deref(), lang);
    assert_eq!(info.translation_base_name, base);
}

// =============================================================================
// Read-only and configuration
// =============================================================================

#[test]
fn composite_refuses_mutation() {
    let fs = site();
    let p = Path::new("layouts/index.html");
    let results = [
        fs.write(p, b"x"),
        fs.chmod(p, Permissions::default_file()),
        fs.chtimes(p, SystemTime::now(), SystemTime::now()),
        fs.create_dir(Path::new("new"), Permissions::default_dir()),
        fs.create_dir_all(Path::new("a/b"), Permissions::default_dir()),
        fs.remove(p),
        fs.remove_all(Path::new("layouts")),
        fs.rename(p, Path::new("moved.html")),
    ];
    for result in results {
        assert!(matches!(result, Err(FsError::PermissionDenied { .. })));
    }
    assert!(matches!(
        fs.open_file(p, OpenFlags::APPEND),
        Err(FsError::PermissionDenied { .. })
    ));
    // Layers are untouched.
    assert_eq!(fs.stat(p).unwrap().size, "project index".len() as u64);
}

#[test]
fn files_cannot_be_opened_through_composite() {
    let err = site().open(Path::new("layouts/index.html")).err().unwrap();
    assert!(matches!(err, FsError::NotSupported { .. }));
}

#[test]
fn configuration_errors() {
    assert!(matches!(
        SliceFs::new(vec![FileMeta::new().with_lang("en")]),
        Err(FsError::InvalidConfiguration { .. })
    ));
    assert!(matches!(
        SliceFs::new_language_fs(languages(), vec![layer(mem(&[]))]),
        Err(FsError::InvalidConfiguration { .. })
    ));
    assert_eq!(SliceFs::new(Vec::new()).unwrap().name(), "NoOpFs");
    assert_eq!(
        SliceFs::new_language_fs(languages(), Vec::new())
            .unwrap()
            .name(),
        "NoOpFs"
    );
}

// =============================================================================
// Provenance
// =============================================================================

#[test]
fn decorated_layers_keep_provenance() {
    let storage = mem(&[
        ("project/content/a.md", "a"),
        ("theme/content/a.md", "theme a"),
        ("theme/content/b.md", "b"),
    ]);
    let project: Arc<dyn Fs> = Arc::new(BasePathFs::new(storage.clone(), "project"));
    let theme: Arc<dyn Fs> = Arc::new(BasePathFs::new(storage, "theme"));

    let fs = SliceFs::new(vec![
        layer(DecoratorFs::base_path(project).unwrap()),
        layer(DecoratorFs::base_path(theme).unwrap()),
    ])
    .unwrap();

    let filenames: Vec<PathBuf> = fs
        .read_dir(Path::new("content"))
        .unwrap()
        .iter()
        .map(|fi| fi.meta().unwrap().filename().unwrap().to_path_buf())
        .collect();
    assert_eq!(
        filenames,
        [
            PathBuf::from("project/content/a.md"),
            PathBuf::from("theme/content/a.md"),
            PathBuf::from("theme/content/b.md"),
        ]
    );

    let b = fs.read_dir(Path::new("content")).unwrap().pop().unwrap();
    let meta = b.meta().unwrap();
    assert_eq!(meta.path(), Some(Path::new("content/b.md")));
    let mut f = meta.open().unwrap();
    let mut s = String::new();
    std::io::Read::read_to_string(&mut f, &mut s).unwrap();
    assert_eq!(s, "b");
}

#[test]
fn composite_dir_decorator_rebinds_directories() {
    let inner = mem(&[("docs/guide/intro.md", "i"), ("docs/readme.md", "r")]);
    let composite = SliceFs::new(vec![layer(inner.clone())]).unwrap();
    let fs = inner.layer(CompositeDirLayer::new(&composite));

    let entries = fs.read_dir(Path::new("docs")).unwrap();
    assert_eq!(entries[0].meta().unwrap().fs().unwrap().name(), "SliceFs");
    assert!(!entries[1].is_decorated());
}

// =============================================================================
// Real directories
// =============================================================================

#[test]
fn os_directories_as_layers() {
    let top = tempfile::tempdir().unwrap();
    let bottom = tempfile::tempdir().unwrap();
    std::fs::create_dir(top.path().join("static")).unwrap();
    std::fs::create_dir(bottom.path().join("static")).unwrap();
    std::fs::write(top.path().join("static/site.css"), "top").unwrap();
    std::fs::write(bottom.path().join("static/site.css"), "bottom").unwrap();
    std::fs::write(bottom.path().join("static/app.js"), "js").unwrap();

    let os: Arc<dyn Fs> = Arc::new(OsFs::new());
    let layers = [top.path(), bottom.path()]
        .into_iter()
        .map(|base| {
            let confined: Arc<dyn Fs> = Arc::new(BasePathFs::new(os.clone(), base));
            layer(DecoratorFs::base_path(confined).unwrap())
        })
        .collect();
    let fs = SliceFs::new(layers).unwrap();

    assert_eq!(fs.stat(Path::new("static/site.css")).unwrap().size, 3);
    assert_eq!(
        fs.read_dir_names(Path::new("static")).unwrap(),
        ["site.css", "app.js", "site.css"]
    );

    let entries = fs.read_dir(Path::new("static")).unwrap();
    let app = entries[1].meta().unwrap();
    assert_eq!(app.filename(), Some(bottom.path().join("static/app.js").as_path()));
}
