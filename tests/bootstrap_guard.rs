mod common;

use std::fs;

use anyhow::{Context, Result};

use mirrorview::error::SyncError;
use mirrorview::model::SyncSignature;
use mirrorview::resolver::{BootstrapOutcome, ContentResolver};
use mirrorview::store::LocalStore;

#[test]
fn seeding_happens_once_and_never_overwrites() -> Result<()> {
    let tmp = tempfile::tempdir().context("create temp dir")?;
    let bundled = common::write_bundled(tmp.path())?;
    let store = LocalStore::open_or_init(&tmp.path().join("data"))?;
    let resolver = ContentResolver::new(&store, "index.html");

    assert_eq!(resolver.resolve_entry_document(), None);
    assert_eq!(
        resolver.ensure_local_content_exists(&bundled)?,
        BootstrapOutcome::Seeded { files: 2 }
    );
    let doc = resolver
        .resolve_entry_document()
        .context("entry document after seeding")?;
    assert_eq!(doc, store.site_dir().join("index.html"));

    fs::write(&doc, b"<html>synced</html>")?;
    fs::write(bundled.join("index.html"), b"<html>new bundle</html>")?;

    assert_eq!(
        resolver.ensure_local_content_exists(&bundled)?,
        BootstrapOutcome::AlreadyPresent
    );
    assert_eq!(fs::read(&doc)?, b"<html>synced</html>");
    Ok(())
}

#[test]
fn live_root_without_entry_document_is_reseeded() -> Result<()> {
    let tmp = tempfile::tempdir().context("create temp dir")?;
    let bundled = common::write_bundled(tmp.path())?;
    let store = LocalStore::open_or_init(&tmp.path().join("data"))?;
    fs::create_dir_all(store.site_dir())?;
    fs::write(store.site_dir().join("stray.txt"), b"x")?;

    let resolver = ContentResolver::new(&store, "index.html");
    assert!(matches!(
        resolver.ensure_local_content_exists(&bundled)?,
        BootstrapOutcome::Seeded { .. }
    ));
    assert!(!store.site_dir().join("stray.txt").exists());
    assert!(store.site_dir().join("assets/app.js").is_file());
    Ok(())
}

#[test]
fn reseeding_forgets_the_remote_signature() -> Result<()> {
    let tmp = tempfile::tempdir().context("create temp dir")?;
    let bundled = common::write_bundled(tmp.path())?;
    let store = LocalStore::open_or_init(&tmp.path().join("data"))?;
    fs::create_dir_all(store.site_dir().join("assets"))?;
    fs::write(store.site_dir().join("assets/a.js"), b"remote")?;
    store.write_signature(&SyncSignature("assets/a.js:h2".to_string()))?;

    let resolver = ContentResolver::new(&store, "index.html");
    assert!(matches!(
        resolver.ensure_local_content_exists(&bundled)?,
        BootstrapOutcome::Seeded { .. }
    ));
    assert_eq!(store.read_signature()?, None);
    Ok(())
}

#[test]
fn missing_bundle_is_a_bootstrap_failure() -> Result<()> {
    let tmp = tempfile::tempdir().context("create temp dir")?;
    let store = LocalStore::open_or_init(&tmp.path().join("data"))?;
    let resolver = ContentResolver::new(&store, "index.html");

    let err = resolver
        .ensure_local_content_exists(&tmp.path().join("nope"))
        .err()
        .context("expected failure")?;
    assert!(matches!(err, SyncError::BootstrapFailed(_)));
    assert!(!store.site_dir().exists());
    Ok(())
}

#[test]
fn bundle_without_entry_document_is_rejected() -> Result<()> {
    let tmp = tempfile::tempdir().context("create temp dir")?;
    let bundled = tmp.path().join("bundled");
    fs::create_dir_all(&bundled)?;
    fs::write(bundled.join("other.html"), b"x")?;
    let store = LocalStore::open_or_init(&tmp.path().join("data"))?;

    let err = ContentResolver::new(&store, "index.html")
        .ensure_local_content_exists(&bundled)
        .err()
        .context("expected failure")?;
    assert!(err.chain().contains("has no index.html"), "{}", err.chain());
    Ok(())
}

#[test]
fn interrupted_promotion_is_recovered_before_bootstrap() -> Result<()> {
    let tmp = tempfile::tempdir().context("create temp dir")?;
    let bundled = common::write_bundled(tmp.path())?;
    let store = LocalStore::open_or_init(&tmp.path().join("data"))?;

    // Crash between "live -> backup" and "staging -> live".
    fs::create_dir_all(store.backup_dir())?;
    fs::write(store.backup_dir().join("index.html"), b"<html>synced</html>")?;

    let resolver = ContentResolver::new(&store, "index.html");
    assert_eq!(
        resolver.ensure_local_content_exists(&bundled)?,
        BootstrapOutcome::AlreadyPresent
    );
    assert_eq!(
        fs::read(store.site_dir().join("index.html"))?,
        b"<html>synced</html>"
    );
    assert!(!store.backup_dir().exists());
    Ok(())
}

#[test]
fn nested_entry_document_resolves_under_live_root() -> Result<()> {
    let tmp = tempfile::tempdir().context("create temp dir")?;
    let store = LocalStore::open_or_init(&tmp.path().join("data"))?;
    fs::create_dir_all(store.site_dir().join("app"))?;
    fs::write(store.site_dir().join("app/index.html"), b"x")?;

    let nested = ContentResolver::new(&store, "app/index.html");
    assert_eq!(
        nested.resolve_entry_document(),
        Some(store.site_dir().join("app/index.html"))
    );
    assert_eq!(
        ContentResolver::new(&store, "../config.json").resolve_entry_document(),
        None
    );
    Ok(())
}
