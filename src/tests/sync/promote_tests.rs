    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn capture_tree(root: &Path) -> Result<BTreeMap<PathBuf, Vec<u8>>> {
        fn visit(root: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) -> Result<()> {
            for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
                let entry = entry?;
                let path = entry.path();
                if entry.file_type()?.is_dir() {
                    visit(root, &path, out)?;
                } else {
                    let rel = path.strip_prefix(root)?.to_path_buf();
                    out.insert(rel, fs::read(&path)?);
                }
            }
            Ok(())
        }
        let mut out = BTreeMap::new();
        visit(root, root, &mut out)?;
        Ok(out)
    }

    fn write(root: &Path, rel: &str, body: &str) -> Result<()> {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().context("parent")?)?;
        fs::write(&p, body)?;
        Ok(())
    }

    #[test]
    fn promote_replaces_live_and_drops_backup() -> Result<()> {
        let tmp = tempfile::tempdir().context("create tempdir")?;
        let (staging, live, backup) = (
            tmp.path().join("staging"),
            tmp.path().join("site"),
            tmp.path().join("site.backup"),
        );
        write(&live, "index.html", "old")?;
        write(&live, "assets/old.js", "old")?;
        write(&staging, "index.html", "new")?;

        promote(&staging, &live, &backup)?;

        let tree = capture_tree(&live)?;
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[&PathBuf::from("index.html")], b"new".to_vec());
        assert!(!staging.exists());
        assert!(!backup.exists());
        Ok(())
    }

    #[test]
    fn promote_without_existing_live_root() -> Result<()> {
        let tmp = tempfile::tempdir().context("create tempdir")?;
        let (staging, live, backup) = (
            tmp.path().join("staging"),
            tmp.path().join("site"),
            tmp.path().join("site.backup"),
        );
        write(&staging, "index.html", "new")?;
        promote(&staging, &live, &backup)?;
        assert_eq!(fs::read_to_string(live.join("index.html"))?, "new");
        assert!(!backup.exists());
        Ok(())
    }

    #[test]
    fn failed_swap_restores_previous_tree_and_removes_partial_root() -> Result<()> {
        let tmp = tempfile::tempdir().context("create tempdir")?;
        let (staging, live, backup) = (
            tmp.path().join("staging"),
            tmp.path().join("site"),
            tmp.path().join("site.backup"),
        );
        write(&live, "index.html", "old")?;
        write(&live, "assets/a.js", "old-js")?;
        write(&staging, "index.html", "new")?;
        let before = capture_tree(&live)?;

        let live_target = live.clone();
        let res = promote_with(&staging, &live, &backup, |from, to| {
            if to == live_target.as_path() && from != backup.as_path() {
                // Leave a half-written root behind, then fail.
                fs::create_dir_all(to.join("assets"))?;
                fs::write(to.join("assets/partial.js"), b"x")?;
                return Err(io::Error::other("injected rename failure"));
            }
            fs::rename(from, to)
        });

        assert!(res.is_err());
        assert_eq!(capture_tree(&live)?, before);
        assert!(!backup.exists());
        assert!(staging.exists());
        Ok(())
    }

    #[test]
    fn stale_backup_is_replaced() -> Result<()> {
        let tmp = tempfile::tempdir().context("create tempdir")?;
        let (staging, live, backup) = (
            tmp.path().join("staging"),
            tmp.path().join("site"),
            tmp.path().join("site.backup"),
        );
        write(&live, "index.html", "old")?;
        write(&backup, "index.html", "ancient")?;
        write(&staging, "index.html", "new")?;

        promote(&staging, &live, &backup)?;
        assert_eq!(fs::read_to_string(live.join("index.html"))?, "new");
        assert!(!backup.exists());
        Ok(())
    }

    #[test]
    fn interrupted_promotion_is_recovered_from_backup() -> Result<()> {
        let tmp = tempfile::tempdir().context("create tempdir")?;
        let (live, backup) = (tmp.path().join("site"), tmp.path().join("site.backup"));
        write(&backup, "index.html", "old")?;

        assert!(recover_interrupted(&live, &backup)?);
        assert_eq!(fs::read_to_string(live.join("index.html"))?, "old");
        assert!(!backup.exists());
        assert!(!recover_interrupted(&live, &backup)?);
        Ok(())
    }
