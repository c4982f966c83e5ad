    use super::*;

    #[test]
    fn signature_ignores_collection_order() {
        let a = RemoteManifest::new(vec![
            RemoteFileEntry::blob("index.html", "h1"),
            RemoteFileEntry::blob("assets/a.js", "h2"),
            RemoteFileEntry::blob("assets/img/logo.png", "h3"),
        ]);
        let b = RemoteManifest::new(vec![
            RemoteFileEntry::blob("assets/img/logo.png", "h3"),
            RemoteFileEntry::blob("index.html", "h1"),
            RemoteFileEntry::blob("assets/a.js", "h2"),
        ]);
        assert_eq!(a.signature(), b.signature());
        assert_eq!(a, b);
    }

    #[test]
    fn signature_is_newline_joined_path_hash_pairs() {
        let m = RemoteManifest::new(vec![
            RemoteFileEntry::blob("index.html", "h1"),
            RemoteFileEntry::blob("assets/a.js", "h2"),
        ]);
        assert_eq!(m.signature().as_str(), "assets/a.js:h2\nindex.html:h1");
    }

    #[test]
    fn signature_changes_when_any_hash_changes() {
        let a = RemoteManifest::new(vec![
            RemoteFileEntry::blob("index.html", "h1"),
            RemoteFileEntry::blob("assets/a.js", "h2"),
        ]);
        let b = RemoteManifest::new(vec![
            RemoteFileEntry::blob("index.html", "h1"),
            RemoteFileEntry::blob("assets/a.js", "h2-changed"),
        ]);
        assert_ne!(a.signature(), b.signature());
        assert_ne!(a.signature().revision(), b.signature().revision());
    }

    #[test]
    fn empty_manifest_has_empty_signature() {
        let m = RemoteManifest::new(Vec::new());
        assert!(m.is_empty());
        assert_eq!(m.signature().as_str(), "");
    }

    #[test]
    fn revision_is_short_and_stable() {
        let sig = SyncSignature("index.html:h1".to_string());
        let rev = sig.revision();
        assert_eq!(rev.len(), 12);
        assert_eq!(rev, sig.revision());
    }
