    use super::*;

    fn filter() -> ManifestFilter {
        ManifestFilter::new(
            "index.html",
            &["assets/**".to_string(), "public/**".to_string()],
        )
        .expect("build filter")
    }

    fn listing(v: serde_json::Value) -> TreeListing {
        serde_json::from_value(v).expect("parse listing")
    }

    #[test]
    fn keeps_relevant_blobs_in_canonical_order() -> Result<()> {
        let l = listing(serde_json::json!({
            "sha": "root",
            "truncated": false,
            "tree": [
                {"path": "index.html", "type": "blob", "sha": "h1", "mode": "100644"},
                {"path": "assets", "type": "tree", "sha": "t1", "mode": "040000"},
                {"path": "assets/a.js", "type": "blob", "sha": "h2", "mode": "100644"},
                {"path": "README.md", "type": "blob", "sha": "h3", "mode": "100644"},
                {"path": "vendor/lib", "type": "commit", "sha": "c1", "mode": "160000"}
            ]
        }));
        let m = manifest_from_listing(l, &filter())?;
        let paths = m.entries().iter().map(|e| e.path.as_str()).collect::<Vec<_>>();
        assert_eq!(paths, vec!["assets/a.js", "index.html"]);
        assert!(m.entries().iter().all(|e| e.kind == EntryKind::Blob));
        Ok(())
    }

    #[test]
    fn empty_filtered_result_is_an_error() {
        let l = listing(serde_json::json!({
            "tree": [
                {"path": "README.md", "type": "blob", "sha": "h3"}
            ]
        }));
        assert!(manifest_from_listing(l, &filter()).is_err());
    }

    #[test]
    fn listing_without_entry_document_is_an_error() {
        let l = listing(serde_json::json!({
            "tree": [
                {"path": "assets/a.js", "type": "blob", "sha": "h2"},
                {"path": "public/robots.txt", "type": "blob", "sha": "h3"}
            ]
        }));
        let err = manifest_from_listing(l, &filter())
            .err()
            .expect("missing entry document rejected");
        assert!(format!("{:#}", err).contains("has no index.html"));
    }

    #[test]
    fn truncated_listing_is_an_error() {
        let l = listing(serde_json::json!({
            "truncated": true,
            "tree": [
                {"path": "index.html", "type": "blob", "sha": "h1"}
            ]
        }));
        assert!(manifest_from_listing(l, &filter()).is_err());
    }

    #[test]
    fn escaping_paths_are_rejected() {
        let l = listing(serde_json::json!({
            "tree": [
                {"path": "index.html", "type": "blob", "sha": "h1"},
                {"path": "assets/../../etc/passwd", "type": "blob", "sha": "h2"}
            ]
        }));
        assert!(manifest_from_listing(l, &filter()).is_err());
    }
