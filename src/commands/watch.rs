//! Keep a live collection in step with its source files

use anyhow::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::content::loader::ContentLoader;
use crate::store::CollectionStore;
use crate::Postdex;

/// Reload the source directory and reconcile it with the store.
///
/// When any source file fails to load, the posts it held are unknown, so
/// nothing is removed on that pass.
pub fn reload(app: &Postdex, store: &CollectionStore) -> Result<()> {
    let loaded = ContentLoader::new(app)?.load();
    for error in &loaded.errors {
        tracing::warn!("{}: {}", error.source, error.message);
    }
    let report = if loaded.errors.is_empty() {
        store.sync(&loaded.raw())?
    } else {
        tracing::warn!(
            "{} source problem(s), keeping posts that did not load",
            loaded.errors.len()
        );
        store.merge(&loaded.raw())?
    };
    if !report.is_noop() {
        println!(
            "Updated: +{} ~{} -{} ({} rejected)",
            report.inserted_ids.len(),
            report.replaced_ids.len(),
            report.removed_ids.len(),
            report.failures.len()
        );
    }
    Ok(())
}

/// Load the collection, then watch the source directory for changes
pub fn run(app: &Postdex) -> Result<()> {
    let opened = app.open()?;
    let store = opened.store;
    println!("Loaded {} post(s)", store.len());

    std::fs::create_dir_all(&app.source_dir)?;

    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;
    debouncer
        .watcher()
        .watch(&app.source_dir, RecursiveMode::Recursive)?;

    tracing::info!(
        "Watching {:?} for changes. Press Ctrl+C to stop.",
        app.source_dir
    );

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                for event in &events {
                    tracing::debug!("Changed: {}", event.path.display());
                }
                tracing::info!("Source changed, reloading...");
                if let Err(e) = reload(app, &store) {
                    tracing::error!("Reload failed: {}", e);
                    if store.is_halted() {
                        break;
                    }
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_reload_applies_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        crate::commands::init::init_collection(dir.path()).unwrap();
        let app = Postdex::new(dir.path()).unwrap();
        let store = app.open().unwrap().store;
        assert_eq!(store.len(), 1);

        fs::write(
            app.source_dir.join("more.yml"),
            "id: 2\ntitle: Second\ncontent: <p>two</p>\ndate: 2024-04-01\nauthor:\n  name: Baha\n",
        )
        .unwrap();
        reload(&app, &store).unwrap();
        assert_eq!(store.len(), 2);

        fs::remove_file(app.source_dir.join("posts.json")).unwrap();
        reload(&app, &store).unwrap();
        let ids: Vec<_> = store.all().iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn test_reload_keeps_posts_of_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        crate::commands::init::init_collection(dir.path()).unwrap();
        let app = Postdex::new(dir.path()).unwrap();
        let store = app.open().unwrap().store;
        assert_eq!(store.len(), 1);

        // A half-written save
        fs::write(app.source_dir.join("posts.json"), r#"[{"id": "1", "#).unwrap();
        reload(&app, &store).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get("1").is_some());

        fs::write(
            app.source_dir.join("posts.json"),
            serde_json::to_string(&crate::commands::init::seed_records()).unwrap(),
        )
        .unwrap();
        reload(&app, &store).unwrap();
        assert_eq!(store.len(), 1);
    }
}
