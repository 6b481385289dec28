use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;
use postdex::content::{Post, RawAuthor, RawRecord};
use postdex::query::QuerySpec;
use postdex::store::{CollectionStore, FailureKind};

fn record(id: &str, date: &str, tags: &[&str]) -> RawRecord {
    RawRecord {
        id: Some(id.to_string()),
        title: Some(format!("Post {}", id)),
        excerpt: Some(format!("Excerpt for {}", id)),
        content: Some("<article><p>payload</p></article>".to_string()),
        date: Some(date.to_string()),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        read_time: Some("5 min read".to_string()),
        image: None,
        author: Some(RawAuthor {
            name: Some("Baha".to_string()),
            avatar: Some("https://avatars.githubusercontent.com/u/91181868?v=4".to_string()),
        }),
    }
}

fn ids(posts: &[Arc<Post>]) -> Vec<String> {
    posts.iter().map(|p| p.id.clone()).collect()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn sample_batch() -> Vec<RawRecord> {
    vec![
        record("1", "2024-03-15", &["react", "typescript"]),
        record("2", "2023-12-01", &["rust"]),
        record("3", "2024-01-20", &["react"]),
        record("4", "2024-03-15", &["rust", "wasm"]),
        record("5", "2022-06-30", &[]),
        record("6", "2024-02-29", &["typescript"]),
        record("7", "2024-01-20", &["rust"]),
    ]
}

#[test]
fn react_example_round_trip() {
    let store = CollectionStore::new();
    let report = store
        .ingest(&[record("1", "2024-03-15", &["react", "typescript"])])
        .unwrap();
    assert_eq!(report.inserted_ids, vec!["1"]);

    assert_eq!(ids(&store.query(&QuerySpec::new().tag("react"))), vec!["1"]);
    assert!(store.query(&QuerySpec::new().tag("vue")).is_empty());

    store.remove("1").unwrap();
    assert!(store.query(&QuerySpec::new().tag("react")).is_empty());
}

#[test]
fn all_returns_valid_subset_in_insertion_order() {
    let mut batch = sample_batch();
    batch[2].date = Some("2024-13-01".to_string());
    batch[5].author = None;

    let store = CollectionStore::new();
    let report = store.ingest(&batch).unwrap();

    assert_eq!(report.inserted_ids, vec!["1", "2", "4", "5", "7"]);
    assert_eq!(ids(&store.all()), report.inserted_ids);
    let failed: Vec<_> = report.failures.iter().map(|f| f.index).collect();
    assert_eq!(failed, vec![2, 5]);
}

#[test]
fn tag_query_contains_exactly_tagged_posts() {
    let store = CollectionStore::new();
    store.ingest(&sample_batch()).unwrap();

    for tag in ["react", "typescript", "rust", "wasm", "missing"] {
        let found = ids(&store.query(&QuerySpec::new().tag(tag)));
        for post in store.all() {
            assert_eq!(
                found.contains(&post.id),
                post.has_tag(tag),
                "post {} / tag {}",
                post.id,
                tag
            );
        }
    }
}

#[test]
fn date_range_is_inclusive_and_newest_first() {
    let store = CollectionStore::new();
    store.ingest(&sample_batch()).unwrap();

    let (from, to) = (date("2024-01-20"), date("2024-03-15"));
    let found = store.query(&QuerySpec::new().date_from(from).date_to(to));

    let mut expected: Vec<_> = store
        .all()
        .into_iter()
        .filter(|p| p.date >= from && p.date <= to)
        .collect();
    expected.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));

    assert_eq!(ids(&found), ids(&expected));
    assert_eq!(ids(&found), vec!["1", "4", "6", "3", "7"]);
}

#[test]
fn rebuild_all_is_idempotent() {
    let store = CollectionStore::new();
    store.ingest(&sample_batch()).unwrap();
    store.remove("3").unwrap();

    let incremental = store.snapshot().indices().clone();
    store.rebuild_all().unwrap();
    let once = store.snapshot().indices().clone();
    store.rebuild_all().unwrap();
    store.rebuild_all().unwrap();
    let thrice = store.snapshot().indices().clone();

    assert_eq!(incremental, once);
    assert_eq!(once, thrice);
}

#[test]
fn rebuild_all_keeps_tag_order_after_replace() {
    let store = CollectionStore::new();
    store.ingest(&sample_batch()).unwrap();
    let mut edited = record("2", "2023-12-02", &["rust"]);
    edited.title = Some("Post 2, revised".to_string());
    store.replace("2", &edited).unwrap();

    let tag_order = |store: &CollectionStore, tag: &str| -> Vec<String> {
        store
            .snapshot()
            .indices()
            .ids_for_tag(tag)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    };
    assert_eq!(tag_order(&store, "rust"), vec!["4", "7", "2"]);

    store.rebuild_all().unwrap();
    assert_eq!(tag_order(&store, "rust"), vec!["4", "7", "2"]);
    assert_eq!(tag_order(&store, "react"), vec!["1", "3"]);
}

#[test]
fn pages_partition_the_result() {
    let store = CollectionStore::new();
    store.ingest(&sample_batch()).unwrap();
    let full = ids(&store.query(&QuerySpec::new()));

    for k in 1..=4 {
        for n in 0..=full.len() {
            let first = ids(&store.query(&QuerySpec::new().limit(k).offset(n)));
            let second = ids(&store.query(&QuerySpec::new().limit(k).offset(n + k)));
            let joined: Vec<_> = first.iter().chain(second.iter()).cloned().collect();
            let end = (n + 2 * k).min(full.len());
            let start = n.min(full.len());
            assert_eq!(joined, full[start..end].to_vec(), "k={} n={}", k, n);
        }
    }
}

#[test]
fn duplicate_in_batch_inserts_once() {
    let store = CollectionStore::new();
    let mut later = record("9", "2024-05-05", &["later"]);
    later.title = Some("Later copy".to_string());
    let report = store
        .ingest(&[record("9", "2024-01-01", &[]), later])
        .unwrap();

    assert_eq!(report.inserted_ids, vec!["9"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert_eq!(report.failures[0].id.as_deref(), Some("9"));
    assert_eq!(store.get("9").unwrap().title, "Post 9");
}

#[test]
fn invalid_first_occurrence_blocks_later_duplicate() {
    let store = CollectionStore::new();
    let report = store
        .ingest(&[
            record("1", "not-a-date", &[]),
            record("1", "2024-01-01", &[]),
        ])
        .unwrap();

    assert!(report.inserted_ids.is_empty());
    let kinds: Vec<_> = report.failures.iter().map(|f| (f.index, f.kind)).collect();
    assert_eq!(
        kinds,
        vec![(0, FailureKind::Validation), (1, FailureKind::DuplicateId)]
    );
    assert!(store.is_empty());
}

#[test]
fn readers_only_see_committed_snapshots() {
    let store = Arc::new(CollectionStore::new());
    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..200 {
                let tags: &[&str] = if i % 2 == 0 { &["even"] } else { &["odd"] };
                store
                    .ingest(&[record(&i.to_string(), "2024-01-01", tags)])
                    .unwrap();
                if i % 3 == 0 {
                    store.remove(&i.to_string()).unwrap();
                }
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..200 {
                    let snapshot = store.snapshot();
                    let posts = snapshot.len();
                    let even = snapshot.query(&QuerySpec::new().tag("even")).len();
                    let odd = snapshot.query(&QuerySpec::new().tag("odd")).len();
                    assert_eq!(even + odd, posts);
                    assert_eq!(snapshot.indices().ids_by_date().count(), posts);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(store.len(), 200 - 67);
}
