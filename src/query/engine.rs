//! Query execution against a snapshot

use std::collections::HashMap;
use std::sync::Arc;

use super::{Page, QuerySpec, SortOrder};
use crate::content::Post;
use crate::store::Snapshot;

/// Run a query. Tag and author filters are answered from their indices and a
/// pure date-range query walks the date index; only a query with neither
/// scans every post.
pub fn execute(snapshot: &Snapshot, spec: &QuerySpec) -> Page {
    let indices = snapshot.indices();

    let candidates: Vec<&Arc<Post>> = match (spec.tag.as_deref(), spec.author.as_deref()) {
        (Some(tag), Some(author)) => {
            match (indices.ids_for_tag(tag), indices.ids_for_author(author)) {
                (Some(tagged), Some(authored)) => {
                    let (small, large) = if tagged.len() <= authored.len() {
                        (tagged, authored)
                    } else {
                        (authored, tagged)
                    };
                    resolve(snapshot, small.iter().filter(|id| large.contains(*id)))
                }
                _ => Vec::new(),
            }
        }
        (Some(tag), None) => indices
            .ids_for_tag(tag)
            .map(|ids| resolve(snapshot, ids.iter()))
            .unwrap_or_default(),
        (None, Some(author)) => indices
            .ids_for_author(author)
            .map(|ids| resolve(snapshot, ids.iter()))
            .unwrap_or_default(),
        (None, None) if spec.date_from.is_some() || spec.date_to.is_some() => resolve(
            snapshot,
            indices.ids_in_range(spec.date_from, spec.date_to),
        ),
        (None, None) => snapshot.posts().collect(),
    };

    let needle = spec
        .text_search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut matched: Vec<Arc<Post>> = candidates
        .into_iter()
        .filter(|post| spec.date_from.map_or(true, |from| post.date >= from))
        .filter(|post| spec.date_to.map_or(true, |to| post.date <= to))
        .filter(|post| needle.as_deref().map_or(true, |n| post.matches_text(n)))
        .cloned()
        .collect();

    sort_posts(&mut matched, spec.sort);

    let total = matched.len();
    let items: Vec<Arc<Post>> = matched
        .into_iter()
        .skip(spec.offset)
        .take(spec.limit.unwrap_or(usize::MAX))
        .collect();

    tracing::debug!(
        "Query matched {} post(s), returning {} from offset {}",
        total,
        items.len(),
        spec.offset
    );

    Page {
        items,
        total,
        offset: spec.offset,
        limit: spec.limit,
    }
}

/// Posts sharing the most tags with `post`, excluding itself.
/// Ties go to the newer post, then the smaller id.
pub fn related(snapshot: &Snapshot, post: &Post, limit: usize) -> Vec<Arc<Post>> {
    let indices = snapshot.indices();
    let mut shared: HashMap<&str, usize> = HashMap::new();
    for tag in &post.tags {
        for id in indices.ids_for_tag(tag).into_iter().flat_map(|ids| ids.iter()) {
            if id != &post.id {
                *shared.entry(id.as_str()).or_insert(0) += 1;
            }
        }
    }

    let mut scored: Vec<(usize, &Arc<Post>)> = shared
        .into_iter()
        .filter_map(|(id, count)| indices.get(id).map(|p| (count, p)))
        .collect();
    scored.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| b.1.date.cmp(&a.1.date))
            .then_with(|| a.1.id.cmp(&b.1.id))
    });
    scored
        .into_iter()
        .take(limit)
        .map(|(_, p)| Arc::clone(p))
        .collect()
}

fn resolve<'a, I, S>(snapshot: &'a Snapshot, ids: I) -> Vec<&'a Arc<Post>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ids.into_iter()
        .filter_map(|id| snapshot.indices().get(id.as_ref()))
        .collect()
}

fn sort_posts(posts: &mut [Arc<Post>], order: SortOrder) {
    let by_id = |a: &Arc<Post>, b: &Arc<Post>| a.id.cmp(&b.id);
    match order {
        SortOrder::DateDesc => {
            posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| by_id(a, b)))
        }
        SortOrder::DateAsc => {
            posts.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| by_id(a, b)))
        }
        SortOrder::TitleAsc => posts.sort_by_cached_key(|p| (p.title.to_lowercase(), p.id.clone())),
    }
}
