//! Secondary indices derived from the post table
//!
//! Every index holds ids (plus the shared `Arc<Post>` in `by_id`), never an
//! independent copy of a post. The owning snapshot keeps them in step with its
//! record table on every insert and remove.

use chrono::NaiveDate;
use indexmap::{IndexMap, IndexSet};
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use std::ops::Bound;
use std::sync::Arc;

use crate::content::Post;
use crate::error::{CollectionError, Result};

/// Ordering key for the date index: newest first, then id ascending
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateKey {
    pub date: Reverse<NaiveDate>,
    pub id: String,
}

impl DateKey {
    pub fn of(post: &Post) -> Self {
        Self {
            date: Reverse(post.date),
            id: post.id.clone(),
        }
    }

    /// Smallest key for a date, i.e. where that day starts in the index
    fn first_of(date: NaiveDate) -> Self {
        Self {
            date: Reverse(date),
            id: String::new(),
        }
    }
}

/// The four derived lookups over a set of posts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Indices {
    by_id: HashMap<String, Arc<Post>>,
    by_tag: HashMap<String, IndexSet<String>>,
    by_date: BTreeSet<DateKey>,
    by_author: HashMap<String, IndexSet<String>>,
}

impl Indices {
    /// Build all indices from scratch, visiting posts in insertion order
    pub fn rebuild<'a, I>(posts: I) -> Self
    where
        I: IntoIterator<Item = &'a Arc<Post>>,
    {
        let mut indices = Self::default();
        for post in posts {
            indices.insert(post);
        }
        indices
    }

    /// Add a post to every index
    pub fn insert(&mut self, post: &Arc<Post>) {
        self.by_id.insert(post.id.clone(), Arc::clone(post));
        for tag in &post.tags {
            self.by_tag
                .entry(tag.clone())
                .or_default()
                .insert(post.id.clone());
        }
        self.by_date.insert(DateKey::of(post));
        self.by_author
            .entry(post.author.name.clone())
            .or_default()
            .insert(post.id.clone());
    }

    /// Retract every entry for a post. Empty buckets are dropped so an
    /// incrementally maintained index equals a rebuilt one.
    pub fn remove(&mut self, post: &Post) {
        self.by_id.remove(&post.id);
        for tag in &post.tags {
            if let Some(ids) = self.by_tag.get_mut(tag) {
                ids.shift_remove(&post.id);
                if ids.is_empty() {
                    self.by_tag.remove(tag);
                }
            }
        }
        self.by_date.remove(&DateKey::of(post));
        if let Some(ids) = self.by_author.get_mut(&post.author.name) {
            ids.shift_remove(&post.id);
            if ids.is_empty() {
                self.by_author.remove(&post.author.name);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Post>> {
        self.by_id.get(id)
    }

    /// Ids carrying a tag, in insertion order
    pub fn ids_for_tag(&self, tag: &str) -> Option<&IndexSet<String>> {
        self.by_tag.get(tag)
    }

    /// Ids written by an author, in insertion order
    pub fn ids_for_author(&self, author: &str) -> Option<&IndexSet<String>> {
        self.by_author.get(author)
    }

    /// All ids, newest first
    pub fn ids_by_date(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.by_date.iter().map(|k| k.id.as_str())
    }

    /// Ids whose date lies in `[from, to]` (either bound optional), newest first
    pub fn ids_in_range(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> impl Iterator<Item = &str> {
        let start = match to {
            Some(to) => Bound::Included(DateKey::first_of(to)),
            None => Bound::Unbounded,
        };
        self.by_date
            .range((start, Bound::Unbounded))
            .take_while(move |k| from.map_or(true, |from| k.date.0 >= from))
            .map(|k| k.id.as_str())
    }

    /// The posts just newer and just older than `post` in date order
    pub fn date_neighbors(&self, post: &Post) -> (Option<&str>, Option<&str>) {
        let key = DateKey::of(post);
        let newer = self
            .by_date
            .range((Bound::Unbounded, Bound::Excluded(&key)))
            .next_back()
            .map(|k| k.id.as_str());
        let older = self
            .by_date
            .range((Bound::Excluded(&key), Bound::Unbounded))
            .next()
            .map(|k| k.id.as_str());
        (newer, older)
    }

    /// Number of posts per tag, most used first, then by name
    pub fn tag_counts(&self) -> Vec<(String, usize)> {
        sorted_counts(&self.by_tag)
    }

    /// Number of posts per author, most prolific first, then by name
    pub fn author_counts(&self) -> Vec<(String, usize)> {
        sorted_counts(&self.by_author)
    }

    /// Number of posts per month (`YYYY-MM`), newest month first
    pub fn archives(&self) -> Vec<(String, usize)> {
        let mut months: IndexMap<String, usize> = IndexMap::new();
        for key in &self.by_date {
            *months
                .entry(key.date.0.format("%Y-%m").to_string())
                .or_insert(0) += 1;
        }
        months.into_iter().collect()
    }

    /// Check every index against the record table it was derived from
    pub fn verify<'a, I>(&self, posts: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Arc<Post>>,
    {
        let mut count = 0;
        let mut tag_entries = 0;
        for post in posts {
            count += 1;
            tag_entries += post.tags.len();

            match self.by_id.get(&post.id) {
                Some(indexed) if Arc::ptr_eq(indexed, post) => {}
                _ => {
                    return Err(CollectionError::InternalConsistency(format!(
                        "id index is stale for {}",
                        post.id
                    )))
                }
            }
            if !self.by_date.contains(&DateKey::of(post)) {
                return Err(CollectionError::InternalConsistency(format!(
                    "date index is missing {}",
                    post.id
                )));
            }
            if let Some(tag) = post
                .tags
                .iter()
                .find(|tag| !self.by_tag.get(*tag).is_some_and(|ids| ids.contains(&post.id)))
            {
                return Err(CollectionError::InternalConsistency(format!(
                    "tag index is missing {} under {}",
                    post.id, tag
                )));
            }
            let by_author = self
                .by_author
                .get(&post.author.name)
                .is_some_and(|ids| ids.contains(&post.id));
            if !by_author {
                return Err(CollectionError::InternalConsistency(format!(
                    "author index is missing {}",
                    post.id
                )));
            }
        }

        let author_entries: usize = self.by_author.values().map(IndexSet::len).sum();
        let indexed_tag_entries: usize = self.by_tag.values().map(IndexSet::len).sum();
        if self.by_id.len() != count
            || self.by_date.len() != count
            || author_entries != count
            || indexed_tag_entries != tag_entries
        {
            return Err(CollectionError::InternalConsistency(format!(
                "index sizes (id {}, date {}, author {}, tag {}) do not match {} posts with {} tags",
                self.by_id.len(),
                self.by_date.len(),
                author_entries,
                indexed_tag_entries,
                count,
                tag_entries
            )));
        }
        Ok(())
    }
}

fn sorted_counts(index: &HashMap<String, IndexSet<String>>) -> Vec<(String, usize)> {
    let mut counts: Vec<_> = index
        .iter()
        .map(|(name, ids)| (name.clone(), ids.len()))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}
