//! Immutable, fully committed collection state

use indexmap::IndexMap;
use std::sync::Arc;

use crate::content::Post;
use crate::error::Result;
use crate::index::Indices;
use crate::query::{self, Page, QuerySpec};

/// One consistent version of the collection: the post table plus every index
/// derived from it. Readers hold an `Arc<Snapshot>`; writers build a new one.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    posts: IndexMap<String, Arc<Post>>,
    indices: Indices,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.posts.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Post>> {
        self.posts.get(id).cloned()
    }

    /// Posts in insertion order
    pub fn posts(&self) -> impl Iterator<Item = &Arc<Post>> {
        self.posts.values()
    }

    /// All posts in insertion order
    pub fn all(&self) -> Vec<Arc<Post>> {
        self.posts.values().cloned().collect()
    }

    pub fn indices(&self) -> &Indices {
        &self.indices
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<Arc<Post>> {
        self.posts.values().find(|p| p.slug == slug).cloned()
    }

    pub fn query(&self, spec: &QuerySpec) -> Vec<Arc<Post>> {
        query::execute(self, spec).items
    }

    pub fn query_page(&self, spec: &QuerySpec) -> Page {
        query::execute(self, spec)
    }

    /// `(newer, older)` neighbors of a post in newest-first order
    pub fn neighbors(&self, id: &str) -> Option<(Option<Arc<Post>>, Option<Arc<Post>>)> {
        let post = self.posts.get(id)?;
        let (newer, older) = self.indices.date_neighbors(post);
        Some((
            newer.and_then(|id| self.get(id)),
            older.and_then(|id| self.get(id)),
        ))
    }

    /// Posts sharing the most tags with the given one
    pub fn related(&self, id: &str, limit: usize) -> Vec<Arc<Post>> {
        match self.posts.get(id) {
            Some(post) => query::related(self, post, limit),
            None => Vec::new(),
        }
    }

    pub(crate) fn insert_post(&mut self, post: Post) -> Arc<Post> {
        let post = Arc::new(post);
        self.indices.insert(&post);
        self.posts.insert(post.id.clone(), Arc::clone(&post));
        post
    }

    pub(crate) fn remove_post(&mut self, id: &str) -> Option<Arc<Post>> {
        let post = self.posts.shift_remove(id)?;
        self.indices.remove(&post);
        Some(post)
    }

    pub(crate) fn rebuild_indices(&mut self) {
        self.indices = Indices::rebuild(self.posts.values());
    }

    pub(crate) fn verify(&self) -> Result<()> {
        self.indices.verify(self.posts.values())
    }

    #[cfg(test)]
    pub(crate) fn indices_mut(&mut self) -> &mut Indices {
        &mut self.indices
    }
}
