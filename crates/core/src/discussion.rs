//! Discussion thread comments.
//!
//! A thread hangs off a bug or a test case. Comments are stored flat, each
//! naming the comment it replies to, and are immutable once written. The
//! nested reply tree only exists in [`CommentView`], assembled on read.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Maximum length of a comment body (characters).
pub const MAX_COMMENT_LENGTH: usize = 10_000;

// ---------------------------------------------------------------------------
// Parent types
// ---------------------------------------------------------------------------

/// The kind of entity a thread is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParentType {
    Bug,
    TestCase,
}

impl ParentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParentType::Bug => "Bug",
            ParentType::TestCase => "TestCase",
        }
    }

    /// Parse a stored or user-supplied parent type.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "Bug" => Ok(ParentType::Bug),
            "TestCase" => Ok(ParentType::TestCase),
            other => Err(CoreError::Validation(format!(
                "parent_type must be \"Bug\" or \"TestCase\", got '{other}'"
            ))),
        }
    }
}

/// Validate a parent reference before a thread is created or looked up.
pub fn validate_parent(parent_type: &str, parent_id: DbId) -> Result<ParentType, CoreError> {
    let parent_type = ParentType::parse(parent_type)?;
    if parent_id <= 0 {
        return Err(CoreError::Validation(format!(
            "parent_id must be a positive id, got {parent_id}"
        )));
    }
    Ok(parent_type)
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// One stored comment. Top-level comments have no `parent_id`; a reply
/// points at the comment it answers, which may itself be a reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub author_id: DbId,
    pub content: String,
    pub created_at: Timestamp,
}

impl Comment {
    pub fn new(
        parent_id: Option<Uuid>,
        author_id: DbId,
        content: String,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            parent_id,
            author_id,
            content,
            created_at,
        }
    }
}

/// Trim and validate a comment body, returning the stored form.
///
/// Blank content is a [`CoreError::Validation`] (HTTP 400), not a not-found
/// error: the thread exists, the input is malformed.
pub fn validate_content(content: &str) -> Result<String, CoreError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Comment content is required".into()));
    }
    if trimmed.chars().count() > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Comment exceeds maximum length of {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Every author id referenced by `comments`.
pub fn collect_author_ids<'a>(
    comments: impl IntoIterator<Item = &'a Comment>,
    into: &mut BTreeSet<DbId>,
) {
    into.extend(comments.into_iter().map(|c| c.author_id));
}

/// Only the user who opened a thread may delete it.
pub fn ensure_thread_author(thread_author_id: DbId, caller_id: DbId) -> Result<(), CoreError> {
    if thread_author_id == caller_id {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Only the thread author can delete this thread".into(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Populated views
// ---------------------------------------------------------------------------

/// The identity fields shown next to every comment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorSummary {
    pub id: DbId,
    pub name: String,
    pub email: String,
}

impl AuthorSummary {
    /// Placeholder for an author whose user row no longer exists.
    pub fn unknown(id: DbId) -> Self {
        Self {
            id,
            name: "Unknown user".into(),
            email: String::new(),
        }
    }
}

/// A comment with its author resolved and its replies nested, as returned
/// to API callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub author: AuthorSummary,
    pub content: String,
    pub created_at: Timestamp,
    pub replies: Vec<CommentView>,
}

impl Drop for CommentView {
    // Unlink descendants onto a flat stack so a long reply chain is not
    // dropped one stack frame per level.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.replies);
        while let Some(mut view) = pending.pop() {
            pending.append(&mut view.replies);
        }
    }
}

/// Assemble a thread's flat comment list into its reply tree, resolving
/// every author against `authors`.
///
/// Siblings keep the order of `comments`. A comment whose parent is not in
/// the list is shown at the top level. Assembly uses an explicit stack, so
/// depth is bounded only by memory.
pub fn populate(
    comments: &[Comment],
    authors: &HashMap<DbId, AuthorSummary>,
) -> Vec<CommentView> {
    let index: HashMap<Uuid, usize> = comments
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id, i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); comments.len()];
    let mut roots = Vec::new();
    for (i, comment) in comments.iter().enumerate() {
        match comment.parent_id.and_then(|p| index.get(&p)) {
            Some(&parent) if parent != i => children[parent].push(i),
            _ => roots.push(i),
        }
    }

    // Post-order: a node is built once all of its replies are.
    let mut built: Vec<Option<CommentView>> = (0..comments.len()).map(|_| None).collect();
    let mut stack: Vec<(usize, bool)> = roots.iter().rev().map(|&i| (i, false)).collect();
    while let Some((i, expanded)) = stack.pop() {
        if expanded {
            let replies = children[i].iter().filter_map(|&c| built[c].take()).collect();
            let c = &comments[i];
            built[i] = Some(CommentView {
                id: c.id,
                author: authors
                    .get(&c.author_id)
                    .cloned()
                    .unwrap_or_else(|| AuthorSummary::unknown(c.author_id)),
                content: c.content.clone(),
                created_at: c.created_at,
                replies,
            });
        } else {
            stack.push((i, true));
            stack.extend(children[i].iter().rev().map(|&c| (c, false)));
        }
    }

    roots.iter().filter_map(|&i| built[i].take()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;

    fn comment(parent: Option<&Comment>, author: DbId, text: &str) -> Comment {
        Comment::new(parent.map(|p| p.id), author, text.to_string(), Utc::now())
    }

    /// Follow the first reply at every level, returning the depth reached
    /// and the deepest view.
    fn deepest(views: &[CommentView]) -> (usize, &CommentView) {
        let mut node = &views[0];
        let mut depth = 1;
        while let Some(next) = node.replies.first() {
            node = next;
            depth += 1;
        }
        (depth, node)
    }

    #[test]
    fn parent_type_parsing() {
        assert_eq!(ParentType::parse("Bug").unwrap(), ParentType::Bug);
        assert_eq!(ParentType::parse("TestCase").unwrap(), ParentType::TestCase);
        assert_matches!(ParentType::parse("bug"), Err(CoreError::Validation(_)));
        assert_matches!(validate_parent("Bug", 0), Err(CoreError::Validation(_)));
        assert_eq!(validate_parent("TestCase", 3).unwrap(), ParentType::TestCase);
    }

    #[test]
    fn content_is_trimmed_and_required() {
        assert_eq!(validate_content("  hi  ").unwrap(), "hi");
        assert_matches!(validate_content("   "), Err(CoreError::Validation(_)));
        let long = "x".repeat(MAX_COMMENT_LENGTH + 1);
        assert_matches!(validate_content(&long), Err(CoreError::Validation(_)));
    }

    #[test]
    fn reply_to_nested_comment_lands_at_depth_three() {
        let c1 = comment(None, 1, "C1");
        let c2 = comment(Some(&c1), 2, "C2");
        let c3 = comment(Some(&c2), 3, "reply to C2");
        let c3_id = c3.id;

        let views = populate(&[c1, c2, c3], &HashMap::new());

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].replies.len(), 1);
        assert_eq!(views[0].replies[0].replies.len(), 1);
        assert_eq!(views[0].replies[0].replies[0].id, c3_id);
    }

    #[test]
    fn siblings_keep_input_order() {
        let first = comment(None, 1, "first");
        let reply_a = comment(Some(&first), 2, "a");
        let second = comment(None, 3, "second");
        let reply_b = comment(Some(&first), 4, "b");

        let views = populate(&[first, reply_a, second, reply_b], &HashMap::new());

        let top: Vec<&str> = views.iter().map(|v| v.content.as_str()).collect();
        assert_eq!(top, vec!["first", "second"]);
        let replies: Vec<&str> = views[0].replies.iter().map(|v| v.content.as_str()).collect();
        assert_eq!(replies, vec!["a", "b"]);
    }

    #[test]
    fn reply_listed_before_its_parent_still_nests() {
        let parent = comment(None, 1, "parent");
        let reply = comment(Some(&parent), 2, "reply");

        let views = populate(&[reply, parent], &HashMap::new());

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].content, "parent");
        assert_eq!(views[0].replies[0].content, "reply");
    }

    #[test]
    fn comment_with_missing_parent_is_shown_top_level() {
        let ghost = comment(None, 1, "deleted elsewhere");
        let orphan = comment(Some(&ghost), 2, "orphan");

        let views = populate(&[orphan], &HashMap::new());
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].content, "orphan");
    }

    #[test]
    fn chain_several_hundred_deep_is_assembled() {
        const DEPTH: usize = 600;
        let mut comments = vec![comment(None, 1, "level 1")];
        for level in 2..=DEPTH {
            let parent = comments.last().unwrap();
            let next = comment(Some(parent), 1, &format!("level {level}"));
            comments.push(next);
        }

        let views = populate(&comments, &HashMap::new());

        let (depth, leaf) = deepest(&views);
        assert_eq!(depth, DEPTH);
        assert_eq!(leaf.content, format!("level {DEPTH}"));
        assert!(serde_json::to_string(&views).is_ok());
    }

    #[test]
    fn author_ids_cover_every_comment() {
        let root = comment(None, 1, "a");
        let child = comment(Some(&root), 2, "b");
        let grandchild = comment(Some(&child), 3, "c");
        let mut ids = BTreeSet::new();
        collect_author_ids(&[root, child, grandchild], &mut ids);
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn populate_resolves_authors_at_every_depth() {
        let root = comment(None, 1, "a");
        let reply = comment(Some(&root), 2, "b");
        let authors = HashMap::from([(
            1,
            AuthorSummary {
                id: 1,
                name: "Ada".into(),
                email: "ada@example.com".into(),
            },
        )]);
        let views = populate(&[root, reply], &authors);
        assert_eq!(views[0].author.name, "Ada");
        assert_eq!(views[0].replies[0].author, AuthorSummary::unknown(2));
    }

    #[test]
    fn only_author_may_delete() {
        assert!(ensure_thread_author(5, 5).is_ok());
        assert_matches!(ensure_thread_author(5, 6), Err(CoreError::Forbidden(_)));
    }
}
