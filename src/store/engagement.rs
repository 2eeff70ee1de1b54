use chrono::Utc;
use redb::{ReadableDatabase, ReadableTable};

use super::links::{bump, load_active, Counter};
use super::{decode, encode, next_id, prefix_range, Store};
use crate::database::{TABLE_COMMENTS, TABLE_LIKES, TABLE_LINK_COMMENTS};
use crate::error::Result;
use crate::model::{Comment, LikeToggle, LinkLike};
use crate::validation::validate_comment_text;

fn like_key(hash_id: &str, user_id: &str) -> String {
    format!("{hash_id}:{user_id}")
}

fn comment_index_key(hash_id: &str, comment_id: u64) -> String {
    format!("{hash_id}:{comment_id:020}")
}

impl Store {
    pub fn has_liked(&self, hash_id: &str, user_id: &str) -> Result<bool> {
        let read_txn = self.db.begin_read()?;
        let likes = read_txn.open_table(TABLE_LIKES)?;
        let liked = likes.get(like_key(hash_id, user_id).as_str())?.is_some();
        Ok(liked)
    }

    /// Likes the link if `user_id` has not liked it yet, otherwise removes the like.
    ///
    /// The like row and `likes_count` change in the same write transaction.
    /// Returns `None` when the link is missing or inactive.
    pub fn toggle_like(&self, hash_id: &str, user_id: &str) -> Result<Option<LikeToggle>> {
        let write_txn = self.db.begin_write()?;
        let key = like_key(hash_id, user_id);

        let liked = {
            if load_active(&write_txn, hash_id)?.is_none() {
                return Ok(None);
            }

            let mut likes = write_txn.open_table(TABLE_LIKES)?;
            let existing = likes.remove(key.as_str())?.is_some();
            if !existing {
                let like = LinkLike {
                    user_id: user_id.to_string(),
                    hash_id: hash_id.to_string(),
                    created_at: Utc::now(),
                };
                likes.insert(key.as_str(), encode(&like)?.as_str())?;
            }
            !existing
        };

        let delta = if liked { 1 } else { -1 };
        let Some(link) = bump(&write_txn, hash_id, Counter::Likes, delta)? else {
            return Ok(None);
        };

        write_txn.commit()?;
        Ok(Some(LikeToggle {
            liked,
            likes_count: link.likes_count,
        }))
    }

    /// Number of like rows referencing a link
    pub fn like_rows(&self, hash_id: &str) -> Result<usize> {
        let read_txn = self.db.begin_read()?;
        let likes = read_txn.open_table(TABLE_LIKES)?;

        let (start, end) = prefix_range(hash_id);
        let mut count = 0;
        for entry in likes.range(start.as_str()..end.as_str())? {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    /// Adds a comment to an active link. Returns `None` for a missing or
    /// inactive link.
    pub fn add_comment(&self, hash_id: &str, user_id: &str, text: &str) -> Result<Option<Comment>> {
        let text = validate_comment_text(text)?;
        let write_txn = self.db.begin_write()?;

        let comment = {
            if load_active(&write_txn, hash_id)?.is_none() {
                return Ok(None);
            }

            let now = Utc::now();
            let comment = Comment {
                id: next_id(&write_txn, "comment")?,
                user_id: user_id.to_string(),
                hash_id: hash_id.to_string(),
                text,
                is_active: true,
                created_at: now,
                updated_at: now,
            };

            let mut comments = write_txn.open_table(TABLE_COMMENTS)?;
            comments.insert(comment.id, encode(&comment)?.as_str())?;

            let mut index = write_txn.open_table(TABLE_LINK_COMMENTS)?;
            index.insert(comment_index_key(hash_id, comment.id).as_str(), comment.id)?;

            comment
        };

        write_txn.commit()?;
        Ok(Some(comment))
    }

    /// Active comments of a link, newest first
    pub fn active_comments(&self, hash_id: &str) -> Result<Vec<Comment>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(TABLE_LINK_COMMENTS)?;
        let comments = read_txn.open_table(TABLE_COMMENTS)?;

        let (start, end) = prefix_range(hash_id);
        let mut found = Vec::new();
        for entry in index.range(start.as_str()..end.as_str())?.rev() {
            let (_, comment_id) = entry?;
            let comment: Option<Comment> = decode(comments.get(comment_id.value())?)?;
            if let Some(comment) = comment.filter(|comment| comment.is_active) {
                found.push(comment);
            }
        }
        Ok(found)
    }

    /// Soft-deletes a comment written by `user_id`
    pub fn deactivate_comment(&self, comment_id: u64, user_id: &str) -> Result<Option<Comment>> {
        let write_txn = self.db.begin_write()?;

        let comment = {
            let mut comments = write_txn.open_table(TABLE_COMMENTS)?;
            let comment: Option<Comment> = decode(comments.get(comment_id)?)?;
            match comment.filter(|c| c.is_active && c.user_id == user_id) {
                Some(mut comment) => {
                    comment.is_active = false;
                    comment.updated_at = Utc::now();
                    comments.insert(comment_id, encode(&comment)?.as_str())?;
                    Some(comment)
                }
                None => None,
            }
        };

        write_txn.commit()?;
        Ok(comment)
    }
}
