//! Database initialization and table definitions
//!
//! This module handles the setup of the embedded redb database. Records are
//! stored as JSON strings; secondary tables hold composite keys that give
//! ordered range scans and uniqueness checks.

use std::sync::Arc;

use redb::{Database, TableDefinition};

use crate::config::Config;
use crate::store::Store;

/// Accounts
///
/// Key: user id (UUID)
/// Value: JSON-serialized User
pub const TABLE_USERS: TableDefinition<&str, &str> = TableDefinition::new("users_v1");

/// Unique index over usernames
///
/// Key: username
/// Value: user id
pub const TABLE_USERNAMES: TableDefinition<&str, &str> = TableDefinition::new("usernames_v1");

/// Login sessions
///
/// Key: session token (the cookie value)
/// Value: JSON-serialized SessionRecord
pub const TABLE_SESSIONS: TableDefinition<&str, &str> = TableDefinition::new("sessions_v1");

/// Admin-managed categories
///
/// Key: category id
/// Value: JSON-serialized Category
pub const TABLE_CATEGORIES: TableDefinition<u64, &str> = TableDefinition::new("categories_v1");

/// Unique index over category names
///
/// Key: category name
/// Value: category id
pub const TABLE_CATEGORY_NAMES: TableDefinition<&str, u64> =
    TableDefinition::new("category_names_v1");

/// Telegram links
///
/// Key: hash_id
/// Value: JSON-serialized TelegramLink
pub const TABLE_LINKS: TableDefinition<&str, &str> = TableDefinition::new("links_v1");

/// Index of links by owner
///
/// Key: "{user_id}:{created_at_micros:020}:{hash_id}"
/// Value: hash_id
///
/// The zero-padded timestamp keeps a range scan over one owner in creation order.
pub const TABLE_OWNER_INDEX: TableDefinition<&str, &str> = TableDefinition::new("owner_index_v1");

/// Likes, one row per (link, user) pair
///
/// Key: "{hash_id}:{user_id}"
/// Value: JSON-serialized LinkLike
pub const TABLE_LIKES: TableDefinition<&str, &str> = TableDefinition::new("likes_v1");

/// Comments
///
/// Key: comment id
/// Value: JSON-serialized Comment
pub const TABLE_COMMENTS: TableDefinition<u64, &str> = TableDefinition::new("comments_v1");

/// Index of comments by link
///
/// Key: "{hash_id}:{comment_id:020}"
/// Value: comment id
pub const TABLE_LINK_COMMENTS: TableDefinition<&str, u64> =
    TableDefinition::new("link_comments_v1");

/// Integer id sequences ("category", "comment")
pub const TABLE_SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences_v1");

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        Self {
            store: Store::new(Arc::new(db)),
            config: Arc::new(config),
        }
    }
}

/// Creates or opens the database file and makes sure every table exists
///
/// # Example
///
/// ```no_run
/// # use tglinks::database::init_db;
/// let db = init_db("data.db").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database, redb::Error> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_USERS)?;
        write_txn.open_table(TABLE_USERNAMES)?;
        write_txn.open_table(TABLE_SESSIONS)?;
        write_txn.open_table(TABLE_CATEGORIES)?;
        write_txn.open_table(TABLE_CATEGORY_NAMES)?;
        write_txn.open_table(TABLE_LINKS)?;
        write_txn.open_table(TABLE_OWNER_INDEX)?;
        write_txn.open_table(TABLE_LIKES)?;
        write_txn.open_table(TABLE_COMMENTS)?;
        write_txn.open_table(TABLE_LINK_COMMENTS)?;
        write_txn.open_table(TABLE_SEQUENCES)?;
    }
    write_txn.commit()?;

    Ok(db)
}
