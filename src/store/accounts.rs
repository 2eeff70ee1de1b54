use std::collections::HashMap;

use chrono::{Duration, Utc};
use redb::{ReadableDatabase, ReadableTable};

use super::{decode, encode, Store};
use crate::auth::{random_token, SESSION_TOKEN_LEN};
use crate::database::{TABLE_SESSIONS, TABLE_USERNAMES, TABLE_USERS};
use crate::error::{AppError, FieldErrors, Result};
use crate::model::{CurrentUser, FlashMessage, SessionRecord, User};

impl Store {
    /// Creates an account; a taken username is a validation error on `username`
    pub fn create_user(&self, username: &str, password_hash: String) -> Result<User> {
        let write_txn = self.db.begin_write()?;

        let user = {
            let mut usernames = write_txn.open_table(TABLE_USERNAMES)?;
            if usernames.get(username)?.is_some() {
                return Err(AppError::Validation(FieldErrors::single(
                    "username",
                    "A user with that username already exists.",
                )));
            }

            let user = User {
                id: uuid::Uuid::new_v4().to_string(),
                username: username.to_string(),
                password_hash,
                date_joined: Utc::now(),
            };

            usernames.insert(username, user.id.as_str())?;
            let mut users = write_txn.open_table(TABLE_USERS)?;
            users.insert(user.id.as_str(), encode(&user)?.as_str())?;

            user
        };

        write_txn.commit()?;
        Ok(user)
    }

    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let usernames = read_txn.open_table(TABLE_USERNAMES)?;
        let users = read_txn.open_table(TABLE_USERS)?;

        let user_id = match usernames.get(username)? {
            Some(user_id) => user_id.value().to_string(),
            None => return Ok(None),
        };
        let user: Option<User> = decode(users.get(user_id.as_str())?)?;
        Ok(user)
    }

    /// Usernames for a set of user ids; unknown ids are left out
    pub fn usernames<'a>(
        &self,
        user_ids: impl IntoIterator<Item = &'a str>,
    ) -> Result<HashMap<String, String>> {
        let read_txn = self.db.begin_read()?;
        let users = read_txn.open_table(TABLE_USERS)?;

        let mut names = HashMap::new();
        for user_id in user_ids {
            if names.contains_key(user_id) {
                continue;
            }
            let user: Option<User> = decode(users.get(user_id)?)?;
            if let Some(user) = user {
                names.insert(user.id, user.username);
            }
        }
        Ok(names)
    }

    /// Opens a login session and returns its token
    pub fn create_session(&self, user_id: &str, ttl_hours: i64) -> Result<String> {
        let now = Utc::now();
        let record = SessionRecord {
            user_id: user_id.to_string(),
            created_at: now,
            expires_at: now + Duration::hours(ttl_hours),
            messages: Vec::new(),
        };

        let write_txn = self.db.begin_write()?;
        let token = {
            let mut sessions = write_txn.open_table(TABLE_SESSIONS)?;
            let mut token = random_token(SESSION_TOKEN_LEN);
            while sessions.get(token.as_str())?.is_some() {
                token = random_token(SESSION_TOKEN_LEN);
            }
            sessions.insert(token.as_str(), encode(&record)?.as_str())?;
            token
        };
        write_txn.commit()?;

        Ok(token)
    }

    /// Resolves a session token to its user. Unknown, expired and orphaned
    /// sessions all resolve to `None`; an expired record is deleted.
    pub fn resolve_session(&self, token: &str) -> Result<Option<CurrentUser>> {
        let read_txn = self.db.begin_read()?;
        let sessions = read_txn.open_table(TABLE_SESSIONS)?;
        let users = read_txn.open_table(TABLE_USERS)?;

        let record: Option<SessionRecord> = decode(sessions.get(token)?)?;
        let Some(record) = record else {
            return Ok(None);
        };
        if record.expires_at <= Utc::now() {
            tracing::debug!("Removing expired session of user {}", record.user_id);
            self.delete_session(token)?;
            return Ok(None);
        }

        let user: Option<User> = decode(users.get(record.user_id.as_str())?)?;
        Ok(user.map(|user| CurrentUser {
            id: user.id,
            username: user.username,
            session: token.to_string(),
        }))
    }

    pub fn delete_session(&self, token: &str) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut sessions = write_txn.open_table(TABLE_SESSIONS)?;
            sessions.remove(token)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Queues a flash message on a session; a vanished session drops it
    pub fn push_message(&self, token: &str, message: FlashMessage) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut sessions = write_txn.open_table(TABLE_SESSIONS)?;
            let record: Option<SessionRecord> = decode(sessions.get(token)?)?;
            if let Some(mut record) = record {
                record.messages.push(message);
                sessions.insert(token, encode(&record)?.as_str())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Removes and returns the queued flash messages of a session
    pub fn take_messages(&self, token: &str) -> Result<Vec<FlashMessage>> {
        let write_txn = self.db.begin_write()?;
        let messages = {
            let mut sessions = write_txn.open_table(TABLE_SESSIONS)?;
            let record: Option<SessionRecord> = decode(sessions.get(token)?)?;
            match record {
                Some(mut record) if !record.messages.is_empty() => {
                    let messages = std::mem::take(&mut record.messages);
                    sessions.insert(token, encode(&record)?.as_str())?;
                    messages
                }
                _ => Vec::new(),
            }
        };
        write_txn.commit()?;
        Ok(messages)
    }
}
