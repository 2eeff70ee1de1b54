use chrono::Utc;
use redb::{ReadableDatabase, ReadableTable, WriteTransaction};

use super::{decode, encode, prefix_range, Store};
use crate::auth::{random_token, HASH_ID_LEN};
use crate::database::{TABLE_LINKS, TABLE_OWNER_INDEX};
use crate::error::Result;
use crate::model::{LinkInput, TelegramLink};
use crate::validation::validate_link;

/// Server-maintained link counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Views,
    Likes,
}

fn owner_key(link: &TelegramLink) -> String {
    format!(
        "{}:{:020}:{}",
        link.user_id,
        link.created_at.timestamp_micros(),
        link.hash_id
    )
}

/// Loads an active link inside a write transaction
pub(super) fn load_active(txn: &WriteTransaction, hash_id: &str) -> Result<Option<TelegramLink>> {
    let table = txn.open_table(TABLE_LINKS)?;
    let link: Option<TelegramLink> = decode(table.get(hash_id)?)?;
    Ok(link.filter(|link| link.is_active))
}

pub(super) fn save(txn: &WriteTransaction, link: &TelegramLink) -> Result<()> {
    let mut table = txn.open_table(TABLE_LINKS)?;
    table.insert(link.hash_id.as_str(), encode(link)?.as_str())?;
    Ok(())
}

/// Adds `delta` to a counter of an active link, clamping at zero
pub(super) fn bump(
    txn: &WriteTransaction,
    hash_id: &str,
    counter: Counter,
    delta: i64,
) -> Result<Option<TelegramLink>> {
    let Some(mut link) = load_active(txn, hash_id)? else {
        return Ok(None);
    };

    let field = match counter {
        Counter::Views => &mut link.views_count,
        Counter::Likes => &mut link.likes_count,
    };
    *field = field.saturating_add_signed(delta);

    save(txn, &link)?;
    Ok(Some(link))
}

impl Store {
    /// Inserts a new link owned by `user_id` under a fresh random hash_id
    pub fn create_link(&self, user_id: &str, input: LinkInput) -> Result<TelegramLink> {
        let now = Utc::now();
        let write_txn = self.db.begin_write()?;

        let link = {
            let mut table = write_txn.open_table(TABLE_LINKS)?;

            let mut hash_id = random_token(HASH_ID_LEN);
            while table.get(hash_id.as_str())?.is_some() {
                hash_id = random_token(HASH_ID_LEN);
            }

            let link = TelegramLink {
                hash_id,
                user_id: user_id.to_string(),
                title: input.title,
                url: input.url,
                description: input.description,
                link_type: input.link_type,
                category: input.category,
                views_count: 0,
                likes_count: 0,
                is_active: true,
                is_verified: false,
                created_at: now,
                updated_at: now,
            };
            validate_link(&link)?;

            table.insert(link.hash_id.as_str(), encode(&link)?.as_str())?;

            let mut index = write_txn.open_table(TABLE_OWNER_INDEX)?;
            index.insert(owner_key(&link).as_str(), link.hash_id.as_str())?;

            link
        };

        write_txn.commit()?;
        Ok(link)
    }

    /// Looks up a link that has not been soft-deleted
    pub fn active_link(&self, hash_id: &str) -> Result<Option<TelegramLink>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_LINKS)?;
        let link: Option<TelegramLink> = decode(table.get(hash_id)?)?;
        Ok(link.filter(|link| link.is_active))
    }

    /// Looks up an active link owned by `user_id`.
    /// A link owned by someone else is reported exactly like a missing one.
    pub fn owned_link(&self, hash_id: &str, user_id: &str) -> Result<Option<TelegramLink>> {
        Ok(self
            .active_link(hash_id)?
            .filter(|link| link.user_id == user_id))
    }

    /// Replaces the editable fields of an owned link
    pub fn update_link(
        &self,
        hash_id: &str,
        user_id: &str,
        input: LinkInput,
    ) -> Result<Option<TelegramLink>> {
        let write_txn = self.db.begin_write()?;

        let Some(mut link) = load_active(&write_txn, hash_id)?.filter(|l| l.user_id == user_id)
        else {
            return Ok(None);
        };

        link.title = input.title;
        link.url = input.url;
        link.description = input.description;
        link.link_type = input.link_type;
        link.category = input.category;
        link.updated_at = Utc::now();
        validate_link(&link)?;

        save(&write_txn, &link)?;
        write_txn.commit()?;
        Ok(Some(link))
    }

    /// Soft-deletes an owned link
    pub fn deactivate_link(&self, hash_id: &str, user_id: &str) -> Result<Option<TelegramLink>> {
        let write_txn = self.db.begin_write()?;

        let Some(mut link) = load_active(&write_txn, hash_id)?.filter(|l| l.user_id == user_id)
        else {
            return Ok(None);
        };

        link.is_active = false;
        link.updated_at = Utc::now();
        save(&write_txn, &link)?;

        write_txn.commit()?;
        Ok(Some(link))
    }

    /// Sets the admin-only verification flag, whatever the link's state
    pub fn set_verified(&self, hash_id: &str, verified: bool) -> Result<Option<TelegramLink>> {
        let write_txn = self.db.begin_write()?;

        let link = {
            let mut table = write_txn.open_table(TABLE_LINKS)?;
            let link: Option<TelegramLink> = decode(table.get(hash_id)?)?;
            match link {
                Some(mut link) => {
                    link.is_verified = verified;
                    link.updated_at = Utc::now();
                    table.insert(hash_id, encode(&link)?.as_str())?;
                    Some(link)
                }
                None => None,
            }
        };

        write_txn.commit()?;
        Ok(link)
    }

    /// Adds `delta` to a counter and returns the new value,
    /// or `None` if the link is missing or inactive
    pub fn bump_counter(&self, hash_id: &str, counter: Counter, delta: i64) -> Result<Option<u64>> {
        let write_txn = self.db.begin_write()?;
        let link = bump(&write_txn, hash_id, counter, delta)?;
        write_txn.commit()?;

        Ok(link.map(|link| match counter {
            Counter::Views => link.views_count,
            Counter::Likes => link.likes_count,
        }))
    }

    /// Counts one view of an active link and returns the updated record
    pub fn record_view(&self, hash_id: &str) -> Result<Option<TelegramLink>> {
        let write_txn = self.db.begin_write()?;
        let link = bump(&write_txn, hash_id, Counter::Views, 1)?;
        write_txn.commit()?;
        Ok(link)
    }

    /// Every link that has not been soft-deleted, in storage order
    pub fn active_links(&self) -> Result<Vec<TelegramLink>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_LINKS)?;

        let mut links = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let link: TelegramLink = serde_json::from_str(value.value())?;
            if link.is_active {
                links.push(link);
            }
        }
        Ok(links)
    }

    /// Active links of one owner, newest first
    pub fn links_by_owner(&self, user_id: &str) -> Result<Vec<TelegramLink>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(TABLE_OWNER_INDEX)?;
        let table = read_txn.open_table(TABLE_LINKS)?;

        let (start, end) = prefix_range(user_id);
        let mut links = Vec::new();
        for entry in index.range(start.as_str()..end.as_str())?.rev() {
            let (_, hash_id) = entry?;
            let link: Option<TelegramLink> = decode(table.get(hash_id.value())?)?;
            if let Some(link) = link.filter(|link| link.is_active) {
                links.push(link);
            }
        }
        Ok(links)
    }
}
