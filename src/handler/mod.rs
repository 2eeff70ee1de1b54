//! HTTP request handlers
//!
//! Pages are JSON documents. Form submissions answer with `303 See Other`
//! redirects, the way a browser-facing form flow expects.
//!
//! - [`links`] - feed, detail, upload, edit, soft delete, owner and category feeds
//! - [`engagement`] - likes and comments
//! - [`accounts`] - register, login, logout
//! - [`admin`] - category management and verification (admin secret required)

pub mod accounts;
pub mod admin;
pub mod engagement;
pub mod links;

use std::collections::HashMap;

use axum::response::{IntoResponse, Redirect, Response};

use crate::database::AppState;
use crate::error::Result;
use crate::listing::Page;
use crate::model::{CurrentUser, FlashMessage, LinkSummary, TelegramLink};

fn see_other(path: &str) -> Response {
    Redirect::to(path).into_response()
}

fn link_path(hash_id: &str) -> String {
    format!("/link/{hash_id}")
}

/// Drains the flash messages queued on the caller's session
fn take_messages(state: &AppState, user: Option<&CurrentUser>) -> Result<Vec<FlashMessage>> {
    match user {
        Some(user) => state.store.take_messages(&user.session),
        None => Ok(Vec::new()),
    }
}

fn flash(state: &AppState, user: &CurrentUser, message: FlashMessage) -> Result<()> {
    state.store.push_message(&user.session, message)
}

fn summarize(links: Vec<TelegramLink>, owners: &HashMap<String, String>) -> Vec<LinkSummary> {
    links
        .into_iter()
        .map(|link| {
            let owner = owners.get(&link.user_id).cloned().unwrap_or_default();
            LinkSummary::new(link, owner)
        })
        .collect()
}

/// Resolves owner usernames for one page of links
fn summarize_page(state: &AppState, page: Page<TelegramLink>) -> Result<Page<LinkSummary>> {
    let owners = state
        .store
        .usernames(page.items.iter().map(|link| link.user_id.as_str()))?;

    Ok(page.map(|link| {
        let owner = owners.get(&link.user_id).cloned().unwrap_or_default();
        LinkSummary::new(link, owner)
    }))
}
