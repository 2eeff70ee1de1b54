//! Link pages: home feed, detail, upload, edit, soft delete,
//! "my links" and category feeds

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Extension, Form, Json,
};
use serde::Serialize;

use super::{flash, link_path, see_other, summarize, summarize_page, take_messages};
use crate::database::AppState;
use crate::error::{AppError, Result};
use crate::listing::{
    paginate, sort_links, LinkQuery, ListParams, Page, PageParams, SortOrder, FEED_PAGE_SIZE,
    MY_LINKS_PAGE_SIZE,
};
use crate::model::{
    choices, Author, Category, Choice, CommentView, CurrentUser, FlashMessage, LinkSummary,
    CATEGORY_CHOICES, LINK_TYPES,
};
use crate::validation::LinkForm;

/// Number of same-category links shown on a detail page
const RELATED_LINKS: usize = 4;

#[derive(Serialize)]
pub struct HomePage {
    pub page: Page<LinkSummary>,
    pub search_query: String,
    pub selected_category: Option<String>,
    pub selected_type: Option<String>,
    pub sort_by: SortOrder,
    pub categories: Vec<Choice>,
    pub link_types: Vec<Choice>,
    pub messages: Vec<FlashMessage>,
}

#[derive(Serialize)]
pub struct LinkDetailPage {
    pub link: LinkSummary,
    pub is_owner: bool,
    pub user_has_liked: bool,
    pub comments: Vec<CommentView>,
    pub related_links: Vec<LinkSummary>,
    pub messages: Vec<FlashMessage>,
}

#[derive(Serialize)]
pub struct LinkFormPage {
    /// Set when editing an existing link
    pub hash_id: Option<String>,
    pub form: LinkForm,
    pub categories: Vec<Choice>,
    pub link_types: Vec<Choice>,
}

impl LinkFormPage {
    fn new(hash_id: Option<String>, form: LinkForm) -> Self {
        Self {
            hash_id,
            form,
            categories: choices(CATEGORY_CHOICES),
            link_types: choices(LINK_TYPES),
        }
    }
}

#[derive(Serialize)]
pub struct DeleteLinkPage {
    pub link: LinkSummary,
}

#[derive(Serialize)]
pub struct MyLinksPage {
    pub page: Page<LinkSummary>,
    pub messages: Vec<FlashMessage>,
}

#[derive(Serialize)]
pub struct CategoryPage {
    pub category: Category,
    pub page: Page<LinkSummary>,
}

/// Home feed
///
/// # Query Parameters
///
/// - `search` - case-insensitive match on title or description
/// - `category` - exact category code
/// - `type` - `channel` or `group`
/// - `sort` - `recent` (default), `popular` or `liked`
/// - `page` - page number, clamped into range
pub async fn home(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Query(params): Query<ListParams>,
) -> Result<Json<HomePage>> {
    let query = LinkQuery::from_params(&params);
    let links = query.apply(state.store.active_links()?);
    let page = paginate(links, FEED_PAGE_SIZE, params.page.as_deref());

    Ok(Json(HomePage {
        page: summarize_page(&state, page)?,
        search_query: query.search.clone().unwrap_or_default(),
        selected_category: query.category,
        selected_type: query.link_type,
        sort_by: query.sort,
        categories: choices(CATEGORY_CHOICES),
        link_types: choices(LINK_TYPES),
        messages: take_messages(&state, user.as_deref())?,
    }))
}

/// Link detail; every fetch counts one view
pub async fn link_detail(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Path(hash_id): Path<String>,
) -> Result<Json<LinkDetailPage>> {
    let link = state.store.record_view(&hash_id)?.ok_or(AppError::NotFound)?;
    let user = user.as_deref();

    let user_has_liked = match user {
        Some(user) => state.store.has_liked(&hash_id, &user.id)?,
        None => false,
    };

    let comments = state.store.active_comments(&hash_id)?;

    let mut related: Vec<_> = state
        .store
        .active_links()?
        .into_iter()
        .filter(|other| other.category == link.category && other.hash_id != link.hash_id)
        .collect();
    sort_links(&mut related, SortOrder::Recent);
    related.truncate(RELATED_LINKS);

    let names = state.store.usernames(
        std::iter::once(link.user_id.as_str())
            .chain(comments.iter().map(|comment| comment.user_id.as_str()))
            .chain(related.iter().map(|other| other.user_id.as_str())),
    )?;

    let comments = comments
        .into_iter()
        .map(|comment| CommentView {
            id: comment.id,
            author: Author {
                username: names.get(&comment.user_id).cloned().unwrap_or_default(),
                id: comment.user_id,
            },
            text: comment.text,
            created_at: comment.created_at,
        })
        .collect();

    let is_owner = user.is_some_and(|user| user.id == link.user_id);
    let owner = names.get(&link.user_id).cloned().unwrap_or_default();

    Ok(Json(LinkDetailPage {
        link: LinkSummary::new(link, owner),
        is_owner,
        user_has_liked,
        comments,
        related_links: summarize(related, &names),
        messages: take_messages(&state, user)?,
    }))
}

/// Empty upload form
pub async fn upload_form() -> Json<LinkFormPage> {
    Json(LinkFormPage::new(None, LinkForm::default()))
}

/// Creates a link owned by the caller and redirects to its detail page
pub async fn upload_link(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<LinkForm>,
) -> Result<Response> {
    let input = form.validate()?;
    let link = state.store.create_link(&user.id, input)?;

    tracing::info!("Link {} created by {}", link.hash_id, user.username);
    flash(
        &state,
        &user,
        FlashMessage::success("Your Telegram link has been uploaded successfully!"),
    )?;

    Ok(see_other(&link_path(&link.hash_id)))
}

/// Edit form pre-filled with the link's current values (owner only)
pub async fn edit_form(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(hash_id): Path<String>,
) -> Result<Json<LinkFormPage>> {
    let link = state
        .store
        .owned_link(&hash_id, &user.id)?
        .ok_or(AppError::NotFound)?;

    Ok(Json(LinkFormPage::new(
        Some(link.hash_id.clone()),
        LinkForm::from_link(&link),
    )))
}

/// Applies an edit (owner only)
pub async fn edit_link(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(hash_id): Path<String>,
    Form(form): Form<LinkForm>,
) -> Result<Response> {
    if state.store.owned_link(&hash_id, &user.id)?.is_none() {
        return Err(AppError::NotFound);
    }

    let input = form.validate()?;
    let link = state
        .store
        .update_link(&hash_id, &user.id, input)?
        .ok_or(AppError::NotFound)?;

    tracing::info!("Link {} updated by {}", link.hash_id, user.username);
    flash(&state, &user, FlashMessage::success("Link updated successfully!"))?;

    Ok(see_other(&link_path(&link.hash_id)))
}

/// Confirmation page for a soft delete (owner only)
pub async fn delete_confirm(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(hash_id): Path<String>,
) -> Result<Json<DeleteLinkPage>> {
    let link = state
        .store
        .owned_link(&hash_id, &user.id)?
        .ok_or(AppError::NotFound)?;

    Ok(Json(DeleteLinkPage {
        link: LinkSummary::new(link, user.username),
    }))
}

/// Soft-deletes a link (owner only) and redirects to "my links"
pub async fn delete_link(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(hash_id): Path<String>,
) -> Result<Response> {
    let link = state
        .store
        .deactivate_link(&hash_id, &user.id)?
        .ok_or(AppError::NotFound)?;

    tracing::info!("Link {} soft-deleted by {}", link.hash_id, user.username);
    flash(&state, &user, FlashMessage::success("Link deleted successfully!"))?;

    Ok(see_other("/my-links"))
}

/// The caller's own active links, newest first
pub async fn my_links(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<PageParams>,
) -> Result<Json<MyLinksPage>> {
    let links = state.store.links_by_owner(&user.id)?;
    let page = paginate(links, MY_LINKS_PAGE_SIZE, params.page.as_deref());

    Ok(Json(MyLinksPage {
        page: summarize_page(&state, page)?,
        messages: take_messages(&state, Some(&user))?,
    }))
}

/// Active links filed under a category, newest first
pub async fn category_links(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<CategoryPage>> {
    let category_id: u64 = category_id.parse().map_err(|_| AppError::NotFound)?;
    let category = state
        .store
        .category(category_id)?
        .ok_or(AppError::NotFound)?;

    let mut links: Vec<_> = state
        .store
        .active_links()?
        .into_iter()
        .filter(|link| link.category == category.name)
        .collect();
    sort_links(&mut links, SortOrder::Recent);

    let page = paginate(links, FEED_PAGE_SIZE, params.page.as_deref());

    Ok(Json(CategoryPage {
        page: summarize_page(&state, page)?,
        category,
    }))
}
