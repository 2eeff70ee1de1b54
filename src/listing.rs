//! Filtering, sorting and pagination of link collections

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::model::TelegramLink;

/// Page size of the home feed and the category feed
pub const FEED_PAGE_SIZE: usize = 12;

/// Page size of the "my links" list
pub const MY_LINKS_PAGE_SIZE: usize = 10;

/// Query parameters of the home feed
///
/// # Example
/// Query string: `?search=python&category=programming&type=group&sort=popular&page=2`
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ListParams {
    pub search: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub link_type: Option<String>,
    pub sort: Option<String>,
    /// Kept as text: a non-numeric page falls back to the first page
    pub page: Option<String>,
}

/// Only `page` is read by the owner and category feeds
#[derive(Deserialize, Debug, Clone, Default)]
pub struct PageParams {
    pub page: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Newest first
    #[default]
    Recent,
    /// Most viewed first, then newest
    Popular,
    /// Most liked first, then newest
    Liked,
}

impl SortOrder {
    /// Unknown values fall back to `Recent`
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("popular") => SortOrder::Popular,
            Some("liked") => SortOrder::Liked,
            _ => SortOrder::Recent,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Home feed filters in the order they are applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub link_type: Option<String>,
    pub sort: SortOrder,
}

impl LinkQuery {
    pub fn from_params(params: &ListParams) -> Self {
        Self {
            search: non_empty(&params.search),
            category: non_empty(&params.category),
            link_type: non_empty(&params.link_type),
            sort: SortOrder::parse(params.sort.as_deref()),
        }
    }

    /// Inactive links never match
    pub fn matches(&self, link: &TelegramLink) -> bool {
        if !link.is_active {
            return false;
        }

        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !link.title.to_lowercase().contains(&needle)
                && !link.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        if let Some(category) = &self.category {
            if link.category != *category {
                return false;
            }
        }

        if let Some(link_type) = &self.link_type {
            if link.link_type.as_str() != link_type {
                return false;
            }
        }

        true
    }

    /// Filters then sorts
    pub fn apply(&self, links: Vec<TelegramLink>) -> Vec<TelegramLink> {
        let mut matched: Vec<TelegramLink> =
            links.into_iter().filter(|link| self.matches(link)).collect();
        sort_links(&mut matched, self.sort);
        matched
    }
}

pub fn sort_links(links: &mut [TelegramLink], order: SortOrder) {
    match order {
        SortOrder::Recent => links.sort_by_key(|link| Reverse(link.created_at)),
        SortOrder::Popular => {
            links.sort_by_key(|link| (Reverse(link.views_count), Reverse(link.created_at)))
        }
        SortOrder::Liked => {
            links.sort_by_key(|link| (Reverse(link.likes_count), Reverse(link.created_at)))
        }
    }
}

/// One page of results plus navigation metadata
#[derive(Serialize, Debug, Clone)]
pub struct Page<T> {
    pub number: usize,
    pub num_pages: usize,
    pub count: usize,
    pub per_page: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            per_page: self.per_page,
            has_next: self.has_next,
            has_previous: self.has_previous,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

/// Cuts one page out of `items`.
///
/// The requested page is clamped into `1..=num_pages`; anything that is not a
/// number yields the first page. An empty collection has a single empty page.
pub fn paginate<T>(items: Vec<T>, per_page: usize, requested: Option<&str>) -> Page<T> {
    let per_page = per_page.max(1);
    let count = items.len();
    let num_pages = count.div_ceil(per_page).max(1);

    let number = requested
        .and_then(|page| page.trim().parse::<i64>().ok())
        .map(|page| page.clamp(1, num_pages as i64) as usize)
        .unwrap_or(1);

    let items = items
        .into_iter()
        .skip((number - 1) * per_page)
        .take(per_page)
        .collect();

    Page {
        number,
        num_pages,
        count,
        per_page,
        has_next: number < num_pages,
        has_previous: number > 1,
        items,
    }
}
