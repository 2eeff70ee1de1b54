//! Field and form validation
//!
//! Form structs deserialize leniently (every field defaults to empty) so that a
//! missing field is reported as "This field is required." instead of a
//! framework rejection. Entity-level checks in [`validate_link`] run again in
//! the store on every write.

use serde::{Deserialize, Serialize};

use crate::error::{FieldErrors, Result, NON_FIELD_ERRORS};
use crate::model::{category_label, LinkInput, LinkType, TelegramLink};

pub const TITLE_MAX_CHARS: usize = 200;
pub const URL_MAX_CHARS: usize = 500;
pub const COMMENT_MAX_CHARS: usize = 500;
pub const USERNAME_MAX_CHARS: usize = 150;
pub const CATEGORY_NAME_MAX_CHARS: usize = 100;
pub const PASSWORD_MIN_CHARS: usize = 8;

const REQUIRED: &str = "This field is required.";
const TELEGRAM_PREFIXES: [&str; 2] = ["https://t.me/", "http://t.me/"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Please enter a valid Telegram link (t.me)")]
pub struct InvalidLinkUrl;

/// Accepts only `https://t.me/...` and `http://t.me/...` links
pub fn validate_telegram_url(value: &str) -> std::result::Result<(), InvalidLinkUrl> {
    let rest = TELEGRAM_PREFIXES
        .iter()
        .find_map(|prefix| value.strip_prefix(prefix))
        .ok_or(InvalidLinkUrl)?;

    if rest.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(InvalidLinkUrl);
    }
    Ok(())
}

fn max_length(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    let len = value.chars().count();
    if len > max {
        errors.add(
            field,
            format!("Ensure this value has at most {max} characters (it has {len})."),
        );
    }
}

/// Entity invariants checked on every link insert and update
pub fn validate_link(link: &TelegramLink) -> Result<()> {
    let mut errors = FieldErrors::new();

    if link.title.trim().is_empty() {
        errors.add("title", REQUIRED);
    }
    max_length(&mut errors, "title", &link.title, TITLE_MAX_CHARS);

    if link.url.is_empty() {
        errors.add("url", REQUIRED);
    } else {
        max_length(&mut errors, "url", &link.url, URL_MAX_CHARS);
        if let Err(e) = validate_telegram_url(&link.url) {
            errors.add("url", e.to_string());
        }
    }

    if category_label(&link.category).is_none() {
        errors.add(
            "category",
            format!(
                "Select a valid choice. {} is not one of the available choices.",
                link.category
            ),
        );
    }

    errors.into_result()
}

/// Upload / edit form
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct LinkForm {
    pub title: String,
    pub url: String,
    pub description: String,
    pub link_type: String,
    pub category: String,
}

impl LinkForm {
    /// Pre-fills the form from a stored link (edit page)
    pub fn from_link(link: &TelegramLink) -> Self {
        Self {
            title: link.title.clone(),
            url: link.url.clone(),
            description: link.description.clone(),
            link_type: link.link_type.as_str().to_string(),
            category: link.category.clone(),
        }
    }

    pub fn validate(self) -> Result<LinkInput> {
        let mut errors = FieldErrors::new();

        let title = self.title.trim().to_string();
        if title.is_empty() {
            errors.add("title", REQUIRED);
        } else {
            max_length(&mut errors, "title", &title, TITLE_MAX_CHARS);
        }

        let url = self.url.trim().to_string();
        if url.is_empty() {
            errors.add("url", REQUIRED);
        } else {
            max_length(&mut errors, "url", &url, URL_MAX_CHARS);
            if let Err(e) = validate_telegram_url(&url) {
                errors.add("url", e.to_string());
            }
        }

        let link_type = match self.link_type.trim() {
            "" => {
                errors.add("link_type", REQUIRED);
                None
            }
            choice => {
                let parsed = LinkType::from_choice(choice);
                if parsed.is_none() {
                    errors.add(
                        "link_type",
                        format!("Select a valid choice. {choice} is not one of the available choices."),
                    );
                }
                parsed
            }
        };

        let category = self.category.trim().to_string();
        if category.is_empty() {
            errors.add("category", REQUIRED);
        } else if category_label(&category).is_none() {
            errors.add(
                "category",
                format!("Select a valid choice. {category} is not one of the available choices."),
            );
        }

        errors.into_result()?;

        Ok(LinkInput {
            title,
            url,
            description: self.description.trim().to_string(),
            link_type: link_type.unwrap_or_default(),
            category,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct CommentForm {
    pub text: String,
}

impl CommentForm {
    pub fn validate(self) -> Result<String> {
        validate_comment_text(&self.text)
    }
}

/// Returns the trimmed comment text if it is non-empty and short enough
pub fn validate_comment_text(text: &str) -> Result<String> {
    let text = text.trim().to_string();
    let mut errors = FieldErrors::new();

    if text.is_empty() {
        errors.add("text", REQUIRED);
    }
    max_length(&mut errors, "text", &text, COMMENT_MAX_CHARS);

    errors.into_result()?;
    Ok(text)
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub password1: String,
    pub password2: String,
}

impl RegisterForm {
    /// Checks field rules; username uniqueness is enforced by the store.
    /// Returns `(username, password)`.
    pub fn validate(self) -> Result<(String, String)> {
        let mut errors = FieldErrors::new();
        let username = self.username.trim().to_string();

        if username.is_empty() {
            errors.add("username", REQUIRED);
        } else {
            max_length(&mut errors, "username", &username, USERNAME_MAX_CHARS);
            if !username
                .chars()
                .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
            {
                errors.add(
                    "username",
                    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
                );
            }
        }

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        }

        if !self.password1.is_empty() && !self.password2.is_empty() {
            if self.password1 != self.password2 {
                errors.add("password2", "The two password fields didn't match.");
            } else {
                let password = &self.password1;
                if password.chars().count() < PASSWORD_MIN_CHARS {
                    errors.add(
                        "password2",
                        format!("This password is too short. It must contain at least {PASSWORD_MIN_CHARS} characters."),
                    );
                }
                if password.chars().all(|c| c.is_ascii_digit()) {
                    errors.add("password2", "This password is entirely numeric.");
                }
                if !username.is_empty() && password.eq_ignore_ascii_case(&username) {
                    errors.add("password2", "The password is too similar to the username.");
                }
            }
        }

        errors.into_result()?;
        Ok((username, self.password1))
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

impl LoginForm {
    pub fn check_present(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        if self.username.trim().is_empty() {
            errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        errors.into_result()
    }
}

pub fn invalid_login() -> FieldErrors {
    FieldErrors::single(
        NON_FIELD_ERRORS,
        "Please enter a correct username and password. Note that both fields may be case-sensitive.",
    )
}

/// Only local absolute paths are followed after login. Backslashes and control
/// characters are refused anywhere in the path (`/\host` reads as `//host`).
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.chars().any(|c| c == '\\' || c.is_control()) =>
        {
            path
        }
        _ => "/",
    }
}

/// Trims and checks a category name before it is stored
pub fn validate_category_name(name: &str) -> Result<String> {
    let name = name.trim().to_string();
    let mut errors = FieldErrors::new();
    if name.is_empty() {
        errors.add("name", REQUIRED);
    }
    max_length(&mut errors, "name", &name, CATEGORY_NAME_MAX_CHARS);
    errors.into_result()?;
    Ok(name)
}
