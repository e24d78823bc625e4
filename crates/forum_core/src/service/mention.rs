//! `@name` mention scanning.
//!
//! # Invariants
//! - Only the first five `@token` matches in text order are considered.
//!   Duplicates count toward that bound, so repeated names can crowd out
//!   later ones.
//! - Tokens are ASCII letters/digits only.
//! - The acting user is never returned as a recipient.

use crate::model::user::User;
use crate::repo::store::RepoResult;
use crate::repo::user_repo::UserRepository;
use once_cell::sync::Lazy;
use regex::Regex;

/// Upper bound on `@token` matches read from one text.
pub const MAX_MENTION_MATCHES: usize = 5;

static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@([a-zA-Z0-9]+)").expect("valid mention regex"));

/// Extracts distinct mention tokens from the first five matches.
///
/// Order follows first appearance in `content`.
pub fn extract_mention_tokens(content: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for caps in MENTION_RE.captures_iter(content).take(MAX_MENTION_MATCHES) {
        let token = &caps[1];
        if !tokens.iter().any(|existing| existing == token) {
            tokens.push(token.to_string());
        }
    }
    tokens
}

/// Resolves mention tokens to known users.
pub struct MentionScanner<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> MentionScanner<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns users mentioned in `content`, excluding `actor_name`.
    ///
    /// Unknown names are dropped silently. All tokens are looked up in one
    /// batch query; the result keeps the tokens' text order.
    pub fn resolve_recipients(&self, content: &str, actor_name: &str) -> RepoResult<Vec<User>> {
        let tokens = extract_mention_tokens(content);
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let mut users = self.repo.find_users_by_names(&tokens)?;
        users.retain(|user| user.name != actor_name);
        users.sort_by_key(|user| {
            tokens
                .iter()
                .position(|token| *token == user.name)
                .unwrap_or(usize::MAX)
        });
        Ok(users)
    }
}
