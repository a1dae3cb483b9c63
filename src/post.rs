//! Gated post bodies and the post store

use crate::gate::{GateView, TokenGate};
use crate::membership::MembershipStatus;
use crate::template::Html;
use crate::wallet::WalletConnection;
use crate::{GateError, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// A pre-rendered post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// URL slug (file stem)
    pub slug: String,
    /// Display title
    pub title: String,
    /// Rendered HTML body
    pub content: Html,
}

/// Post body wrapped in the token gate
#[derive(Debug, Clone, Copy)]
pub struct PostBody<'a> {
    content: &'a Html,
}

impl<'a> PostBody<'a> {
    pub fn new(content: &'a Html) -> Self {
        Self { content }
    }

    /// Render the gated body with layout styling
    pub fn render(
        &self,
        gate: &TokenGate<'_>,
        connection: &WalletConnection,
        status: &MembershipStatus,
    ) -> Result<GateView> {
        let inner = Html::trusted(format!(
            r#"<div class="markdown">{}</div>"#,
            self.content
        ));
        let view = gate.render(connection, status, &inner)?;

        Ok(GateView {
            state: view.state,
            html: Html::trusted(format!(r#"<div class="max-w-2xl mx-auto">{}</div>"#, view.html)),
        })
    }
}

/// In-memory posts loaded at startup
#[derive(Debug, Clone, Default)]
pub struct PostStore {
    posts: BTreeMap<String, Post>,
}

impl PostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.html` file in `dir`
    ///
    /// The file stem is the slug. A leading `<!-- title: ... -->` comment sets
    /// the title, otherwise the slug is used.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut store = Self::new();

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("html") {
                continue;
            }
            let Some(slug) = path.file_stem().and_then(|stem| stem.to_str()) else {
                tracing::warn!(path = %path.display(), "skipping post with non UTF-8 name");
                continue;
            };

            let raw = std::fs::read_to_string(&path)?;
            let (title, content) = split_title(&raw);
            store.insert(Post {
                slug: slug.to_string(),
                title: title.unwrap_or(slug).to_string(),
                content: Html::trusted(content),
            });
        }

        tracing::info!(dir = %dir.display(), count = store.len(), "loaded posts");
        Ok(store)
    }

    /// Add or replace a post
    pub fn insert(&mut self, post: Post) {
        self.posts.insert(post.slug.clone(), post);
    }

    /// Look up a post by slug
    pub fn get(&self, slug: &str) -> Result<&Post> {
        self.posts
            .get(slug)
            .ok_or_else(|| GateError::post_not_found(slug))
    }

    /// All posts ordered by slug
    pub fn iter(&self) -> impl Iterator<Item = &Post> {
        self.posts.values()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

fn split_title(raw: &str) -> (Option<&str>, &str) {
    let trimmed = raw.trim_start();
    if let Some(rest) = trimmed.strip_prefix("<!-- title:") {
        if let Some((title, body)) = rest.split_once("-->") {
            return (Some(title.trim()), body.trim_start());
        }
    }
    (None, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LockConfig;
    use crate::gate::GateState;
    use ethereum_types::Address;

    #[test]
    fn test_post_body_wraps_content_for_members() {
        let lock = LockConfig::parse("0xCE62D71c768aeC13C0F5C8BD4B3e8B0B9A5c1f2A", 5).unwrap();
        let gate = TokenGate::new(&lock);
        let content = Html::trusted("<p>secret</p>");

        let view = PostBody::new(&content)
            .render(
                &gate,
                &WalletConnection::connected(Address::repeat_byte(1)),
                &MembershipStatus::member(true),
            )
            .unwrap();

        assert_eq!(view.state, GateState::Member);
        assert_eq!(
            view.html.as_str(),
            r#"<div class="max-w-2xl mx-auto"><div class="markdown"><p>secret</p></div></div>"#
        );
    }

    #[test]
    fn test_split_title() {
        assert_eq!(
            split_title("<!-- title: Hello World -->\n<p>x</p>"),
            (Some("Hello World"), "<p>x</p>")
        );
        assert_eq!(split_title("<p>x</p>"), (None, "<p>x</p>"));
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("hello.html"),
            "<!-- title: Hello -->\n<p>members only</p>",
        )
        .unwrap();
        std::fs::write(dir.path().join("plain.html"), "<p>plain</p>").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let store = PostStore::load_dir(dir.path()).unwrap();
        assert_eq!(store.len(), 2);

        let hello = store.get("hello").unwrap();
        assert_eq!(hello.title, "Hello");
        assert_eq!(hello.content.as_str(), "<p>members only</p>");
        assert_eq!(store.get("plain").unwrap().title, "plain");
        assert!(matches!(
            store.get("notes"),
            Err(GateError::PostNotFound { .. })
        ));
    }

    #[test]
    fn test_load_missing_dir() {
        assert!(matches!(
            PostStore::load_dir("/definitely/not/here"),
            Err(GateError::Io(_))
        ));
    }
}
