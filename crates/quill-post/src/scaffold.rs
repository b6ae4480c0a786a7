//! New post scaffolding from templates.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use quill_config::PostsConfig;

use crate::slug::slugify;

/// Template used when `<templates_dir>/<name>.md` does not exist.
pub const DEFAULT_TEMPLATE: &str = r#"---
layout: post
title: "{{TITLE}}"
date: {{DATE}}
categories: {{CATEGORIES}}
tags: {{TAGS}}
author: {{AUTHOR}}
description: "{{DESCRIPTION}}"
---

# {{TITLE}}

## Introduction

Write your introduction here.

## Main Content

### Section 1

Add your content here.

### Section 2

Add more content here.

## Conclusion

Summarize your post here.
"#;

/// Error type for post scaffolding.
#[derive(Debug, thiserror::Error)]
pub enum ScaffoldError {
    #[error("Title is required")]
    MissingTitle,

    #[error("Post already exists at {}", .0.display())]
    Exists(PathBuf),

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Front matter values for a new post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostOptions {
    pub title: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub author: String,
    /// Template name, without the `.md` extension.
    pub template: String,
}

impl PostOptions {
    #[must_use]
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            categories: Vec::new(),
            tags: Vec::new(),
            author: author.into(),
            template: "default".to_owned(),
        }
    }

    #[must_use]
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Split a comma-separated flag value, trimming items and dropping empty ones.
    #[must_use]
    pub fn parse_list(value: &str) -> Vec<String> {
        value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }

    fn description(&self) -> String {
        format!(
            "A comprehensive guide to {}. Learn about best practices, implementation details, and real-world examples.",
            self.title.to_lowercase()
        )
    }
}

/// Writes dated post files from templates.
#[derive(Debug, Clone)]
pub struct Scaffolder {
    posts_dir: PathBuf,
    templates_dir: PathBuf,
}

impl Scaffolder {
    #[must_use]
    pub fn new(posts_dir: impl Into<PathBuf>, templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            posts_dir: posts_dir.into(),
            templates_dir: templates_dir.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &PostsConfig) -> Self {
        Self::new(&config.dir, &config.templates_dir)
    }

    /// `YYYY-MM-DD-<slug>.md`.
    #[must_use]
    pub fn file_name(title: &str, date: NaiveDate) -> String {
        format!("{}-{}.md", date.format("%Y-%m-%d"), slugify(title))
    }

    /// Path the post for `title` would be written to.
    #[must_use]
    pub fn post_path(&self, title: &str, date: NaiveDate) -> PathBuf {
        self.posts_dir.join(Self::file_name(title, date))
    }

    /// Post content with every template placeholder filled in.
    pub fn render(&self, options: &PostOptions, date: NaiveDate) -> Result<String, ScaffoldError> {
        if options.title.trim().is_empty() {
            return Err(ScaffoldError::MissingTitle);
        }

        let template = self.load_template(&options.template)?;
        let content = template
            .replace("{{TITLE}}", &options.title)
            .replace("{{DATE}}", &date.format("%Y-%m-%d 00:00:00 +0000").to_string())
            .replace("{{AUTHOR}}", &options.author)
            .replace("{{CATEGORIES}}", &yaml_array(&options.categories))
            .replace("{{TAGS}}", &yaml_array(&options.tags))
            .replace("{{SLUG}}", &slugify(&options.title))
            .replace("{{DESCRIPTION}}", &options.description());
        Ok(content)
    }

    /// Write a new post, refusing to overwrite an existing one.
    pub fn create(&self, options: &PostOptions, date: NaiveDate) -> Result<PathBuf, ScaffoldError> {
        let content = self.render(options, date)?;
        let path = self.post_path(&options.title, date);

        fs::create_dir_all(&self.posts_dir).map_err(|source| ScaffoldError::Io {
            path: self.posts_dir.clone(),
            source,
        })?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(ScaffoldError::Exists(path));
            }
            Err(source) => return Err(ScaffoldError::Io { path, source }),
        };
        file.write_all(content.as_bytes())
            .map_err(|source| ScaffoldError::Io {
                path: path.clone(),
                source,
            })?;

        tracing::info!(path = %path.display(), template = %options.template, "Created post");
        Ok(path)
    }

    fn load_template(&self, name: &str) -> Result<String, ScaffoldError> {
        let path = self.templates_dir.join(format!("{name}.md"));
        match fs::read_to_string(&path) {
            Ok(template) => Ok(template),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Template not found, using built-in default");
                Ok(DEFAULT_TEMPLATE.to_owned())
            }
            Err(source) => Err(ScaffoldError::Io { path, source }),
        }
    }

    #[must_use]
    pub fn posts_dir(&self) -> &Path {
        &self.posts_dir
    }
}

/// `["a", "b"]`, or `[]` when empty.
fn yaml_array(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| format!("\"{item}\"")).collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()
    }

    fn options() -> PostOptions {
        PostOptions::new("Hello, Rust World!", "Jane Doe")
            .with_categories(PostOptions::parse_list("rust, tooling"))
            .with_tags(PostOptions::parse_list(" cli ,, ssg "))
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            Scaffolder::file_name("Hello, Rust World!", date()),
            "2025-03-07-hello-rust-world.md"
        );
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(PostOptions::parse_list(" a, b ,c,"), ["a", "b", "c"]);
        assert!(PostOptions::parse_list("").is_empty());
    }

    #[test]
    fn test_yaml_array() {
        assert_eq!(yaml_array(&[]), "[]");
        assert_eq!(yaml_array(&["a".to_owned(), "b".to_owned()]), r#"["a", "b"]"#);
    }

    #[test]
    fn test_render_default_template() {
        let temp = TempDir::new().unwrap();
        let scaffolder = Scaffolder::new(temp.path().join("_posts"), temp.path().join("_templates"));

        let content = scaffolder.render(&options(), date()).unwrap();

        assert!(content.starts_with("---\nlayout: post\ntitle: \"Hello, Rust World!\"\n"));
        assert!(content.contains("date: 2025-03-07 00:00:00 +0000\n"));
        assert!(content.contains("categories: [\"rust\", \"tooling\"]\n"));
        assert!(content.contains("tags: [\"cli\", \"ssg\"]\n"));
        assert!(content.contains("author: Jane Doe\n"));
        assert!(content.contains(
            "description: \"A comprehensive guide to hello, rust world!. Learn about best practices"
        ));
        assert!(content.contains("# Hello, Rust World!\n"));
    }

    #[test]
    fn test_render_custom_template() {
        let temp = TempDir::new().unwrap();
        let templates = temp.path().join("_templates");
        fs::create_dir_all(&templates).unwrap();
        fs::write(templates.join("tutorial.md"), "{{SLUG}}|{{TAGS}}|{{CATEGORIES}}").unwrap();
        let scaffolder = Scaffolder::new(temp.path().join("_posts"), &templates);

        let content = scaffolder
            .render(&options().with_template("tutorial").with_categories(Vec::new()), date())
            .unwrap();

        assert_eq!(content, r#"hello-rust-world|["cli", "ssg"]|[]"#);
    }

    #[test]
    fn test_missing_title() {
        let scaffolder = Scaffolder::new("_posts", "_templates");
        let err = scaffolder
            .render(&PostOptions::new("  ", "Anonymous"), date())
            .unwrap_err();

        assert!(matches!(err, ScaffoldError::MissingTitle));
    }

    #[test]
    fn test_create_refuses_overwrite() {
        let temp = TempDir::new().unwrap();
        let scaffolder = Scaffolder::new(temp.path().join("_posts"), temp.path().join("_templates"));

        let path = scaffolder.create(&options(), date()).unwrap();
        assert_eq!(path, temp.path().join("_posts/2025-03-07-hello-rust-world.md"));
        assert!(fs::read_to_string(&path).unwrap().contains("author: Jane Doe"));

        fs::write(&path, "edited").unwrap();
        let err = scaffolder.create(&options(), date()).unwrap_err();

        assert!(matches!(err, ScaffoldError::Exists(ref p) if *p == path));
        assert_eq!(fs::read_to_string(&path).unwrap(), "edited");
    }
}
