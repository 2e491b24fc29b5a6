// ABOUTME: Converts Leanote notes to Hexo-flavoured Markdown
// ABOUTME: Decides which notes are exported and builds the YAML frontmatter

use crate::model::{Frontmatter, Note, NoteFlags};
use crate::Result;
use chrono::{DateTime, FixedOffset};

pub const HEXO_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct MarkdownOutput {
    pub frontmatter: Frontmatter,
    pub frontmatter_yaml: String,
    pub body: String,
}

impl MarkdownOutput {
    pub fn render(&self) -> String {
        format!("---\n{}---\n{}", self.frontmatter_yaml, self.body)
    }
}

/// Only live Markdown notes are exported; with `only_blog` they must also be
/// published to the blog.
pub fn should_export(flags: &NoteFlags, only_blog: bool) -> bool {
    if flags.is_trash || !flags.is_markdown {
        return false;
    }
    !only_blog || flags.is_blog
}

pub fn hexo_date(ts: Option<&DateTime<FixedOffset>>) -> Option<String> {
    ts.map(|t| t.format(HEXO_DATE_FORMAT).to_string())
}

pub fn frontmatter_for(note: &Note) -> Frontmatter {
    Frontmatter {
        title: note.title.clone(),
        date: hexo_date(note.created_time.as_ref()),
        updated: hexo_date(note.updated_time.as_ref()),
        tags: note
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
        note_id: Some(note.note_id.clone()),
    }
}

/// `content` replaces the note body, e.g. after image links were localized.
pub fn to_markdown(note: &Note, content: &str) -> Result<MarkdownOutput> {
    let frontmatter = frontmatter_for(note);
    let frontmatter_yaml = serde_yaml::to_string(&frontmatter)?;

    Ok(MarkdownOutput {
        frontmatter,
        frontmatter_yaml,
        body: content.to_string(),
    })
}
