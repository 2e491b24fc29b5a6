// ABOUTME: Output layout for exported posts with atomic writes
// ABOUTME: Handles filename sanitizing, notebook directories and frontmatter parsing

use crate::notebooks::PathTable;
use crate::{Error, Frontmatter, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Makes a title safe to use as a file or directory name on every platform.
///
/// Characters Windows rejects are swapped for full-width look-alikes so that
/// titles stay readable; path separators become `-`.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            ':' => '：',
            '?' => '？',
            '"' => '“',
            '<' => '《',
            '>' => '》',
            '*' => '※',
            '|' => '｜',
            '/' | '\\' => '-',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();

    match cleaned.trim() {
        "" | "." | ".." => "_".to_string(),
        s => s.to_string(),
    }
}

/// `<output_root>/<notebook path>/<title>.md`; notes of unknown notebooks go
/// straight into `output_root`.
pub fn note_path(output_root: &Path, table: &PathTable, notebook_id: &str, title: &str) -> PathBuf {
    let mut path = output_root.to_path_buf();
    if let Some(segments) = table.get(notebook_id) {
        for segment in segments {
            path.push(sanitize_filename(segment));
        }
    }
    path.push(format!("{}.md", sanitize_filename(title)));
    path
}

/// Alternative path for a note whose title collides with another note's:
/// `Title.md` becomes `Title-<note id>.md`.
pub fn disambiguate(md_path: &Path, note_id: &str) -> PathBuf {
    let stem = md_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    md_path.with_file_name(format!("{}-{}.md", stem, sanitize_filename(note_id)))
}

/// Writes through a hidden temp file next to `path`, then renames over it.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    use rand::Rng;

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let random: u32 = rand::thread_rng().gen();
    let tmp_path = parent.join(format!(".{:x}.part", random));

    fs::write(&tmp_path, content)?;

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    Ok(())
}

pub fn read_frontmatter(md_path: &Path) -> Result<Option<Frontmatter>> {
    if !md_path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(md_path)?;

    // Look for YAML frontmatter (--- ... ---)
    let Some(rest) = content.strip_prefix("---\n") else {
        return Ok(None);
    };
    let Some(end_pos) = rest.find("\n---") else {
        return Ok(None);
    };

    let yaml = &rest[..end_pos];
    let fm: Frontmatter = serde_yaml::from_str(yaml).map_err(|e| {
        Error::Filesystem(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Failed to parse frontmatter in {}: {}", md_path.display(), e),
        ))
    })?;
    Ok(Some(fm))
}

/// True when `md_path` already holds this exact revision of the note.
pub fn is_up_to_date(md_path: &Path, expected: &Frontmatter) -> bool {
    match read_frontmatter(md_path) {
        Ok(Some(fm)) => {
            fm.note_id.is_some()
                && fm.note_id == expected.note_id
                && fm.updated.is_some()
                && fm.updated == expected.updated
        }
        Ok(None) => false,
        Err(e) => {
            log::warn!("{}", e);
            false
        }
    }
}
