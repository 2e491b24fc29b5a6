// ABOUTME: Core export pipeline from Leanote notebooks to Hexo posts
// ABOUTME: Handles filtering, image localization, update detection and progress

use crate::{
    api::ApiClient,
    config::Settings,
    convert::{should_export, to_markdown},
    images::localize_images,
    model::{NoteSummary, Notebook},
    notebooks::{resolve_paths, PathTable},
    storage::{disambiguate, is_up_to_date, note_path, write_atomic},
    Result,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ExportReport {
    pub written: usize,
    pub unchanged: usize,
    pub filtered: usize,
}

/// Fetches all notebooks and resolves where each one lands on disk.
pub fn notebook_paths(client: &ApiClient) -> Result<(Vec<Notebook>, PathTable)> {
    let notebooks = client.list_notebooks()?;
    let table = resolve_paths(&notebooks)?;
    log::debug!(
        "Resolved {} live notebooks out of {}",
        table.len(),
        notebooks.len()
    );
    Ok((notebooks, table))
}

pub fn export_all(client: &ApiClient, settings: &Settings) -> Result<ExportReport> {
    println!("Fetching notebooks...");
    let (notebooks, table) = notebook_paths(client)?;

    let mut report = ExportReport::default();
    let mut seen = HashSet::new();
    let mut pending: Vec<(NoteSummary, &str)> = Vec::new();

    for notebook in notebooks.iter().filter(|nb| !nb.is_deleted) {
        for summary in client.list_notes(&notebook.id)? {
            if !seen.insert(summary.note_id.clone()) {
                continue;
            }
            if should_export(&summary.flags, settings.only_blog) {
                pending.push((summary, notebook.id.as_str()));
            } else {
                report.filtered += 1;
            }
        }
    }

    let images = settings.image_options();
    // Output path -> note id that owns it during this run
    let mut claimed: HashMap<PathBuf, String> = HashMap::new();

    let pb = ProgressBar::new(pending.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40}] {pos}/{len} notes")
            .unwrap()
            .progress_chars("##-"),
    );

    for (summary, listed_in) in &pending {
        let note = client.get_note(&summary.note_id)?;

        // The listing can be stale; trust the full note
        if !should_export(&note.flags, settings.only_blog) {
            report.filtered += 1;
            pb.inc(1);
            continue;
        }

        let notebook_id = if note.notebook_id.is_empty() {
            *listed_in
        } else {
            note.notebook_id.as_str()
        };
        let mut md_path = note_path(&settings.output_path, &table, notebook_id, &note.title);
        if let Some(owner) = claimed.get(&md_path) {
            if owner != &note.note_id {
                let renamed = disambiguate(&md_path, &note.note_id);
                log::warn!(
                    "Notes {} and {} share the path {}; writing {} instead",
                    owner,
                    note.note_id,
                    md_path.display(),
                    renamed.display()
                );
                md_path = renamed;
            }
        }
        claimed.insert(md_path.clone(), note.note_id.clone());

        let mut md = to_markdown(&note, &note.content)?;
        if !settings.force && is_up_to_date(&md_path, &md.frontmatter) {
            log::debug!("Unchanged {}", md_path.display());
            report.unchanged += 1;
            pb.inc(1);
            continue;
        }

        if let Some(opts) = &images {
            md.body = localize_images(&note.content, client, opts)?;
        }

        pb.println(format!("Saving note {}", md_path.display()));
        write_atomic(&md_path, md.render().as_bytes())?;
        report.written += 1;
        pb.inc(1);
    }

    pb.finish_with_message(format!(
        "exported {} notes ({} written, {} unchanged, {} skipped)",
        pending.len(),
        report.written,
        report.unchanged,
        report.filtered
    ));
    log::info!(
        "Export finished: {} written, {} unchanged, {} skipped",
        report.written,
        report.unchanged,
        report.filtered
    );

    Ok(report)
}
