// ABOUTME: Public library API for the Leanote to Hexo exporter
// ABOUTME: Re-exports core modules for external use

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod export;
pub mod images;
pub mod model;
pub mod notebooks;
pub mod storage;

pub use error::{Error, Result};
pub use model::{Frontmatter, Note, NoteSummary, Notebook};
pub use notebooks::{resolve_paths, PathTable};
