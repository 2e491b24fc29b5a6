// ABOUTME: Downloads Leanote-hosted images and rewrites Markdown links to them
// ABOUTME: External image links are left as they are

use crate::api::ApiClient;
use crate::storage::write_atomic;
use crate::{Error, Result};
use regex::{Captures, Regex};
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

const LEANOTE_IMAGE_ENDPOINT: &str = "/api/file/getImage";

/// Anything that can hand back image bytes for a Leanote file id.
pub trait ImageSource {
    fn fetch_image(&self, file_id: &str) -> Result<Vec<u8>>;
}

impl ImageSource for ApiClient {
    fn fetch_image(&self, file_id: &str) -> Result<Vec<u8>> {
        self.get_image(file_id)
    }
}

#[derive(Debug, Clone)]
pub struct ImageOptions {
    /// Directory the image files are written to
    pub image_dir: PathBuf,
    /// Prefix used in the rewritten links, e.g. `/images`
    pub link_prefix: String,
    /// Download even if the file is already on disk
    pub force: bool,
}

fn image_link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").expect("valid image regex"))
}

/// File id of an image served by Leanote, if `url` points at one.
pub fn leanote_file_id(url: &str) -> Option<&str> {
    if !url.contains(LEANOTE_IMAGE_ENDPOINT) {
        return None;
    }
    let query = url.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "fileId")
        .map(|(_, value)| value)
        .filter(|value| is_safe_file_id(value))
}

/// File ids become file names, so only plain id characters are accepted.
fn is_safe_file_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Splits a link destination into the URL and an optional `"title"`.
fn split_destination(dest: &str) -> (&str, Option<&str>) {
    let dest = dest.trim();
    match dest.split_once(char::is_whitespace) {
        Some((url, title)) => (url, Some(title.trim())),
        None => (dest, None),
    }
}

/// Rewrites Leanote image links in `content` to local copies.
pub fn localize_images(
    content: &str,
    source: &dyn ImageSource,
    opts: &ImageOptions,
) -> Result<String> {
    fs::create_dir_all(&opts.image_dir)?;

    let mut failure: Option<Error> = None;
    let prefix = opts.link_prefix.trim_end_matches('/');

    let rewritten = image_link_pattern().replace_all(content, |caps: &Captures| {
        let original = caps[0].to_string();
        if failure.is_some() {
            return original;
        }
        let (url, title) = split_destination(&caps[2]);
        let Some(file_id) = leanote_file_id(url) else {
            if url.contains(LEANOTE_IMAGE_ENDPOINT) {
                log::warn!("Leaving image link with unusable file id: {}", url);
            }
            return original;
        };

        match save_image(file_id, source, opts) {
            Ok(filename) => match title {
                Some(title) => format!("![{}]({}/{} {})", &caps[1], prefix, filename, title),
                None => format!("![{}]({}/{})", &caps[1], prefix, filename),
            },
            Err(e) => {
                failure = Some(e);
                original
            }
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(rewritten.into_owned()),
    }
}

fn save_image(file_id: &str, source: &dyn ImageSource, opts: &ImageOptions) -> Result<String> {
    let filename = format!("{}.png", file_id);
    let path = opts.image_dir.join(&filename);

    if path.exists() && !opts.force {
        log::debug!("Image {} already saved", filename);
        return Ok(filename);
    }

    let bytes = source.fetch_image(file_id)?;
    write_atomic(&path, &bytes)?;
    log::info!("Saved image {}", path.display());
    Ok(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    struct FakeSource {
        calls: RefCell<Vec<String>>,
    }

    impl FakeSource {
        fn new() -> Self {
            FakeSource {
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl ImageSource for FakeSource {
        fn fetch_image(&self, file_id: &str) -> Result<Vec<u8>> {
            self.calls.borrow_mut().push(file_id.to_string());
            if file_id == "broken" {
                return Err(Error::Api {
                    endpoint: "/file/getImage".into(),
                    status: 404,
                    message: "missing".into(),
                });
            }
            Ok(format!("png:{}", file_id).into_bytes())
        }
    }

    fn options(dir: &TempDir, force: bool) -> ImageOptions {
        ImageOptions {
            image_dir: dir.path().join("images"),
            link_prefix: "/images".into(),
            force,
        }
    }

    #[test]
    fn test_leanote_file_id() {
        assert_eq!(
            leanote_file_id("https://leanote.com/api/file/getImage?fileId=abc123"),
            Some("abc123")
        );
        assert_eq!(
            leanote_file_id("https://leanote.com/api/file/getImage?token=t&fileId=xyz"),
            Some("xyz")
        );
        assert_eq!(leanote_file_id("https://example.com/cat.png"), None);
        assert_eq!(
            leanote_file_id("http://h/api/file/getImage?fileId=../../escaped"),
            None
        );
        assert_eq!(leanote_file_id("http://h/api/file/getImage?fileId=a%2Fb"), None);
        assert_eq!(leanote_file_id("https://leanote.com/api/file/getImage"), None);
    }

    #[test]
    fn test_localize_rewrites_and_downloads() {
        let temp = TempDir::new().unwrap();
        let opts = options(&temp, false);
        let source = FakeSource::new();

        let content = "Intro\n![diagram](https://leanote.com/api/file/getImage?fileId=img1)\nEnd";
        let out = localize_images(content, &source, &opts).unwrap();

        assert_eq!(out, "Intro\n![diagram](/images/img1.png)\nEnd");
        assert_eq!(
            fs::read_to_string(opts.image_dir.join("img1.png")).unwrap(),
            "png:img1"
        );
    }

    #[test]
    fn test_external_links_untouched() {
        let temp = TempDir::new().unwrap();
        let source = FakeSource::new();
        let content = "![cat](https://example.com/cat.png)";

        let out = localize_images(content, &source, &options(&temp, false)).unwrap();
        assert_eq!(out, content);
        assert!(source.calls.borrow().is_empty());
    }

    #[test]
    fn test_existing_image_not_refetched_unless_forced() {
        let temp = TempDir::new().unwrap();
        let opts = options(&temp, false);
        fs::create_dir_all(&opts.image_dir).unwrap();
        fs::write(opts.image_dir.join("img1.png"), "old").unwrap();

        let content = "![](http://host/api/file/getImage?fileId=img1)";
        let source = FakeSource::new();
        let out = localize_images(content, &source, &opts).unwrap();
        assert_eq!(out, "![](/images/img1.png)");
        assert!(source.calls.borrow().is_empty());

        let forced = options(&temp, true);
        localize_images(content, &source, &forced).unwrap();
        assert_eq!(source.calls.borrow().as_slice(), ["img1"]);
        assert_eq!(
            fs::read_to_string(opts.image_dir.join("img1.png")).unwrap(),
            "png:img1"
        );
    }

    #[test]
    fn test_traversal_file_id_left_alone() {
        let temp = TempDir::new().unwrap();
        let opts = ImageOptions {
            image_dir: temp.path().join("a").join("images"),
            link_prefix: "/images".into(),
            force: false,
        };
        let source = FakeSource::new();
        let content = "![](http://h/api/file/getImage?fileId=../../escaped)";

        let out = localize_images(content, &source, &opts).unwrap();
        assert_eq!(out, content);
        assert!(source.calls.borrow().is_empty());
        assert!(!temp.path().join("escaped.png").exists());
    }

    #[test]
    fn test_titled_image_keeps_title() {
        let temp = TempDir::new().unwrap();
        let opts = options(&temp, false);
        let source = FakeSource::new();

        let content = "![a](http://h/api/file/getImage?fileId=abc \"Cap\")";
        let out = localize_images(content, &source, &opts).unwrap();

        assert_eq!(out, "![a](/images/abc.png \"Cap\")");
        assert_eq!(source.calls.borrow().as_slice(), ["abc"]);
        assert!(opts.image_dir.join("abc.png").exists());
    }

    #[test]
    fn test_download_leaves_no_partial_files() {
        let temp = TempDir::new().unwrap();
        let opts = options(&temp, false);
        let source = FakeSource::new();

        localize_images("![](http://h/api/file/getImage?fileId=img2)", &source, &opts).unwrap();

        let names: Vec<String> = fs::read_dir(&opts.image_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["img2.png"]);
    }

    #[test]
    fn test_download_failure_propagates() {
        let temp = TempDir::new().unwrap();
        let source = FakeSource::new();
        let content = "![](http://host/api/file/getImage?fileId=broken)";

        let opts = options(&temp, false);
        let err = localize_images(content, &source, &opts).unwrap_err();
        assert!(matches!(err, Error::Api { status: 404, .. }));
        assert!(!opts.image_dir.join("broken.png").exists());
    }
}
