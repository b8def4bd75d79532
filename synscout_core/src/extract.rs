/*============================================================
  Synavera Project: Syn-Scout
  Module: synscout_core::extract
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Turn the rendered Java download page into a structured
    release record: version, release date and one download
    entry per recognised platform.

  Security / Safety Notes:
    Pure text processing; no I/O and no clock access.

  Dependencies:
    regex for markup matching.

  Operational Scope:
    Invoked once per run between the page fetch and the
    archive merge. Matching rules sit behind `ReleaseExtractor`
    so they can be replaced when the vendor markup drifts.

  Revision History:
    2025-11-12 COD  Authored Java 8 page extractor.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Typed failures for missing version and empty downloads
    - Deterministic first-match-wins deduplication
    - Best-effort enrichment never fails the record
============================================================*/

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ExtractionError;
use crate::release::{DownloadEntry, Platform, ReleaseRecord};

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($regex).expect("static regex is valid"));
    };
}

regex!(VERSION_REGEX, r"Version\s+8\s+Update\s+(\d+)");
regex!(RELEASE_DATE_REGEX, r"Release\s+date:\s*([^<]+)");
regex!(ANCHOR_REGEX, r"(?is)<a\b([^>]*)>(.*?)</a\s*>");
regex!(HREF_REGEX, r#"(?i)(?:^|\s)href\s*=\s*(?:"([^"]*)"|'([^']*)')"#);
regex!(
    DOWNLOAD_URL_REGEX,
    r"^https?://javadl\.oracle\.com/webapps/download/AutoDL\?BundleId=(\d+)_([0-9A-Fa-f]+)"
);
regex!(TAG_REGEX, r"<[^>]*>");
regex!(WHITESPACE_REGEX, r"\s+");
regex!(FILESIZE_REGEX, r"(?i)filesize:\s*([0-9][0-9.,]*)\s*MB");

/// Upper bound on markup scanned after a download link for its file size.
const FILESIZE_WINDOW: usize = 600;

/// Visible link text (normalised, lower-case) → platform.
const PLATFORM_RULES: &[(&str, Platform)] = &[
    ("windows online", Platform::WindowsOnline),
    ("windows offline", Platform::WindowsX86),
    ("windows offline (32-bit)", Platform::WindowsX86),
    ("windows x86 offline", Platform::WindowsX86),
    ("windows offline (64-bit)", Platform::WindowsX64),
    ("windows x64 offline", Platform::WindowsX64),
    ("windows x64", Platform::WindowsX64),
    ("macos x64", Platform::MacOsX64),
    ("mac os x x64", Platform::MacOsX64),
    ("mac os x (10.7.3 version and above)", Platform::MacOsX64),
    ("macos arm64", Platform::MacOsArm64),
    ("macos arm64 (apple silicon)", Platform::MacOsArm64),
    ("linux x86", Platform::LinuxX86),
    ("linux", Platform::LinuxX86),
    ("linux x64", Platform::LinuxX64),
    ("linux x86 rpm", Platform::LinuxX86Rpm),
    ("linux rpm", Platform::LinuxX86Rpm),
    ("linux x64 rpm", Platform::LinuxX64Rpm),
    ("solaris sparc 64-bit", Platform::SolarisSparc64),
    ("solaris sparc64", Platform::SolarisSparc64),
    ("solaris x64", Platform::SolarisX64),
];

/// Converts page markup into a release record.
pub trait ReleaseExtractor {
    fn extract(&self, html: &str) -> Result<ReleaseRecord, ExtractionError>;
}

/// Rules for the java.com manual download page.
#[derive(Debug, Default, Clone, Copy)]
pub struct Java8PageExtractor;

impl ReleaseExtractor for Java8PageExtractor {
    fn extract(&self, html: &str) -> Result<ReleaseRecord, ExtractionError> {
        let update_number = extract_update_number(html)?;
        let release_date = extract_release_date(html);

        let mut downloads = BTreeMap::new();
        for link in download_links(html) {
            let Some(platform) = classify_platform(&link.text) else {
                continue;
            };
            if downloads.contains_key(&platform) {
                continue;
            }
            let file_size = file_size_after(html, link.end);
            downloads.insert(
                platform,
                DownloadEntry {
                    platform,
                    bundle_id: link.bundle_id,
                    url: link.url,
                    file_size,
                },
            );
        }

        if downloads.is_empty() {
            return Err(ExtractionError::NoDownloadsFound);
        }

        Ok(ReleaseRecord {
            version: ReleaseRecord::version_for_update(update_number),
            update_number,
            release_date,
            downloads,
        })
    }
}

/// Vendor download anchor found in the page.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DownloadLink {
    url: String,
    bundle_id: String,
    text: String,
    /// Byte offset just past the closing `</a>`.
    end: usize,
}

fn extract_update_number(html: &str) -> Result<u32, ExtractionError> {
    VERSION_REGEX
        .captures(html)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .ok_or(ExtractionError::MissingVersion)
}

fn extract_release_date(html: &str) -> Option<String> {
    let caps = RELEASE_DATE_REGEX.captures(html)?;
    let date = normalise_text(&caps[1]);
    (!date.is_empty()).then_some(date)
}

fn download_links(html: &str) -> impl Iterator<Item = DownloadLink> + '_ {
    ANCHOR_REGEX.captures_iter(html).filter_map(|anchor| {
        let href_caps = HREF_REGEX.captures(&anchor[1])?;
        let raw_href = href_caps.get(1).or_else(|| href_caps.get(2))?.as_str();
        let url = raw_href.trim().replace("&amp;", "&");
        let bundle_id = DOWNLOAD_URL_REGEX.captures(&url)?[1].to_string();
        Some(DownloadLink {
            end: anchor.get(0)?.end(),
            text: normalise_text(&TAG_REGEX.replace_all(&anchor[2], " ")),
            bundle_id,
            url,
        })
    })
}

fn classify_platform(text: &str) -> Option<Platform> {
    let key = text.to_lowercase();
    PLATFORM_RULES
        .iter()
        .find(|(label, _)| *label == key)
        .map(|(_, platform)| *platform)
}

/// Looks for `filesize: N MB` between a download link and the next one.
fn file_size_after(html: &str, offset: usize) -> Option<String> {
    let rest = html.get(offset..)?;
    let mut end = rest.find("BundleId=").unwrap_or(rest.len()).min(FILESIZE_WINDOW);
    while !rest.is_char_boundary(end) {
        end -= 1;
    }
    let caps = FILESIZE_REGEX.captures(&rest[..end])?;
    Some(format!("{} MB", &caps[1]))
}

fn normalise_text(raw: &str) -> String {
    let decoded = raw.replace("&nbsp;", " ").replace("&#160;", " ");
    WHITESPACE_REGEX
        .replace_all(decoded.trim(), " ")
        .into_owned()
}
