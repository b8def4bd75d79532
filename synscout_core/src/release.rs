/*============================================================
  Synavera Project: Syn-Scout
  Module: synscout_core::release
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Shared structures describing a scraped Java release: the
    closed platform set, per-platform download entries and the
    release record produced by the extractor.

  Security / Safety Notes:
    Pure data container; no I/O performed in this module.

  Dependencies:
    serde for JSON serialization.

  Operational Scope:
    Passed from the extractor to the archive merger and stored
    verbatim inside the archive document.

  Revision History:
    2024-11-04 COD  Introduced shared release types.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Clear data contracts between modules
    - Serializable structures with stable keys
============================================================*/

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of platform builds published on the download page.
///
/// Serialized as the key string (e.g. `Windows_x64`). Declaration order
/// is the order entries appear in the persisted maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "Windows_Online")]
    WindowsOnline,
    #[serde(rename = "Windows_x86")]
    WindowsX86,
    #[serde(rename = "Windows_x64")]
    WindowsX64,
    #[serde(rename = "macOS_x64")]
    MacOsX64,
    #[serde(rename = "macOS_ARM64")]
    MacOsArm64,
    #[serde(rename = "Linux_x86")]
    LinuxX86,
    #[serde(rename = "Linux_x64")]
    LinuxX64,
    #[serde(rename = "Linux_x86_RPM")]
    LinuxX86Rpm,
    #[serde(rename = "Linux_x64_RPM")]
    LinuxX64Rpm,
    #[serde(rename = "Solaris_SPARC64")]
    SolarisSparc64,
    #[serde(rename = "Solaris_x64")]
    SolarisX64,
}

impl Platform {
    pub const ALL: [Platform; 11] = [
        Platform::WindowsOnline,
        Platform::WindowsX86,
        Platform::WindowsX64,
        Platform::MacOsX64,
        Platform::MacOsArm64,
        Platform::LinuxX86,
        Platform::LinuxX64,
        Platform::LinuxX86Rpm,
        Platform::LinuxX64Rpm,
        Platform::SolarisSparc64,
        Platform::SolarisX64,
    ];

    /// Persisted key for this platform.
    pub fn key(self) -> &'static str {
        match self {
            Platform::WindowsOnline => "Windows_Online",
            Platform::WindowsX86 => "Windows_x86",
            Platform::WindowsX64 => "Windows_x64",
            Platform::MacOsX64 => "macOS_x64",
            Platform::MacOsArm64 => "macOS_ARM64",
            Platform::LinuxX86 => "Linux_x86",
            Platform::LinuxX64 => "Linux_x64",
            Platform::LinuxX86Rpm => "Linux_x86_RPM",
            Platform::LinuxX64Rpm => "Linux_x64_RPM",
            Platform::SolarisSparc64 => "Solaris_SPARC64",
            Platform::SolarisX64 => "Solaris_x64",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One downloadable build artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadEntry {
    pub platform: Platform,
    pub bundle_id: String,
    pub url: String,
    pub file_size: Option<String>,
}

/// Release metadata scraped from a single page load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRecord {
    pub version: String,
    pub update_number: u32,
    pub release_date: Option<String>,
    pub downloads: BTreeMap<Platform, DownloadEntry>,
}

impl ReleaseRecord {
    /// Canonical version string for a Java 8 update, e.g. `8u471`.
    pub fn version_for_update(update_number: u32) -> String {
        format!("8u{update_number}")
    }
}
