//! The per-version JSON-shaped record: download descriptors and library
//! dependencies (spec §3, `VersionDetail`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One of the four download kinds a [`VersionDetail`] may list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadKind {
    Client,
    Server,
    ClientMappings,
    ServerMappings,
}

impl DownloadKind {
    pub fn label(self) -> &'static str {
        match self {
            DownloadKind::Client => "client",
            DownloadKind::Server => "server",
            DownloadKind::ClientMappings => "client_mappings",
            DownloadKind::ServerMappings => "server_mappings",
        }
    }
}

/// A single downloadable artifact reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadDescriptor {
    pub url: String,
    pub sha1: String,
    pub size: u64,
    /// Optional path override under which the artifact should be cached,
    /// relative to the per-version cache directory.
    #[serde(default)]
    pub optional_path: Option<String>,
}

/// A library dependency declared by a version's detail record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryDescriptor {
    pub name: String,
    /// Present only when the library has a downloadable artifact; some
    /// library entries are platform-conditional native components with no
    /// artifact of their own.
    #[serde(default)]
    pub artifact: Option<LibraryArtifact>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryArtifact {
    pub path: String,
    pub url: String,
    pub sha1: String,
    pub size: u64,
}

/// The full per-version detail record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionDetail {
    pub downloads: BTreeMap<DownloadKind, DownloadDescriptor>,
    #[serde(default)]
    pub libraries: Vec<LibraryDescriptor>,
    #[serde(default, rename = "is_unobfuscated")]
    pub is_unobfuscated: bool,
}

impl VersionDetail {
    pub fn download(&self, kind: DownloadKind) -> Option<&DownloadDescriptor> {
        self.downloads.get(&kind)
    }

    pub fn has_mappings(&self) -> bool {
        self.downloads.contains_key(&DownloadKind::ClientMappings)
            && self.downloads.contains_key(&DownloadKind::ServerMappings)
    }
}
