use std::path::{Path, PathBuf};
use std::thread;

use flume::Receiver;
use log::{info, warn};
use serde::Deserialize;

use crate::document::NodeSpec;

/// Suffix identifying late-loaded content files next to the main document.
const SECTION_SUFFIX: &str = ".section.json";

/// One section file: nodes to graft into the content tree, optionally under
/// a named anchor container instead of the document root.
#[derive(Debug, Deserialize)]
pub struct SectionFile {
    #[serde(default)]
    pub attach_to: Option<String>,
    pub nodes: Vec<NodeSpec>,
}

#[derive(Debug)]
pub struct LoadedSection {
    pub name: String,
    pub attach_to: Option<String>,
    pub nodes: Vec<NodeSpec>,
}

/// Parse section files on a background thread and hand the results to the
/// event loop. This is the asynchronous content injection the trigger
/// registry has to absorb: sections arrive whenever the thread gets to
/// them, well after the first render. Files that fail to parse are logged
/// and skipped. The channel closes when every file has been delivered.
pub fn spawn_loader(document_path: &Path) -> Receiver<LoadedSection> {
    let (tx, rx) = flume::unbounded();
    let dir = document_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    thread::spawn(move || {
        let mut paths = section_paths(&dir);
        paths.sort();
        for path in paths {
            match load_section(&path) {
                Ok(section) => {
                    info!("loaded section '{}'", section.name);
                    if tx.send(section).is_err() {
                        return;
                    }
                }
                Err(err) => warn!("skipping section {}: {err:#}", path.display()),
            }
        }
    });

    rx
}

fn section_paths(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let name = path.file_name()?.to_str()?;
            name.ends_with(SECTION_SUFFIX).then_some(path)
        })
        .collect()
}

fn load_section(path: &Path) -> anyhow::Result<LoadedSection> {
    let raw = std::fs::read_to_string(path)?;
    let file: SectionFile = serde_json::from_str(&raw)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("section")
        .trim_end_matches(SECTION_SUFFIX)
        .to_string();
    Ok(LoadedSection {
        name,
        attach_to: file.attach_to,
        nodes: file.nodes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn loads_sections_in_name_order_and_skips_broken_ones() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("cv.json");
        std::fs::write(&doc, "{}").unwrap();

        std::fs::write(
            dir.path().join("20-talks.section.json"),
            r#"{"nodes": [{"type": "paragraph", "text": "talks"}]}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("10-projects.section.json"),
            r#"{"attach_to": "projects", "nodes": [{"type": "image", "source": "p.png"}]}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("99-broken.section.json"), "not json").unwrap();
        std::fs::write(dir.path().join("unrelated.json"), "{}").unwrap();

        let rx = spawn_loader(&doc);

        let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(first.name, "10-projects");
        assert_eq!(first.attach_to.as_deref(), Some("projects"));
        assert_eq!(first.nodes.len(), 1);

        let second = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(second.name, "20-talks");

        // Broken and unrelated files never arrive; the channel just closes.
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_err());
    }

    #[test]
    fn missing_directory_yields_an_empty_closed_channel() {
        let rx = spawn_loader(Path::new("/nonexistent/cv.json"));
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_err());
    }
}
