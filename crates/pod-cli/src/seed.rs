use std::path::Path;

use anyhow::Context;
use pod_ldp::PodPipeline;
use pod_types::content_types::{
    APPLICATION_N_TRIPLES, APPLICATION_OCTET_STREAM, TEXT_PLAIN, TEXT_TURTLE,
};
use pod_types::Representation;
use tracing::debug;
use walkdir::WalkDir;

/// Content-type of a seeded file, guessed from its name.
pub fn content_type_for(path: &Path) -> &'static str {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    if name == ".acl" {
        return TEXT_TURTLE;
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("ttl" | "acl") => TEXT_TURTLE,
        Some("nt") => APPLICATION_N_TRIPLES,
        Some("txt") => TEXT_PLAIN,
        _ => APPLICATION_OCTET_STREAM,
    }
}

/// Load every file and directory below `dir` into the pod.
///
/// Writes go straight to the store, so ACLs in the directory take effect
/// for later operations without governing the load itself.
pub async fn seed_from_dir(pod: &PodPipeline, dir: &Path) -> anyhow::Result<usize> {
    let store = pod.store();
    let mut loaded = 0;
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walking {}", dir.display()))?;
        let relative = entry.path().strip_prefix(dir)?;
        let mut path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let representation = if entry.file_type().is_dir() {
            path.push('/');
            Representation::binary(TEXT_TURTLE, "")
        } else {
            let data = std::fs::read(entry.path())
                .with_context(|| format!("reading {}", entry.path().display()))?;
            Representation::binary(content_type_for(entry.path()), data)
        };

        let id = pod.resolve(&path);
        store
            .set_resource(&id, representation)
            .await
            .with_context(|| format!("loading {}", entry.path().display()))?;
        debug!(resource = %id, "seeded");
        loaded += 1;
    }
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pod_ldp::PodConfig;
    use pod_types::RepresentationPreferences;
    use std::fs;

    #[test]
    fn content_types_by_extension() {
        assert_eq!(content_type_for(Path::new("a/profile.ttl")), TEXT_TURTLE);
        assert_eq!(content_type_for(Path::new("a/.acl")), TEXT_TURTLE);
        assert_eq!(content_type_for(Path::new("doc.acl")), TEXT_TURTLE);
        assert_eq!(content_type_for(Path::new("data.nt")), APPLICATION_N_TRIPLES);
        assert_eq!(content_type_for(Path::new("notes.txt")), TEXT_PLAIN);
        assert_eq!(content_type_for(Path::new("photo.jpg")), APPLICATION_OCTET_STREAM);
        assert_eq!(content_type_for(Path::new("README")), APPLICATION_OCTET_STREAM);
    }

    #[tokio::test]
    async fn seeds_files_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("notes/empty")).unwrap();
        fs::write(dir.path().join("notes/today.ttl"), "<> <http://e/p> 1.").unwrap();
        fs::write(dir.path().join("hello.txt"), "hi").unwrap();

        let pod = PodPipeline::in_memory(PodConfig {
            base_url: "http://test.com/".into(),
            ..PodConfig::default()
        })
        .unwrap();
        let loaded = seed_from_dir(&pod, dir.path()).await.unwrap();
        assert_eq!(loaded, 4);

        let store = pod.store();
        let any = RepresentationPreferences::any();
        assert!(store.exists(&pod.resolve("notes/empty/")).await.unwrap());
        let text = store
            .get_representation(&pod.resolve("hello.txt"), &any)
            .await
            .unwrap();
        assert_eq!(text.content_type(), TEXT_PLAIN);
        let doc = store
            .get_representation(&pod.resolve("notes/today.ttl"), &any)
            .await
            .unwrap();
        assert_eq!(doc.data.len(), 1);
    }

    #[tokio::test]
    async fn malformed_turtle_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.ttl"), "<a> <b>").unwrap();
        let pod = PodPipeline::in_memory(PodConfig::default()).unwrap();
        assert!(seed_from_dir(&pod, dir.path()).await.is_err());
    }
}
