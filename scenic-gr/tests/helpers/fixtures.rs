//! Small taxonomy fixture shared by the integration tests

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use scenic_gr::cache::ResponseCache;
use scenic_gr::completion::CompletionService;
use scenic_gr::semantic::SemanticResolver;
use scenic_gr::taxonomy::{DetailedRecord, MainRecord, RawChild, RawGenre, TaxonomySource, TaxonomyStore};
use scenic_gr::GenreResolver;

pub fn fixture_mains() -> Vec<MainRecord> {
    vec![
        MainRecord {
            name: "Ambient".to_string(),
            description: "Atmospheric, texture-focused music".to_string(),
            url: "https://example.org/ambient".to_string(),
            sub_genres: vec![
                RawGenre::new("Dark Ambient", "Ominous, low-register drones", ""),
                RawGenre::new("Ambient House", "House rhythms under ambient pads", ""),
                RawGenre::new("Space Ambient", "Slow cosmic washes of synth", ""),
            ],
        },
        MainRecord {
            name: "Electronic".to_string(),
            description: "Music built from synthesizers and drum machines".to_string(),
            url: "https://example.org/electronic".to_string(),
            sub_genres: vec![
                RawGenre::new("Synthwave", "Retro analog leads and gated drums", ""),
                RawGenre::new("Downtempo", "Slow, laid-back beats", ""),
                RawGenre::new("IDM", "Intricate, cerebral electronics", ""),
            ],
        },
        MainRecord {
            name: "Jazz".to_string(),
            description: "Swing, improvisation and extended harmony".to_string(),
            url: "https://example.org/jazz".to_string(),
            sub_genres: vec![
                RawGenre::new("Cool Jazz", "Relaxed tempos and soft tone", ""),
                RawGenre::new("Bossa Nova", "Brazilian samba rhythm with jazz harmony", ""),
            ],
        },
    ]
}

pub fn fixture_detailed() -> Vec<DetailedRecord> {
    vec![
        // Upgrades the sub entry implied by Electronic
        DetailedRecord {
            name: "Synthwave".to_string(),
            description: "Retro analog leads and gated drums".to_string(),
            url: String::new(),
            level: "detailed".to_string(),
            parent: Some("Electronic".to_string()),
            children: Some(vec![RawChild {
                name: "Darksynth".to_string(),
                description: "Aggressive, horror-tinged synthwave".to_string(),
                level: "detailed".to_string(),
            }]),
        },
        DetailedRecord {
            name: "Darksynth".to_string(),
            description: "Aggressive, horror-tinged synthwave".to_string(),
            url: String::new(),
            level: "detailed".to_string(),
            parent: Some("Synthwave".to_string()),
            children: None,
        },
    ]
}

/// Resolver over `source` with a default-sized cache
pub fn fixture_resolver(
    source: Arc<dyn TaxonomySource>,
    completion: Arc<dyn CompletionService>,
) -> GenreResolver {
    GenreResolver::new(
        TaxonomyStore::new(source),
        ResponseCache::default(),
        SemanticResolver::new(completion, Duration::from_secs(5)),
    )
}

/// Lay out `main/` and `detailed/` JSON files under `root`
pub fn write_taxonomy_dir(root: &Path, mains: &[serde_json::Value], detailed: &[serde_json::Value]) {
    let main_dir = root.join("main");
    std::fs::create_dir_all(&main_dir).unwrap();
    for (i, record) in mains.iter().enumerate() {
        std::fs::write(main_dir.join(format!("{:03}.json", i)), record.to_string()).unwrap();
    }

    if !detailed.is_empty() {
        let detailed_dir = root.join("detailed");
        std::fs::create_dir_all(&detailed_dir).unwrap();
        for (i, record) in detailed.iter().enumerate() {
            std::fs::write(detailed_dir.join(format!("{:03}.json", i)), record.to_string()).unwrap();
        }
    }
}
