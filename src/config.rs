//! Entity configuration: loading the YAML list and pre-run validation.
//!
//! The entity list is the only configuration file the pipeline reads. It is
//! a plain YAML sequence (see `companies.yaml` in the repository root):
//!
//! ```yaml
//! - name: Apple
//!   ticker: AAPL
//! - name: Mahindra & Mahindra
//!   ticker: M&M.NS
//! - name: Microsoft
//!   ticker: MSFT
//!   github_repo: microsoft/vscode
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::info;

use crate::error::ConfigError;
use crate::models::Entity;
use crate::utils::slugify;

/// Load the entity list from a YAML file.
pub fn load_entities(path: &Path) -> Result<Vec<Entity>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entities: Vec<Entity> = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        entities = entities.len(),
        "Loaded entity configuration"
    );
    Ok(entities)
}

/// Reject configurations the pipeline must not run with.
///
/// Checked before any network call: blank names, duplicate names, names that
/// slug to nothing, and slug collisions. A collision matters because two
/// entities with the same slug would silently overwrite each other's
/// `{slug}.json` artifact.
pub fn validate(entities: &[Entity]) -> Result<(), ConfigError> {
    let mut seen_names: HashSet<&str> = HashSet::new();
    let mut seen_slugs: HashMap<String, &str> = HashMap::new();

    for (index, entity) in entities.iter().enumerate() {
        if entity.name.trim().is_empty() {
            return Err(ConfigError::EmptyName { index });
        }
        if !seen_names.insert(entity.name.as_str()) {
            return Err(ConfigError::DuplicateName {
                name: entity.name.clone(),
            });
        }
        let slug = slugify(&entity.name);
        if slug.is_empty() {
            return Err(ConfigError::EmptySlug {
                name: entity.name.clone(),
            });
        }
        if let Some(first) = seen_slugs.insert(slug.clone(), entity.name.as_str()) {
            return Err(ConfigError::DuplicateSlug {
                slug,
                first: first.to_string(),
                second: entity.name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(name: &str) -> Entity {
        Entity {
            name: name.to_string(),
            ticker: None,
            blog_rss: None,
            github_repo: None,
        }
    }

    #[test]
    fn test_parse_entity_list_yaml() {
        let yaml = r#"
- name: Apple
  ticker: AAPL
- name: Mahindra & Mahindra
  ticker: M&M.NS
- name: Microsoft
  ticker: MSFT
  github_repo: microsoft/vscode
  blog_rss: https://blogs.microsoft.com/feed/
"#;
        let entities: Vec<Entity> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(entities.len(), 3);
        assert_eq!(entities[1].name, "Mahindra & Mahindra");
        assert_eq!(entities[1].ticker.as_deref(), Some("M&M.NS"));
        assert_eq!(
            entities[2].github_repo.as_deref(),
            Some("microsoft/vscode")
        );
        validate(&entities).unwrap();
    }

    #[test]
    fn test_validate_accepts_clean_list() {
        let entities = vec![entity("Apple"), entity("Tata Motors"), entity("Infosys")];
        assert!(validate(&entities).is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let entities = vec![entity("Apple"), entity("   ")];
        assert!(matches!(
            validate(&entities),
            Err(ConfigError::EmptyName { index: 1 })
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_name() {
        let entities = vec![entity("Apple"), entity("Apple")];
        assert!(matches!(
            validate(&entities),
            Err(ConfigError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_slug_collision() {
        // Distinct names, identical slugs.
        let entities = vec![entity("Acme & Co"), entity("Acme and Co")];
        match validate(&entities) {
            Err(ConfigError::DuplicateSlug { slug, first, second }) => {
                assert_eq!(slug, "acme-and-co");
                assert_eq!(first, "Acme & Co");
                assert_eq!(second, "Acme and Co");
            }
            other => panic!("expected a slug collision, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_unsluggable_name() {
        let entities = vec![entity("!!!")];
        assert!(matches!(
            validate(&entities),
            Err(ConfigError::EmptySlug { .. })
        ));
    }

    #[test]
    fn test_load_entities_missing_file() {
        let err = load_entities(Path::new("/nonexistent/companies.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_entities_bad_yaml() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("company_tracker_bad_{}.yaml", std::process::id()));
        std::fs::write(&path, "this: is: not: a list").unwrap();
        let err = load_entities(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
        let _ = std::fs::remove_file(&path);
    }
}
