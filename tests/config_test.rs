//! Loading repository settings from YAML files

use metagraph::{ConfigError, RepositoryConfig};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_full_file() {
    let file = write_config(
        r#"
materialization:
  header_attributes: [name, owner]
  strict_relationship_attributes: true
propagation:
  max_traversal_vertices: 10000
  skip_deleted_relationships: false
"#,
    );

    let config = RepositoryConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.materialization.header_attributes, vec!["name", "owner"]);
    assert!(config.materialization.strict_relationship_attributes);
    assert_eq!(config.propagation.max_traversal_vertices, Some(10000));
    assert!(!config.propagation.skip_deleted_relationships);
}

#[test]
fn test_empty_file_uses_defaults() {
    let file = write_config("{}\n");
    let config = RepositoryConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config, RepositoryConfig::default());
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = RepositoryConfig::from_yaml_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_malformed_file() {
    let file = write_config("propagation: [not, a, map]\n");
    let err = RepositoryConfig::from_yaml_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_invalid_values() {
    let file = write_config("materialization:\n  header_attributes: [name, \"\"]\n");
    let err = RepositoryConfig::from_yaml_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}
