//! # `ectd regions` — Inspect the Rule Table
//!
//! Prints the active region profiles, from the built-in defaults or a
//! YAML override.

use std::path::Path;

use anyhow::Context;
use clap::Args;

use ectd_region::RegionRuleTable;

#[derive(Args, Debug)]
pub struct RegionsArgs {}

/// Load the rule table from `config`, falling back to the built-ins.
pub fn load_region_table(config: Option<&Path>) -> anyhow::Result<RegionRuleTable> {
    match config {
        Some(path) => RegionRuleTable::load(path)
            .with_context(|| format!("failed to load region config {}", path.display())),
        None => Ok(RegionRuleTable::builtin()),
    }
}

pub fn run_regions(_args: &RegionsArgs, config: Option<&Path>) -> anyhow::Result<u8> {
    let table = load_region_table(config)?;
    for profile in table.profiles() {
        println!("{} — {}", profile.region, profile.display_name);
        println!(
            "  required:  {}",
            join_modules(&profile.required_modules)
        );
        println!(
            "  singleton: {}",
            join_modules(&profile.singleton_modules)
        );
        println!(
            "  multi-doc: {}",
            join_modules(&profile.multi_document_modules)
        );
    }
    Ok(0)
}

fn join_modules(modules: &[ectd_core::ModulePath]) -> String {
    if modules.is_empty() {
        return "(none)".to_string();
    }
    modules
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ectd_core::Region;

    #[test]
    fn test_builtin_table_without_config() {
        let table = load_region_table(None).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_config_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.yaml");
        std::fs::write(
            &path,
            r#"
- region: FDA
  display_name: FDA
  required_modules: ["m1.1"]
  singleton_modules: []
  multi_document_modules: []
"#,
        )
        .unwrap();
        let table = load_region_table(Some(&path)).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.profile(Region::Fda).is_some());
    }

    #[test]
    fn test_missing_config_errors() {
        assert!(load_region_table(Some(Path::new("/nope/regions.yaml"))).is_err());
    }

    #[test]
    fn test_run_regions_prints_table() {
        assert_eq!(run_regions(&RegionsArgs {}, None).unwrap(), 0);
    }
}
