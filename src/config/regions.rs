// src/config/regions.rs
use anyhow::{anyhow, bail, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::Region;

const ENV_PATH: &str = "MONITOR_REGIONS_PATH";

/// Load the catalog from an explicit path. Supports TOML or JSON formats.
pub fn load_regions_from(path: &Path) -> Result<Vec<Region>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading regions from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let regions = parse_regions(&content, ext.as_str())?;
    check_ids(&regions)?;
    Ok(regions)
}

/// Load the catalog using env var + fallbacks:
/// 1) $MONITOR_REGIONS_PATH
/// 2) config/regions.toml
/// 3) config/regions.json
pub fn load_regions_default() -> Result<Vec<Region>> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_regions_from(&pb);
        } else {
            return Err(anyhow!("MONITOR_REGIONS_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/regions.toml");
    if toml_p.exists() {
        return load_regions_from(&toml_p);
    }
    let json_p = PathBuf::from("config/regions.json");
    if json_p.exists() {
        return load_regions_from(&json_p);
    }
    Ok(Vec::new())
}

fn parse_regions(s: &str, hint_ext: &str) -> Result<Vec<Region>> {
    match hint_ext {
        "toml" => parse_toml(s).context("invalid TOML region catalog"),
        "json" => parse_json(s).context("invalid JSON region catalog"),
        _ => parse_json(s).or_else(|json_err| {
            parse_toml(s).map_err(|_| json_err.context("unsupported regions format"))
        }),
    }
}

fn parse_toml(s: &str) -> Result<Vec<Region>> {
    #[derive(serde::Deserialize)]
    struct TomlCatalog {
        #[serde(default)]
        regions: Vec<Region>,
    }
    let v: TomlCatalog = toml::from_str(s)?;
    Ok(v.regions)
}

fn parse_json(s: &str) -> Result<Vec<Region>> {
    Ok(serde_json::from_str(s)?)
}

fn check_ids(regions: &[Region]) -> Result<()> {
    let mut seen = HashSet::new();
    for r in regions {
        if r.id.trim().is_empty() {
            bail!("region '{}' has an empty id", r.name);
        }
        if !seen.insert(r.id.as_str()) {
            bail!("duplicate region id '{}'", r.id);
        }
    }
    Ok(())
}
