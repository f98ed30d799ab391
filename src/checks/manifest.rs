//! Manifest-backed predicates: build commands and dependencies

use super::{CheckError, Evidence};
use crate::snapshot::{ManifestKind, RepoSnapshot};
use serde_json::Value;

fn non_empty<'a>(values: &'a [String], name: &'static str) -> Result<Vec<&'a str>, CheckError> {
    let cleaned: Vec<&str> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();
    if cleaned.is_empty() {
        return Err(CheckError::EmptyParameter(name));
    }
    Ok(cleaned)
}

fn strings(values: Vec<String>) -> Value {
    Value::Array(values.into_iter().map(Value::String).collect())
}

/// One of the commands is a `package.json` script or a Makefile target
pub(super) fn build_command(
    snapshot: &RepoSnapshot,
    commands: &[String],
) -> Result<Evidence, CheckError> {
    let commands = non_empty(commands, "commands")?;

    let mut matched = Vec::new();
    let mut found = Vec::new();

    if let Some(npm) = snapshot
        .manifests()
        .iter()
        .find(|m| m.kind == ManifestKind::Npm)
    {
        let hits: Vec<String> = commands
            .iter()
            .filter(|c| npm.scripts.contains_key(**c))
            .map(|c| c.to_string())
            .collect();
        if !hits.is_empty() {
            matched.push(npm.file_name().to_string());
            found.extend(hits);
        }
    }

    let targets = snapshot.make_targets();
    let make_hits: Vec<String> = commands
        .iter()
        .filter(|c| targets.contains(**c))
        .map(|c| c.to_string())
        .collect();
    if !make_hits.is_empty() {
        matched.push("Makefile".to_string());
        for hit in make_hits {
            if !found.contains(&hit) {
                found.push(hit);
            }
        }
    }

    let evidence = if matched.is_empty() {
        Evidence::fail()
    } else {
        Evidence::pass(matched)
    };
    Ok(evidence.with_detail("found_commands", strings(found)))
}

/// One of the packages is a direct or development dependency
pub(super) fn dependency(
    snapshot: &RepoSnapshot,
    packages: &[String],
) -> Result<Evidence, CheckError> {
    let packages = non_empty(packages, "packages")?;

    let mut matched = Vec::new();
    let mut found = Vec::new();

    for manifest in snapshot.manifests() {
        let hits: Vec<&str> = packages
            .iter()
            .copied()
            .filter(|p| {
                // Python package names are case-insensitive and stored lowercased
                let lowered = p.to_lowercase();
                manifest.declares(p) || manifest.declares(&lowered)
            })
            .collect();
        if hits.is_empty() {
            continue;
        }
        matched.push(manifest.file_name().to_string());
        for hit in hits {
            if !found.iter().any(|f: &String| f == hit) {
                found.push(hit.to_string());
            }
        }
    }

    let evidence = if matched.is_empty() {
        Evidence::fail()
    } else {
        Evidence::pass(matched)
    };
    Ok(evidence.with_detail("found_packages", strings(found)))
}
