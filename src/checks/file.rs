//! `file_exists` and `path_glob` predicates

use super::{CheckError, Evidence};
use crate::snapshot::{normalize_path, RepoSnapshot};
use regex::RegexBuilder;

pub(super) fn file_exists(
    snapshot: &RepoSnapshot,
    path: &str,
    content_regex: Option<&str>,
    case_sensitive: bool,
) -> Result<Evidence, CheckError> {
    if path.trim().is_empty() {
        return Err(CheckError::EmptyParameter("path"));
    }
    // Compile before looking at the tree so a bad pattern is reported even
    // when the file is missing
    let regex = content_regex
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(!case_sensitive)
                .multi_line(true)
                .build()
                .map_err(|source| CheckError::InvalidRegex {
                    pattern: pattern.to_string(),
                    source,
                })
        })
        .transpose()?;

    if !snapshot.exists(path) {
        return Ok(Evidence::fail());
    }
    let found = normalize_path(path);

    let Some(regex) = regex else {
        return Ok(Evidence::pass(vec![found]));
    };

    match snapshot.read_file(&found) {
        Some(content) if regex.is_match(&content) => Ok(Evidence::pass(vec![found])),
        Some(_) => Ok(Evidence::fail().with_detail("content_matched", false)),
        None => Ok(Evidence::fail().with_detail("content_readable", false)),
    }
}

pub(super) fn path_glob(
    snapshot: &RepoSnapshot,
    pattern: &str,
    min_matches: usize,
) -> Result<Evidence, CheckError> {
    if pattern.trim().is_empty() {
        return Err(CheckError::EmptyParameter("pattern"));
    }
    let matches = snapshot
        .glob(pattern)
        .map_err(|source| CheckError::InvalidGlob {
            pattern: pattern.to_string(),
            source,
        })?;

    let count = matches.len();
    let evidence = if count >= min_matches {
        Evidence::pass(matches.to_vec())
    } else {
        Evidence {
            matched_files: matches.to_vec(),
            ..Evidence::fail()
        }
    };
    Ok(evidence
        .with_detail("match_count", count)
        .with_detail("min_matches", min_matches))
}
