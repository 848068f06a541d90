//! Subject extraction from build results.
//!
//! Builds announce what they produced through result naming conventions:
//!
//! - a `<P>_DIGEST` result written as `alg:hex`, named by its `<P>_URL`
//!   sibling (e.g. `IMAGE_URL` + `IMAGE_DIGEST`); without one the subject
//!   name is empty;
//! - an `IMAGES` result listing `name@alg:hex` references separated by commas
//!   or newlines.
//!
//! Malformed entries are skipped, never reported as errors.

use super::statement::Subject;
use crate::build::BuildRecord;

use log::debug;
use std::collections::HashMap;

pub const DIGEST_SUFFIX: &str = "_DIGEST";
pub const URL_SUFFIX: &str = "_URL";
pub const IMAGES_RESULT: &str = "IMAGES";

/// Produces the subject list of a provenance statement.
pub trait SubjectExtractor {
    fn extract_subjects(&self, record: &BuildRecord) -> Vec<Subject>;
}

/// The result-convention extractor used by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultSubjectExtractor;

impl SubjectExtractor for ResultSubjectExtractor {
    fn extract_subjects(&self, record: &BuildRecord) -> Vec<Subject> {
        let by_name: HashMap<&str, &str> = record
            .results()
            .iter()
            .map(|r| (r.name.as_str(), r.value.as_str()))
            .collect();

        let mut subjects = Vec::new();

        for result in record.results() {
            if result.name == IMAGES_RESULT {
                subjects.extend(parse_image_list(&result.value));
                continue;
            }

            let Some(prefix) = result.name.strip_suffix(DIGEST_SUFFIX) else {
                continue;
            };
            let url_key = format!("{prefix}{URL_SUFFIX}");
            let url = match by_name.get(url_key.as_str()) {
                Some(url) => url.trim(),
                None => {
                    debug!(
                        "result {} has no matching {url_key}, subject is unnamed",
                        result.name
                    );
                    ""
                }
            };

            match split_digest(&result.value) {
                Some((alg, digest)) => subjects.push(Subject::new(url, alg, digest)),
                None => debug!(
                    "result {} is not of the form alg:digest, skipping",
                    result.name
                ),
            }
        }

        subjects
    }
}

fn parse_image_list(value: &str) -> Vec<Subject> {
    value
        .split([',', '\n'])
        .map(str::trim)
        .filter(|reference| !reference.is_empty())
        .filter_map(|reference| {
            let parsed = reference
                .split_once('@')
                .and_then(|(name, digest)| split_digest(digest).map(|d| (name, d)));
            if parsed.is_none() {
                debug!("image reference {reference} has no digest, skipping");
            }
            parsed.map(|(name, (alg, digest))| Subject::new(name, alg, digest))
        })
        .collect()
}

fn split_digest(value: &str) -> Option<(&str, &str)> {
    let (alg, digest) = value.trim().split_once(':')?;
    if alg.is_empty() || digest.is_empty() {
        return None;
    }
    Some((alg, digest))
}
