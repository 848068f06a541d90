use super::statement::{DigestSet, Material};
use super::{COMMIT_PARAM, GIT_COMMIT_DIGEST_KEY, GIT_PURL_PREFIX, URL_PARAM};
use crate::build::BuildRecord;

/// Collects the materials a build consumed, sorted by URI.
///
/// The only source today is the version-control origin declared through the
/// `CHAINS-GIT_COMMIT` / `CHAINS-GIT_URL` params; both must be present and
/// non-empty for a material to be emitted.
pub fn extract_materials(record: &BuildRecord) -> Vec<Material> {
    let mut materials = Vec::new();

    if let Some((commit, url)) = git_info(record) {
        materials.push(Material {
            uri: url,
            digest: DigestSet::from([(GIT_COMMIT_DIGEST_KEY.to_string(), commit)]),
        });
    }

    materials.sort_by(|a, b| a.uri.cmp(&b.uri));
    materials
}

/// Returns the declared commit and the origin URL in package-URL form.
fn git_info(record: &BuildRecord) -> Option<(String, String)> {
    let mut commit = None;
    let mut url = None;

    for param in record.params() {
        let Some(value) = param.value.as_str() else {
            continue;
        };
        if param.name == COMMIT_PARAM {
            commit = Some(value);
        } else if param.name == URL_PARAM {
            url = Some(value);
        }
    }

    match (commit, url) {
        (Some(commit), Some(url)) if !commit.is_empty() && !url.is_empty() => {
            Some((commit.to_string(), to_git_purl(url)))
        }
        _ => None,
    }
}

/// Prefixes `git+` unless the URL already carries it.
pub fn to_git_purl(url: &str) -> String {
    if url.starts_with(GIT_PURL_PREFIX) {
        url.to_string()
    } else {
        format!("{GIT_PURL_PREFIX}{url}")
    }
}
