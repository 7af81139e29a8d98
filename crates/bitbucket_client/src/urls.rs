//! Translation of Bitbucket browse URLs into API URLs.
//!
//! The URLs a user browses to differ between the two deployment flavors:
//!
//! - Cloud: `https://bitbucket.org/<workspace>/<repo>/src/<ref>/<path>`
//! - Server: `https://<host>/projects/<project>/repos/<repo>/browse/<path>?at=<ref>`
//!
//! The functions here are pure string/URL transformations; no request is
//! made and no provider state is consulted beyond the configuration.

use url::Url;

use crate::config::BitbucketConfig;
use crate::errors::Error;

#[cfg(test)]
#[path = "urls_tests.rs"]
mod tests;

/// Builds the URL to fetch the raw content of a single file.
///
/// For Bitbucket Cloud the scheme and host are replaced by the configured
/// API base and a `repositories` segment is inserted; the rest of the path
/// is kept verbatim. For Bitbucket Server the `browse` segment becomes
/// `raw` and the ref moves into an `at` query parameter, which is always
/// present and empty when the browse URL carries no ref.
///
/// # Errors
///
/// Returns [`Error::IncorrectUrl`] if the target is not an absolute URL or
/// its path does not have the expected shape.
///
/// # Examples
///
/// ```rust
/// use bitbucket_client::{file_fetch_url, BitbucketConfig};
///
/// let config = BitbucketConfig {
///     host: "bitbucket.org".to_string(),
///     api_base_url: "https://api.bitbucket.org/2.0".to_string(),
///     token: None,
///     username: None,
///     app_password: None,
/// };
///
/// let url = file_fetch_url(
///     "https://bitbucket.org/my-workspace/my-repo/src/master/catalog-info.yaml",
///     &config,
/// )
/// .unwrap();
/// assert_eq!(
///     url,
///     "https://api.bitbucket.org/2.0/repositories/my-workspace/my-repo/src/master/catalog-info.yaml"
/// );
/// ```
pub fn file_fetch_url(target: &str, config: &BitbucketConfig) -> Result<String, Error> {
    let url = parse_target(target)?;
    let segments = path_segments(&url, target)?;

    if config.is_cloud() {
        match segments.as_slice() {
            [workspace, repo, "src", git_ref, path @ ..] if !path.is_empty() => Ok(format!(
                "{}/repositories/{}/{}/src/{}/{}",
                api_base(config),
                workspace,
                repo,
                git_ref,
                path.join("/")
            )),
            _ => Err(Error::IncorrectUrl(target.to_string())),
        }
    } else {
        match segments.as_slice() {
            ["projects", project, "repos", repo, "browse", path @ ..] if !path.is_empty() => {
                Ok(format!(
                    "{}/projects/{}/repos/{}/raw/{}?at={}",
                    api_base(config),
                    project,
                    repo,
                    path.join("/"),
                    browse_ref(&url)
                ))
            }
            _ => Err(Error::IncorrectUrl(target.to_string())),
        }
    }
}

/// Builds the URL to download an archive of a repository.
///
/// Bitbucket Cloud archives are scoped to a repository and ref only; any
/// path segments past the ref are dropped. Bitbucket Server archives go
/// through the REST API and accept an optional `path` query parameter
/// restricting the archive to a subtree, which is added only when the
/// browse URL names a path.
///
/// # Errors
///
/// Returns [`Error::IncorrectUrl`] if the target is not an absolute URL or
/// its path does not have the expected shape, and [`Error::MissingRef`]
/// for a Cloud URL that does not name a ref to archive.
pub fn download_url(target: &str, config: &BitbucketConfig) -> Result<String, Error> {
    let url = parse_target(target)?;
    let segments = path_segments(&url, target)?;

    if config.is_cloud() {
        match segments.as_slice() {
            [workspace, repo, "src", git_ref, ..] => {
                let host = url
                    .host_str()
                    .ok_or_else(|| Error::IncorrectUrl(target.to_string()))?;
                Ok(format!(
                    "{}://{}/{}/{}/get/{}.zip",
                    url.scheme(),
                    host,
                    workspace,
                    repo,
                    git_ref
                ))
            }
            [_, _] | [_, _, "src"] => Err(Error::MissingRef(target.to_string())),
            _ => Err(Error::IncorrectUrl(target.to_string())),
        }
    } else {
        match segments.as_slice() {
            ["projects", project, "repos", repo, "browse", path @ ..] => {
                let mut result = format!(
                    "{}/projects/{}/repos/{}/archive?format=zip&prefix={}-{}",
                    api_base(config),
                    project,
                    repo,
                    project,
                    repo
                );
                if !path.is_empty() {
                    result.push_str("&path=");
                    result.push_str(&path.join("/"));
                }
                Ok(result)
            }
            _ => Err(Error::IncorrectUrl(target.to_string())),
        }
    }
}

fn parse_target(target: &str) -> Result<Url, Error> {
    Url::parse(target).map_err(|_| Error::IncorrectUrl(target.to_string()))
}

/// Splits the target path into its non-empty segments, so that trailing or
/// duplicate slashes never produce an empty segment.
fn path_segments<'a>(url: &'a Url, target: &str) -> Result<Vec<&'a str>, Error> {
    Ok(url
        .path_segments()
        .ok_or_else(|| Error::IncorrectUrl(target.to_string()))?
        .filter(|segment| !segment.is_empty())
        .collect())
}

/// The ref a Bitbucket Server browse URL carries in its `at` query
/// parameter, or an empty string when absent.
fn browse_ref(url: &Url) -> String {
    url.query_pairs()
        .find(|(key, _)| key == "at")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

fn api_base(config: &BitbucketConfig) -> &str {
    config.api_base_url.trim_end_matches('/')
}
