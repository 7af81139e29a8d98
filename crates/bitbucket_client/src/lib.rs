//! Crate for translating Bitbucket browse URLs into REST API requests.
//!
//! Bitbucket comes in two deployment flavors with incompatible REST
//! surfaces: the hosted Bitbucket Cloud service at `bitbucket.org` and
//! self-hosted Bitbucket Server installations. This crate holds the
//! integration configuration for a single provider instance and the pure
//! translation functions that turn the URLs a user would browse to into
//! the API calls needed to fetch raw file content or download a
//! repository archive.
//!
//! Which flavor applies is decided solely by the configured host, never
//! by inspecting the incoming URL.

pub mod auth;
pub mod config;
pub mod errors;
pub mod urls;

pub use auth::{request_options, RequestOptions};
pub use config::{BitbucketConfig, BitbucketSettings, BITBUCKET_API_BASE_URL, BITBUCKET_HOST};
pub use errors::Error;
pub use urls::{download_url, file_fetch_url};
