//! Request authorization for the Bitbucket REST API.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use http::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::config::BitbucketConfig;
use crate::errors::Error;

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;

/// Options to apply to outgoing Bitbucket API requests.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Headers to send with the request
    pub headers: HeaderMap,
}

/// Builds the request options for the given provider configuration.
///
/// A configured token produces a bearer authorization header. A username
/// and app password pair produces a basic authorization header. Without
/// credentials no authorization header is added. The token wins when both
/// credential modes are configured.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] if the configured credentials contain
/// bytes that cannot be carried in an HTTP header value. The error message
/// does not echo the credentials.
pub fn request_options(config: &BitbucketConfig) -> Result<RequestOptions, Error> {
    let mut headers = HeaderMap::new();

    if let Some(token) = &config.token {
        headers.insert(AUTHORIZATION, authorization_value(format!("Bearer {}", token))?);
    } else if let (Some(username), Some(app_password)) = (&config.username, &config.app_password) {
        let credentials = STANDARD.encode(format!("{}:{}", username, app_password));
        headers.insert(AUTHORIZATION, authorization_value(format!("Basic {}", credentials))?);
    }

    Ok(RequestOptions { headers })
}

fn authorization_value(value: String) -> Result<HeaderValue, Error> {
    let mut value = HeaderValue::from_str(&value).map_err(|_| {
        Error::InvalidConfig(
            "credentials contain characters that are not valid in an authorization header"
                .to_string(),
        )
    })?;
    value.set_sensitive(true);
    Ok(value)
}
