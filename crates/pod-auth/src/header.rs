//! Response headers describing permissions.

use crate::modes::PermissionSet;

pub const WAC_ALLOW: &str = "WAC-Allow";
pub const WWW_AUTHENTICATE: &str = "WWW-Authenticate";

/// Default challenge for unauthenticated requests.
pub const DEFAULT_AUTH_SCHEME: &str = r#"Bearer scope="openid webid""#;

/// `WAC-Allow` value, e.g. `user="read write append",public="read"`.
pub fn wac_allow(user: &PermissionSet, public: &PermissionSet) -> String {
    format!(r#"user="{user}",public="{public}""#)
}

/// `WWW-Authenticate` header for a denied anonymous request.
pub fn challenge(scheme: &str) -> (&'static str, String) {
    (WWW_AUTHENTICATE, scheme.to_owned())
}
