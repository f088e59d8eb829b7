//! Browser-side tracking snippet and dashboard login helpers.
//!
//! Plain string builders. Every function returns `None` when the API key is
//! empty, since neither the tracker nor the dashboard can work without it.

use md5::Md5;
use sha1::{Digest, Sha1};

pub const LOGIN_URL: &str = "https://www.unfraud.com/srv/login.php";
pub const TRACKER_SCRIPT_URL: &str = "//www.unfraud.com/bea/bea.js";

const PASSWORD_SALT: &str = "asdz!!3";

/// `<script>` tags that load the behavioural tracker for this session.
pub fn tracking_snippet(api_key: &str, session_id: &str) -> Option<String> {
    if api_key.is_empty() {
        return None;
    }
    Some(format!(
        "<script type=\"text/javascript\">\
         var bea_api_id = '{api_key}';\
         var bea_session_id= '{session_id}';\
         </script>\
         <script type=\"text/javascript\" src=\"{TRACKER_SCRIPT_URL}\"></script>"
    ))
}

/// Auto-login URL for the Unfraud dashboard.
///
/// The email is sent as `sha1(email)` and the password as
/// `sha1(md5(password + salt))`, both lowercase hex.
pub fn dashboard_url(api_key: &str, email: &str, password: &str) -> Option<String> {
    if api_key.is_empty() {
        return None;
    }
    let email_hash = hex::encode(Sha1::digest(email.as_bytes()));
    let salted = hex::encode(Md5::digest(format!("{password}{PASSWORD_SALT}").as_bytes()));
    let password_hash = hex::encode(Sha1::digest(salted.as_bytes()));
    Some(format!("{LOGIN_URL}?e={email_hash}&p={password_hash}&t={api_key}"))
}

/// Dashboard embedded in an `<iframe>`.
pub fn dashboard_iframe(api_key: &str, email: &str, password: &str) -> Option<String> {
    dashboard_url(api_key, email, password).map(|url| {
        format!("<iframe src=\"{url}\" width=\"100%\" height=\"1000\" frameborder=\"0\"></iframe>")
    })
}
