//! Define our own macro to simplify the code
//!

/// Call the HTTP client with the proper arguments
///
/// - unauth call to fetch token by submitting a form
///
#[macro_export]
macro_rules! http_post_form {
    ($self:ident, $url:expr, $form:expr) => {
        $self
            .client
            .post($url)
            .header(
                "user-agent",
                format!("{}/{}", crate_name!(), crate_version!()),
            )
            .form($form)
            .send()
    };
}

/// Call the HTTP client with the proper arguments
///
/// - auth call to fetch data with query parameters
///
#[macro_export]
macro_rules! http_get_auth {
    ($self:ident, $url:expr, $token:expr, $query:expr) => {
        $self
            .client
            .get($url)
            .header(
                "user-agent",
                format!("{}/{}", crate_name!(), crate_version!()),
            )
            .bearer_auth($token)
            .query($query)
            .send()
    };
}

/// Unauthenticated GET
///
#[macro_export]
macro_rules! http_get {
    ($self:ident, $url:expr) => {
        $self
            .client
            .get($url)
            .header(
                "user-agent",
                format!("{}/{}", crate_name!(), crate_version!()),
            )
            .send()
    };
}
