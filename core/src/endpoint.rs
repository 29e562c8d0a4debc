//! Endpoint alias resolution.
//!
//! # Design
//! The alias table is process-wide constant data. Resolution never fails: a
//! string that is not a known alias is taken to be a literal base URL, which
//! is how tests and private deployments point the client elsewhere.

/// Known endpoint aliases and the base URL each one stands for.
///
/// `runabove-ca` shares its URL with `runabove`.
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("ovh-eu", "https://eu.api.ovh.com/1.0"),
    ("ovh-ca", "https://ca.api.ovh.com/1.0"),
    ("kimsufi-eu", "https://eu.api.kimsufi.com/1.0"),
    ("kimsufi-ca", "https://ca.api.kimsufi.com/1.0"),
    ("soyoustart-eu", "https://eu.api.soyoustart.com/1.0"),
    ("soyoustart-ca", "https://ca.api.soyoustart.com/1.0"),
    ("runabove", "https://api.runabove.com/1.0"),
    ("runabove-ca", "https://api.runabove.com/1.0"),
];

/// Map an alias to its base URL, or return the input unchanged.
pub fn resolve(alias_or_url: &str) -> &str {
    ENDPOINTS
        .iter()
        .find(|(alias, _)| *alias == alias_or_url)
        .map(|(_, url)| *url)
        .unwrap_or(alias_or_url)
}

/// Whether `name` is one of the aliases in `ENDPOINTS`.
pub fn is_known_alias(name: &str) -> bool {
    ENDPOINTS.iter().any(|(alias, _)| *alias == name)
}

/// Alias names in table order.
pub fn known_aliases() -> impl Iterator<Item = &'static str> {
    ENDPOINTS.iter().map(|(alias, _)| *alias)
}
