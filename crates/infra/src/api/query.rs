//! URL construction for control API resources

use cloudapi_domain::constants::RESOURCE_SUFFIX;

/// Encode `key=value` pairs joined by `&`, percent-encoding keys and values.
pub fn encode_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// `endpoint + resource_path + ".json"`, with the query string appended when
/// there is one.
pub fn build_url(endpoint: &str, resource_path: &str, query: &[(String, String)]) -> String {
    let mut url = format!("{}{}{}", endpoint.trim_end_matches('/'), resource_path, RESOURCE_SUFFIX);
    if !query.is_empty() {
        url.push('?');
        url.push_str(&encode_query(query));
    }
    url
}
