//! `Link` response header parsing (RFC 8288)

use std::collections::HashMap;

/// Parse a `Link` header into a map of relation name to target URL.
///
/// `<https://a?page=2>; rel="next", <https://a?page=5>; rel="last"` yields
/// `{"next": "https://a?page=2", "last": "https://a?page=5"}`. A link whose
/// `rel` lists several space-separated relations is recorded under each.
/// Malformed segments are skipped.
pub fn parse_link_header(value: &str) -> HashMap<String, String> {
    let mut links = HashMap::new();
    let mut rest = value;

    while let Some(start) = rest.find('<') {
        let after_open = &rest[start + 1..];
        let Some(end) = after_open.find('>') else {
            break;
        };
        let url = after_open[..end].trim();
        let after_close = &after_open[end + 1..];

        // Parameters run until the next link target
        let params_end = after_close.find('<').unwrap_or(after_close.len());
        let params = &after_close[..params_end];
        rest = &after_close[params_end..];

        for param in params.split(';') {
            let param = param.trim().trim_end_matches(',').trim();
            let Some((name, value)) = param.split_once('=') else {
                continue;
            };
            if !name.trim().eq_ignore_ascii_case("rel") {
                continue;
            }
            for relation in value.trim().trim_matches('"').split_whitespace() {
                links.insert(relation.to_ascii_lowercase(), url.to_string());
            }
        }
    }

    links
}

/// URL of the `next` relation, if present
pub fn next_page(value: &str) -> Option<String> {
    parse_link_header(value).remove("next")
}
