use std::collections::HashMap;

/// Parses an `application/x-www-form-urlencoded` body. Repeated keys keep
/// every value in submission order.
pub fn parse_urlencoded_body(body: &axum::body::Bytes) -> HashMap<String, Vec<String>> {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    let raw = String::from_utf8_lossy(body);
    for pair in raw.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, val) = pair.split_once('=').unwrap_or((pair, ""));
        map.entry(decode_component(key)).or_default().push(decode_component(val));
    }
    map
}

fn decode_component(raw: &str) -> String {
    // browsers send spaces as '+'; a literal plus arrives as %2B
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
