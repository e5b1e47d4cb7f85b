/// Reads a checkbox or env style flag. Blank or missing values yield `default`;
/// anything other than `1`, `true`, `yes` or `on` is false.
pub fn parse_flag(value: Option<&String>, default: bool) -> bool {
    let Some(v) = value else {
        return default;
    };
    let t = v.trim().to_ascii_lowercase();
    if t.is_empty() {
        return default;
    }
    matches!(t.as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_values() {
        for raw in ["1", "true", " YES ", "on"] {
            assert!(parse_flag(Some(&raw.to_string()), false), "{raw}");
        }
    }

    #[test]
    fn falsy_and_blank_values() {
        assert!(!parse_flag(Some(&"0".to_string()), true));
        assert!(!parse_flag(Some(&"off".to_string()), true));
        assert!(parse_flag(Some(&"  ".to_string()), true));
        assert!(!parse_flag(None, false));
    }
}
