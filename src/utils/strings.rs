/// Splits a dotted path into its components, skipping empty segments.
pub fn tokenize_path(path: &str) -> Vec<&str> {
    path.split('.').filter(|part| !part.is_empty()).collect()
}

pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn decapitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `["subject", "reference"]` -> `SubjectReference`
pub fn path_to_upper_camel_case(parts: &[&str]) -> String {
    parts.iter().map(|part| capitalize(part)).collect()
}

/// `["Encounter", "reasonCode"]` -> `encounterReasonCode`
pub fn path_to_lower_camel_case(parts: &[&str]) -> String {
    decapitalize(&path_to_upper_camel_case(parts))
}
