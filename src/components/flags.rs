const REGIONAL_INDICATOR_A: u32 = 0x1F1E6;

/// ISO 3166-1 alpha-2 code to its flag emoji. Anything else yields "".
pub fn country_flag(code: &str) -> String {
    let cc = code.trim().to_ascii_uppercase();
    if cc.len() != 2 || !cc.bytes().all(|b| b.is_ascii_uppercase()) {
        return String::new();
    }
    cc.bytes()
        .filter_map(|b| char::from_u32(REGIONAL_INDICATOR_A + u32::from(b - b'A')))
        .collect()
}

/// Flag followed by the code, or the placeholder when unknown.
pub fn country_label(code: Option<&str>) -> String {
    match code.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => {
            let flag = country_flag(c);
            if flag.is_empty() { c.to_string() } else { format!("{flag} {c}") }
        }
        None => crate::state::app_state::MISSING.to_string(),
    }
}
