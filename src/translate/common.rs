/// Convert language code to full language name for clearer prompts
pub fn language_code_to_name(code: &str) -> String {
    match code.to_lowercase().as_str() {
        "ja" => "Japanese".to_string(),
        "ko" => "Korean".to_string(),
        "zh" | "zh-cn" | "zh-hans" => "Simplified Chinese".to_string(),
        "zh-tw" | "zh-hant" => "Traditional Chinese".to_string(),
        "en" => "English".to_string(),
        "fr" => "French".to_string(),
        "de" => "German".to_string(),
        "es" => "Spanish".to_string(),
        "it" => "Italian".to_string(),
        "pt" => "Portuguese".to_string(),
        "ru" => "Russian".to_string(),
        "ar" => "Arabic".to_string(),
        "hi" => "Hindi".to_string(),
        "th" => "Thai".to_string(),
        "vi" => "Vietnamese".to_string(),
        "id" => "Indonesian".to_string(),
        _ => code.to_string(),
    }
}

/// Normalize a language code to the `xx` / `xx-YY` casing web translation APIs expect
pub fn normalize_language_code(code: &str) -> String {
    match code.split_once(|c: char| c == '-' || c == '_') {
        Some((language, region)) => format!("{}-{}", language.to_lowercase(), region.to_uppercase()),
        None => code.to_lowercase(),
    }
}

/// Strip common wrapping an LLM puts around a bare translation
pub fn clean_translation_response(response: &str) -> String {
    let mut cleaned = response.trim();

    for prefix in ["Translation:", "Translated text:", "Here is the translation:"] {
        if let Some(rest) = cleaned.strip_prefix(prefix) {
            cleaned = rest.trim_start();
        }
    }

    for (open, close) in [('"', '"'), ('「', '」'), ('“', '”')] {
        if cleaned.len() >= open.len_utf8() + close.len_utf8()
            && cleaned.starts_with(open)
            && cleaned.ends_with(close)
        {
            cleaned = &cleaned[open.len_utf8()..cleaned.len() - close.len_utf8()];
        }
    }

    cleaned.trim().to_string()
}
