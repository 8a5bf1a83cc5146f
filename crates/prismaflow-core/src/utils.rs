use regex::Regex;
use url::Url;

pub const BLANK_URL: &str = "about:blank";

fn html_ctrl_entity_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)&(newline|tab);").expect("valid regex"))
}

fn thousands_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,3}(,\d{3})+$").expect("valid regex"))
}

/// Drops `,` group separators from a count such as `1,024`; other text is returned as-is.
pub(crate) fn strip_thousands(raw: &str) -> std::borrow::Cow<'_, str> {
    if thousands_regex().is_match(raw) {
        raw.replace(',', "").into()
    } else {
        raw.into()
    }
}

fn is_ctrl_character_like(ch: char) -> bool {
    matches!(ch,
        '\u{0000}'..='\u{001F}'
        | '\u{007F}'..='\u{009F}'
        | '\u{2000}'..='\u{200D}'
        | '\u{FEFF}'
    )
}

fn strip_ctrl_characters_like(input: &str) -> String {
    input
        .chars()
        .filter(|&ch| !is_ctrl_character_like(ch))
        .collect()
}

fn decode_uri_component_like(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());

    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 2 >= bytes.len() {
                return input.to_string();
            }
            let (Some(hi), Some(lo)) = (from_hex_byte(bytes[i + 1]), from_hex_byte(bytes[i + 2]))
            else {
                return input.to_string();
            };
            out.push((hi << 4) | lo);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8(out).unwrap_or_else(|_| input.to_string())
}

fn from_hex_byte(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn url_scheme_like(input: &str) -> Option<&str> {
    input.find(':').map(|idx| &input[..=idx])
}

fn is_invalid_protocol_like(url_scheme: &str) -> bool {
    let lower = url_scheme.to_ascii_lowercase();
    let trimmed = lower.trim();
    let trimmed = trimmed.trim_start_matches(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'));

    trimmed.starts_with("javascript")
        || trimmed.starts_with("data")
        || trimmed.starts_with("vbscript")
}

/// Makes a template URL safe to place in an `href`.
///
/// Script-bearing schemes (`javascript:`, `data:`, `vbscript:`) and unparsable http(s) URLs
/// collapse to [`BLANK_URL`]; relative paths and other schemes pass through.
pub fn sanitize_url(url: &str) -> String {
    let decoded = decode_uri_component_like(url.trim());
    let decoded = html_ctrl_entity_regex().replace_all(&decoded, "");
    let sanitized = strip_ctrl_characters_like(&decoded).trim().to_string();
    if sanitized.is_empty() {
        return BLANK_URL.to_string();
    }

    if matches!(sanitized.as_bytes().first(), Some(b'.' | b'/' | b'#')) {
        return sanitized;
    }

    let Some(url_scheme) = url_scheme_like(&sanitized) else {
        return sanitized;
    };
    let url_scheme = url_scheme.to_ascii_lowercase();

    if is_invalid_protocol_like(&url_scheme) {
        return BLANK_URL.to_string();
    }

    let back_sanitized = sanitized.replace('\\', "/");

    if url_scheme == "http:" || url_scheme == "https:" {
        let Ok(parsed) = Url::parse(&back_sanitized) else {
            return BLANK_URL.to_string();
        };
        return parsed.to_string();
    }

    back_sanitized
}
