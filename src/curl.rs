//! cURL import/export.
//!
//! Decoding is a set of independent pattern rules run over the normalized
//! command, so flags may appear in any order and unknown flags are ignored.
//! Line continuations are joined first; the data rule then reads quoted
//! bodies with their own newlines intact, the other rules see one line.
//! Rule precedence:
//! 1. an explicit `-X`/`--request` method always wins;
//! 2. the first `http(s)://` token that is not a `-x`/`--proxy` argument is the url;
//! 3. every `-H`/`--header` clause with a `key: value` string is a header;
//! 4. the first data clause is the raw body and implies POST unless rule 1 matched.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{BodyType, Header, HttpMethod, HttpRequest, LoggedRequest, RequestDraft};

const LINE_BREAK: &str = " \\\n  ";

fn line_continuation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\\r?\n").unwrap())
}

fn line_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\r\n]+").unwrap())
}

// Flag is case-sensitive (`-x` is curl's proxy flag), the method token is not.
fn method_rule() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:-X|--request)\s+([A-Za-z]+)").unwrap())
}

fn proxy_flag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?:^|\s)(?:-x|--proxy)\s+['"]?$"#).unwrap())
}

fn url_rule() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)https?://[^\s'"]+"#).unwrap())
}

// Quoted argument: single-quoted (may contain the '\'' splice) or double-quoted.
fn header_rule() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:-H|--header)\s+(?:'((?:[^']|'\\'')*)'|"([^"]*)")"#).unwrap()
    })
}

fn data_rule() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?:--data-raw|--data-binary|--data-urlencode|--data|-d)\s+(?:'((?:[^']|'\\'')*)'|"([^"]*)")"#,
        )
        .unwrap()
    })
}

/// Whether the input starts with the `curl` token
pub fn looks_like_curl(input: &str) -> bool {
    let trimmed = input.trim_start();
    match trimmed.get(..4) {
        Some(head) if head.eq_ignore_ascii_case("curl") => trimmed[4..]
            .chars()
            .next()
            .map_or(true, char::is_whitespace),
        _ => false,
    }
}

/// Parse a cURL command into a request draft.
///
/// Returns `None` only when the input is not a curl command. Anything that
/// cannot be located (url, headers, body) is left at its default.
pub fn parse_curl(input: &str) -> Option<RequestDraft> {
    if !looks_like_curl(input) {
        tracing::debug!("Input is not a curl command");
        return None;
    }

    let joined = line_continuation().replace_all(input, " ");
    let joined = joined.trim();
    let command = line_break().replace_all(joined, " ");
    let command: &str = &command;

    let mut draft = RequestDraft {
        method: HttpMethod::GET,
        body_type: BodyType::Raw,
        ..RequestDraft::default()
    };

    let explicit_method = method_rule().captures(command).map(|c| c[1].to_uppercase());
    if let Some(method) = &explicit_method {
        draft.method = HttpMethod::parse(method);
    }

    if let Some(m) = url_rule()
        .find_iter(command)
        .find(|m| !proxy_flag().is_match(&command[..m.start()]))
    {
        draft.url = Some(strip_quotes(m.as_str()).to_string());
    }

    for caps in header_rule().captures_iter(command) {
        if let Some(header) = parse_header(&quoted_argument(&caps)) {
            draft.headers.push(header);
        }
    }

    if let Some(caps) = data_rule().captures(joined) {
        draft.body_raw = quoted_argument(&caps);
        draft.body_type = BodyType::Raw;
        if explicit_method.is_none() {
            draft.method = HttpMethod::POST;
        }
    }

    tracing::debug!(
        method = %draft.method,
        url = ?draft.url,
        headers = draft.headers.len(),
        "Parsed curl command"
    );
    Some(draft)
}

fn strip_quotes(s: &str) -> &str {
    let s = s.strip_prefix(['\'', '"']).unwrap_or(s);
    s.strip_suffix(['\'', '"']).unwrap_or(s)
}

/// Content of a quoted argument matched by the header or data rule
fn quoted_argument(caps: &regex::Captures<'_>) -> String {
    if let Some(single) = caps.get(1) {
        single.as_str().replace("'\\''", "'")
    } else {
        caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default()
    }
}

/// Split `key: value` on the first colon. Strings without a key are skipped.
fn parse_header(s: &str) -> Option<Header> {
    let (key, value) = s.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some(Header::new(key, value.trim()))
}

fn quote_body(body: &str) -> String {
    format!("'{}'", body.replace('\'', "'\\''"))
}

/// Anything that can be rendered as a cURL command
pub trait ToCurl {
    fn to_curl(&self) -> String;
}

/// Format a saved or captured request as a cURL command
pub fn to_curl<T: ToCurl + ?Sized>(source: &T) -> String {
    source.to_curl()
}

impl ToCurl for HttpRequest {
    fn to_curl(&self) -> String {
        let mut parts = vec![format!("curl -X {} '{}'", self.method, self.url)];

        for header in self.headers.iter().filter(|h| h.is_active()) {
            parts.push(format!("-H '{}: {}'", header.key, header.value));
        }

        if self.method.sends_body() {
            match self.body_type {
                BodyType::Raw if !self.body_raw.is_empty() => {
                    parts.push(format!("--data-raw {}", quote_body(&self.body_raw)));
                }
                BodyType::FormUrlEncoded => {
                    for field in self.body_form.iter().filter(|f| f.is_active()) {
                        parts.push(format!("--data '{}={}'", field.key, field.value));
                    }
                }
                _ => {}
            }
        }

        parts.join(LINE_BREAK)
    }
}

impl ToCurl for LoggedRequest {
    fn to_curl(&self) -> String {
        let mut parts = vec![format!("curl -X {} '{}'", self.method, self.url)];

        for (key, value) in &self.request_headers {
            parts.push(format!("-H '{}: {}'", key, value));
        }

        // Captures reflect what was sent, so the method does not gate the body.
        if let Some(body) = self.body_text() {
            parts.push(format!("--data-raw {}", quote_body(&body)));
        }

        parts.join(LINE_BREAK)
    }
}
