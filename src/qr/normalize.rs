use std::sync::LazyLock;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::{Captures, Regex};
use url::{Url, form_urlencoded};

use super::{CanonicalQrUrl, DEFAULT_HOST, DEFAULT_PATH, DEFAULT_SCHEME, QR_BASE_URL};

/// Query parameter order used by the SET QR verification URL. Anything else
/// follows in the order it was first seen.
pub const PARAM_ORDER: [&str; 10] = [
    "nVersion",
    "Id",
    "dFeEmiDE",
    "dRucRec",
    "dTotGralOpe",
    "dTotIVA",
    "cItems",
    "DigestValue",
    "IdCSC",
    "cHashQR",
];

/// RFC 3986 unreserved characters stay literal, everything else is encoded.
const RFC3986: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z]+);").expect("entity pattern")
});
static AMP_SEMICOLONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&;+").expect("separator pattern"));
static SEMICOLON_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r";([A-Za-z_][A-Za-z0-9_]*=)").expect("parameter pattern")
});
static AMP_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&{2,}").expect("run pattern"));

/// Turn a raw `dCarQR` value into a canonical verification URL.
///
/// Never fails: entity-encoded separators, `&;` and `;name=` separators,
/// duplicated `&`, and a missing scheme/host are all repaired, and the
/// query is rebuilt in [`PARAM_ORDER`]. Normalizing the output again
/// returns it unchanged.
///
/// ```
/// let url = kude::qr::normalize("nVersion=150;Id=0180069&amp;cHashQR=ab");
/// assert_eq!(
///     url.as_str(),
///     "https://ekuatia.set.gov.py/consultas/qr?nVersion=150&Id=0180069&cHashQR=ab"
/// );
/// ```
pub fn normalize(raw: &str) -> CanonicalQrUrl {
    let repaired = repair_separators(&decode_entities(raw));
    let with_base = backfill_base(repaired);
    CanonicalQrUrl(rebuild(&with_base))
}

/// Decode the XML predefined entities and numeric character references.
/// Unknown entities are left as they are.
fn decode_entities(s: &str) -> String {
    ENTITY
        .replace_all(s, |caps: &Captures| {
            let body = &caps[1];
            let decoded = match body {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => numeric_reference(body),
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn numeric_reference(body: &str) -> Option<char> {
    let code = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        body.strip_prefix('#')?.parse().ok()?
    };
    char::from_u32(code).filter(|c| *c != '\0')
}

fn repair_separators(s: &str) -> String {
    let s = s.replace("&amp;", "&");
    let s = AMP_SEMICOLONS.replace_all(&s, "&");
    let s = SEMICOLON_PARAM.replace_all(&s, "&$1");
    let s = AMP_RUN.replace_all(&s, "&");
    s.replace("?&", "?").trim().to_string()
}

/// Prefix the SET base URL when the value is a bare query string.
fn backfill_base(s: String) -> String {
    if parse_with_host(&s).is_none() && s.contains("nVersion=") {
        format!("{QR_BASE_URL}?{}", s.trim_start_matches(['?', '&']))
    } else {
        s
    }
}

/// Parse as an absolute URL with a usable host.
///
/// Hosts containing `&` or `;` are rejected so that separator repair can
/// never change them on a second pass.
fn parse_with_host(s: &str) -> Option<Url> {
    let url = Url::parse(s).ok()?;
    let usable = url
        .host_str()
        .is_some_and(|h| !h.is_empty() && !h.contains(['&', ';']));
    usable.then_some(url)
}

fn rebuild(s: &str) -> String {
    let (scheme, host, path, query) = match parse_with_host(s) {
        Some(url) => {
            let path = match url.path() {
                "" => DEFAULT_PATH.to_string(),
                p => p.replace('&', "%26").replace(';', "%3B"),
            };
            (
                url.scheme().to_string(),
                url.host_str().unwrap_or(DEFAULT_HOST).to_string(),
                path,
                url.query().unwrap_or("").to_string(),
            )
        }
        None => (
            DEFAULT_SCHEME.to_string(),
            DEFAULT_HOST.to_string(),
            DEFAULT_PATH.to_string(),
            bare_query(s).to_string(),
        ),
    };

    let query = encode_query(&order_params(parse_query(&query)));
    if query.is_empty() {
        format!("{scheme}://{host}{path}")
    } else {
        format!("{scheme}://{host}{path}?{query}")
    }
}

/// The part after the first `?`, without any fragment.
fn bare_query(s: &str) -> &str {
    let Some((_, query)) = s.split_once('?') else {
        return "";
    };
    query.split_once('#').map_or(query, |(q, _)| q)
}

/// Decoded parameters grouped by key, keys in first-seen order.
fn parse_query(query: &str) -> Vec<(String, Vec<String>)> {
    let mut params: Vec<(String, Vec<String>)> = Vec::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match params.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value.into_owned()),
            None => params.push((key.into_owned(), vec![value.into_owned()])),
        }
    }
    params
}

fn order_params(mut params: Vec<(String, Vec<String>)>) -> Vec<(String, Vec<String>)> {
    let mut ordered = Vec::with_capacity(params.len());
    for name in PARAM_ORDER {
        if let Some(pos) = params.iter().position(|(k, _)| k == name) {
            ordered.push(params.remove(pos));
        }
    }
    ordered.extend(params);
    ordered
}

fn encode_query(params: &[(String, Vec<String>)]) -> String {
    let mut pairs = Vec::new();
    for (key, values) in params {
        for value in values {
            pairs.push(format!(
                "{}={}",
                utf8_percent_encode(key, RFC3986),
                utf8_percent_encode(value, RFC3986)
            ));
        }
    }
    pairs.join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_xml_entities() {
        assert_eq!(decode_entities("a=1&amp;b=2"), "a=1&b=2");
        assert_eq!(decode_entities("&lt;x&gt; &quot;&apos;"), "<x> \"'");
        assert_eq!(decode_entities("&#38;&#x26;"), "&&");
        assert_eq!(decode_entities("&nbsp;"), "&nbsp;");
        assert_eq!(decode_entities("&#0;"), "&#0;");
        assert_eq!(decode_entities("&amp;amp;"), "&amp;");
    }

    #[test]
    fn repairs_separators() {
        assert_eq!(repair_separators("a=1&;b=2"), "a=1&b=2");
        assert_eq!(repair_separators("a=1&;;;b=2"), "a=1&b=2");
        assert_eq!(repair_separators("a=1;b=2"), "a=1&b=2");
        assert_eq!(repair_separators("a=1;b=2;_c9=3"), "a=1&b=2&_c9=3");
        assert_eq!(repair_separators("a=x;y"), "a=x;y");
        assert_eq!(repair_separators("a=1&&&b=2"), "a=1&b=2");
        assert_eq!(repair_separators("p?&a=1"), "p?a=1");
        assert_eq!(repair_separators("  p?a=1 \n"), "p?a=1");
    }

    #[test]
    fn backfills_only_sifen_queries() {
        assert_eq!(
            backfill_base("?&nVersion=150".into()),
            "https://ekuatia.set.gov.py/consultas/qr?nVersion=150"
        );
        assert_eq!(backfill_base("a=1".into()), "a=1");
        assert_eq!(
            backfill_base("https://h/p?nVersion=1".into()),
            "https://h/p?nVersion=1"
        );
    }

    #[test]
    fn repeated_keys_stay_together() {
        let params = order_params(parse_query("x=1&Id=A&x=2"));
        assert_eq!(encode_query(&params), "Id=A&x=1&x=2");
    }

    #[test]
    fn encodes_per_rfc3986() {
        let params = vec![("k".to_string(), vec!["a b/c+d~e".to_string()])];
        assert_eq!(encode_query(&params), "k=a%20b%2Fc%2Bd~e");
    }

    #[test]
    fn bare_query_ignores_fragment() {
        assert_eq!(bare_query("x?a=1#frag"), "a=1");
        assert_eq!(bare_query("no-query"), "");
    }

    #[test]
    fn rejects_hosts_with_separators() {
        assert!(parse_with_host("https://a&b/p").is_none());
        assert!(parse_with_host("https://ekuatia.set.gov.py/p").is_some());
        assert!(parse_with_host("mailto:x@y").is_none());
    }
}
