//! Pagination metadata from PandaScore response headers.
//!
//! The API advertises neighbouring pages through an RFC 5988 `Link` header and
//! the total item count through `X-Total`. Either may be missing.

use reqwest::Url;
use reqwest::header::HeaderMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub page: u32,
    pub per_page: u32,
    pub has_next: bool,
    pub has_prev: bool,
    pub next_page: Option<u32>,
    pub prev_page: Option<u32>,
    pub last_page: Option<u32>,
    pub total: Option<u64>,
    pub total_pages: Option<u32>,
}

impl PageInfo {
    /// Info for a locally synthesized single page (no request was issued).
    pub fn single(page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            total: Some(0),
            total_pages: Some(1),
            ..Default::default()
        }
    }

    pub fn from_headers(headers: &HeaderMap, page: u32, per_page: u32) -> Self {
        let link = headers
            .get(reqwest::header::LINK)
            .and_then(|v| v.to_str().ok());
        let total = headers
            .get("x-total")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        Self::from_parts(link, total, page, per_page)
    }

    pub fn from_parts(link: Option<&str>, total: Option<u64>, page: u32, per_page: u32) -> Self {
        let links = link.map(parse_link_header).unwrap_or_default();

        let total_pages = links.last_page.or_else(|| match total {
            Some(t) if t > 0 && per_page > 0 => Some(t.div_ceil(u64::from(per_page)) as u32),
            _ => None,
        });

        let has_prev = links.has_prev || total_pages.is_some_and(|_| page > 1);
        let has_next = links.has_next || total_pages.is_some_and(|tp| page < tp);

        Self {
            page,
            per_page,
            has_next,
            has_prev,
            next_page: links.next_page,
            prev_page: links.prev_page,
            last_page: links.last_page,
            total,
            total_pages,
        }
    }
}

/// One page of items plus the metadata needed to navigate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}

impl<T> Page<T> {
    pub fn empty(page: u32, per_page: u32) -> Self {
        Self { items: Vec::new(), info: PageInfo::single(page, per_page) }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page { items: self.items.into_iter().map(f).collect(), info: self.info }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRels {
    pub has_next: bool,
    pub has_prev: bool,
    pub next_page: Option<u32>,
    pub prev_page: Option<u32>,
    pub last_page: Option<u32>,
}

/// Parse `<https://…?page=2>; rel="next", <…>; rel="last"`.
/// Entries that don't look like `<url>; rel="name"` are skipped.
pub fn parse_link_header(link: &str) -> LinkRels {
    let mut out = LinkRels::default();

    for part in link.split(',') {
        let Some((target, params)) = part.trim().split_once(';') else {
            continue;
        };
        let Some(url) = target
            .trim()
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
        else {
            continue;
        };
        let Some(rel) = params.split(';').find_map(|p| {
            let (key, value) = p.trim().split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("rel")
                .then(|| value.trim().trim_matches('"').to_ascii_lowercase())
        }) else {
            continue;
        };

        let page_num = page_from_url(url);
        match rel.as_str() {
            "next" => {
                out.has_next = true;
                out.next_page = page_num;
            }
            "prev" => {
                out.has_prev = true;
                out.prev_page = page_num;
            }
            "last" => out.last_page = page_num,
            _ => {}
        }
    }

    out
}

fn page_from_url(url: &str) -> Option<u32> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(k, _)| k == "page")
        .and_then(|(_, v)| v.parse::<u32>().ok())
}
