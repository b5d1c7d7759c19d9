use url::Url;

use super::path::DocumentPath;

pub const DEFAULT_DOCS_URL: &str = "https://experienceleague.adobe.com/en/docs/analytics";
pub const DEFAULT_SOURCE_URL: &str = "https://github.com/AdobeDocs";
const DEFAULT_SOURCE_EXTENSION: &str = "md";

#[derive(Debug)]
pub struct ProductRoute {
    pub product: &'static str,
    pub prefixes: &'static [&'static str],
    pub strip_segments: &'static [&'static str],
    pub docs_base: &'static str,
    pub source_base: &'static str,
}

pub const PRODUCT_ROUTES: &[ProductRoute] = &[
    ProductRoute {
        product: "Adobe Analytics",
        prefixes: &["adobe-docs/adobe-analytics/", "analytics.en/"],
        strip_segments: &["help/"],
        docs_base: "https://experienceleague.adobe.com/en/docs/analytics",
        source_base: "https://github.com/AdobeDocs/analytics.en/blob/master",
    },
    ProductRoute {
        product: "Customer Journey Analytics",
        prefixes: &[
            "adobe-docs/customer-journey-analytics/",
            "analytics-platform.en/",
        ],
        strip_segments: &["help/cja-main/", "help/"],
        docs_base: "https://experienceleague.adobe.com/en/docs/analytics-platform",
        source_base: "https://github.com/AdobeDocs/analytics-platform.en/blob/master",
    },
    ProductRoute {
        product: "Adobe Experience Platform",
        prefixes: &[
            "adobe-docs/experience-platform/",
            "experience-platform.en/",
            "aep/",
        ],
        strip_segments: &["help/"],
        docs_base: "https://experienceleague.adobe.com/en/docs/experience-platform",
        source_base: "https://github.com/AdobeDocs/experience-platform.en/blob/master",
    },
    ProductRoute {
        product: "Analytics APIs",
        prefixes: &["adobe-docs/analytics-apis/", "analytics-2.0-apis/"],
        strip_segments: &["docs/"],
        docs_base: "https://developer.adobe.com/analytics-apis/docs",
        source_base: "https://github.com/AdobeDocs/analytics-2.0-apis/blob/master",
    },
];

#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'static ProductRoute,
    pub relative: &'a str,
}

impl RouteMatch<'_> {
    pub fn docs_url(&self) -> String {
        let published = self
            .route
            .strip_segments
            .iter()
            .find_map(|segment| self.relative.strip_prefix(segment))
            .unwrap_or(self.relative);
        join_segments(self.route.docs_base, published, None)
            .unwrap_or_else(|| DEFAULT_DOCS_URL.to_string())
    }

    pub fn source_url(&self, extension: Option<&str>) -> String {
        join_source(self.route.source_base, self.relative, extension)
    }
}

pub fn match_route(normalized: &str) -> Option<RouteMatch<'_>> {
    PRODUCT_ROUTES.iter().find_map(|route| {
        route.prefixes.iter().find_map(|prefix| {
            normalized
                .strip_prefix(prefix)
                .map(|relative| RouteMatch { route, relative })
        })
    })
}

pub fn source_url_for(path: &DocumentPath) -> String {
    match match_route(path.normalized()) {
        Some(matched) => matched.source_url(path.extension()),
        None => join_source(DEFAULT_SOURCE_URL, path.normalized(), path.extension()),
    }
}

fn join_source(base: &str, relative: &str, extension: Option<&str>) -> String {
    join_segments(
        base,
        relative,
        Some(extension.unwrap_or(DEFAULT_SOURCE_EXTENSION)),
    )
    .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string())
}

// Segments are decoded text; `Url` re-encodes each one, so a `?`, space or
// `%` in a file name stays inside the path.
fn join_segments(base: &str, relative: &str, extension: Option<&str>) -> Option<String> {
    let mut url = Url::parse(base).ok()?;
    let mut segments = relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(ToOwned::to_owned)
        .collect::<Vec<String>>();
    if let (Some(last), Some(extension)) = (segments.last_mut(), extension) {
        last.push('.');
        last.push_str(extension);
    }

    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(&segments);
    Some(url.as_str().to_owned())
}
