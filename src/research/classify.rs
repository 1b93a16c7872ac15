//! Source category classification by URL host.

use crate::research::model::SourceCategory;

/// Host keywords per category, checked in this order.
const CATEGORY_KEYWORDS: &[(SourceCategory, &[&str])] = &[
    (
        SourceCategory::News,
        &[
            "reuters",
            "spiegel",
            "zeit",
            "bbc",
            "aljazeera",
            "tagesschau",
            "sueddeutsche",
            "faz.net",
            "propublica",
            "theintercept",
            "correctiv",
            "bellingcat",
        ],
    ),
    (
        SourceCategory::Science,
        &[
            "scholar",
            "ncbi",
            "arxiv",
            "doaj",
            "core.ac.uk",
            "openaire",
            "researchgate",
        ],
    ),
    (
        SourceCategory::Government,
        &[
            "bundesregierung",
            "bundestag",
            "europarl",
            "gov.",
            "whitehouse",
            "congress.gov",
            "data.gov",
        ],
    ),
    (
        SourceCategory::Legal,
        &["gericht", "eur-lex", "justia", "hudoc"],
    ),
    (
        SourceCategory::Archive,
        &["archive", "europeana", "dnb.de", "loc.gov"],
    ),
    (
        SourceCategory::Multimedia,
        &[
            "youtube",
            "vimeo",
            "arte",
            "phoenix.de",
            "c-span",
            "mediathek",
        ],
    ),
];

/// Classify a source by substring matching on its lower-cased host.
///
/// Unparseable URLs are matched on their raw lower-cased text. Anything that
/// matches no keyword is news.
pub fn determine_source_type(url: &str) -> SourceCategory {
    let host = reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_lowercase))
        .unwrap_or_else(|| url.to_lowercase());

    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| host.contains(keyword)))
        .map(|(category, _)| *category)
        .unwrap_or(SourceCategory::News)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://www.reuters.com/world/", SourceCategory::News)]
    #[case("https://arxiv.org/abs/2401.00001", SourceCategory::Science)]
    #[case("https://www.ncbi.nlm.nih.gov/pmc/", SourceCategory::Science)]
    #[case("https://www.bundestag.de/dokumente", SourceCategory::Government)]
    #[case("https://www.gov.uk/guidance", SourceCategory::Government)]
    #[case("https://eur-lex.europa.eu/legal-content", SourceCategory::Legal)]
    #[case("https://www.bundesverfassungsgericht.de/", SourceCategory::Legal)]
    #[case("https://web.archive.org/web/2020/", SourceCategory::Archive)]
    #[case("https://www.youtube.com/watch?v=abc", SourceCategory::Multimedia)]
    #[case("https://www.arte.tv/de/", SourceCategory::Multimedia)]
    #[case("https://example.com/post", SourceCategory::News)]
    fn test_classification(#[case] url: &str, #[case] expected: SourceCategory) {
        assert_eq!(determine_source_type(url), expected);
    }

    #[test]
    fn test_only_host_is_considered() {
        // "arxiv" in the path must not make this a science source
        assert_eq!(
            determine_source_type("https://example.com/arxiv/youtube"),
            SourceCategory::News
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            determine_source_type("https://WWW.YOUTUBE.COM/"),
            SourceCategory::Multimedia
        );
    }

    #[test]
    fn test_unparseable_url_falls_back_to_raw_text() {
        assert_eq!(
            determine_source_type("vimeo.com/12345"),
            SourceCategory::Multimedia
        );
        assert_eq!(determine_source_type(""), SourceCategory::News);
    }

    #[test]
    fn test_classification_is_pure() {
        let url = "https://scholar.google.com/scholar?q=rust";
        assert_eq!(determine_source_type(url), determine_source_type(url));
    }
}
