use reqwest::Url;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use interface::ScrapeError;

use super::client::SITE_ROOT;

/// xls 다운로드 링크를 표시하는 앵커 클래스 조합
const LINK_SELECTOR: &str = "a.accordeon-inner__item-title.link.xls[href]";
const UPLOAD_PREFIX: &str = "/upload";
/// 2022년 아카이브, 2023년 이전 불리틴은 수집하지 않는다
const EXCLUDED_PREFIX: &str = "/upload/reports/oil_xls/oil_xls_2022";

/// 목록 페이지 HTML에서 불리틴 다운로드 링크를 뽑아낸다
#[derive(Debug, Clone)]
pub struct LinkDiscoverer {
    selector: Selector,
    site_root: Url,
}

impl LinkDiscoverer {
    pub fn new() -> Result<Self, ScrapeError> {
        Self::with_site_root(SITE_ROOT)
    }

    pub fn with_site_root(site_root: &str) -> Result<Self, ScrapeError> {
        let selector =
            Selector::parse(LINK_SELECTOR).map_err(|e| ScrapeError::Html(e.to_string()))?;
        let site_root = Url::parse(site_root)
            .map_err(|e| ScrapeError::Other(format!("invalid site root {}: {}", site_root, e)))?;

        Ok(Self {
            selector,
            site_root,
        })
    }

    /// 링크가 없는 페이지는 빈 목록을 돌려준다 (에러 아님)
    pub fn discover(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);

        let links: Vec<String> = document
            .select(&self.selector)
            .filter_map(|a| a.value().attr("href"))
            .filter(|href| is_bulletin_href(href))
            .filter_map(|href| match self.site_root.join(href) {
                Ok(url) => Some(url.to_string()),
                Err(e) => {
                    warn!("Skipping unresolvable href {}: {}", href, e);
                    None
                }
            })
            .collect();

        debug!("Discovered {} bulletin links", links.len());
        links
    }
}

/// 업로드 경로 아래이면서 제외 아카이브가 아닌 href만 통과
pub fn is_bulletin_href(href: &str) -> bool {
    href.starts_with(UPLOAD_PREFIX) && !href.starts_with(EXCLUDED_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(anchors: &[(&str, &str)]) -> String {
        let body: String = anchors
            .iter()
            .map(|(class, href)| format!(r#"<a class="{}" href="{}">bulletin</a>"#, class, href))
            .collect();
        format!("<html><body><div class=\"accordeon-inner\">{}</div></body></html>", body)
    }

    const XLS_CLASS: &str = "accordeon-inner__item-title link xls";

    #[test]
    fn keeps_upload_links_and_resolves_them() {
        let html = page(&[
            (XLS_CLASS, "/upload/reports/oil_xls/oil_xls_20230315162000.xls?r=8447"),
            (XLS_CLASS, "/upload/reports/oil_xls/oil_xls_20230314162000.xls?r=3920"),
        ]);
        let links = LinkDiscoverer::new().unwrap().discover(&html);

        assert_eq!(
            links,
            vec![
                "https://spimex.com/upload/reports/oil_xls/oil_xls_20230315162000.xls?r=8447",
                "https://spimex.com/upload/reports/oil_xls/oil_xls_20230314162000.xls?r=3920",
            ]
        );
    }

    #[test]
    fn excludes_2022_archive() {
        let html = page(&[
            (XLS_CLASS, "/upload/reports/oil_xls/oil_xls_20221230162000.xls"),
            (XLS_CLASS, "/upload/reports/oil_xls/oil_xls_20230109162000.xls"),
        ]);
        let links = LinkDiscoverer::new().unwrap().discover(&html);

        assert_eq!(links.len(), 1);
        assert!(links[0].ends_with("oil_xls_20230109162000.xls"));
    }

    #[test]
    fn ignores_foreign_paths_and_classes() {
        let html = page(&[
            (XLS_CLASS, "/markets/oil_products/trades/results/"),
            ("accordeon-inner__item-title link pdf", "/upload/reports/oil_pdf/x.pdf"),
            ("link", "/upload/reports/oil_xls/oil_xls_20230109162000.xls"),
        ]);
        assert!(LinkDiscoverer::new().unwrap().discover(&html).is_empty());
    }

    #[test]
    fn page_without_anchors_is_empty() {
        let links = LinkDiscoverer::new()
            .unwrap()
            .discover("<html><body><p>Нет данных</p></body></html>");
        assert!(links.is_empty());
    }

    #[test]
    fn href_filter() {
        assert!(is_bulletin_href("/upload/reports/oil_xls/oil_xls_2023.xls"));
        assert!(!is_bulletin_href("/upload/reports/oil_xls/oil_xls_2022.xls"));
        assert!(!is_bulletin_href("/upload/reports/oil_xls/oil_xls_20221230.xls"));
        assert!(!is_bulletin_href("https://spimex.com/upload/x.xls"));
    }
}
