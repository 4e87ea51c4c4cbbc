//! Page routing and the HTML shell served for each page.
//!
//! Page bodies are rendered client-side; the server only commits to the
//! document language, the localized title and the cross-language links.

use crate::i18n::{all_localized_urls, localize_url, Language, Message};
use crate::lifetime_discount::LIFETIME_DISCOUNT_PRICE;
use crate::wizard::{package_url, price_table, BillingPeriod, PackageTier, Wizard, WizardQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    Connections,
    Jobs,
    Partners,
    Products,
    Pricing,
    Package,
    Contact,
    Faq,
    PrivacyPolicy,
    TermsAndConditions,
    TermsSellers,
    LifetimeDiscountGroup,
}

impl Page {
    pub const ALL: [Page; 13] = [
        Page::Home,
        Page::Connections,
        Page::Jobs,
        Page::Partners,
        Page::Products,
        Page::Pricing,
        Page::Package,
        Page::Contact,
        Page::Faq,
        Page::PrivacyPolicy,
        Page::TermsAndConditions,
        Page::TermsSellers,
        Page::LifetimeDiscountGroup,
    ];

    /// First path segment of the page; empty for the home page.
    pub fn segment(self) -> &'static str {
        match self {
            Page::Home => "",
            Page::Connections => "connections",
            Page::Jobs => "jobs",
            Page::Partners => "partners",
            Page::Products => "products",
            Page::Pricing => "pricing",
            Page::Package => "package",
            Page::Contact => "contact",
            Page::Faq => "faq",
            Page::PrivacyPolicy => "privacy-policy",
            Page::TermsAndConditions => "terms-and-conditions",
            Page::TermsSellers => "terms-sellers",
            Page::LifetimeDiscountGroup => "lifetime-discount-group",
        }
    }

    pub fn title(self) -> Message {
        match self {
            Page::Home => Message::PageHome,
            Page::Connections => Message::PageConnections,
            Page::Jobs => Message::PageJobs,
            Page::Partners => Message::PagePartners,
            Page::Products => Message::PageProducts,
            Page::Pricing => Message::PagePricing,
            Page::Package => Message::PagePackage,
            Page::Contact => Message::PageContact,
            Page::Faq => Message::PageFaq,
            Page::PrivacyPolicy => Message::PagePrivacyPolicy,
            Page::TermsAndConditions => Message::PageTerms,
            Page::TermsSellers => Message::PageTermsSellers,
            Page::LifetimeDiscountGroup => Message::PageLifetimeDiscount,
        }
    }

    fn accepts_slug(self) -> bool {
        self == Page::Products
    }
}

/// A matched page and, for product pages, the product slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRoute {
    pub page: Page,
    pub slug: Option<String>,
}

impl PageRoute {
    /// Match a language-neutral path. Segments compare case-insensitively and
    /// a trailing slash is ignored; the slug keeps its original case.
    pub fn from_path(neutral: &str) -> Option<PageRoute> {
        let segments: Vec<&str> = neutral.split('/').filter(|s| !s.is_empty()).collect();

        let (first, slug) = match segments.as_slice() {
            [] => {
                return Some(PageRoute {
                    page: Page::Home,
                    slug: None,
                })
            }
            [first] => (*first, None),
            [first, slug] => (*first, Some(*slug)),
            _ => return None,
        };

        let page = Page::ALL
            .into_iter()
            .filter(|page| *page != Page::Home)
            .find(|page| page.segment().eq_ignore_ascii_case(first))?;

        if slug.is_some() && !page.accepts_slug() {
            return None;
        }

        Some(PageRoute {
            page,
            slug: slug.map(str::to_string),
        })
    }

    /// Neutral path of this route, in canonical lowercase form.
    pub fn path(&self) -> String {
        match (&self.slug, self.page) {
            (_, Page::Home) => "/".to_string(),
            (Some(slug), page) => format!("/{}/{}", page.segment(), slug),
            (None, page) => format!("/{}", page.segment()),
        }
    }
}

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Render the document shell for a page, or the localized 404 shell when
/// `route` is `None`. The package page carries the wizard's initial stage.
pub fn render_page(
    route: Option<&PageRoute>,
    language: Language,
    public_base_url: &str,
    wizard: Option<&Wizard>,
) -> String {
    let base = public_base_url.trim_end_matches('/');
    let mut head = String::new();
    let mut body = String::new();

    match route {
        Some(route) => {
            let title = route.page.title().text(language);
            head.push_str(&format!("<title>{}</title>\n", escape_html(title)));

            let path = route.path();
            for (alternate, url) in all_localized_urls(&path) {
                head.push_str(&format!(
                    "<link rel=\"alternate\" hreflang=\"{}\" href=\"{}{}\">\n",
                    alternate.code(),
                    escape_html(base),
                    escape_html(&url)
                ));
            }
            head.push_str(&format!(
                "<link rel=\"alternate\" hreflang=\"x-default\" href=\"{}{}\">\n",
                escape_html(base),
                escape_html(&path)
            ));

            body.push_str(&format!(
                "<main data-page=\"{}\"",
                route.page.segment()
            ));
            if let Some(slug) = &route.slug {
                body.push_str(&format!(" data-slug=\"{}\"", escape_html(slug)));
            }
            body.push_str(&format!(">\n<h1>{}</h1>\n", escape_html(title)));
            match route.page {
                Page::Pricing => body.push_str(&pricing_links(language)),
                Page::LifetimeDiscountGroup => body.push_str(&format!(
                    "<p class=\"price\" data-price=\"{}\">&euro;{}</p>\n",
                    LIFETIME_DISCOUNT_PRICE, LIFETIME_DISCOUNT_PRICE
                )),
                _ => {}
            }
            if let Some(wizard) = wizard {
                body.push_str(&wizard_mount(wizard));
            }
            body.push_str("</main>\n");
        }
        None => {
            let title = Message::PageNotFound.text(language);
            head.push_str(&format!("<title>{}</title>\n", escape_html(title)));
            body.push_str(&format!(
                "<main data-page=\"not-found\">\n<h1>{}</h1>\n<p>{}</p>\n<a href=\"{}\">SDeal</a>\n</main>\n",
                escape_html(title),
                escape_html(Message::NotFoundBody.text(language)),
                escape_html(&localize_url("/", language))
            ));
        }
    }

    let current_path = route.map(PageRoute::path).unwrap_or_else(|| "/".to_string());
    body.push_str(&language_switcher(language, &current_path));

    format!(
        "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n{}</head>\n<body>\n{}</body>\n</html>\n",
        language.code(),
        head,
        body
    )
}

/// Monthly price list with a link into the new-customer wizard per package.
fn pricing_links(language: Language) -> String {
    let mut html = String::from("<ul class=\"packages\">\n");
    for row in price_table(BillingPeriod::Monthly) {
        let url = package_url(language, &WizardQuery::for_new_customer(Some(row.package)));
        html.push_str(&format!(
            "<li data-package=\"{}\"><a href=\"{}\">{} &euro;{}</a></li>\n",
            row.package,
            escape_html(&url),
            package_label(row.package),
            row.price
        ));
    }
    html.push_str("</ul>\n");
    html
}

fn package_label(package: PackageTier) -> String {
    format!("Package {}", package)
}

/// Mount point for the client-side wizard with its starting state.
fn wizard_mount(wizard: &Wizard) -> String {
    let mut html = format!(
        "<div id=\"package-wizard\" data-stage=\"{}\"",
        wizard.stage().name()
    );
    if let Some(package) = wizard.draft().selected_package {
        html.push_str(&format!(" data-package=\"{}\"", package));
    }
    html.push_str(&format!(
        " data-url=\"{}\"></div>\n",
        escape_html(&wizard.shareable_url())
    ));
    html
}

/// One form per other language; the server answers with a replace-redirect.
fn language_switcher(current: Language, neutral_path: &str) -> String {
    let path = localize_url(neutral_path, current);
    let mut html = String::from("<nav class=\"languages\">\n");
    for language in Language::all().into_iter().filter(|l| *l != current) {
        html.push_str(&format!(
            "<form method=\"post\" action=\"/language\"><input type=\"hidden\" name=\"language\" value=\"{}\"><input type=\"hidden\" name=\"path\" value=\"{}\"><button title=\"{}\">{}</button></form>\n",
            language.code(),
            escape_html(&path),
            escape_html(language.native_name()),
            escape_html(language.label())
        ));
    }
    html.push_str("</nav>\n");
    html
}
