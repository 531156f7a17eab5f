//! Shared layout chrome: brand, navigation, footer, page metadata.
//!
//! Navigation is derived from the loaded pages document rather than a static
//! header partial, so adding a page to the content automatically adds it to
//! the menu.

use time::OffsetDateTime;

use crate::config::SiteSettings;
use crate::domain::content::PagesDoc;
use crate::presentation::views::{
    BrandView, EmailLinkView, FooterView, LayoutChrome, NavigationLinkView, NavigationView,
    PageMetaView,
};

pub struct ChromeService {
    site: SiteSettings,
}

impl ChromeService {
    pub fn new(site: SiteSettings) -> Self {
        Self { site }
    }

    pub fn build(&self, pages: &PagesDoc, active: Option<&str>) -> LayoutChrome {
        let entries = pages
            .nav_entries()
            .into_iter()
            .map(|(key, page)| NavigationLinkView {
                label: page.nav_label().to_string(),
                href: format!("/{key}"),
                current: active == Some(key),
            })
            .collect();

        let email = self.site.contact_email.as_ref().map(|address| {
            let display = self
                .site
                .display_email
                .clone()
                .unwrap_or_else(|| address.clone());
            EmailLinkView {
                display,
                href: format!("mailto:{address}"),
            }
        });

        LayoutChrome {
            brand: BrandView {
                title: self.site.title.clone(),
                href: "/".to_string(),
            },
            navigation: NavigationView { entries },
            footer: FooterView {
                year: OffsetDateTime::now_utc().year(),
                email,
            },
            meta: PageMetaView {
                title: self.site.title.clone(),
                description: String::new(),
                canonical: self.site.public_url.to_string(),
            },
        }
    }
}
