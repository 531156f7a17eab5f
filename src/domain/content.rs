//! Content documents: the page descriptions and the product catalog.
//!
//! Both documents are plain JSON authored outside this system. They are
//! parsed once per page load and never mutated.

use std::collections::HashMap;

use serde::Deserialize;

use super::error::DomainError;

/// One page description, keyed by its page identifier in [`PagesDoc`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageDoc {
    pub title: String,
    pub lead: String,
    pub pills: Vec<String>,
    pub scope_note: Vec<String>,
    pub services: Vec<ServiceGroup>,
    pub store: Option<StoreDoc>,
    pub timeline: Vec<TimelineEntry>,
    pub contact_topic_options: Vec<TopicOption>,
    pub hide_store: bool,
    /// Route submissions through the relay transport instead of a `mailto:` draft.
    pub relay: bool,
    pub nav_label: Option<String>,
    pub nav_order: Option<i64>,
}

impl PageDoc {
    pub fn nav_label(&self) -> &str {
        self.nav_label.as_deref().unwrap_or(&self.title)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceGroup {
    pub group: String,
    pub items: Vec<ServiceItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceItem {
    pub name: String,
    pub desc: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreDoc {
    pub intro: String,
    /// Offer a pickup-slot block (map widget mount plus schedule fields) on the order form.
    pub pickup: bool,
    pub past: Vec<PastItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PastItem {
    pub item: String,
    pub desc: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TimelineEntry {
    pub year: String,
    pub title: String,
    pub desc: String,
}

/// A `[value, label]` pair as authored in the pages document.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicOption(pub String, pub String);

/// The pages document: page key → page description.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct PagesDoc(HashMap<String, PageDoc>);

impl PagesDoc {
    pub fn get(&self, key: &str) -> Option<&PageDoc> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pages in navigation order: explicit `navOrder` first, then by key.
    pub fn nav_entries(&self) -> Vec<(&str, &PageDoc)> {
        let mut entries: Vec<(&str, &PageDoc)> = self
            .0
            .iter()
            .map(|(key, page)| (key.as_str(), page))
            .collect();
        entries.sort_by(|(a_key, a), (b_key, b)| {
            let a_order = a.nav_order.unwrap_or(i64::MAX);
            let b_order = b.nav_order.unwrap_or(i64::MAX);
            a_order.cmp(&b_order).then_with(|| a_key.cmp(b_key))
        });
        entries
    }
}

#[cfg(test)]
impl FromIterator<(String, PageDoc)> for PagesDoc {
    fn from_iter<I: IntoIterator<Item = (String, PageDoc)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One catalog entry. `page` ties the product to the page that sells it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub status: String,
    pub variants: Vec<String>,
    pub page: String,
}

impl Product {
    /// Variant options offered on the order form; a product without explicit
    /// variants still offers one.
    pub fn variant_options(&self) -> Vec<String> {
        if self.variants.is_empty() {
            vec!["Default".to_string()]
        } else {
            self.variants.clone()
        }
    }
}

/// The product catalog document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Catalog(Vec<Product>);

impl Catalog {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.0.iter()
    }

    /// Catalog entries for one page, in document order.
    pub fn for_page(&self, page_key: &str) -> Vec<&Product> {
        self.0
            .iter()
            .filter(|product| product.page == page_key)
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&Product> {
        self.0.iter().find(|product| product.id == id)
    }
}

#[cfg(test)]
impl FromIterator<Product> for Catalog {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Both documents of one page load.
#[derive(Debug, Clone, Default)]
pub struct ContentBundle {
    pub pages: PagesDoc,
    pub products: Catalog,
}

impl ContentBundle {
    /// Hard integrity checks plus advisory warnings for the `check` command.
    ///
    /// Returns warnings for products referencing unknown pages; fails on
    /// duplicate or empty product ids.
    pub fn validate(&self) -> Result<Vec<String>, DomainError> {
        let mut seen = std::collections::HashSet::new();
        for product in self.products.iter() {
            if product.id.trim().is_empty() {
                return Err(DomainError::validation(format!(
                    "product `{}` has an empty id",
                    product.name
                )));
            }
            if !seen.insert(product.id.as_str()) {
                return Err(DomainError::validation(format!(
                    "duplicate product id `{}`",
                    product.id
                )));
            }
        }

        let mut warnings = Vec::new();
        for product in self.products.iter() {
            if !product.page.is_empty() && !self.pages.contains(&product.page) {
                warnings.push(format!(
                    "product `{}` references unknown page `{}`",
                    product.id, product.page
                ));
            }
        }
        Ok(warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(title: &str, nav_order: Option<i64>) -> PageDoc {
        PageDoc {
            title: title.to_string(),
            nav_order,
            ..Default::default()
        }
    }

    #[test]
    fn pages_document_parses_page_map() {
        let doc: PagesDoc = serde_json::from_str(
            r#"{
                "home": {
                    "title": "Workshop",
                    "lead": "Small-batch goods.",
                    "pills": ["Repairs", "Commissions"],
                    "scopeNote": ["By appointment only."],
                    "contactTopicOptions": [["quote", "Request a quote"]],
                    "hideStore": true
                }
            }"#,
        )
        .expect("valid pages document");

        let home = doc.get("home").expect("home page");
        assert_eq!(home.title, "Workshop");
        assert_eq!(home.pills.len(), 2);
        assert_eq!(home.scope_note.len(), 1);
        assert_eq!(home.contact_topic_options[0].0, "quote");
        assert!(home.hide_store);
        assert!(!home.relay);
        assert!(doc.get("shop").is_none());
    }

    #[test]
    fn nav_entries_order_explicit_before_keyed() {
        let doc: PagesDoc = [
            ("zeta".to_string(), page("Zeta", None)),
            ("shop".to_string(), page("Shop", Some(2))),
            ("home".to_string(), page("Home", Some(1))),
            ("about".to_string(), page("About", None)),
        ]
        .into_iter()
        .collect();

        let keys: Vec<&str> = doc.nav_entries().into_iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["home", "shop", "about", "zeta"]);
    }

    #[test]
    fn catalog_filters_by_page_key() {
        let catalog: Catalog = serde_json::from_str(
            r#"[
                {"id": "mug", "name": "Mug", "status": "available", "page": "shop",
                 "variants": ["Blue", "Sand"]},
                {"id": "zine", "name": "Zine", "page": "press"}
            ]"#,
        )
        .expect("valid catalog");

        let shop = catalog.for_page("shop");
        assert_eq!(shop.len(), 1);
        assert_eq!(shop[0].id, "mug");
        assert_eq!(shop[0].variant_options(), vec!["Blue", "Sand"]);
        assert_eq!(
            catalog.find("zine").expect("zine").variant_options(),
            vec!["Default"]
        );
        assert!(catalog.for_page("home").is_empty());
    }

    #[test]
    fn validate_rejects_duplicate_product_ids() {
        let bundle = ContentBundle {
            pages: PagesDoc::default(),
            products: [
                Product {
                    id: "mug".to_string(),
                    ..Default::default()
                },
                Product {
                    id: "mug".to_string(),
                    ..Default::default()
                },
            ]
            .into_iter()
            .collect(),
        };

        assert!(bundle.validate().is_err());
    }

    #[test]
    fn validate_warns_on_unknown_page_reference() {
        let bundle = ContentBundle {
            pages: [("home".to_string(), page("Home", None))].into_iter().collect(),
            products: [Product {
                id: "mug".to_string(),
                page: "shop".to_string(),
                ..Default::default()
            }]
            .into_iter()
            .collect(),
        };

        let warnings = bundle.validate().expect("valid bundle");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("unknown page `shop`"));
    }
}
