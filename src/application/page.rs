//! View Renderer: page key + content bundle → the per-page view model.
//!
//! A key absent from the pages document yields `None`; the HTTP layer turns
//! that into the site-chrome 404 page.

use serde_json::{Map, Value};

use crate::domain::content::{ContentBundle, PageDoc, Product};
use crate::presentation::views::{
    ContactView, HeroView, OrderFormView, PageContext, PastItemView, ProductCardView,
    ProductOptionView, ServiceCardView, ServiceGroupView, StoreView, TimelineEntryView,
    TopicOptionView,
};

pub fn page_context(key: &str, bundle: &ContentBundle) -> Option<PageContext> {
    let page = bundle.pages.get(key)?;

    Some(PageContext {
        page_key: key.to_string(),
        hero: HeroView {
            title: page.title.clone(),
            lead: page.lead.clone(),
            pills: page.pills.clone(),
        },
        scope_note: page.scope_note.clone(),
        services: service_groups(page),
        store: store_view(key, page, bundle),
        timeline: timeline_entries(page),
        contact: contact_view(key, page),
        sent: false,
    })
}

fn service_groups(page: &PageDoc) -> Vec<ServiceGroupView> {
    page.services
        .iter()
        .map(|group| ServiceGroupView {
            group: group.group.clone(),
            items: group
                .items
                .iter()
                .map(|item| ServiceCardView {
                    name: item.name.clone(),
                    desc: item.desc.clone(),
                })
                .collect(),
        })
        .collect()
}

fn store_view(key: &str, page: &PageDoc, bundle: &ContentBundle) -> Option<StoreView> {
    if page.hide_store {
        return None;
    }

    let store = page.store.as_ref();
    let products = bundle.products.for_page(key);
    if store.is_none() && products.is_empty() {
        return None;
    }

    let cards = products
        .iter()
        .map(|product| ProductCardView {
            name: product.name.clone(),
            description: product.description.clone(),
            image: product.image.clone(),
            status: if product.status.is_empty() {
                "—".to_string()
            } else {
                product.status.clone()
            },
        })
        .collect();

    let pickup = store.is_some_and(|store| store.pickup);
    let order_form = (!products.is_empty()).then(|| order_form_view(key, page, pickup, &products));

    Some(StoreView {
        intro: store.map(|store| store.intro.clone()).unwrap_or_default(),
        products: cards,
        order_form,
        past: store
            .map(|store| {
                store
                    .past
                    .iter()
                    .map(|item| PastItemView {
                        name: item.item.clone(),
                        desc: item.desc.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
    })
}

/// One order form for the whole grid: a product selector, the variant options
/// of the initially selected product, and the full product→variants map for
/// client-side repopulation when the selection changes.
fn order_form_view(
    key: &str,
    page: &PageDoc,
    pickup: bool,
    products: &[&Product],
) -> OrderFormView {
    let options = products
        .iter()
        .map(|product| ProductOptionView {
            id: product.id.clone(),
            name: product.name.clone(),
        })
        .collect();

    let variants = products
        .first()
        .map(|product| product.variant_options())
        .unwrap_or_default();

    let mut variant_map = Map::new();
    for product in products {
        variant_map.insert(
            product.id.clone(),
            Value::from(product.variant_options()),
        );
    }

    OrderFormView {
        action: format!("/pages/{key}/order"),
        relay: page.relay,
        products: options,
        variants,
        variants_json: Value::Object(variant_map).to_string(),
        pickup,
    }
}

fn timeline_entries(page: &PageDoc) -> Vec<TimelineEntryView> {
    page.timeline
        .iter()
        .map(|entry| TimelineEntryView {
            year: entry.year.clone(),
            title: entry.title.clone(),
            desc: entry.desc.clone(),
        })
        .collect()
}

fn contact_view(key: &str, page: &PageDoc) -> ContactView {
    ContactView {
        action: format!("/pages/{key}/contact"),
        relay: page.relay,
        topics: page
            .contact_topic_options
            .iter()
            .map(|option| TopicOptionView {
                value: option.0.clone(),
                label: option.1.clone(),
            })
            .collect(),
    }
}
