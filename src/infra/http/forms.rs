//! Form-encoded submission routes: the no-script path for the contact and
//! order forms. A populated honeypot suppresses the submission while
//! answering exactly like a success.

use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::debug;

use crate::application::error::HttpError;
use crate::domain::submission::{
    self, ContactFields, EmailDraft, OrderFields, PickupFields,
};

use super::public::{HttpState, content_error_response};

const CONTACT_SOURCE: &str = "infra::http::forms::submit_contact";
const ORDER_SOURCE: &str = "infra::http::forms::submit_order";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactFormBody {
    name: String,
    email: String,
    topic: String,
    message: String,
    company: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrderFormBody {
    product: String,
    qty: String,
    variant: String,
    datetime: String,
    location_label: String,
    lat: String,
    lng: String,
    name: String,
    email: String,
    notes: String,
    company: String,
}

pub async fn submit_contact(
    State(state): State<HttpState>,
    Path(key): Path<String>,
    Form(body): Form<ContactFormBody>,
) -> Response {
    let bundle = match state.content.load().await {
        Ok(bundle) => bundle,
        Err(err) => return content_error_response(err),
    };
    let Some(page) = bundle.pages.get(&key) else {
        return page_not_found(CONTACT_SOURCE, &key);
    };

    if submission::honeypot_tripped(&body.company) {
        debug!(
            target = "vetrina::forms",
            page = %key,
            "honeypot tripped, contact submission suppressed"
        );
        return sent_redirect(&key);
    }

    let fields = ContactFields {
        name: body.name,
        email: body.email,
        topic: body.topic,
        message: body.message,
    };

    if page.relay {
        dispatch_or_error(&state, submission::contact_message(&key, &fields), CONTACT_SOURCE, &key)
            .await
    } else {
        draft_redirect(&state, &submission::contact_draft(&key, &fields), CONTACT_SOURCE)
    }
}

pub async fn submit_order(
    State(state): State<HttpState>,
    Path(key): Path<String>,
    Form(body): Form<OrderFormBody>,
) -> Response {
    let bundle = match state.content.load().await {
        Ok(bundle) => bundle,
        Err(err) => return content_error_response(err),
    };
    let Some(page) = bundle.pages.get(&key) else {
        return page_not_found(ORDER_SOURCE, &key);
    };

    if submission::honeypot_tripped(&body.company) {
        debug!(
            target = "vetrina::forms",
            page = %key,
            "honeypot tripped, order submission suppressed"
        );
        return sent_redirect(&key);
    }

    let Some(product) = bundle
        .products
        .find(&body.product)
        .filter(|product| product.page == key)
    else {
        return HttpError::new(
            ORDER_SOURCE,
            StatusCode::BAD_REQUEST,
            "Unknown product",
            format!("product `{}` is not sold on page `{key}`", body.product),
        )
        .into_response();
    };

    let fields = OrderFields {
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        qty: body.qty,
        variant: body.variant,
        pickup: PickupFields {
            datetime: body.datetime,
            location_label: body.location_label,
            lat: body.lat,
            lng: body.lng,
        },
        name: body.name,
        email: body.email,
        notes: body.notes,
    };

    if page.relay {
        dispatch_or_error(&state, submission::order_message(&key, &fields), ORDER_SOURCE, &key)
            .await
    } else {
        draft_redirect(&state, &submission::order_draft(&key, &fields), ORDER_SOURCE)
    }
}

async fn dispatch_or_error(
    state: &HttpState,
    draft: EmailDraft,
    source: &'static str,
    key: &str,
) -> Response {
    match state.submissions.dispatch(draft).await {
        Ok(()) => sent_redirect(key),
        Err(err) => HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to send message",
            &err,
        )
        .into_response(),
    }
}

fn draft_redirect(state: &HttpState, draft: &EmailDraft, source: &'static str) -> Response {
    match state.submissions.mailto_url(draft) {
        Some(url) => Redirect::to(&url).into_response(),
        None => HttpError::new(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Contact address is not configured",
            "mailto drafts require site.contact_email",
        )
        .into_response(),
    }
}

fn sent_redirect(key: &str) -> Response {
    Redirect::to(&format!("/{key}?sent=1")).into_response()
}

fn page_not_found(source: &'static str, key: &str) -> Response {
    HttpError::new(
        source,
        StatusCode::NOT_FOUND,
        "Page not found",
        format!("no page `{key}` in the content document"),
    )
    .into_response()
}
