//! The stateless relay: `POST /api/relay` with `{kind, pageKey, ...fields}`.
//!
//! Response contract is deliberately plain: `200 "ok"`, `403 "forbidden"` on
//! origin or page-key mismatch, `400 "bad json"` on a malformed body, `500`
//! with the error text on a send failure.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use metrics::counter;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::application::error::ErrorReport;
use crate::domain::submission::{
    self, ContactFields, OrderFields, PickupFields, SubmissionKind,
};

use super::public::HttpState;

const SOURCE: &str = "infra::http::relay::submit";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RelayPayload {
    kind: String,
    #[serde(rename = "pageKey")]
    page_key: String,
    #[serde(rename = "productId", deserialize_with = "loose_string")]
    product_id: String,
    #[serde(rename = "productName")]
    product_name: String,
    #[serde(deserialize_with = "loose_string")]
    qty: String,
    variant: String,
    datetime: String,
    location_label: String,
    #[serde(deserialize_with = "loose_string")]
    lat: String,
    #[serde(deserialize_with = "loose_string")]
    lng: String,
    name: String,
    email: String,
    topic: String,
    message: String,
    notes: String,
    company: String,
}

impl RelayPayload {
    fn order_fields(&self) -> OrderFields {
        OrderFields {
            product_id: self.product_id.clone(),
            product_name: self.product_name.clone(),
            qty: self.qty.clone(),
            variant: self.variant.clone(),
            pickup: PickupFields {
                datetime: self.datetime.clone(),
                location_label: self.location_label.clone(),
                lat: self.lat.clone(),
                lng: self.lng.clone(),
            },
            name: self.name.clone(),
            email: self.email.clone(),
            notes: self.notes.clone(),
        }
    }

    fn contact_fields(&self) -> ContactFields {
        ContactFields {
            name: self.name.clone(),
            email: self.email.clone(),
            topic: self.topic.clone(),
            message: self.message.clone(),
        }
    }
}

/// Map widgets submit coordinates as numbers, forms as strings; accept both
/// (and `null`) for the free-form fields.
fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Text(String),
        Number(serde_json::Number),
        Missing(()),
    }

    Ok(match Loose::deserialize(deserializer)? {
        Loose::Text(value) => value,
        Loose::Number(value) => value.to_string(),
        Loose::Missing(()) => String::new(),
    })
}

pub async fn submit(
    State(state): State<HttpState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());
    if !state.submissions.origin_allowed(origin) {
        counter!("vetrina_relay_rejected_total").increment(1);
        return rejected(
            StatusCode::FORBIDDEN,
            "forbidden",
            format!(
                "origin `{}` does not match the public origin",
                origin.unwrap_or_default()
            ),
        );
    }

    let payload: RelayPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(err) => {
            counter!("vetrina_relay_rejected_total").increment(1);
            return rejected(StatusCode::BAD_REQUEST, "bad json", err.to_string());
        }
    };

    if !state.submissions.page_allowed(&payload.page_key) {
        counter!("vetrina_relay_rejected_total").increment(1);
        return rejected(
            StatusCode::FORBIDDEN,
            "forbidden",
            format!("page key `{}` is not relayed", payload.page_key),
        );
    }

    if submission::honeypot_tripped(&payload.company) {
        counter!("vetrina_relay_suppressed_total").increment(1);
        debug!(
            target = "vetrina::relay",
            page = %payload.page_key,
            "honeypot tripped, submission suppressed"
        );
        return ok_response();
    }

    let draft = match SubmissionKind::from_wire(&payload.kind) {
        SubmissionKind::Order => {
            submission::order_message(&payload.page_key, &payload.order_fields())
        }
        SubmissionKind::Contact => {
            submission::contact_message(&payload.page_key, &payload.contact_fields())
        }
    };

    match state.submissions.dispatch(draft).await {
        Ok(()) => {
            counter!("vetrina_relay_accepted_total").increment(1);
            ok_response()
        }
        Err(err) => {
            let mut response =
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
            ErrorReport::from_error(SOURCE, StatusCode::INTERNAL_SERVER_ERROR, &err)
                .attach(&mut response);
            response
        }
    }
}

fn ok_response() -> Response {
    "ok".into_response()
}

fn rejected(status: StatusCode, public: &'static str, detail: String) -> Response {
    let mut response = (status, public).into_response();
    ErrorReport::from_message(SOURCE, status, detail).attach(&mut response);
    response
}
