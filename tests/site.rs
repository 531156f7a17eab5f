//! Page rendering and form submission routes, driven through the full router
//! against stub content and mail adapters.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use bytes::Bytes;
use tower::ServiceExt;
use tracing::level_filters::LevelFilter;
use url::Url;

use vetrina::application::chrome::ChromeService;
use vetrina::application::content::{ContentDoc, ContentError, ContentService, ContentSource};
use vetrina::application::submission::{EmailMessage, MailError, MailTransport, SubmissionService};
use vetrina::config::{
    ContentLocation, ContentSettings, LogFormat, LoggingSettings, MailSettings, RelaySettings,
    ServerSettings, Settings, SiteSettings,
};
use vetrina::infra::http::{HttpState, build_router};

const PAGES_JSON: &str = r#"{
    "home": {
        "title": "Grainline Workshop",
        "lead": "Small-batch woodwork and repairs.",
        "pills": ["Repairs", "Commissions"],
        "scopeNote": ["Visits by appointment only."],
        "services": [
            {
                "group": "Repairs",
                "items": [{ "name": "Chair regluing", "desc": "Loose joints rebuilt." }]
            }
        ],
        "hideStore": true,
        "timeline": [{ "year": "2019", "title": "First bench", "desc": "The workshop opens." }],
        "contactTopicOptions": [["repair", "Repair inquiry"]],
        "navOrder": 1
    },
    "shop": {
        "title": "Shop",
        "lead": "Current pieces, made to order.",
        "relay": true,
        "store": { "intro": "Allow two weeks.", "pickup": true,
                   "past": [{ "item": "Serving boards", "desc": "Sold out." }] },
        "navOrder": 2
    }
}"#;

const PRODUCTS_JSON: &str = r#"[
    {
        "id": "stool-low",
        "name": "Low stool",
        "description": "Three-legged stool.",
        "status": "available",
        "variants": ["Ash", "Oak"],
        "page": "shop"
    },
    {
        "id": "board-end",
        "name": "End-grain board",
        "description": "Chopping board.",
        "page": "shop"
    }
]"#;

struct StubContent;

#[async_trait]
impl ContentSource for StubContent {
    async fn fetch(&self, doc: ContentDoc) -> Result<Bytes, ContentError> {
        Ok(Bytes::from_static(match doc {
            ContentDoc::Pages => PAGES_JSON.as_bytes(),
            ContentDoc::Products => PRODUCTS_JSON.as_bytes(),
        }))
    }
}

struct FailingContent;

#[async_trait]
impl ContentSource for FailingContent {
    async fn fetch(&self, doc: ContentDoc) -> Result<Bytes, ContentError> {
        Err(ContentError::Status { doc, status: 502 })
    }
}

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<EmailMessage>>,
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        self.sent
            .lock()
            .expect("transport lock")
            .push(message.clone());
        Ok(())
    }
}

fn settings() -> Settings {
    Settings {
        server: ServerSettings {
            public_addr: "127.0.0.1:0".parse().expect("valid addr"),
        },
        logging: LoggingSettings {
            level: LevelFilter::INFO,
            format: LogFormat::Compact,
        },
        content: ContentSettings {
            pages: ContentLocation::Path("content/pages.json".into()),
            products: ContentLocation::Path("content/products.json".into()),
            default_page: "home".to_string(),
        },
        site: SiteSettings {
            public_url: Url::parse("https://shop.example/").expect("valid url"),
            title: "Workshop".to_string(),
            contact_email: Some("orders@shop.example".to_string()),
            display_email: Some("orders [at] shop.example".to_string()),
        },
        mail: MailSettings {
            endpoint: None,
            from: "vetrina@shop.example".to_string(),
            to: None,
        },
        relay: RelaySettings {
            pages: vec!["shop".to_string()],
        },
    }
}

fn build_state(
    source: Arc<dyn ContentSource>,
    transport: Arc<RecordingTransport>,
) -> HttpState {
    let settings = settings();
    HttpState {
        content: Arc::new(ContentService::new(source)),
        chrome: Arc::new(ChromeService::new(settings.site.clone())),
        submissions: Arc::new(SubmissionService::new(transport, &settings)),
        default_page: settings.content.default_page.clone(),
    }
}

async fn get(state: HttpState, uri: &str) -> (StatusCode, String) {
    let response = build_router(state)
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, String::from_utf8_lossy(&bytes).to_string())
}

async fn post_form(
    state: HttpState,
    uri: &str,
    body: &str,
) -> (StatusCode, Option<String>) {
    let response = build_router(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
        .expect("response");

    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    (status, location)
}

#[tokio::test]
async fn index_renders_the_default_page() {
    let state = build_state(Arc::new(StubContent), Arc::default());
    let (status, body) = get(state, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Grainline Workshop"));
    assert!(body.contains("Visits by appointment only."));
    assert!(body.contains("Chair regluing"));
    assert!(body.contains("First bench"));
    assert!(body.contains("Repair inquiry"));
    // hideStore: no order form on the default page.
    assert!(!body.contains("order-form"));
}

#[tokio::test]
async fn navigation_marks_the_active_page() {
    let state = build_state(Arc::new(StubContent), Arc::default());
    let (_, body) = get(state, "/shop").await;

    assert!(body.contains(r#"<a href="/shop" aria-current="page">"#));
}

#[tokio::test]
async fn shop_page_renders_catalog_and_order_form() {
    let state = build_state(Arc::new(StubContent), Arc::default());
    let (status, body) = get(state, "/shop").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Low stool"));
    assert!(body.contains("End-grain board"));
    assert!(body.contains("Status: available"));
    // Initial variants come from the first product.
    assert!(body.contains(r#"<option value="Ash">Ash</option>"#));
    // The variant map is embedded for repopulation on product change.
    assert!(body.contains("data-variant-map"));
    assert!(body.contains("board-end"));
    // Pickup block with the widget mount.
    assert!(body.contains(r#"data-role="pickup-map""#));
    // Past products render without forms.
    assert!(body.contains("Serving boards"));
}

#[tokio::test]
async fn unknown_page_key_renders_the_not_found_chrome() {
    let state = build_state(Arc::new(StubContent), Arc::default());
    let (status, body) = get(state, "/missing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Page Not Found"));
}

#[tokio::test]
async fn content_failure_surfaces_as_bad_gateway() {
    let state = build_state(Arc::new(FailingContent), Arc::default());
    let (status, _) = get(state, "/").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn health_reflects_content_availability() {
    let state = build_state(Arc::new(StubContent), Arc::default());
    let (status, _) = get(state, "/_health").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let state = build_state(Arc::new(FailingContent), Arc::default());
    let (status, _) = get(state, "/_health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn honeypot_suppresses_the_form_submission() {
    let transport = Arc::new(RecordingTransport::default());
    let state = build_state(Arc::new(StubContent), transport.clone());

    let (status, location) = post_form(
        state,
        "/pages/shop/contact",
        "name=Bot&email=bot%40spam.example&message=buy&company=Acme",
    )
    .await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/shop?sent=1"));
    assert!(transport.sent.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn contact_form_on_a_draft_page_redirects_to_a_mailto_url() {
    let transport = Arc::new(RecordingTransport::default());
    let state = build_state(Arc::new(StubContent), transport.clone());

    let (status, location) = post_form(
        state,
        "/pages/home/contact",
        "name=Ada&email=ada%40example.com&topic=repair&message=hello+there",
    )
    .await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    let location = location.expect("mailto location");
    assert!(location.starts_with("mailto:orders@shop.example?subject="));
    assert!(location.contains("%20"));
    assert!(!location.contains('+'));
    assert!(transport.sent.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn order_form_on_a_relay_page_dispatches_through_the_transport() {
    let transport = Arc::new(RecordingTransport::default());
    let state = build_state(Arc::new(StubContent), transport.clone());

    let (status, location) = post_form(
        state,
        "/pages/shop/order",
        "product=stool-low&qty=2&variant=Oak&name=Ada&email=ada%40example.com&notes=Gift+wrap",
    )
    .await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/shop?sent=1"));

    let sent = transport.sent.lock().expect("lock");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "[shop] Order — Low stool");
    assert!(sent[0].text.contains("Product: Low stool (stool-low)"));
    assert!(sent[0].text.contains("Qty: 2\n"));
    assert!(!sent[0].text.contains("Pickup:"));
}

#[tokio::test]
async fn order_for_an_unknown_product_is_rejected() {
    let transport = Arc::new(RecordingTransport::default());
    let state = build_state(Arc::new(StubContent), transport.clone());

    let (status, _) = post_form(
        state,
        "/pages/shop/order",
        "product=unknown&qty=1&name=Ada&email=ada%40example.com",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(transport.sent.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn form_post_to_an_unknown_page_is_not_found() {
    let transport = Arc::new(RecordingTransport::default());
    let state = build_state(Arc::new(StubContent), transport);

    let (status, _) = post_form(state, "/pages/missing/contact", "name=Ada&message=hi").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sent_flag_shows_the_confirmation_notice() {
    let state = build_state(Arc::new(StubContent), Arc::default());
    let (_, body) = get(state, "/shop?sent=1").await;

    assert!(body.contains("your message is on its way"));
}
