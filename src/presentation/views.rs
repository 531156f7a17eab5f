use crate::application::error::{ErrorReport, HttpError};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    let content = ErrorPageView::not_found();
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub href: String,
}

#[derive(Clone)]
pub struct NavigationView {
    pub entries: Vec<NavigationLinkView>,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
    pub current: bool,
}

#[derive(Clone)]
pub struct FooterView {
    pub year: i32,
    pub email: Option<EmailLinkView>,
}

#[derive(Clone)]
pub struct EmailLinkView {
    pub display: String,
    pub href: String,
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
    pub canonical: String,
}

impl PageMetaView {
    pub fn with_canonical(self, canonical: String) -> Self {
        Self { canonical, ..self }
    }

    pub fn with_content(self, title: String, description: String) -> Self {
        Self {
            title,
            description,
            ..self
        }
    }
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
}

impl LayoutChrome {
    pub fn with_meta(self, meta: PageMetaView) -> Self {
        Self { meta, ..self }
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            navigation: chrome.navigation,
            footer: chrome.footer,
            meta: chrome.meta,
            content,
        }
    }
}

#[derive(Clone)]
pub struct HeroView {
    pub title: String,
    pub lead: String,
    pub pills: Vec<String>,
}

#[derive(Clone)]
pub struct ServiceGroupView {
    pub group: String,
    pub items: Vec<ServiceCardView>,
}

#[derive(Clone)]
pub struct ServiceCardView {
    pub name: String,
    pub desc: String,
}

#[derive(Clone)]
pub struct ProductCardView {
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub status: String,
}

#[derive(Clone)]
pub struct ProductOptionView {
    pub id: String,
    pub name: String,
}

#[derive(Clone)]
pub struct OrderFormView {
    pub action: String,
    pub relay: bool,
    pub products: Vec<ProductOptionView>,
    /// Variant options of the initially selected product.
    pub variants: Vec<String>,
    /// Product id → variant options, embedded for client-side repopulation.
    pub variants_json: String,
    pub pickup: bool,
}

#[derive(Clone)]
pub struct PastItemView {
    pub name: String,
    pub desc: String,
}

#[derive(Clone)]
pub struct StoreView {
    pub intro: String,
    pub products: Vec<ProductCardView>,
    pub order_form: Option<OrderFormView>,
    pub past: Vec<PastItemView>,
}

#[derive(Clone)]
pub struct TimelineEntryView {
    pub year: String,
    pub title: String,
    pub desc: String,
}

#[derive(Clone)]
pub struct TopicOptionView {
    pub value: String,
    pub label: String,
}

#[derive(Clone)]
pub struct ContactView {
    pub action: String,
    pub relay: bool,
    pub topics: Vec<TopicOptionView>,
}

#[derive(Clone)]
pub struct PageContext {
    pub page_key: String,
    pub hero: HeroView,
    pub scope_note: Vec<String>,
    pub services: Vec<ServiceGroupView>,
    pub store: Option<StoreView>,
    pub timeline: Vec<TimelineEntryView>,
    pub contact: ContactView,
    pub sent: bool,
}

#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub view: LayoutContext<PageContext>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub primary_action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Try returning to the homepage to continue exploring.".to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to home".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}
