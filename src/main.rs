use std::{process, sync::Arc};

use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;
use vetrina::{
    application::{
        chrome::ChromeService, content::ContentService, error::AppError,
        submission::SubmissionService,
    },
    config,
    infra::{
        content::ConfiguredContentSource,
        error::InfraError,
        http::{self, HttpState},
        mail::HttpMailTransport,
        telemetry,
    },
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Check(_) => run_check(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let state = build_http_state(&settings)?;
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "vetrina::serve",
        addr = %settings.server.public_addr,
        pages = %settings.content.pages,
        products = %settings.content.products,
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn run_check(settings: config::Settings) -> Result<(), AppError> {
    let source = ConfiguredContentSource::new(&settings.content)?;
    let service = ContentService::new(Arc::new(source));

    let bundle = service.load().await?;
    let warnings = bundle.validate()?;
    for warning in &warnings {
        warn!(target = "vetrina::check", "{warning}");
    }

    if !bundle.pages.contains(&settings.content.default_page) {
        warn!(
            target = "vetrina::check",
            page = %settings.content.default_page,
            "default page is missing from the pages document"
        );
    }

    info!(
        target = "vetrina::check",
        pages = bundle.pages.len(),
        products = bundle.products.len(),
        warnings = warnings.len(),
        "content documents loaded"
    );

    Ok(())
}

fn build_http_state(settings: &config::Settings) -> Result<HttpState, AppError> {
    let source = ConfiguredContentSource::new(&settings.content)?;
    let transport = HttpMailTransport::new(&settings.mail)?;

    Ok(HttpState {
        content: Arc::new(ContentService::new(Arc::new(source))),
        chrome: Arc::new(ChromeService::new(settings.site.clone())),
        submissions: Arc::new(SubmissionService::new(Arc::new(transport), settings)),
        default_page: settings.content.default_page.clone(),
    })
}
