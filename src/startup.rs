use crate::shutdown;
use chrono::Utc;
use gocanvas_client::api::auth::decode_claims;
use gocanvas_client::api::{ApiClient, LmsApi};
use gocanvas_client::components::calendar::render::render_agenda;
use gocanvas_client::components::calendar::{current_semester_code, CalendarService};
use gocanvas_client::components::messages::models::Inbox;
use gocanvas_client::components::MessageService;
use gocanvas_client::config::Config;
use gocanvas_client::context::AppContext;
use gocanvas_client::error::{ClientResult, Error};
use gocanvas_client::storage::{FileStore, KeyValueStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Run the dashboard, stopping early on a termination signal
pub async fn start(config: Config) -> miette::Result<()> {
    let token = CancellationToken::new();

    // Spawn signal handler task
    let signal_token = token.clone();
    tokio::spawn(async move {
        shutdown::handle_signals(signal_token).await;
    });

    let result: miette::Result<()> = tokio::select! {
        result = run(&config) => result.map_err(Into::into),
        _ = token.cancelled() => {
            info!("Cancelled, discarding outstanding requests");
            Ok(())
        }
    };
    token.cancel();
    result
}

async fn run(config: &Config) -> ClientResult<()> {
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.storage_path.clone()));
    let context = AppContext::restore(store).await?;
    let api: Arc<dyn LmsApi> = Arc::new(ApiClient::new(config, context.clone())?);

    sign_in_if_needed(config, &context, api.as_ref()).await?;

    let now = Utc::now().with_timezone(&config.tz());
    let today = now.date_naive();
    println!("Semester: {}", current_semester_code(&now));
    println!();

    let course_id = context.selected_course().await;
    let calendar = CalendarService::new(Arc::clone(&api));
    let messages = MessageService::new(Arc::clone(&api));

    // Independent panels, one failing does not cancel the other
    let (month, inbox) = futures::join!(
        async {
            if config.is_panel_enabled("calendar") {
                Some(calendar.fetch_month(today, course_id).await)
            } else {
                None
            }
        },
        async {
            if config.is_panel_enabled("inbox") {
                Some(messages.inbox().await)
            } else {
                None
            }
        }
    );

    match month {
        Some(Ok(view)) => {
            println!("{}", view.render(Some(today)));
            print!("{}", render_agenda(&view.events, today));
            println!();
        }
        Some(Err(e)) => println!("Calendar unavailable: {}\n", e),
        None => {}
    }

    let user_id = context
        .token()
        .await
        .and_then(|token| decode_claims(&token).ok())
        .and_then(|claims| claims.userid);

    match inbox {
        Some(Ok(inbox)) => print_inbox(&inbox, user_id),
        Some(Err(e)) => println!("Inbox unavailable: {}", e),
        None => {}
    }

    Ok(())
}

async fn sign_in_if_needed(config: &Config, context: &AppContext, api: &dyn LmsApi) -> ClientResult<()> {
    if context.is_signed_in().await {
        return Ok(());
    }
    match config.credentials() {
        Some((username, password)) => {
            let response = api.login(username, password).await?;
            let role = context.sign_in(response.access_token).await?;
            info!("Signed in as {}, landing on {}", role, role.home_route());
        }
        None => warn!("No stored session and no credentials configured, requests will be anonymous"),
    }
    Ok(())
}

fn print_inbox(inbox: &Inbox, user_id: Option<i64>) {
    println!(
        "Inbox: {} conversations, {} unread",
        inbox.total_conversations, inbox.unread_conversations
    );
    for (conversation, unread) in inbox.rows() {
        let marker = if unread { "*" } else { " " };
        println!(
            "{} {} ({})",
            marker,
            conversation.subject.as_deref().unwrap_or("(no subject)"),
            conversation.participant_names(user_id)
        );
    }
}
