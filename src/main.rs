use anyhow::{Context, Result};
use clap::Parser;
use smartstudy::{
    create_router, AppState, AudioCaptureController, AudioInputFactory, Config,
    FocusTimerController, LogNotifier, VoiceApiClient,
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "smartstudy")]
#[command(about = "Focus timer and voice-note recorder service", long_about = None)]
struct Args {
    /// Config file path (extension optional)
    #[arg(short, long, default_value = "config/smartstudy")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("SmartStudy v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);
    info!(
        "Focus cycle: {}m focus / {}m break",
        cfg.focus.focus_minutes, cfg.focus.break_minutes
    );

    let focus = FocusTimerController::new(cfg.focus.timer_config(), Arc::new(LogNotifier));

    let voice = VoiceApiClient::new(cfg.voice.api_base_url.clone(), cfg.voice.api_token.clone());
    let input = AudioInputFactory::create(cfg.voice.source(), cfg.voice.input_config());
    let capture = AudioCaptureController::new(input, Arc::new(voice.clone()));

    let ambient = cfg.ambient.player()?;

    let state = AppState::new(focus, capture, ambient, voice);
    let app = create_router(state.clone());

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await
        .context("HTTP server failed")?;

    state.capture.shutdown().await;
    state.focus.shutdown().await;

    Ok(())
}
