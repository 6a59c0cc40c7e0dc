use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

use video_overlay::{
    cli::CliArgs,
    config::Config,
    controller::Controller,
    geometry::{Rect, StyleProperty},
    page::{HostPage, SimulatedPage},
    persistence::JsonFileStore,
    utils::{setup_logging, Result},
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    args.validate()?;

    let config = Config::load_with_fallback(&args.config)?;

    setup_logging(
        args.effective_log_level(&config.logging.level),
        config.logging.show_timestamps,
        config.logging.colored_output,
    )?;

    let page = Arc::new(SimulatedPage::new(&args.url));
    let video = page.attach_video(
        Rect::new(args.container_width, args.container_height),
        (1920, 1080),
    );
    // Host-page inline styles the overlay must be able to restore.
    video.set_inline_style(StyleProperty::Width, "100%");
    video.set_inline_style(StyleProperty::ObjectFit, "contain");

    let gateway = Arc::new(JsonFileStore::from_config(&config.persistence));
    let controller = Controller::new(
        page.clone() as Arc<dyn HostPage>,
        gateway,
        config.watchdog.clone(),
    );
    controller.hydrate().await;
    let watchdog = controller.start();

    let outcome = controller.transform(args.settings(), args.persist).await;
    info!("apply outcome: {:?}", outcome);
    info!("video inline styles: {}", page_styles(&page));

    if args.simulate_interference {
        info!("simulating host-page style interference");
        if let Some(video) = page.query_video() {
            video.set_inline_style(StyleProperty::Transform, "none");
        }
        sleep(Duration::from_millis(config.watchdog.drift_debounce_ms + 200)).await;
        info!("after reconciliation: {}", page_styles(&page));
    }

    if args.simulate_navigation {
        let next_url = format!("{}&t=next", args.url);
        info!("simulating client-side navigation to {}", next_url);
        page.navigate(&next_url);
        let replacement = page.attach_video(
            Rect::new(args.container_width, args.container_height),
            (0, 0),
        );

        // The replacement video decodes a moment after the navigation.
        sleep(Duration::from_millis(config.watchdog.poll_interval_ms)).await;
        replacement.set_decoded_size(1920, 1080);
        sleep(Duration::from_millis(
            config.watchdog.reapply_delay_ms * 3 + config.watchdog.poll_interval_ms,
        ))
        .await;
        info!("after navigation: {}", page_styles(&page));
    }

    watchdog.shutdown();
    Ok(())
}

fn page_styles(page: &SimulatedPage) -> String {
    match page.query_video() {
        Some(video) => {
            let css = video.inline_css();
            if css.is_empty() {
                "(no inline overrides)".to_string()
            } else {
                css
            }
        }
        None => "(no video element)".to_string(),
    }
}
