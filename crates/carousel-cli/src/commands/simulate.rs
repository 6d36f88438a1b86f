use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};
use tracing::info;

use carousel_core::AppConfig;
use carousel_host::scenario::replay;
use carousel_host::{render_indicators, CarouselRuntime, RuntimeEvent, Scenario};

pub async fn run(
    config: &AppConfig,
    scenario: Scenario,
    default_duration: Duration,
    json: bool,
) -> Result<()> {
    let mut config = config.clone();
    if let Some(carousel) = scenario.carousel.clone() {
        config.carousel = carousel;
    }
    let duration = scenario.duration(default_duration);
    let show_indicators = config.carousel.show_indicators;

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (out_tx, mut out_rx) = mpsc::unbounded_channel();

    let runtime = CarouselRuntime::new(scenario.items, &config, scenario.visible)
        .with_event_sender(out_tx);
    let runtime_handle = tokio::spawn(runtime.run(event_rx, shutdown_rx));
    let replay_handle = tokio::spawn(replay(scenario.events, event_tx));

    info!("Simulating for {} ms", duration.as_millis());
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
            }
        }
        let _ = shutdown_tx.send(true);
    });

    // Ends once the runtime drops its sender
    while let Some(event) = out_rx.recv().await {
        if json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            println!("{}", describe(&event, show_indicators));
        }
    }

    replay_handle.abort();
    let controller = runtime_handle
        .await
        .context("Carousel runtime task failed")?;
    info!(
        current = ?controller.current_index(),
        items = controller.item_count(),
        "Simulation finished"
    );
    Ok(())
}

fn describe(event: &RuntimeEvent, show_indicators: bool) -> String {
    match event {
        RuntimeEvent::ActiveChanged {
            at_ms,
            index,
            item_count,
        } => {
            let dots = render_indicators(*item_count, Some(*index), show_indicators);
            format!("[{:>7} ms] active item {} {}", at_ms, index, dots)
        }
        RuntimeEvent::ScrollIssued { at_ms, command } => format!(
            "[{:>7} ms] scroll to item {} (offset {}{})",
            at_ms,
            command.index,
            command.offset,
            if command.animated { ", animated" } else { "" }
        ),
        RuntimeEvent::StateChanged { at_ms, state } => {
            format!("[{:>7} ms] scheduler {:?}", at_ms, state)
        }
        RuntimeEvent::Stopped { at_ms, current } => match current {
            Some(index) => format!("[{:>7} ms] stopped on item {}", at_ms, index),
            None => format!("[{:>7} ms] stopped with no items", at_ms),
        },
    }
}
