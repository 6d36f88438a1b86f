use std::time::Duration;

use carousel_core::{AppConfig, CarouselController, CarouselItem, SchedulerState, ScrollCommand};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::event::{HostEvent, RuntimeEvent};
use crate::scroll::animation::Frame;
use crate::scroll::ScrollAnimator;

/// Event loop hosting one carousel controller.
///
/// Everything runs on a single task: host events, animation frames and the
/// auto-advance deadline are serviced one at a time by a biased `select!`,
/// so a drag-start that is already queued always beats a tick that comes
/// due at the same moment.
pub struct CarouselRuntime {
    controller: CarouselController,
    animator: ScrollAnimator,
    event_tx: Option<mpsc::UnboundedSender<RuntimeEvent>>,
    started: Instant,
    reported_index: Option<usize>,
    reported_state: Option<SchedulerState>,
}

impl CarouselRuntime {
    pub fn new(items: Vec<CarouselItem>, config: &AppConfig, visible: bool) -> Self {
        let started = Instant::now();
        Self {
            controller: CarouselController::new(
                items,
                config.carousel.clone(),
                visible,
                started.into_std(),
            ),
            animator: ScrollAnimator::new(config.scroll.clone()),
            event_tx: None,
            started,
            reported_index: None,
            reported_state: None,
        }
    }

    /// Set the sender for runtime notifications
    pub fn with_event_sender(mut self, tx: mpsc::UnboundedSender<RuntimeEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn controller(&self) -> &CarouselController {
        &self.controller
    }

    /// Current simulated scroll offset
    pub fn offset(&self) -> f64 {
        self.animator.offset()
    }

    /// Run until shutdown is signalled (or both channels are gone).
    /// Returns the controller after it has been shut down.
    pub async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<HostEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) -> CarouselController {
        info!(
            items = self.controller.item_count(),
            visible = self.controller.is_visible(),
            "Carousel runtime started"
        );
        let frame = self.animator.frame_interval();
        let mut events_open = true;
        self.report();

        loop {
            let deadline = self.controller.next_deadline().map(Instant::from_std);
            let animating = self.animator.is_animating();

            tokio::select! {
                biased;

                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Carousel runtime received shutdown signal");
                        break;
                    }
                }

                event = events.recv(), if events_open => {
                    match event {
                        Some(event) => self.handle_event(event),
                        None => {
                            debug!("Host event channel closed");
                            events_open = false;
                        }
                    }
                }

                _ = tokio::time::sleep(frame), if animating => {
                    self.on_frame();
                }

                _ = wait_until(deadline) => {
                    let now = Instant::now().into_std();
                    if let Some(command) = self.controller.poll(now) {
                        self.issue(command);
                    }
                }
            }

            self.report();
        }

        self.controller.shutdown();
        let at_ms = self.elapsed_ms();
        self.send(RuntimeEvent::Stopped {
            at_ms,
            current: self.controller.current_index(),
        });
        info!("Carousel runtime stopped");
        self.controller
    }

    fn handle_event(&mut self, event: HostEvent) {
        let now = Instant::now().into_std();
        debug!(?event, "Host event");

        match event {
            HostEvent::Sample { offset } => {
                self.animator.set_offset(offset, self.max_offset());
                self.controller.on_scroll_sample(self.animator.offset());
            }
            HostEvent::DragStart => {
                self.animator.cancel();
                self.controller.on_drag_start();
            }
            HostEvent::DragEnd => match self.controller.on_drag_end(now) {
                Some(snap) => self.issue(snap),
                None => {
                    self.controller.on_scroll_settled(self.animator.offset());
                }
            },
            HostEvent::SetVisible { visible } => self.controller.set_visible(visible, now),
            HostEvent::SetItems { items } => {
                self.controller.set_items(items, now);
                let offset = self.animator.offset();
                self.animator.set_offset(offset, self.max_offset());
            }
            HostEvent::SetInterval { interval_ms } => {
                self.controller
                    .set_interval(Duration::from_millis(interval_ms), now);
            }
            HostEvent::Layout { container_width } => self.controller.on_layout(container_width, now),
            HostEvent::ScrollToIndex { index, animated } => {
                match self.controller.scroll_to_index(index, animated) {
                    Some(command) => self.issue(command),
                    None => warn!(index, "Scroll target out of range"),
                }
            }
        }
    }

    /// Hand a controller command to the animator.
    ///
    /// Programmatic scrolls only report where they come to rest; live
    /// samples come from the user.
    fn issue(&mut self, command: ScrollCommand) {
        let at_ms = self.elapsed_ms();
        self.send(RuntimeEvent::ScrollIssued { at_ms, command });

        let now = Instant::now().into_std();
        if let Some(offset) = self.animator.execute(command, self.max_offset(), now) {
            self.controller.on_scroll_settled(offset);
        }
    }

    fn on_frame(&mut self) {
        let now = Instant::now().into_std();
        if let Some(Frame::Settled(offset)) = self.animator.update(now) {
            self.controller.on_scroll_settled(offset);
        }
    }

    fn max_offset(&self) -> f64 {
        self.controller
            .viewport()
            .max_offset(self.controller.item_count())
    }

    fn report(&mut self) {
        let at_ms = self.elapsed_ms();

        let current = self.controller.current_index();
        if current != self.reported_index {
            self.reported_index = current;
            if let Some(index) = current {
                self.send(RuntimeEvent::ActiveChanged {
                    at_ms,
                    index,
                    item_count: self.controller.item_count(),
                });
            }
        }

        let state = self.controller.scheduler_state();
        if self.reported_state != Some(state) {
            self.reported_state = Some(state);
            self.send(RuntimeEvent::StateChanged { at_ms, state });
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn send(&self, event: RuntimeEvent) {
        if let Some(ref tx) = self.event_tx {
            if tx.send(event).is_err() {
                warn!("Failed to send runtime event: receiver dropped");
            }
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carousel_core::CarouselConfig;

    fn items(count: usize) -> Vec<CarouselItem> {
        (0..count)
            .map(|i| CarouselItem::new(format!("post-{i}"), format!("img/{i}.jpg")))
            .collect()
    }

    fn config() -> AppConfig {
        AppConfig {
            carousel: CarouselConfig {
                animated: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    struct Harness {
        events: mpsc::UnboundedSender<HostEvent>,
        shutdown: watch::Sender<bool>,
        output: mpsc::UnboundedReceiver<RuntimeEvent>,
        handle: tokio::task::JoinHandle<CarouselController>,
    }

    fn spawn(count: usize, config: AppConfig, visible: bool) -> Harness {
        let (events, events_rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = watch::channel(false);
        let (out_tx, output) = mpsc::unbounded_channel();
        let runtime = CarouselRuntime::new(items(count), &config, visible).with_event_sender(out_tx);
        let handle = tokio::spawn(runtime.run(events_rx, shutdown_rx));
        Harness {
            events,
            shutdown,
            output,
            handle,
        }
    }

    impl Harness {
        async fn stop(mut self) -> (CarouselController, Vec<RuntimeEvent>) {
            self.shutdown.send(true).unwrap();
            let controller = self.handle.await.unwrap();
            let mut out = Vec::new();
            while let Ok(event) = self.output.try_recv() {
                out.push(event);
            }
            (controller, out)
        }
    }

    fn scroll_times(events: &[RuntimeEvent]) -> Vec<(u64, usize)> {
        events
            .iter()
            .filter_map(|e| match e {
                RuntimeEvent::ScrollIssued { at_ms, command } => Some((*at_ms, command.index)),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_advance_three_ticks() {
        let harness = spawn(5, config(), true);
        tokio::time::sleep(Duration::from_millis(6500)).await;
        let (controller, events) = harness.stop().await;

        assert_eq!(scroll_times(&events), vec![(2000, 1), (4000, 2), (6000, 3)]);
        assert_eq!(controller.current_index(), Some(3));
        assert!(controller.is_shut_down());
        assert!(matches!(events.last(), Some(RuntimeEvent::Stopped { current: Some(3), .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drag_restarts_interval() {
        let harness = spawn(5, config(), true);

        tokio::time::sleep(Duration::from_millis(500)).await;
        harness.events.send(HostEvent::DragStart).unwrap();
        tokio::time::sleep(Duration::from_millis(1300)).await;
        harness.events.send(HostEvent::DragEnd).unwrap();
        tokio::time::sleep(Duration::from_millis(2500)).await;

        let (_, events) = harness.stop().await;
        assert_eq!(scroll_times(&events), vec![(3800, 1)]);
        assert!(events.contains(&RuntimeEvent::StateChanged {
            at_ms: 500,
            state: SchedulerState::Suspended
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drag_start_queued_at_deadline_wins() {
        let (events, events_rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = watch::channel(false);
        let (out_tx, mut output) = mpsc::unbounded_channel();
        let runtime = CarouselRuntime::new(items(5), &config(), true).with_event_sender(out_tx);

        // The deadline has passed and a drag-start is waiting when the loop first polls
        tokio::time::advance(Duration::from_millis(2500)).await;
        events.send(HostEvent::DragStart).unwrap();
        let handle = tokio::spawn(runtime.run(events_rx, shutdown_rx));
        tokio::time::sleep(Duration::from_millis(5000)).await;

        shutdown.send(true).unwrap();
        let controller = handle.await.unwrap();
        let mut out = Vec::new();
        while let Ok(event) = output.try_recv() {
            out.push(event);
        }
        assert!(scroll_times(&out).is_empty());
        assert_eq!(controller.current_index(), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drag_before_deadline_cancels_tick() {
        let harness = spawn(5, config(), true);
        tokio::time::sleep(Duration::from_millis(1999)).await;
        harness.events.send(HostEvent::DragStart).unwrap();
        tokio::time::sleep(Duration::from_millis(5000)).await;

        let (controller, events) = harness.stop().await;
        assert!(scroll_times(&events).is_empty());
        assert_eq!(controller.current_index(), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hidden_runtime_never_scrolls() {
        let harness = spawn(5, config(), false);
        tokio::time::sleep(Duration::from_secs(60)).await;
        let (_, events) = harness.stop().await;
        assert!(scroll_times(&events).is_empty());
        assert!(events.contains(&RuntimeEvent::StateChanged {
            at_ms: 0,
            state: SchedulerState::Idle
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_user_samples_and_snap() {
        let harness = spawn(5, config(), true);
        harness.events.send(HostEvent::DragStart).unwrap();
        for offset in [100.0, 250.0, 420.0] {
            harness.events.send(HostEvent::Sample { offset }).unwrap();
        }
        harness.events.send(HostEvent::DragEnd).unwrap();
        tokio::time::sleep(Duration::from_millis(1000)).await;

        let (controller, events) = harness.stop().await;
        assert_eq!(controller.current_index(), Some(1));
        assert_eq!(scroll_times(&events), vec![(0, 1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_animated_scroll_settles_on_target() {
        let harness = spawn(5, AppConfig::default(), true);
        harness
            .events
            .send(HostEvent::ScrollToIndex { index: 3, animated: true })
            .unwrap();
        tokio::time::sleep(Duration::from_millis(1000)).await;

        let (controller, _) = harness.stop().await;
        assert_eq!(controller.current_index(), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wide_container_wraps_around() {
        let mut config = AppConfig::default();
        config.carousel.container_width = 600.0;
        let harness = spawn(5, config, true);
        tokio::time::sleep(Duration::from_millis(14_500)).await;
        let (controller, events) = harness.stop().await;

        let targets: Vec<usize> = scroll_times(&events).into_iter().map(|(_, i)| i).collect();
        assert_eq!(targets, vec![1, 2, 3, 4, 0, 1, 2]);

        let active: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                RuntimeEvent::ActiveChanged { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(active, vec![0, 1, 2, 3, 4, 0, 1, 2]);
        assert_eq!(controller.current_index(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_item_change_replaces_timer() {
        let harness = spawn(5, config(), true);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        harness.events.send(HostEvent::SetItems { items: items(3) }).unwrap();
        tokio::time::sleep(Duration::from_millis(2500)).await;

        let (_, events) = harness.stop().await;
        assert_eq!(scroll_times(&events), vec![(3500, 1)]);
    }
}
