use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::{ApiError, CourseInfo, SyllabusBackend};
use crate::config::Config;
use crate::ui::{install_panic_hook, TerminalGuard, WizardCommand, WizardScreen};
use crate::wizard::{
    load_section, persist, LocationStore, SaveReceipt, SaveRequest, SectionDraft, StepError,
    SyllabusIdentity,
};

/// How long quitting waits for saves already sent
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Results of background work, delivered to the event loop
#[derive(Debug)]
pub enum AppEvent {
    Loaded {
        mount: u64,
        result: Result<SectionDraft, StepError>,
    },
    Saved {
        request: SaveRequest,
        result: Result<SaveReceipt, StepError>,
    },
    Submitted(Result<(), ApiError>),
    Course(Result<Option<CourseInfo>, ApiError>),
}

pub struct App {
    config: Config,
    backend: Arc<dyn SyllabusBackend>,
    location: Arc<dyn LocationStore>,
    screen: WizardScreen,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    /// Load of the mounted step; aborted when another step mounts
    load_task: Option<JoinHandle<()>>,
    saves_in_flight: usize,
    should_quit: bool,
}

impl App {
    pub fn new(
        config: Config,
        backend: Arc<dyn SyllabusBackend>,
        identity: SyllabusIdentity,
        location: Arc<dyn LocationStore>,
    ) -> Self {
        tracing::info!(
            backend = backend.name(),
            syllabus_id = ?identity.syllabus_id(),
            course_code = ?identity.course_code(),
            "starting wizard"
        );
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            config,
            backend,
            location,
            screen: WizardScreen::new(identity),
            events_tx,
            events_rx,
            load_task: None,
            saves_in_flight: 0,
            should_quit: false,
        }
    }

    pub fn screen(&self) -> &WizardScreen {
        &self.screen
    }

    pub async fn run(&mut self) -> Result<()> {
        install_panic_hook();
        let (_guard, mut terminal) =
            TerminalGuard::enter().context("Failed to initialize terminal")?;

        self.start();
        let tick_rate = Duration::from_millis(self.config.ui.refresh_rate_ms);

        while !self.should_quit {
            terminal.draw(|f| self.screen.render(f))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        if let Some(command) = self.screen.handle_key(key) {
                            self.dispatch(command);
                        }
                    }
                }
            }

            while let Ok(event) = self.events_rx.try_recv() {
                self.handle_event(event);
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Dispatch the wizard's opening commands
    pub fn start(&mut self) {
        for command in self.screen.start() {
            self.dispatch(command);
        }
    }

    pub fn dispatch(&mut self, command: WizardCommand) {
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        match command {
            WizardCommand::Load {
                mount,
                kind,
                syllabus_id,
            } => {
                if let Some(previous) = self.load_task.take() {
                    previous.abort();
                }
                self.load_task = Some(tokio::spawn(async move {
                    let result = load_section(backend.as_ref(), syllabus_id, kind).await;
                    let _ = tx.send(AppEvent::Loaded { mount, result });
                }));
            }
            WizardCommand::Save(request) => {
                self.saves_in_flight += 1;
                tokio::spawn(async move {
                    let result = persist(backend.as_ref(), &request).await;
                    let _ = tx.send(AppEvent::Saved { request, result });
                });
            }
            WizardCommand::Submit(syllabus_id) => {
                tokio::spawn(async move {
                    let result = backend.submit_for_review(syllabus_id).await;
                    let _ = tx.send(AppEvent::Submitted(result));
                });
            }
            WizardCommand::FetchCourse(code) => {
                tokio::spawn(async move {
                    let result = backend.fetch_course(&code).await;
                    let _ = tx.send(AppEvent::Course(result));
                });
            }
            WizardCommand::Quit => self.should_quit = true,
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Loaded { mount, result } => self.screen.load_finished(mount, result),
            AppEvent::Saved { request, result } => {
                self.saves_in_flight = self.saves_in_flight.saturating_sub(1);
                if let Some(command) =
                    self.screen
                        .save_finished(&request, result, self.location.as_ref())
                {
                    self.dispatch(command);
                }
            }
            AppEvent::Submitted(result) => self.screen.submit_finished(result),
            AppEvent::Course(result) => self.screen.course_loaded(result),
        }
    }

    /// Wait for the next background result and apply it
    pub async fn next_event(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    /// Abort the pending load and give in-flight saves a chance to land
    async fn shutdown(&mut self) {
        if let Some(task) = self.load_task.take() {
            task.abort();
        }
        if self.saves_in_flight == 0 {
            return;
        }
        tracing::info!(pending = self.saves_in_flight, "waiting for pending saves");
        let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
            while self.saves_in_flight > 0 {
                if !self.next_event().await {
                    break;
                }
            }
        })
        .await;
        if drained.is_err() {
            tracing::warn!(
                pending = self.saves_in_flight,
                "quit before pending saves finished"
            );
        }
    }
}
