use eframe::egui;
use log::{error, info};
use std::io;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

use crate::config::JobConfig;
use crate::context::AppContext;
use crate::download::{validate, DownloadJob};
use crate::error::ValidationError;
use crate::localizations::Localizations;
use crate::models::{AppState, JobOutcome, Tab};
use crate::session::{JobSession, POLL_INTERVAL, SHUTDOWN_GRACE};
use crate::ui::{self, dialogs, settings::SettingsAction, DownloadAction};

pub struct YtdlApp {
    pub state: AppState,
    localizer: Localizations,
    context: AppContext,
    session: Option<JobSession>,
    last_poll: Instant,
}

impl YtdlApp {
    pub fn new(context: AppContext) -> Self {
        let localizer = Localizations::new();
        let config = context.config_store.load();
        let state = AppState::new(config, localizer.text("status-ready"));

        Self {
            state,
            localizer,
            context,
            session: None,
            last_poll: Instant::now(),
        }
    }

    pub fn start_download(&mut self) {
        if !self.state.can_start() {
            return;
        }

        let url = self.state.url.trim().to_string();
        if let Err(err) = validate(&url, &self.state.config.output_dir) {
            let (title, text) = match err {
                ValidationError::EmptyUrl => ("warn-empty-url-title", "warn-empty-url"),
                ValidationError::InvalidOutputDir(_) => ("warn-bad-dir-title", "warn-bad-dir"),
            };
            dialogs::warning(&self.localizer.text(title), &self.localizer.text(text));
            return;
        }

        let job = DownloadJob::new(url, self.state.config.clone());
        match JobSession::start(job, self.context.extractor.clone()) {
            Ok(session) => {
                self.state.begin_job(self.localizer.text("status-preparing"));
                self.session = Some(session);
                self.last_poll = Instant::now();
            }
            Err(err) => {
                error!("Could not start download: {}", err);
                dialogs::error(
                    &self.localizer.text("error-title"),
                    &format!("{}: {}", self.localizer.text("start-failed"), err),
                );
            }
        }
    }

    pub fn cancel_download(&mut self) {
        if !self.state.can_cancel() {
            return;
        }
        let confirmed = dialogs::confirm(
            &self.localizer.text("confirm-cancel-title"),
            &self.localizer.text("confirm-cancel"),
        );
        if let (true, Some(session)) = (confirmed, self.session.as_ref()) {
            session.cancel();
            self.state.begin_cancel(self.localizer.text("status-canceling"));
        }
    }

    fn poll_worker(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let result = session.poll();
        if result.worker_exited {
            self.session = None;
        }

        match self.state.apply_poll(result) {
            Some(JobOutcome::Completed) => self.show_completion(),
            Some(JobOutcome::Vanished) => {
                let text = self.localizer.text("status-worker-lost");
                self.state.push_log(&text);
                self.state.status = text;
            }
            _ => {}
        }
    }

    fn show_completion(&mut self) {
        if let Some(track) = &self.state.track {
            let artist = if track.artist.is_empty() {
                self.localizer.text("unknown-artist")
            } else {
                track.artist.clone()
            };
            dialogs::info(
                &self.localizer.text("complete-title"),
                &format!(
                    "'{}' {} {}\n\n{}",
                    track.title,
                    self.localizer.text("complete-by"),
                    artist,
                    self.localizer.text("complete-body")
                ),
            );
        }
        self.state.status = self.localizer.text("status-done-idle");
    }

    fn open_output_folder(&self) {
        let dir = &self.state.config.output_dir;
        if !dir.is_dir() {
            dialogs::warning(
                &self.localizer.text("folder-missing-title"),
                &self.localizer.text("folder-missing"),
            );
            return;
        }
        self.open_folder(dir);
    }

    fn open_config_folder(&self) {
        let path = self.context.config_store.path();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir().unwrap_or_default(),
        };
        self.open_folder(&dir);
    }

    fn open_folder(&self, dir: &Path) {
        if let Err(err) = open_in_file_manager(dir) {
            error!("Failed to open {:?}: {}", dir, err);
            dialogs::error(
                &self.localizer.text("error-title"),
                &format!("{}: {}", self.localizer.text("open-failed"), err),
            );
        }
    }

    fn save_settings(&self) {
        let title = self.localizer.text("settings-title");
        if self.context.config_store.save(&self.state.config) {
            dialogs::info(&title, &self.localizer.text("settings-saved"));
        } else {
            dialogs::warning(&title, &self.localizer.text("settings-save-failed"));
        }
    }

    fn reset_settings(&mut self) {
        let title = self.localizer.text("settings-title");
        if dialogs::confirm(&title, &self.localizer.text("confirm-reset")) {
            self.state.config = JobConfig::default();
            dialogs::info(&title, &self.localizer.text("settings-restored"));
        }
    }

    pub fn update_ui(&mut self, ctx: &egui::Context) {
        if self.last_poll.elapsed() >= POLL_INTERVAL {
            self.last_poll = Instant::now();
            self.poll_worker();
        }
        if self.session.is_some() {
            ctx.request_repaint_after(POLL_INTERVAL);
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.heading(self.localizer.text("app-title"));
            ui.add_space(4.0);
            ui::render_tabs(ui, &mut self.state, &self.localizer);
            ui.add_space(4.0);
        });

        let mut download_action = None;
        let mut settings_action = None;
        let tab = self.state.tab;
        egui::CentralPanel::default().show(ctx, |ui| match tab {
            Tab::Download => {
                download_action = ui::render_download_tab(ui, &mut self.state, &self.localizer);
            }
            Tab::Settings => {
                settings_action =
                    ui::settings::render_settings_tab(ui, &mut self.state, &self.localizer);
            }
            Tab::About => ui::about::render_about_tab(ui, &self.localizer),
        });

        match download_action {
            Some(DownloadAction::Start) => {
                self.start_download();
                ctx.request_repaint();
            }
            Some(DownloadAction::Cancel) => self.cancel_download(),
            Some(DownloadAction::OpenFolder) => self.open_output_folder(),
            Some(DownloadAction::ClearLog) => self.state.clear_log(),
            None => {}
        }

        match settings_action {
            Some(SettingsAction::Save) => self.save_settings(),
            Some(SettingsAction::Reset) => self.reset_settings(),
            Some(SettingsAction::OpenConfigFolder) => self.open_config_folder(),
            None => {}
        }
    }
}

impl eframe::App for YtdlApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_ui(ctx);
    }

    /// Confirm, signal the worker, give it a bounded time to stop, then close
    /// regardless.
    fn on_close_event(&mut self) -> bool {
        let alive = self.session.as_ref().is_some_and(JobSession::is_alive);
        if !alive {
            return true;
        }

        let confirmed = dialogs::confirm(
            &self.localizer.text("confirm-exit-title"),
            &self.localizer.text("confirm-exit"),
        );
        if !confirmed {
            return false;
        }

        if let Some(session) = self.session.take() {
            info!("Closing with a download in progress");
            session.shutdown(SHUTDOWN_GRACE);
        }
        true
    }
}

fn open_in_file_manager(dir: &Path) -> io::Result<()> {
    let program = if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };
    Command::new(program).arg(dir).spawn().map(|_| ())
}
