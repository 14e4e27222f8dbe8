use eframe::egui;
use rfd::FileDialog;
use std::path::PathBuf;

use crate::config::BITRATE_OPTIONS;
use crate::localizations::Localizations;
use crate::models::{track_summary, AppState, AudioFormat, CoverFormat, JobOutcome, Tab};
use crate::theme::*;

pub mod about;
pub mod dialogs;
pub mod settings;

/// Buttons on the download tab that need the application to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadAction {
    Start,
    Cancel,
    OpenFolder,
    ClearLog,
}

pub fn render_tabs(ui: &mut egui::Ui, state: &mut AppState, localizer: &Localizations) {
    ui.horizontal(|ui| {
        ui.selectable_value(&mut state.tab, Tab::Download, localizer.text("tab-download"));
        ui.selectable_value(&mut state.tab, Tab::Settings, localizer.text("tab-settings"));
        ui.selectable_value(&mut state.tab, Tab::About, localizer.text("tab-about"));
    });
}

/// Draws the whole download tab and reports the button pressed, if any.
pub fn render_download_tab(
    ui: &mut egui::Ui,
    state: &mut AppState,
    localizer: &Localizations,
) -> Option<DownloadAction> {
    let mut action = None;

    let url_response = render_url_input(ui, state, localizer);
    let submitted = url_response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
    if submitted && state.can_start() {
        action = Some(DownloadAction::Start);
    }

    ui.add_space(8.0);
    render_output_options(ui, state, localizer);
    ui.add_space(8.0);

    if let Some(clicked) = render_controls(ui, state, localizer) {
        action = Some(clicked);
    }

    ui.add_space(8.0);
    render_track_info(ui, state, localizer);
    ui.add_space(8.0);
    render_progress(ui, state, localizer);

    action
}

pub fn render_url_input(
    ui: &mut egui::Ui,
    state: &mut AppState,
    localizer: &Localizations,
) -> egui::Response {
    group(ui, &localizer.text("url-group"), |ui| {
        let response = ui.add_sized(
            [ui.available_width(), 32.0],
            egui::TextEdit::singleline(&mut state.url)
                .hint_text(localizer.text("url-placeholder"))
                .font(egui::TextStyle::Monospace),
        );

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(localizer.text("format-label")).strong());
            format_combo(ui, "quick-format", &mut state.config.format);
            ui.add_space(20.0);
            ui.label(egui::RichText::new(localizer.text("quality-label")).strong());
            bitrate_combo(ui, "quick-bitrate", &mut state.config.bitrate);
        });

        response
    })
}

fn render_output_options(ui: &mut egui::Ui, state: &mut AppState, localizer: &Localizations) {
    group(ui, &localizer.text("output-group"), |ui| {
        render_download_dir_selector(ui, state, localizer);
        ui.add_space(6.0);

        ui.columns(2, |columns| {
            columns[0].checkbox(
                &mut state.config.create_artist_folders,
                localizer.text("artist-folders"),
            );
            columns[0].checkbox(&mut state.config.skip_existing, localizer.text("skip-existing"));

            columns[1].checkbox(&mut state.config.save_cover_art, localizer.text("save-cover"));
            columns[1].horizontal(|ui| {
                ui.label(localizer.text("cover-format"));
                cover_combo(
                    ui,
                    "quick-cover",
                    &mut state.config.cover_format,
                    &CoverFormat::ALL[..2],
                );
            });
        });
    });
}

fn render_download_dir_selector(
    ui: &mut egui::Ui,
    state: &mut AppState,
    localizer: &Localizations,
) {
    ui.label(egui::RichText::new(localizer.text("output-dir-label")).strong());
    ui.horizontal(|ui| {
        let mut text = state.config.output_dir.to_string_lossy().into_owned();
        let response = ui.add_sized(
            [ui.available_width() - 110.0, 28.0],
            egui::TextEdit::singleline(&mut text)
                .hint_text(localizer.text("output-dir-placeholder")),
        );
        if response.changed() {
            state.config.output_dir = PathBuf::from(text);
        }

        let button = egui::Button::new(localizer.text("browse-button"))
            .min_size(egui::vec2(100.0, 28.0))
            .rounding(ROUNDING_FRAME);

        if ui.add(button).clicked() {
            let start_dir = if state.config.output_dir.is_dir() {
                state.config.output_dir.clone()
            } else {
                PathBuf::from(".")
            };
            if let Some(path) = FileDialog::new()
                .set_title(&localizer.text("pick-folder-title"))
                .set_directory(start_dir)
                .pick_folder()
            {
                state.config.output_dir = path;
            }
        }
    });
}

fn render_controls(
    ui: &mut egui::Ui,
    state: &AppState,
    localizer: &Localizations,
) -> Option<DownloadAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        let download_button = egui::Button::new(
            egui::RichText::new(localizer.text("download-button"))
                .size(BUTTON_FONT_SIZE)
                .color(BUTTON_MAIN_TEXT),
        )
        .min_size(MIN_SIZE_BUTTON)
        .fill(PRIMARY_BUTTON_BG)
        .rounding(ROUNDING_BUTTON)
        .stroke(egui::Stroke::new(1.0, BORDER_COLOR));
        if ui.add_enabled(state.can_start(), download_button).clicked() {
            action = Some(DownloadAction::Start);
        }

        let cancel_button = egui::Button::new(
            egui::RichText::new(localizer.text("cancel-button"))
                .size(BUTTON_FONT_SIZE)
                .color(BUTTON_MAIN_TEXT),
        )
        .min_size(MIN_SIZE_BUTTON)
        .fill(DANGER_BUTTON_BG)
        .rounding(ROUNDING_BUTTON);
        if ui.add_enabled(state.can_cancel(), cancel_button).clicked() {
            action = Some(DownloadAction::Cancel);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button(localizer.text("open-folder-button")).clicked() {
                action = Some(DownloadAction::OpenFolder);
            }
            if ui.button(localizer.text("clear-log-button")).clicked() {
                action = Some(DownloadAction::ClearLog);
            }
        });
    });

    action
}

fn render_track_info(ui: &mut egui::Ui, state: &AppState, localizer: &Localizations) {
    group(ui, &localizer.text("track-group"), |ui| {
        let text = state.track.as_ref().map(track_summary).unwrap_or_default();
        ui.add_sized(
            [ui.available_width(), 48.0],
            egui::Label::new(egui::RichText::new(text).color(SECONDARY_TEXT)).wrap(true),
        );
    });
}

pub fn render_progress(ui: &mut egui::Ui, state: &AppState, localizer: &Localizations) {
    group(ui, &localizer.text("progress-group"), |ui| {
        ui.horizontal(|ui| {
            let bar = if state.indeterminate {
                egui::ProgressBar::new(0.0).animate(true)
            } else {
                egui::ProgressBar::new(state.progress / 100.0)
            };
            ui.add_sized([ui.available_width() - 50.0, 18.0], bar);
            ui.label(&state.progress_label);
        });

        let color = match state.last_outcome {
            Some(JobOutcome::Completed) => TEXT_SUCCESS,
            Some(JobOutcome::Failed) => TEXT_ERROR,
            Some(JobOutcome::Canceled) | Some(JobOutcome::Vanished) => TEXT_WARNING,
            None => SECONDARY_TEXT,
        };
        ui.label(egui::RichText::new(&state.status).color(color));
        ui.add_space(6.0);

        egui::Frame::none()
            .fill(LOG_BG)
            .rounding(ROUNDING_FRAME)
            .inner_margin(egui::Margin::same(6.0))
            .show(ui, |ui| {
                ui.set_min_height(ui.available_height().max(80.0));
                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        for line in &state.log {
                            ui.label(
                                egui::RichText::new(line)
                                    .monospace()
                                    .size(LOG_FONT_SIZE)
                                    .color(LOG_TEXT),
                            );
                        }
                    });
            });
    });
}

/// A titled group frame, the egui take on a labelled frame.
pub(crate) fn group<R>(
    ui: &mut egui::Ui,
    title: &str,
    add_contents: impl FnOnce(&mut egui::Ui) -> R,
) -> R {
    egui::Frame::group(ui.style())
        .fill(PANEL_BG)
        .rounding(ROUNDING_FRAME)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(egui::RichText::new(title).strong());
            ui.add_space(4.0);
            add_contents(ui)
        })
        .inner
}

pub(crate) fn format_combo(ui: &mut egui::Ui, id: &str, format: &mut AudioFormat) {
    egui::ComboBox::from_id_source(id)
        .selected_text(format.as_str())
        .width(80.0)
        .show_ui(ui, |ui| {
            for option in AudioFormat::ALL {
                ui.selectable_value(format, option, option.as_str());
            }
        });
}

pub(crate) fn bitrate_combo(ui: &mut egui::Ui, id: &str, bitrate: &mut String) {
    egui::ComboBox::from_id_source(id)
        .selected_text(bitrate.as_str())
        .width(80.0)
        .show_ui(ui, |ui| {
            for option in BITRATE_OPTIONS {
                ui.selectable_value(bitrate, option.to_string(), option);
            }
        });
}

pub(crate) fn cover_combo(
    ui: &mut egui::Ui,
    id: &str,
    cover: &mut CoverFormat,
    options: &[CoverFormat],
) {
    egui::ComboBox::from_id_source(id)
        .selected_text(cover.as_str())
        .width(70.0)
        .show_ui(ui, |ui| {
            for option in options {
                ui.selectable_value(cover, *option, option.as_str());
            }
        });
}
