use eframe::egui;

use super::{bitrate_combo, cover_combo, format_combo, group};
use crate::localizations::Localizations;
use crate::models::{AppState, CoverFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    Save,
    Reset,
    OpenConfigFolder,
}

pub fn render_settings_tab(
    ui: &mut egui::Ui,
    state: &mut AppState,
    localizer: &Localizations,
) -> Option<SettingsAction> {
    let mut action = None;

    group(ui, &localizer.text("settings-audio-group"), |ui| {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(localizer.text("default-format")).strong());
            format_combo(ui, "settings-format", &mut state.config.format);
            ui.add_space(30.0);
            ui.label(egui::RichText::new(localizer.text("default-quality")).strong());
            bitrate_combo(ui, "settings-bitrate", &mut state.config.bitrate);
        });
    });
    ui.add_space(8.0);

    group(ui, &localizer.text("settings-files-group"), |ui| {
        ui.checkbox(
            &mut state.config.create_artist_folders,
            localizer.text("artist-folders-long"),
        );
        ui.checkbox(&mut state.config.skip_existing, localizer.text("skip-existing-long"));
    });
    ui.add_space(8.0);

    group(ui, &localizer.text("settings-cover-group"), |ui| {
        ui.checkbox(&mut state.config.save_cover_art, localizer.text("save-cover-long"));
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(localizer.text("cover-format-long")).strong());
            cover_combo(ui, "settings-cover", &mut state.config.cover_format, &CoverFormat::ALL);
        });
    });
    ui.add_space(16.0);

    ui.horizontal(|ui| {
        if ui.button(localizer.text("save-settings")).clicked() {
            action = Some(SettingsAction::Save);
        }
        if ui.button(localizer.text("reset-settings")).clicked() {
            action = Some(SettingsAction::Reset);
        }
        if ui.button(localizer.text("open-config-folder")).clicked() {
            action = Some(SettingsAction::OpenConfigFolder);
        }
    });

    action
}
