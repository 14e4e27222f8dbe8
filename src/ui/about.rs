use eframe::egui;

use super::group;
use crate::localizations::Localizations;

pub fn render_about_tab(ui: &mut egui::Ui, localizer: &Localizations) {
    ui.vertical_centered(|ui| {
        ui.add_space(16.0);
        ui.heading(localizer.text("app-title"));
        ui.label(format!(
            "{} {}",
            localizer.text("about-version"),
            env!("CARGO_PKG_VERSION")
        ));
        ui.add_space(16.0);
    });

    group(ui, &localizer.text("about-features-group"), |ui| {
        ui.label(localizer.text("about-features"));
    });
    ui.add_space(8.0);
    group(ui, &localizer.text("about-requirements-group"), |ui| {
        ui.label(localizer.text("about-requirements"));
    });
}
