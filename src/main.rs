use anyhow::anyhow;
use eframe::egui;
use std::path::Path;
use std::process::ExitCode;

use ytdl_audio_gui::app::YtdlApp;
use ytdl_audio_gui::context::AppContext;
use ytdl_audio_gui::logging::{self, LOG_FILE};
use ytdl_audio_gui::Error;

fn main() -> ExitCode {
    logging::initialize(Path::new(LOG_FILE));

    let context = match AppContext::detect() {
        Ok(context) => context,
        Err(err @ Error::DependencyMissing { .. }) => {
            log::error!("{}", err);
            eprintln!("Error: yt-dlp no esta instalado. Instala con: pip install yt-dlp");
            return ExitCode::from(1);
        }
        Err(err) => {
            log::error!("Startup failed: {}", err);
            return ExitCode::from(1);
        }
    };

    match run(context) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("Unexpected error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(context: AppContext) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 680.0])
            .with_min_inner_size([640.0, 520.0])
            .with_title("Audio Downloader (yt-dlp)"),
        ..Default::default()
    };

    let app = YtdlApp::new(context);
    log::info!("Starting UI");

    eframe::run_native(
        "Audio Downloader",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
            Box::new(app)
        }),
    )
    .map_err(|err| anyhow!("UI error: {err}"))
}
