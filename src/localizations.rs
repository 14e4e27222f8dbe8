use std::collections::HashMap;

use i18n_embed::DesktopLanguageRequester;
use unic_langid::{langid, LanguageIdentifier};

// Simple in-memory translations
#[derive(Default)]
pub struct Translations {
    strings: HashMap<&'static str, &'static str>,
}

impl Translations {
    fn from_table(table: &[(&'static str, &'static str)]) -> Self {
        Self {
            strings: table.iter().copied().collect(),
        }
    }

    pub fn lookup(&self, key: &str) -> Option<&'static str> {
        self.strings.get(key).copied()
    }
}

pub struct Localizations {
    translations: HashMap<LanguageIdentifier, Translations>,
    current: LanguageIdentifier,
}

impl Default for Localizations {
    fn default() -> Self {
        Self::new()
    }
}

impl Localizations {
    /// Picks the first supported language the desktop asks for.
    pub fn new() -> Self {
        Self::with_requested(&DesktopLanguageRequester::requested_languages())
    }

    pub fn with_requested(requested: &[LanguageIdentifier]) -> Self {
        let mut translations = HashMap::new();
        translations.insert(langid!("es-ES"), Translations::from_table(ES));
        translations.insert(langid!("en-US"), Translations::from_table(EN));

        let mut localizer = Self {
            translations,
            current: fallback_language(),
        };
        if let Some(lang) = requested.iter().find(|lang| localizer.supports(lang)) {
            localizer.select(lang);
        }
        localizer
    }

    pub fn current(&self) -> &LanguageIdentifier {
        &self.current
    }

    /// Exact match first, then any table with the same language subtag,
    /// otherwise English.
    pub fn select(&mut self, lang: &LanguageIdentifier) {
        self.current = if self.translations.contains_key(lang) {
            lang.clone()
        } else {
            self.translations
                .keys()
                .find(|known| known.language == lang.language)
                .cloned()
                .unwrap_or_else(fallback_language)
        };
    }

    pub fn lookup(&self, key: &str) -> Option<&'static str> {
        self.translations
            .get(&self.current)
            .and_then(|t| t.lookup(key))
            .or_else(|| {
                self.translations
                    .get(&fallback_language())
                    .and_then(|t| t.lookup(key))
            })
    }

    /// Like [`lookup`](Self::lookup), but a missing key shows up as itself.
    pub fn text(&self, key: &str) -> String {
        self.lookup(key).unwrap_or(key).to_string()
    }

    fn supports(&self, lang: &LanguageIdentifier) -> bool {
        self.translations
            .keys()
            .any(|known| known.language == lang.language)
    }
}

fn fallback_language() -> LanguageIdentifier {
    langid!("en-US")
}

const ES: &[(&str, &str)] = &[
    ("app-title", "Descargador de Audio (yt-dlp)"),
    ("tab-download", "Descarga"),
    ("tab-settings", "Configuración"),
    ("tab-about", "Acerca de"),
    ("url-group", "URL de Audio"),
    ("url-placeholder", "Pega aquí la URL (SoundCloud, YouTube, ...)"),
    ("format-label", "Formato:"),
    ("quality-label", "Calidad:"),
    ("output-group", "Configuración de Descarga"),
    ("output-dir-label", "Carpeta de salida:"),
    ("output-dir-placeholder", "Selecciona la carpeta de salida"),
    ("browse-button", "Explorar"),
    ("pick-folder-title", "Seleccionar carpeta de salida"),
    ("artist-folders", "Crear carpetas por artista"),
    ("skip-existing", "Omitir archivos existentes"),
    ("save-cover", "Guardar carátula separada"),
    ("cover-format", "Formato carátula:"),
    ("download-button", "Descargar"),
    ("cancel-button", "Cancelar"),
    ("open-folder-button", "Abrir carpeta"),
    ("clear-log-button", "Limpiar log"),
    ("track-group", "Información del Track"),
    ("progress-group", "Progreso de Descarga"),
    ("status-ready", "Listo para descargar"),
    ("status-preparing", "Preparando descarga..."),
    ("status-canceling", "Cancelando..."),
    ("status-done-idle", "Descarga completada - Listo para nueva descarga"),
    ("status-worker-lost", "La descarga terminó sin informar un resultado"),
    ("warn-empty-url-title", "URL vacía"),
    ("warn-empty-url", "Ingresa una URL válida"),
    ("warn-bad-dir-title", "Directorio inválido"),
    ("warn-bad-dir", "Selecciona un directorio válido"),
    ("confirm-cancel-title", "Cancelar"),
    ("confirm-cancel", "¿Cancelar la descarga actual?"),
    ("confirm-exit-title", "Salir"),
    ("confirm-exit", "¿Cancelar descarga y salir?"),
    ("complete-title", "Descarga Completada"),
    ("complete-by", "de"),
    ("complete-body", "Audio descargado\nCarátula procesada\nMetadatos embebidos"),
    ("unknown-artist", "Artista desconocido"),
    ("start-failed", "No se pudo iniciar la descarga"),
    ("settings-audio-group", "Configuración de Audio"),
    ("default-format", "Formato por defecto:"),
    ("default-quality", "Calidad por defecto:"),
    ("settings-files-group", "Organización de Archivos"),
    ("artist-folders-long", "Crear carpetas por artista automáticamente"),
    ("skip-existing-long", "Omitir archivos que ya existen"),
    ("settings-cover-group", "Configuración de Carátulas"),
    ("save-cover-long", "Guardar carátula como archivo separado"),
    ("cover-format-long", "Formato de carátula:"),
    ("save-settings", "Guardar configuración"),
    ("reset-settings", "Restaurar valores por defecto"),
    ("open-config-folder", "Abrir carpeta de configuración"),
    ("settings-title", "Configuración"),
    ("settings-saved", "Configuración guardada correctamente"),
    ("settings-save-failed", "No se pudo guardar la configuración"),
    ("confirm-reset", "¿Restaurar todos los valores por defecto?"),
    ("settings-restored", "Configuración restaurada"),
    ("folder-missing-title", "Carpeta no encontrada"),
    ("folder-missing", "La carpeta de salida no existe"),
    ("open-failed", "No se pudo abrir la carpeta"),
    ("error-title", "Error"),
    ("about-version", "Versión"),
    ("about-features-group", "Características"),
    (
        "about-features",
        "• Descarga de audio de alta calidad desde múltiples plataformas\n\
         • Soporte para MP3, M4A, FLAC y WAV\n\
         • Descarga automática de carátulas y metadatos\n\
         • Organización por artistas\n\
         • Configuración persistente\n\
         • Progreso detallado en tiempo real",
    ),
    ("about-requirements-group", "Requisitos"),
    (
        "about-requirements",
        "• yt-dlp (pip install yt-dlp)\n• FFmpeg (para conversión de audio)",
    ),
];

const EN: &[(&str, &str)] = &[
    ("app-title", "Audio Downloader (yt-dlp)"),
    ("tab-download", "Download"),
    ("tab-settings", "Settings"),
    ("tab-about", "About"),
    ("url-group", "Audio URL"),
    ("url-placeholder", "Paste the URL here (SoundCloud, YouTube, ...)"),
    ("format-label", "Format:"),
    ("quality-label", "Quality:"),
    ("output-group", "Download Settings"),
    ("output-dir-label", "Output folder:"),
    ("output-dir-placeholder", "Select the output folder"),
    ("browse-button", "Browse..."),
    ("pick-folder-title", "Select output folder"),
    ("artist-folders", "Create per-artist folders"),
    ("skip-existing", "Skip existing files"),
    ("save-cover", "Save cover art separately"),
    ("cover-format", "Cover format:"),
    ("download-button", "Download"),
    ("cancel-button", "Cancel"),
    ("open-folder-button", "Open folder"),
    ("clear-log-button", "Clear log"),
    ("track-group", "Track Info"),
    ("progress-group", "Download Progress"),
    ("status-ready", "Ready to download"),
    ("status-preparing", "Preparing download..."),
    ("status-canceling", "Canceling..."),
    ("status-done-idle", "Download complete - Ready for a new download"),
    ("status-worker-lost", "The download ended without reporting a result"),
    ("warn-empty-url-title", "Empty URL"),
    ("warn-empty-url", "Enter a valid URL"),
    ("warn-bad-dir-title", "Invalid folder"),
    ("warn-bad-dir", "Select a valid folder"),
    ("confirm-cancel-title", "Cancel"),
    ("confirm-cancel", "Cancel the current download?"),
    ("confirm-exit-title", "Quit"),
    ("confirm-exit", "Cancel the download and quit?"),
    ("complete-title", "Download Complete"),
    ("complete-by", "by"),
    ("complete-body", "Audio downloaded\nCover art processed\nMetadata embedded"),
    ("unknown-artist", "Unknown artist"),
    ("start-failed", "Could not start the download"),
    ("settings-audio-group", "Audio Settings"),
    ("default-format", "Default format:"),
    ("default-quality", "Default quality:"),
    ("settings-files-group", "File Organization"),
    ("artist-folders-long", "Automatically create per-artist folders"),
    ("skip-existing-long", "Skip files that already exist"),
    ("settings-cover-group", "Cover Art"),
    ("save-cover-long", "Save cover art as a separate file"),
    ("cover-format-long", "Cover art format:"),
    ("save-settings", "Save settings"),
    ("reset-settings", "Restore defaults"),
    ("open-config-folder", "Open settings folder"),
    ("settings-title", "Settings"),
    ("settings-saved", "Settings saved"),
    ("settings-save-failed", "Could not save the settings"),
    ("confirm-reset", "Restore every setting to its default?"),
    ("settings-restored", "Settings restored"),
    ("folder-missing-title", "Folder not found"),
    ("folder-missing", "The output folder does not exist"),
    ("open-failed", "Could not open the folder"),
    ("error-title", "Error"),
    ("about-version", "Version"),
    ("about-features-group", "Features"),
    (
        "about-features",
        "• High quality audio from many platforms\n\
         • MP3, M4A, FLAC and WAV output\n\
         • Cover art and metadata embedding\n\
         • Per-artist organization\n\
         • Persistent settings\n\
         • Detailed real-time progress",
    ),
    ("about-requirements-group", "Requirements"),
    (
        "about-requirements",
        "• yt-dlp (pip install yt-dlp)\n• FFmpeg (for audio conversion)",
    ),
];
