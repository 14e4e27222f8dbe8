#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use ytdl_audio_gui::cancel::CancellationToken;
use ytdl_audio_gui::extractor::{
    DownloadRequest, EventSink, Extractor, ExtractorEvent, Flow, MediaInfo,
};
use ytdl_audio_gui::progress::{ProgressMessage, ProgressReceiver};
use ytdl_audio_gui::{Error, Result};

/// Extractor that replays a fixed list of events instead of touching the
/// network.
pub struct ScriptedExtractor {
    info: MediaInfo,
    failing_probes: usize,
    probe_delay: Duration,
    panics: bool,
    events: Vec<ExtractorEvent>,
    failure: Option<String>,
    tick_delay: Duration,
    cancel_at: Option<(usize, CancellationToken)>,
    probes: AtomicUsize,
    requests: Mutex<Vec<DownloadRequest>>,
    dir_existed: Mutex<Vec<bool>>,
}

impl ScriptedExtractor {
    pub fn new(info: MediaInfo) -> Self {
        Self {
            info,
            failing_probes: 0,
            probe_delay: Duration::ZERO,
            panics: false,
            events: Vec::new(),
            failure: None,
            tick_delay: Duration::ZERO,
            cancel_at: None,
            probes: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            dir_existed: Mutex::new(Vec::new()),
        }
    }

    pub fn with_events(mut self, events: Vec<ExtractorEvent>) -> Self {
        self.events = events;
        self
    }

    /// The first `count` probes fail.
    pub fn failing_probes(mut self, count: usize) -> Self {
        self.failing_probes = count;
        self
    }

    /// Every probe blocks for `delay` without looking at the token.
    pub fn slow_probe(mut self, delay: Duration) -> Self {
        self.probe_delay = delay;
        self
    }

    /// The download panics instead of returning.
    pub fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    /// The download reports this error after replaying its events.
    pub fn failing_with(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn tick_delay(mut self, delay: Duration) -> Self {
        self.tick_delay = delay;
        self
    }

    /// Cancels `token` right before event number `tick` is delivered.
    pub fn cancel_at(mut self, tick: usize, token: CancellationToken) -> Self {
        self.cancel_at = Some((tick, token));
        self
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<DownloadRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Whether the output directory existed each time `download` ran.
    pub fn dir_existed(&self) -> Vec<bool> {
        self.dir_existed.lock().unwrap().clone()
    }
}

impl Extractor for ScriptedExtractor {
    fn probe(&self, _url: &str, _token: &CancellationToken) -> Result<MediaInfo> {
        if !self.probe_delay.is_zero() {
            std::thread::sleep(self.probe_delay);
        }
        let n = self.probes.fetch_add(1, Ordering::SeqCst);
        if n < self.failing_probes {
            return Err(Error::Extractor("probe failed".into()));
        }
        Ok(self.info.clone())
    }

    fn download(&self, request: &DownloadRequest, sink: &mut dyn EventSink) -> Result<()> {
        let dir = output_dir_of(request);
        self.dir_existed.lock().unwrap().push(dir.is_dir());
        self.requests.lock().unwrap().push(request.clone());
        if self.panics {
            panic!("scripted extractor failure");
        }

        for (tick, event) in self.events.iter().enumerate() {
            if let Some((at, token)) = &self.cancel_at {
                if *at == tick {
                    token.cancel();
                }
            }
            if !self.tick_delay.is_zero() {
                std::thread::sleep(self.tick_delay);
            }
            if sink.on_event(event.clone()) == Flow::Abort {
                return Err(Error::Canceled);
            }
        }

        match &self.failure {
            Some(message) => Err(Error::Extractor(message.clone())),
            None => Ok(()),
        }
    }
}

/// Writes an executable stand-in for yt-dlp that answers `-J` with a small
/// JSON document, prints one progress line for a download and then sleeps
/// without further output.
#[cfg(unix)]
pub fn quiet_ytdlp(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = r#"#!/bin/sh
case " $* " in
  *" -J "*) echo '{"title":"Song","uploader":"Band"}'; exit 0 ;;
esac
echo 'YTDL_PROGRESS|downloading|10|100|NA|NA|NA|/tmp/song.webm'
exec sleep 30
"#;
    let path = dir.join("yt-dlp");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

pub fn output_dir_of(request: &DownloadRequest) -> PathBuf {
    Path::new(&request.output_template)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

pub fn downloading(downloaded: u64, total: u64) -> ExtractorEvent {
    ExtractorEvent::Downloading {
        downloaded,
        total: Some(total),
        total_estimate: None,
        speed: Some(1024.0),
        eta: Some(3),
        filename: "/tmp/out/Artist - Song.webm".into(),
    }
}

pub fn finished(filename: &str) -> ExtractorEvent {
    ExtractorEvent::Finished {
        filename: filename.into(),
    }
}

pub fn sample_info() -> MediaInfo {
    MediaInfo {
        title: Some("Song".into()),
        artist: Some("Artist".into()),
        uploader: Some("uploader".into()),
        duration: Some(185.0),
        description: Some("desc".into()),
        webpage_url: Some("https://soundcloud.com/artist/song".into()),
    }
}

pub fn terminal_count(messages: &[ProgressMessage]) -> usize {
    messages.iter().filter(|m| m.is_terminal()).count()
}

/// Polls `rx` until a terminal message arrives or `timeout` passes.
pub fn collect_until_terminal(rx: &ProgressReceiver, timeout: Duration) -> Vec<ProgressMessage> {
    let deadline = std::time::Instant::now() + timeout;
    let mut messages = Vec::new();
    while std::time::Instant::now() < deadline {
        messages.extend(rx.drain());
        if messages.iter().any(ProgressMessage::is_terminal) {
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    messages
}
