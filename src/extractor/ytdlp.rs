//! [`Extractor`] backed by the `yt-dlp` command line tool.
//!
//! Progress is read from a custom `--progress-template` so each line carries
//! the raw counters instead of a human formatted bar.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use super::{DownloadRequest, EventSink, Extractor, ExtractorEvent, Flow, MediaInfo};
use crate::cancel::CancellationToken;
use crate::error::{Error, Result};

pub const PROGRESS_PREFIX: &str = "YTDL_PROGRESS|";

/// How long the backend waits for output before checking for cancellation.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The filename goes last because it may itself contain `|`.
const PROGRESS_TEMPLATE: &str = concat!(
    "download:YTDL_PROGRESS|%(progress.status)s|%(progress.downloaded_bytes)s",
    "|%(progress.total_bytes)s|%(progress.total_bytes_estimate)s",
    "|%(progress.speed)s|%(progress.eta)s|%(progress.filename)s"
);

#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
}

impl YtDlp {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Finds `yt-dlp` on PATH.
    pub fn locate() -> Result<Self> {
        let binary = which::which("yt-dlp").map_err(|source| Error::DependencyMissing {
            program: "yt-dlp",
            source,
        })?;
        info!("Using yt-dlp at {}", binary.display());
        Ok(Self::new(binary))
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .env("PYTHONIOENCODING", "UTF-8")
            .env("PYTHONUTF8", "1");
        command
    }

    fn spawn_error(&self, source: std::io::Error) -> Error {
        Error::Spawn {
            program: self.binary.clone(),
            source,
        }
    }
}

impl Extractor for YtDlp {
    fn probe(&self, url: &str, token: &CancellationToken) -> Result<MediaInfo> {
        let mut child = self
            .command()
            .args(["-J", "--skip-download", "--no-playlist", "--no-warnings"])
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| self.spawn_error(err))?;

        let stdout = read_all(child.stdout.take());
        let stderr = read_all(child.stderr.take());

        let Some(status) = wait_or_kill(&mut child, || token.is_canceled())? else {
            return Err(Error::Canceled);
        };
        let stdout = join_reader(stdout);
        let stderr = join_reader(stderr);

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            return Err(Error::Extractor(failure_description(
                stderr.lines(),
                status.to_string(),
            )));
        }

        parse_probe_output(&stdout)
    }

    fn download(&self, request: &DownloadRequest, sink: &mut dyn EventSink) -> Result<()> {
        let args = download_args(request);
        debug!("Running {} {:?}", self.binary.display(), args);

        let mut child = self
            .command()
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| self.spawn_error(err))?;

        let (tx, rx) = mpsc::channel();
        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            readers.push(forward_lines(stdout, tx.clone(), StreamLine::Out));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(forward_lines(stderr, tx.clone(), StreamLine::Err));
        }
        drop(tx);

        let mut stderr_lines = Vec::new();
        let mut aborted = false;
        loop {
            let line = match rx.recv_timeout(CANCEL_POLL_INTERVAL) {
                Ok(line) => line,
                Err(RecvTimeoutError::Timeout) => {
                    if sink.is_canceled() {
                        aborted = true;
                        break;
                    }
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            };
            let text = match line {
                StreamLine::Out(text) => text,
                StreamLine::Err(text) => {
                    stderr_lines.push(text.clone());
                    text
                }
            };

            let event = match parse_progress_line(&text) {
                Some(event) => event,
                None => match text.strip_prefix("ERROR:") {
                    Some(message) => ExtractorEvent::Error {
                        message: message.trim().to_string(),
                    },
                    None => continue,
                },
            };

            if sink.on_event(event) == Flow::Abort {
                aborted = true;
                break;
            }
        }

        // Output can close before post-processing ends, so keep watching
        // the token until the process exits.
        let status = if aborted {
            kill(&mut child);
            None
        } else {
            wait_or_kill(&mut child, || sink.is_canceled())?
        };

        let Some(status) = status else {
            return Err(Error::Canceled);
        };
        for reader in readers {
            join_reader(reader);
        }

        if !status.success() {
            return Err(Error::Extractor(failure_description(
                stderr_lines.iter().map(String::as_str),
                status.to_string(),
            )));
        }
        Ok(())
    }
}

/// Waits for `child` to exit, killing it as soon as `canceled` reports true.
/// Returns `None` when the child was killed.
fn wait_or_kill(child: &mut Child, canceled: impl Fn() -> bool) -> Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if canceled() {
            kill(child);
            return Ok(None);
        }
        thread::sleep(CANCEL_POLL_INTERVAL);
    }
}

fn kill(child: &mut Child) {
    info!("Stopping yt-dlp (pid {})", child.id());
    if let Err(err) = child.kill() {
        warn!("Failed to kill yt-dlp: {}", err);
    }
    if let Err(err) = child.wait() {
        warn!("Failed to reap yt-dlp: {}", err);
    }
}

fn join_reader<T: Default>(reader: thread::JoinHandle<T>) -> T {
    reader.join().unwrap_or_else(|_| {
        warn!("yt-dlp output reader panicked");
        T::default()
    })
}

enum StreamLine {
    Out(String),
    Err(String),
}

/// Collects everything `stream` produces on its own thread, so a full pipe
/// never stalls the child.
fn read_all<R>(stream: Option<R>) -> thread::JoinHandle<Vec<u8>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut stream) = stream {
            if let Err(err) = stream.read_to_end(&mut buffer) {
                debug!("Stopped reading yt-dlp output: {}", err);
            }
        }
        buffer
    })
}

/// Reads `stream` line by line on its own thread, tolerating invalid UTF-8.
fn forward_lines<R>(
    stream: R,
    tx: Sender<StreamLine>,
    wrap: fn(String) -> StreamLine,
) -> thread::JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            match reader.read_until(b'\n', &mut buffer) {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buffer).trim_end().to_string();
                    if tx.send(wrap(line)).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    debug!("Stopped reading yt-dlp output: {}", err);
                    break;
                }
            }
        }
    })
}

/// Command line for one audio download.
pub fn download_args(request: &DownloadRequest) -> Vec<String> {
    let mut args: Vec<String> = [
        "-f",
        "bestaudio/best",
        "--no-playlist",
        "--newline",
        "--quiet",
        "--progress",
        "--no-warnings",
        "--no-check-certificates",
        "--progress-template",
        PROGRESS_TEMPLATE,
    ]
    .into_iter()
    .map(String::from)
    .collect();

    args.push("-o".into());
    args.push(request.output_template.clone());
    args.push("--socket-timeout".into());
    args.push(request.socket_timeout_secs.to_string());
    args.push("--retries".into());
    args.push(request.retries.to_string());
    args.push("--fragment-retries".into());
    args.push(request.retries.to_string());

    args.push("-x".into());
    args.push("--audio-format".into());
    args.push(request.audio_format.as_str().into());
    if request.audio_format.is_lossy() {
        args.push("--audio-quality".into());
        args.push(format!("{}K", request.bitrate));
    }

    if request.embed_metadata {
        args.push("--embed-metadata".into());
    }
    if request.embed_thumbnail {
        args.push("--embed-thumbnail".into());
    }
    if request.save_cover_art {
        args.push("--write-thumbnail".into());
        args.push("--convert-thumbnails".into());
        args.push(request.cover_format.as_str().into());
    }

    args.push(if request.skip_existing {
        "--no-overwrites".into()
    } else {
        "--force-overwrites".into()
    });

    args.push("--".into());
    args.push(request.url.clone());
    args
}

/// Parses a line produced by [`PROGRESS_TEMPLATE`]. yt-dlp prints `NA` for
/// missing fields.
pub fn parse_progress_line(line: &str) -> Option<ExtractorEvent> {
    let rest = line.trim().strip_prefix(PROGRESS_PREFIX)?;
    let fields: Vec<&str> = rest.splitn(7, '|').collect();
    if fields.len() != 7 {
        return None;
    }

    let filename = fields[6].to_string();
    match fields[0] {
        "downloading" => Some(ExtractorEvent::Downloading {
            downloaded: parse_count(fields[1]).unwrap_or(0),
            total: parse_count(fields[2]),
            total_estimate: parse_count(fields[3]),
            speed: parse_number(fields[4]),
            eta: parse_count(fields[5]),
            filename,
        }),
        "finished" => Some(ExtractorEvent::Finished { filename }),
        "error" => Some(ExtractorEvent::Error {
            message: format!("download failed: {filename}"),
        }),
        _ => None,
    }
}

fn parse_number(field: &str) -> Option<f64> {
    field
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

fn parse_count(field: &str) -> Option<u64> {
    parse_number(field).map(|value| value.round() as u64)
}

pub fn parse_probe_output(stdout: &[u8]) -> Result<MediaInfo> {
    Ok(serde_json::from_slice(stdout)?)
}

/// The last `ERROR:` line, else the last non-empty line, else the exit status.
fn failure_description<'a>(lines: impl Iterator<Item = &'a str>, status: String) -> String {
    let mut last = None;
    let mut last_error = None;
    for line in lines.map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(message) = line.strip_prefix("ERROR:") {
            last_error = Some(message.trim().to_string());
        }
        last = Some(line.to_string());
    }
    last_error
        .or(last)
        .unwrap_or_else(|| format!("yt-dlp exited with {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JobConfig;
    use crate::models::{AudioFormat, CoverFormat};

    fn request(config: &JobConfig) -> DownloadRequest {
        DownloadRequest::new("https://soundcloud.com/a/b", Path::new("/out"), config)
    }

    fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|pair| pair[0] == flag && pair[1] == value)
    }

    #[test]
    fn parses_downloading_line() {
        let line = "YTDL_PROGRESS|downloading|5120|10240|NA|1024.5|5|/out/a - b.webm";
        assert_eq!(
            parse_progress_line(line),
            Some(ExtractorEvent::Downloading {
                downloaded: 5120,
                total: Some(10240),
                total_estimate: None,
                speed: Some(1024.5),
                eta: Some(5),
                filename: "/out/a - b.webm".into(),
            })
        );
    }

    #[test]
    fn parses_estimates_printed_as_floats() {
        let line = "YTDL_PROGRESS|downloading|100|NA|2048.0|NA|NA|x.m4a";
        match parse_progress_line(line) {
            Some(ExtractorEvent::Downloading {
                total,
                total_estimate,
                speed,
                eta,
                ..
            }) => {
                assert_eq!(total, None);
                assert_eq!(total_estimate, Some(2048));
                assert_eq!(speed, None);
                assert_eq!(eta, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn filename_may_contain_separator() {
        let line = "YTDL_PROGRESS|finished|1|1|NA|NA|NA|/out/a | b.webm";
        assert_eq!(
            parse_progress_line(line),
            Some(ExtractorEvent::Finished {
                filename: "/out/a | b.webm".into()
            })
        );
    }

    #[test]
    fn ignores_unrelated_lines() {
        assert_eq!(parse_progress_line("[download] Destination: x"), None);
        assert_eq!(parse_progress_line("YTDL_PROGRESS|downloading|1"), None);
    }

    #[test]
    fn lossy_formats_get_a_quality() {
        let config = JobConfig {
            format: AudioFormat::Mp3,
            bitrate: "320".into(),
            ..Default::default()
        };
        let args = download_args(&request(&config));
        assert!(has_pair(&args, "--audio-format", "mp3"));
        assert!(has_pair(&args, "--audio-quality", "320K"));
        assert!(args.contains(&"--embed-thumbnail".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("https://soundcloud.com/a/b"));
    }

    #[test]
    fn lossless_formats_skip_quality() {
        let config = JobConfig {
            format: AudioFormat::Flac,
            ..Default::default()
        };
        let args = download_args(&request(&config));
        assert!(has_pair(&args, "--audio-format", "flac"));
        assert!(!args.contains(&"--audio-quality".to_string()));
    }

    #[test]
    fn cover_and_overwrite_flags() {
        let config = JobConfig {
            save_cover_art: true,
            cover_format: CoverFormat::Png,
            skip_existing: false,
            ..Default::default()
        };
        let args = download_args(&request(&config));
        assert!(has_pair(&args, "--convert-thumbnails", "png"));
        assert!(args.contains(&"--force-overwrites".to_string()));

        let config = JobConfig {
            save_cover_art: false,
            ..Default::default()
        };
        let args = download_args(&request(&config));
        assert!(!args.contains(&"--write-thumbnail".to_string()));
        assert!(args.contains(&"--no-overwrites".to_string()));
    }

    #[test]
    fn probe_json_with_integer_duration() {
        let json = br#"{"title":"T","uploader":"U","duration":215,"formats":[]}"#;
        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.title.as_deref(), Some("T"));
        assert_eq!(info.artist_name(), Some("U"));
        assert_eq!(info.duration, Some(215.0));
    }

    #[test]
    fn probe_json_with_null_fields() {
        let json = br#"{"title":null,"artist":null,"duration":null}"#;
        assert_eq!(parse_probe_output(json).unwrap(), MediaInfo::default());
    }

    #[test]
    fn failure_prefers_error_lines() {
        let lines = ["WARNING: slow", "ERROR: [soundcloud] 404: Not Found", "trailing"];
        assert_eq!(
            failure_description(lines.into_iter(), "exit status: 1".into()),
            "[soundcloud] 404: Not Found"
        );
        assert_eq!(
            failure_description(std::iter::empty(), "exit status: 2".into()),
            "yt-dlp exited with exit status: 2"
        );
    }

    #[test]
    fn progress_template_matches_the_line_parser() {
        let line = PROGRESS_TEMPLATE
            .trim_start_matches("download:")
            .replace("%(progress.status)s", "downloading")
            .replace("%(progress.filename)s", "/tmp/a.webm")
            .replace("%(progress.downloaded_bytes)s", "5")
            .replace("%(progress.total_bytes)s", "10")
            .replace("%(progress.total_bytes_estimate)s", "NA")
            .replace("%(progress.speed)s", "NA")
            .replace("%(progress.eta)s", "NA");

        assert!(matches!(
            parse_progress_line(&line),
            Some(ExtractorEvent::Downloading { downloaded: 5, total: Some(10), .. })
        ));
    }

    #[cfg(unix)]
    mod child_process {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use std::time::Instant;

        fn fake_ytdlp(dir: &Path, body: &str) -> YtDlp {
            let path = dir.join("yt-dlp");
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            YtDlp::new(path)
        }

        struct TestSink {
            token: CancellationToken,
            cancel_on_event: bool,
            events: Vec<ExtractorEvent>,
        }

        impl TestSink {
            fn new(cancel_on_event: bool) -> Self {
                Self {
                    token: CancellationToken::new(),
                    cancel_on_event,
                    events: Vec::new(),
                }
            }
        }

        impl EventSink for TestSink {
            fn on_event(&mut self, event: ExtractorEvent) -> Flow {
                self.events.push(event);
                if self.cancel_on_event {
                    self.token.cancel();
                }
                Flow::Continue
            }

            fn is_canceled(&self) -> bool {
                self.token.is_canceled()
            }
        }

        #[test]
        fn silent_download_is_killed_after_cancel() {
            let dir = tempfile::tempdir().unwrap();
            let ytdlp = fake_ytdlp(
                dir.path(),
                "echo 'YTDL_PROGRESS|downloading|10|100|NA|NA|NA|/tmp/song.webm'\nexec sleep 30",
            );
            let mut sink = TestSink::new(true);

            let started = Instant::now();
            let result = ytdlp.download(&request(&JobConfig::default()), &mut sink);

            assert!(matches!(result, Err(Error::Canceled)));
            assert_eq!(sink.events.len(), 1);
            assert!(started.elapsed() < Duration::from_secs(5));
        }

        #[test]
        fn quiet_probe_is_killed_after_cancel() {
            let dir = tempfile::tempdir().unwrap();
            let ytdlp = fake_ytdlp(dir.path(), "exec sleep 30");
            let token = CancellationToken::new();
            let canceler = {
                let token = token.clone();
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(200));
                    token.cancel();
                })
            };

            let started = Instant::now();
            let result = ytdlp.probe("https://soundcloud.com/a/b", &token);
            canceler.join().unwrap();

            assert!(matches!(result, Err(Error::Canceled)));
            assert!(started.elapsed() < Duration::from_secs(5));
        }

        #[test]
        fn probe_reads_json_from_stdout() {
            let dir = tempfile::tempdir().unwrap();
            let ytdlp = fake_ytdlp(dir.path(), r#"echo '{"title":"Song","uploader":"Band"}'"#);

            let info = ytdlp
                .probe("https://soundcloud.com/a/b", &CancellationToken::new())
                .unwrap();
            assert_eq!(info.title.as_deref(), Some("Song"));
            assert_eq!(info.artist_name(), Some("Band"));
        }

        #[test]
        fn failed_download_reports_the_error_line() {
            let dir = tempfile::tempdir().unwrap();
            let ytdlp = fake_ytdlp(dir.path(), "echo 'ERROR: Unsupported URL' >&2\nexit 1");
            let mut sink = TestSink::new(false);

            let result = ytdlp.download(&request(&JobConfig::default()), &mut sink);

            assert!(matches!(
                result,
                Err(Error::Extractor(message)) if message == "Unsupported URL"
            ));
            assert_eq!(
                sink.events,
                vec![ExtractorEvent::Error {
                    message: "Unsupported URL".into()
                }]
            );
        }
    }
}
