//! yt-dlp resolver tests against scripted stand-ins for the real tool.
//!
//! Each test writes a small shell script that mimics the parts of yt-dlp's
//! command line behavior the resolver relies on.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;
use tokio::sync::mpsc;

use filetools_core::resolver::{
    DownloadRequest, MediaResolver, ResolverConfig, ResolverError, YtDlpResolver,
};

fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("yt-dlp");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("script metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod script");
    path
}

fn resolver(script: PathBuf) -> YtDlpResolver {
    YtDlpResolver::new(ResolverConfig::with_ytdlp_path(script))
}

/// Emulates `-o <template>`: writes `<dir>/<name>.mp4`, backdates it, and
/// prints the final path like `--print after_move:filepath`.
const DOWNLOAD_SCRIPT: &str = r#"
template=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) template="$2"; shift 2 ;;
    *) shift ;;
  esac
done
out=$(echo "$template" | sed 's/%(ext)s/mp4/')
echo "[download] Destination: $out"
echo "[download]  50.0% of 1.00MiB at 2.00MiB/s ETA 00:01"
echo "[download] 100.0% of 1.00MiB at 2.00MiB/s ETA 00:00"
printf 'fake video' > "$out"
touch -t 200001010000 "$out"
echo "$out"
"#;

#[tokio::test]
async fn test_resolve_metadata_from_dump_json() {
    let tools = TempDir::new().expect("temp dir");
    let script = write_script(
        tools.path(),
        r#"echo '{"id":"abc","title":"Launch talk","thumbnail":"https://img.example/abc.jpg"}'"#,
    );

    let meta = resolver(script)
        .resolve_metadata("https://videos.example/watch?v=abc")
        .await
        .expect("metadata");
    assert_eq!(meta.title, "Launch talk");
    assert_eq!(meta.thumbnail_url, "https://img.example/abc.jpg");
}

#[tokio::test]
async fn test_resolve_metadata_failure_is_none() {
    let tools = TempDir::new().expect("temp dir");
    let script = write_script(
        tools.path(),
        "echo 'ERROR: Unsupported URL' >&2\nexit 1",
    );
    assert!(resolver(script)
        .resolve_metadata("https://not-a-video.example")
        .await
        .is_none());
}

#[tokio::test]
async fn test_resolve_metadata_without_thumbnail_is_none() {
    let tools = TempDir::new().expect("temp dir");
    let script = write_script(tools.path(), r#"echo '{"title":"Launch talk"}'"#);
    assert!(resolver(script)
        .resolve_metadata("https://videos.example/watch?v=abc")
        .await
        .is_none());
}

#[tokio::test]
async fn test_download_resets_timestamps() {
    let tools = TempDir::new().expect("temp dir");
    let dest = TempDir::new().expect("temp dir");
    let script = write_script(tools.path(), DOWNLOAD_SCRIPT);

    let request = DownloadRequest::new(
        "https://videos.example/watch?v=abc",
        dest.path(),
        Some("launch".to_string()),
        "video",
    );
    let result = resolver(script).download(&request).await.expect("download");

    assert_eq!(result.output_path, dest.path().join("launch.mp4"));
    assert_eq!(result.size_bytes, 10);

    let meta = std::fs::metadata(&result.output_path).expect("metadata");
    let age = SystemTime::now()
        .duration_since(meta.modified().expect("mtime"))
        .unwrap_or(Duration::ZERO);
    assert!(age <= Duration::from_secs(5), "mtime is {:?} old", age);
}

#[tokio::test]
async fn test_download_reports_progress() {
    let tools = TempDir::new().expect("temp dir");
    let dest = TempDir::new().expect("temp dir");
    let script = write_script(tools.path(), DOWNLOAD_SCRIPT);

    let request = DownloadRequest::new("https://videos.example/watch?v=abc", dest.path(), None, "video");
    let (tx, mut rx) = mpsc::channel(16);
    let result = resolver(script)
        .download_with_progress(&request, tx)
        .await
        .expect("download");
    assert_eq!(result.output_path, dest.path().join("video.mp4"));

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert!(!events.is_empty());
    assert_eq!(events.last().map(|e| e.percent), Some(100.0));
}

#[tokio::test]
async fn test_download_failure_keeps_stderr() {
    let tools = TempDir::new().expect("temp dir");
    let dest = TempDir::new().expect("temp dir");
    let script = write_script(
        tools.path(),
        "echo 'ERROR: HTTP Error 403: Forbidden' >&2\nexit 1",
    );

    let request = DownloadRequest::new("https://videos.example/watch?v=abc", dest.path(), None, "video");
    let err = resolver(script).download(&request).await.unwrap_err();

    match err {
        ResolverError::DownloadFailed { stderr, .. } => {
            assert!(stderr.unwrap_or_default().contains("403"));
        }
        other => panic!("unexpected error: {}", other),
    }
}
