//! Post-download timestamp correction.

use std::fs::{File, FileTimes};
use std::path::Path;
use std::time::SystemTime;

/// Sets the access and modification times of `path` to now.
///
/// Downloaders frequently stamp files with the upload date of the remote
/// media (or with zero). The downloaded file must carry the time it
/// actually arrived.
pub async fn reset_timestamps(path: &Path) -> std::io::Result<()> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let now = SystemTime::now();
        let file = File::options().write(true).open(&path)?;
        file.set_times(FileTimes::new().set_accessed(now).set_modified(now))
    })
    .await
    .map_err(std::io::Error::other)?
}
