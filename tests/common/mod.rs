#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Header used by the official daily exports.
pub const CHART_HEADER: &str = "rank,uri,artist_names,track_name,source,peak_rank,previous_rank,days_on_chart,streams";

/// Scratch data directory that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes a daily chart in the official export layout. Each row is
    /// `(rank, track, artist, streams)`.
    pub fn write_chart(&self, date: &str, rows: &[(u32, &str, &str, u64)]) -> PathBuf {
        let mut body = String::from(CHART_HEADER);
        body.push('\n');
        for (idx, (rank, track, artist, streams)) in rows.iter().enumerate() {
            body.push_str(&format!(
                "{rank},spotify:track:id{idx}x{rank},\"{artist}\",\"{track}\",label,{rank},{rank},1,{streams}\n"
            ));
        }
        self.write(&format!("regional-pk-daily-{date}.csv"), &body)
    }
}
