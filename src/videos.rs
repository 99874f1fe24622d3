use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tokio::fs;
use tokio::fs::File;

use crate::constants::VIDEO_EXTENSION;
use crate::validation::validate_video_id;

/// Flat-directory blob store for uploaded videos.
///
/// The logical id is the file stem; the physical file is always
/// `<id>.mp4` inside the store directory. A trailing `.mp4` on incoming
/// ids and file names is accepted and stripped, so `clip1` and
/// `clip1.mp4` address the same blob.
#[derive(Debug, Clone)]
pub struct VideoStore {
    dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum VideoStoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("video not found: {0}")]
    NotFound(String),
    #[error("invalid video id: {0}")]
    InvalidId(String),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VideoEntry {
    pub video_id: String,
    pub file_name: String,
    pub size_bytes: u64,
}

/// 解析 GET/DELETE 入口的视频标识：可带可不带 .mp4 后缀。
pub fn logical_id(raw: &str) -> Result<String, VideoStoreError> {
    let stem = raw.strip_suffix(VIDEO_EXTENSION).unwrap_or(raw);
    validate_video_id(stem).map_err(|msg| VideoStoreError::InvalidId(msg.to_string()))?;
    Ok(stem.to_string())
}

/// 解析上传文件名：必须以 .mp4 结尾，返回校验后的逻辑 ID。
pub fn upload_id(file_name: &str) -> Result<String, VideoStoreError> {
    let stem = file_name.strip_suffix(VIDEO_EXTENSION).ok_or_else(|| {
        VideoStoreError::InvalidId(format!(
            "上传文件名必须以 {VIDEO_EXTENSION} 结尾，当前为 '{file_name}'"
        ))
    })?;
    validate_video_id(stem).map_err(|msg| VideoStoreError::InvalidId(msg.to_string()))?;
    Ok(stem.to_string())
}

impl VideoStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> Result<(), VideoStoreError> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    pub fn file_name(video_id: &str) -> String {
        format!("{video_id}{VIDEO_EXTENSION}")
    }

    fn file_path(&self, video_id: &str) -> PathBuf {
        self.dir.join(Self::file_name(video_id))
    }

    /// Opens the stored file for reading, returning the handle and its size.
    pub async fn open(&self, video_id: &str) -> Result<(File, u64), VideoStoreError> {
        let path = self.file_path(video_id);
        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(VideoStoreError::NotFound(video_id.to_string()));
            }
            Err(e) => return Err(VideoStoreError::Io(e)),
        };
        let len = file.metadata().await?.len();
        Ok((file, len))
    }

    /// Opens the target file for writing, truncating any previous content.
    /// Collisions overwrite silently; last writer wins.
    pub async fn writer(&self, video_id: &str) -> Result<File, VideoStoreError> {
        let path = self.file_path(video_id);
        Ok(File::create(&path).await?)
    }

    pub async fn size(&self, video_id: &str) -> Result<u64, VideoStoreError> {
        let path = self.file_path(video_id);
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(VideoStoreError::NotFound(video_id.to_string()))
            }
            Err(e) => Err(VideoStoreError::Io(e)),
        }
    }

    pub async fn delete(&self, video_id: &str) -> Result<(), VideoStoreError> {
        let path = self.file_path(video_id);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(VideoStoreError::NotFound(video_id.to_string()))
            }
            Err(e) => Err(VideoStoreError::Io(e)),
        }
    }

    /// Lists regular files directly inside the store directory.
    /// No recursion; entries that vanish mid-listing are skipped.
    pub async fn list(&self) -> Result<Vec<VideoEntry>, VideoStoreError> {
        let mut entries = Vec::new();
        let mut dir = fs::read_dir(&self.dir).await?;

        while let Some(entry) = dir.next_entry().await? {
            let meta = match entry.metadata().await {
                Ok(meta) => meta,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(VideoStoreError::Io(e)),
            };
            if !meta.is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().to_string();
            let video_id = file_name
                .strip_suffix(VIDEO_EXTENSION)
                .unwrap_or(&file_name)
                .to_string();
            entries.push(VideoEntry {
                video_id,
                file_name,
                size_bytes: meta.len(),
            });
        }

        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(entries)
    }
}
