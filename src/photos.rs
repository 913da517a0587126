//! Disk-backed photo store
//!
//! Captures land under a `temp_` name while they await confirmation and are
//! renamed in place on confirm-yes. Discard removes the temp file.

use crate::runtime::traits::{PhotoStore, PhotoStoreError};
use crate::state_machine::state::{PendingPhoto, PhotoRef, PhotoSlot};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

pub struct DiskPhotoStore {
    dir: PathBuf,
}

impl DiskPhotoStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn temp_path(&self, pending: &PendingPhoto) -> PathBuf {
        self.dir
            .join(format!("temp_{}_{}.jpg", pending.slot.as_str(), pending.id))
    }

    fn final_path(&self, photo: &PhotoRef) -> PathBuf {
        self.dir
            .join(format!("{}_{}.jpg", photo.slot.as_str(), photo.id))
    }
}

#[async_trait]
impl PhotoStore for DiskPhotoStore {
    async fn stash(
        &self,
        slot: PhotoSlot,
        bytes: Vec<u8>,
    ) -> Result<PendingPhoto, PhotoStoreError> {
        fs::create_dir_all(&self.dir).await?;
        let pending = PendingPhoto {
            slot,
            id: uuid::Uuid::new_v4().to_string(),
        };
        fs::write(self.temp_path(&pending), bytes).await?;
        Ok(pending)
    }

    async fn promote(&self, pending: &PendingPhoto) -> Result<(), PhotoStoreError> {
        fs::rename(self.temp_path(pending), self.final_path(&pending.confirmed())).await?;
        Ok(())
    }

    async fn discard(&self, pending: &PendingPhoto) -> Result<(), PhotoStoreError> {
        fs::remove_file(self.temp_path(pending)).await?;
        Ok(())
    }

    async fn read_pending(&self, pending: &PendingPhoto) -> Result<Vec<u8>, PhotoStoreError> {
        read_file(self.temp_path(pending), &pending.id).await
    }

    async fn read(&self, photo: &PhotoRef) -> Result<Vec<u8>, PhotoStoreError> {
        read_file(self.final_path(photo), &photo.id).await
    }
}

async fn read_file(path: PathBuf, id: &str) -> Result<Vec<u8>, PhotoStoreError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(PhotoStoreError::Missing(id.to_string()))
        }
        Err(err) => Err(err.into()),
    }
}
