//! Profile screen binding: load, draft editing, save, photo/cover upload.

use std::sync::Arc;

use mingle_channel::ChannelHandle;
use mingle_media::{MediaFile, Uploader};
use mingle_shared::models::{ProfilePatch, ProfileRecord};
use mingle_shared::protocol::{ClientEvent, ProfileQuery};
use mingle_shared::types::UserId;
use mingle_store::Store;

use crate::error::ClientError;

/// Transient, form-local copy of the editable profile fields. Nothing is
/// committed until [`ProfileScreen::save`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    pub display_name: String,
    /// Shown but not editable; never part of the outgoing patch.
    pub email: String,
    pub phone_number: String,
    pub dob: String,
    pub address: String,
}

impl ProfileDraft {
    pub fn from_record(record: &ProfileRecord) -> Self {
        Self {
            display_name: record.display_name.clone(),
            email: record.email.clone(),
            phone_number: record.phone_number.clone().unwrap_or_default(),
            dob: record.dob.clone().unwrap_or_default(),
            address: record.address.clone().unwrap_or_default(),
        }
    }

    fn into_patch(self) -> ProfilePatch {
        ProfilePatch {
            display_name: Some(self.display_name),
            phone_number: Some(self.phone_number),
            dob: Some(self.dob),
            address: Some(self.address),
            ..Default::default()
        }
    }
}

enum ImageSlot {
    Photo,
    Cover,
}

pub struct ProfileScreen {
    store: Arc<Store>,
    channel: ChannelHandle,
    me: UserId,
    requested: bool,
}

impl ProfileScreen {
    pub fn new(store: Arc<Store>, channel: ChannelHandle, me: UserId) -> Self {
        Self {
            store,
            channel,
            me,
            requested: false,
        }
    }

    /// Request the profile record once, when nothing is cached yet.
    pub fn load(&mut self) {
        if self.requested || self.store.snapshot().profile.record().is_some() {
            return;
        }
        self.channel
            .emit(ClientEvent::GetProfileRequest(ProfileQuery {
                user_id: self.me.clone(),
            }));
        self.requested = true;
    }

    /// A fresh draft of the loaded record, or `None` before it arrives.
    pub fn draft(&self) -> Option<ProfileDraft> {
        self.store
            .snapshot()
            .profile
            .record()
            .map(ProfileDraft::from_record)
    }

    /// Commit the draft optimistically and send the full patched record.
    pub fn save(&self, draft: ProfileDraft) -> Result<(), ClientError> {
        let patch = draft.into_patch();
        self.commit_and_emit(patch)
    }

    /// Upload a new profile picture, then patch `photoURL`. The upload runs
    /// first; on failure nothing is committed or emitted.
    pub async fn upload_photo<U: Uploader>(
        &self,
        uploader: &U,
        file: MediaFile,
    ) -> Result<(), ClientError> {
        self.upload_image(uploader, file, ImageSlot::Photo).await
    }

    /// Upload a new cover image, then patch `coverURL`.
    pub async fn upload_cover<U: Uploader>(
        &self,
        uploader: &U,
        file: MediaFile,
    ) -> Result<(), ClientError> {
        self.upload_image(uploader, file, ImageSlot::Cover).await
    }

    async fn upload_image<U: Uploader>(
        &self,
        uploader: &U,
        file: MediaFile,
        slot: ImageSlot,
    ) -> Result<(), ClientError> {
        let uploaded = uploader.upload(file).await?;

        let patch = match slot {
            ImageSlot::Photo => ProfilePatch {
                photo_url: Some(uploaded.file_url),
                ..Default::default()
            },
            ImageSlot::Cover => ProfilePatch {
                cover_url: Some(uploaded.file_url),
                ..Default::default()
            },
        };
        self.commit_and_emit(patch)
    }

    // Optimistic merge into the profile slice, then `update-profile` with
    // the full patched record. The session user record refreshes when the
    // server broadcasts `user-updated`.
    fn commit_and_emit(&self, patch: ProfilePatch) -> Result<(), ClientError> {
        let outcome = self
            .store
            .commit(|state| state.profile.apply_update(&patch));
        if !outcome.is_applied() {
            return Err(ClientError::ProfileNotLoaded);
        }

        let snapshot = self.store.snapshot();
        let record = snapshot
            .profile
            .record()
            .cloned()
            .ok_or(ClientError::ProfileNotLoaded)?;
        self.channel.emit(ClientEvent::UpdateProfile(record));
        Ok(())
    }

    pub fn view(&self) -> Option<ProfileRecord> {
        self.store.snapshot().profile.record().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use mingle_channel::ChannelCommand;
    use mingle_media::{UploadError, UploadedMedia};
    use tokio::sync::mpsc;

    struct StubUploader {
        fail: bool,
    }

    #[async_trait]
    impl Uploader for StubUploader {
        async fn upload(&self, file: MediaFile) -> Result<UploadedMedia, UploadError> {
            if self.fail {
                Err(UploadError::Status { code: 502 })
            } else {
                Ok(UploadedMedia {
                    file_url: "http://files/new.png".into(),
                    kind: file.kind(),
                })
            }
        }
    }

    fn record() -> ProfileRecord {
        ProfileRecord {
            id: UserId::from("me"),
            email: "me@mingle.dev".into(),
            display_name: "Me".into(),
            photo_url: Some("http://files/old.png".into()),
            cover_url: None,
            phone_number: None,
            dob: None,
            address: None,
        }
    }

    fn screen() -> (ProfileScreen, mpsc::Receiver<ChannelCommand>) {
        let (tx, rx) = mpsc::channel(8);
        let screen = ProfileScreen::new(
            Arc::new(Store::new()),
            ChannelHandle::new(tx),
            UserId::from("me"),
        );
        (screen, rx)
    }

    #[tokio::test]
    async fn test_load_requests_profile_once() {
        let (mut screen, mut rx) = screen();

        screen.load();
        screen.load();

        assert!(matches!(
            rx.try_recv().unwrap(),
            ChannelCommand::Emit(ClientEvent::GetProfileRequest(_))
        ));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_save_merges_and_emits_full_record() {
        let (screen, mut rx) = screen();
        screen.store.commit(|s| s.profile.set_record(record()));

        let mut draft = screen.draft().unwrap();
        draft.address = "1 Main St".into();
        screen.save(draft).unwrap();

        let view = screen.view().unwrap();
        assert_eq!(view.address.as_deref(), Some("1 Main St"));
        // photo untouched by a field edit
        assert_eq!(view.photo_url.as_deref(), Some("http://files/old.png"));

        match rx.try_recv().unwrap() {
            ChannelCommand::Emit(ClientEvent::UpdateProfile(sent)) => {
                assert_eq!(sent.address.as_deref(), Some("1 Main St"));
                assert_eq!(sent.email, "me@mingle.dev");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_save_before_load_fails_cleanly() {
        let (screen, mut rx) = screen();
        let result = screen.save(ProfileDraft::default());
        assert!(matches!(result, Err(ClientError::ProfileNotLoaded)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_photo_upload_failure_changes_nothing() {
        let (screen, mut rx) = screen();
        screen.store.commit(|s| s.profile.set_record(record()));
        let before = screen.store.snapshot();

        let file = MediaFile::new("p.png", "image/png", Bytes::from_static(b"x"));
        let result = screen.upload_photo(&StubUploader { fail: true }, file).await;

        assert!(matches!(result, Err(ClientError::Upload(_))));
        assert_eq!(screen.store.snapshot(), before);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_photo_upload_patches_only_photo_url() {
        let (screen, mut rx) = screen();
        screen.store.commit(|s| s.profile.set_record(record()));

        let file = MediaFile::new("p.png", "image/png", Bytes::from_static(b"x"));
        screen
            .upload_photo(&StubUploader { fail: false }, file)
            .await
            .unwrap();

        let view = screen.view().unwrap();
        assert_eq!(view.photo_url.as_deref(), Some("http://files/new.png"));
        assert_eq!(view.display_name, "Me");
        assert!(matches!(
            rx.try_recv().unwrap(),
            ChannelCommand::Emit(ClientEvent::UpdateProfile(_))
        ));
    }
}
