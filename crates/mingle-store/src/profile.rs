//! Profile slice: the record being viewed or edited on the profile screen.

use mingle_shared::models::{ProfilePatch, ProfileRecord};

use crate::apply::Apply;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileSlice {
    record: Option<ProfileRecord>,
}

impl ProfileSlice {
    /// Install the record answering `get-profile-request`.
    pub fn set_record(&mut self, record: ProfileRecord) {
        self.record = Some(record);
    }

    pub fn record(&self) -> Option<&ProfileRecord> {
        self.record.as_ref()
    }

    /// Shallow-merge the patch into the loaded record. No-op until a record
    /// has been loaded.
    pub fn apply_update(&mut self, patch: &ProfilePatch) -> Apply {
        match self.record.as_mut() {
            Some(record) => {
                patch.merge_into(record);
                Apply::Applied
            }
            None => Apply::NotFound,
        }
    }

    /// Drop the cached record (logout).
    pub fn clear(&mut self) {
        self.record = None;
    }
}
