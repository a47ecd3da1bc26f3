//! Account request types.

use foundation_identity::ProfileChanges;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request payload to update the signed-in account's profile.
///
/// Omitted fields are left unchanged.
#[must_use]
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// New display username.
    #[validate(length(min = 1, max = 64))]
    pub username: Option<String>,

    /// New phone number.
    #[validate(length(min = 1, max = 32))]
    pub phone_number: Option<String>,

    /// New profile photo URL.
    #[validate(url)]
    #[validate(length(max = 2048))]
    pub photo_url: Option<String>,
}

impl UpdateUserRequest {
    /// Converts this request into a core partial update.
    pub fn into_changes(self) -> ProfileChanges {
        ProfileChanges {
            username: self.username,
            phone_number: self.phone_number,
            photo_url: self.photo_url,
        }
    }
}
