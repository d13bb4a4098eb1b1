//! Guest experience selection from a QR code's [`QrRules`].
//!
//! Resolution is a pure four-way branch on two flags:
//!
//! | view gallery | upload | result                          |
//! |--------------|--------|---------------------------------|
//! | yes          | yes    | both, gallery tab active        |
//! | yes          | no     | gallery only                    |
//! | no           | yes    | upload only                     |
//! | no           | no     | [`GuestAccessError::NoActiveFeatures`] |

use serde::Serialize;

use super::{PhoneRequirement, QrRules};

/// Tab shown inside the guest experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuestTab {
    /// Approved media gallery.
    Gallery,
    /// Upload form.
    Upload,
}

/// Guest experience granted by a QR code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum GuestView {
    /// Gallery and upload behind tabs.
    Both {
        /// Currently selected tab.
        active_tab: GuestTab,
    },
    /// Gallery without upload.
    GalleryOnly,
    /// Upload without gallery.
    UploadOnly,
}

/// Errors raised while deciding or exercising guest access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuestAccessError {
    /// Neither viewing nor uploading is enabled on the QR code.
    #[error("This QR code has no active features")]
    NoActiveFeatures,
    /// The QR rules require a name and none was given.
    #[error("name is required for uploads through this QR code")]
    NameRequired,
    /// The QR rules require a phone number and none was given.
    #[error("phone number is required for uploads through this QR code")]
    PhoneRequired,
}

impl GuestView {
    /// Selects the guest experience for `rules`.
    ///
    /// # Errors
    ///
    /// Returns [`GuestAccessError::NoActiveFeatures`] when the QR code
    /// enables neither viewing nor uploading.
    pub fn resolve(rules: &QrRules) -> Result<Self, GuestAccessError> {
        match (rules.anyone_can_view_gallery, rules.anyone_can_upload) {
            (true, true) => Ok(Self::Both {
                active_tab: GuestTab::Gallery,
            }),
            (true, false) => Ok(Self::GalleryOnly),
            (false, true) => Ok(Self::UploadOnly),
            (false, false) => Err(GuestAccessError::NoActiveFeatures),
        }
    }

    /// Tab currently on screen.
    #[must_use]
    pub const fn current_tab(&self) -> GuestTab {
        match self {
            Self::Both { active_tab } => *active_tab,
            Self::GalleryOnly => GuestTab::Gallery,
            Self::UploadOnly => GuestTab::Upload,
        }
    }

    /// Switches tabs inside a two-tab view. Single-feature views cannot
    /// switch to a feature their rules do not grant, so this is a no-op
    /// for them.
    pub fn switch_to(&mut self, tab: GuestTab) {
        if let Self::Both { active_tab } = self {
            *active_tab = tab;
        }
    }

    /// Returns `true` if the gallery is reachable from this view.
    #[must_use]
    pub const fn shows_gallery(&self) -> bool {
        matches!(self, Self::Both { .. } | Self::GalleryOnly)
    }

    /// Returns `true` if the upload form is reachable from this view.
    #[must_use]
    pub const fn shows_upload(&self) -> bool {
        matches!(self, Self::Both { .. } | Self::UploadOnly)
    }
}

/// Optional uploader details entered on the guest upload form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploaderDetails {
    /// Guest name.
    pub name: Option<String>,
    /// Guest phone number.
    pub phone: Option<String>,
}

impl UploaderDetails {
    /// Drops blank values so that `Some("")` counts as missing.
    #[must_use]
    pub fn normalized(self) -> Self {
        let clean = |v: Option<String>| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        Self {
            name: clean(self.name),
            phone: clean(self.phone),
        }
    }
}

impl QrRules {
    /// Checks uploader details against the name and phone requirements.
    ///
    /// # Errors
    ///
    /// Returns [`GuestAccessError::NameRequired`] or
    /// [`GuestAccessError::PhoneRequired`] for a missing mandatory field.
    pub fn validate_uploader(&self, details: &UploaderDetails) -> Result<(), GuestAccessError> {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        if self.name_required && blank(&details.name) {
            return Err(GuestAccessError::NameRequired);
        }
        if self.phone_required == PhoneRequirement::Mandatory && blank(&details.phone) {
            return Err(GuestAccessError::PhoneRequired);
        }
        Ok(())
    }
}
