use bytes::Bytes;
use mime::Mime;

use crate::errors::{DomainError, DomainResult};

const MB: usize = 1024 * 1024;

/// What an uploaded file is for. Each category has its own directory,
/// size ceiling and accepted content types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadCategory {
    ValidId,
    SelfieWithId,
    ProfilePicture,
    ItemPhoto,
}

impl UploadCategory {
    pub fn dir(self) -> &'static str {
        match self {
            UploadCategory::ValidId => "ids",
            UploadCategory::SelfieWithId => "selfies",
            UploadCategory::ProfilePicture => "profiles",
            UploadCategory::ItemPhoto => "items",
        }
    }

    /// Multipart field the file arrives in.
    pub fn field_name(self) -> &'static str {
        match self {
            UploadCategory::ValidId => "valid_id",
            UploadCategory::SelfieWithId => "selfie_with_id",
            UploadCategory::ProfilePicture => "profile_picture",
            UploadCategory::ItemPhoto => "photo",
        }
    }

    pub fn max_bytes(self) -> usize {
        match self {
            UploadCategory::ValidId | UploadCategory::SelfieWithId => 10 * MB,
            UploadCategory::ProfilePicture | UploadCategory::ItemPhoto => 5 * MB,
        }
    }

    /// Government IDs may be scanned PDFs; everything else must be an image.
    pub fn accepts(self, content_type: &Mime) -> bool {
        if content_type.type_() == mime::IMAGE {
            return true;
        }
        self == UploadCategory::ValidId && content_type.essence_str() == mime::APPLICATION_PDF.essence_str()
    }

    pub fn type_error(self) -> &'static str {
        match self {
            UploadCategory::ValidId => "ID must be an image or PDF",
            _ => "Only image files (JPG, PNG, GIF) are allowed",
        }
    }

    pub fn size_error(self) -> String {
        format!("File too large. Maximum size is {}MB", self.max_bytes() / MB)
    }

    /// Size and declared-type rules, reported against the upload's field.
    /// Checking the bytes themselves is left to the storage adapter.
    pub fn check(self, upload: &Upload) -> DomainResult<()> {
        let field = self.field_name();
        if upload.is_empty() {
            return Err(DomainError::field(field, "Uploaded file is empty"));
        }
        if upload.len() > self.max_bytes() {
            return Err(DomainError::field(field, self.size_error()));
        }
        if !self.accepts(&upload.content_type) {
            return Err(DomainError::field(field, self.type_error()));
        }
        Ok(())
    }
}

/// A file received from a client, held in memory until stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Mime,
    pub bytes: Bytes,
}

impl Upload {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ids_accept_pdf() {
        assert!(UploadCategory::ValidId.accepts(&mime::APPLICATION_PDF));
        assert!(!UploadCategory::SelfieWithId.accepts(&mime::APPLICATION_PDF));
        assert!(!UploadCategory::ItemPhoto.accepts(&mime::APPLICATION_PDF));
    }

    #[test]
    fn images_are_accepted_everywhere() {
        assert!(UploadCategory::ProfilePicture.accepts(&mime::IMAGE_PNG));
        assert!(UploadCategory::ItemPhoto.accepts(&mime::IMAGE_JPEG));
        assert!(!UploadCategory::ItemPhoto.accepts(&mime::TEXT_PLAIN));
    }

    #[test]
    fn check_reports_against_the_category_field() {
        let upload = Upload {
            file_name: None,
            content_type: mime::TEXT_PLAIN,
            bytes: Bytes::from_static(b"hello"),
        };
        assert_eq!(
            UploadCategory::SelfieWithId.check(&upload),
            Err(DomainError::field("selfie_with_id", "Only image files (JPG, PNG, GIF) are allowed"))
        );
    }

    #[test]
    fn document_limits_are_larger_than_photo_limits() {
        assert_eq!(UploadCategory::ValidId.max_bytes(), 10 * MB);
        assert_eq!(UploadCategory::ItemPhoto.max_bytes(), 5 * MB);
        assert_eq!(UploadCategory::ProfilePicture.size_error(), "File too large. Maximum size is 5MB");
    }
}
