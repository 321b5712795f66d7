use crate::config::Config;
use crate::domain::{
    AttachmentMeta, CreateOrderRequest, OrderDraft, SendPriceOfferRequest, UserContact,
};
use crate::error::AppError;
use thiserror::Error;

/// Content types accepted for order attachments
pub const ALLOWED_ATTACHMENT_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "application/pdf",
    "application/msword",
    "application/text",
];

/// Validation errors, each tied to the offending input field
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be between {min} and {max} characters")]
    NameLength {
        field: &'static str,
        min: usize,
        max: usize,
    },

    #[error("Email address is not valid")]
    InvalidEmail,

    #[error("Mobile number must be between {min} and {max} characters")]
    MobileLength { min: usize, max: usize },

    #[error("Service details must be at least {min} and fewer than {max} characters")]
    DetailsLength { min: usize, max: usize },

    #[error("Attachment exceeds the maximum size of {max_bytes} bytes")]
    AttachmentTooLarge { max_bytes: u64 },

    #[error("Attachment type {0} is not allowed; use JPEG, PNG, PDF, DOC or text")]
    AttachmentType(String),

    #[error("Price must be a non-negative number")]
    InvalidPrice,
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Required { field } => *field,
            ValidationError::NameLength { field, .. } => *field,
            ValidationError::InvalidEmail => "email",
            ValidationError::MobileLength { .. } => "mobile_number",
            ValidationError::DetailsLength { .. } => "service_details",
            ValidationError::AttachmentTooLarge { .. } => "attachment",
            ValidationError::AttachmentType(_) => "attachment",
            ValidationError::InvalidPrice => "price",
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

/// Input rules for order submission and price offers
#[derive(Debug, Clone)]
pub struct OrderValidator {
    /// Inclusive lower bound on trimmed service details, in characters
    min_details_chars: usize,
    /// Exclusive upper bound on trimmed service details, in characters
    max_details_chars: usize,
    max_attachment_bytes: u64,
}

impl Default for OrderValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderValidator {
    const NAME_MIN: usize = 2;
    const NAME_MAX: usize = 50;
    const MOBILE_MIN: usize = 10;
    const MOBILE_MAX: usize = 20;

    pub fn new() -> Self {
        Self::with_rules(100, 500, 100 * 1024 * 1024)
    }

    pub fn with_rules(
        min_details_chars: usize,
        max_details_chars: usize,
        max_attachment_bytes: u64,
    ) -> Self {
        Self {
            min_details_chars,
            max_details_chars,
            max_attachment_bytes,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_rules(
            config.service_details_min_chars,
            config.service_details_max_chars,
            config.max_attachment_bytes,
        )
    }

    /// Validate a submission and split it into the contact to remember and
    /// the order draft to store.
    pub fn validate_create(
        &self,
        request: CreateOrderRequest,
    ) -> Result<(UserContact, OrderDraft), ValidationError> {
        let first_name = self.validate_name("first_name", &request.first_name)?;
        let last_name = self.validate_name("last_name", &request.last_name)?;
        let email = self.validate_email(&request.email)?;
        let mobile_number = self.validate_mobile(&request.mobile_number)?;
        let service_details = self.validate_details(&request.service_details)?;

        let attachment = match request.attachment {
            Some(ref meta) => Some(self.validate_attachment(meta)?),
            None => None,
        };

        Ok((
            UserContact {
                first_name,
                last_name,
                email,
                mobile_number,
            },
            OrderDraft {
                service_type: request.service_type,
                service_details,
                service_delivery_date: request.service_delivery_date,
                attachment,
            },
        ))
    }

    pub fn validate_name(&self, field: &'static str, value: &str) -> Result<String, ValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required { field });
        }
        let len = trimmed.chars().count();
        if len < Self::NAME_MIN || len > Self::NAME_MAX {
            return Err(ValidationError::NameLength {
                field,
                min: Self::NAME_MIN,
                max: Self::NAME_MAX,
            });
        }
        Ok(trimmed.to_string())
    }

    /// Shape check only: one `@`, non-empty local part, dotted domain.
    pub fn validate_email(&self, value: &str) -> Result<String, ValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required { field: "email" });
        }
        let mut parts = trimmed.split('@');
        let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) => (local, domain),
            _ => return Err(ValidationError::InvalidEmail),
        };
        let domain_ok = domain.contains('.') && domain.split('.').all(|label| !label.is_empty());
        if local.is_empty() || !domain_ok || trimmed.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(trimmed.to_string())
    }

    pub fn validate_mobile(&self, value: &str) -> Result<String, ValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required {
                field: "mobile_number",
            });
        }
        let len = trimmed.chars().count();
        if len < Self::MOBILE_MIN || len > Self::MOBILE_MAX {
            return Err(ValidationError::MobileLength {
                min: Self::MOBILE_MIN,
                max: Self::MOBILE_MAX,
            });
        }
        Ok(trimmed.to_string())
    }

    pub fn validate_details(&self, value: &str) -> Result<String, ValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required {
                field: "service_details",
            });
        }
        let len = trimmed.chars().count();
        if len < self.min_details_chars || len >= self.max_details_chars {
            return Err(ValidationError::DetailsLength {
                min: self.min_details_chars,
                max: self.max_details_chars,
            });
        }
        Ok(trimmed.to_string())
    }

    /// Returns the filename to record on the order
    pub fn validate_attachment(&self, meta: &AttachmentMeta) -> Result<String, ValidationError> {
        let filename = meta.filename.trim();
        if filename.is_empty() {
            return Err(ValidationError::Required {
                field: "attachment",
            });
        }
        if meta.size_bytes > self.max_attachment_bytes {
            return Err(ValidationError::AttachmentTooLarge {
                max_bytes: self.max_attachment_bytes,
            });
        }
        let content_type = meta.content_type.trim().to_lowercase();
        if !ALLOWED_ATTACHMENT_TYPES.contains(&content_type.as_str()) {
            return Err(ValidationError::AttachmentType(meta.content_type.clone()));
        }
        Ok(filename.to_string())
    }

    pub fn validate_price_offer(&self, request: &SendPriceOfferRequest) -> Result<(), ValidationError> {
        if !request.price.is_finite() || request.price < 0.0 {
            return Err(ValidationError::InvalidPrice);
        }
        Ok(())
    }
}
