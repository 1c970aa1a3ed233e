// ── Product create/update requests ──
//
// Typed payloads for product mutations, with parsing helpers for the
// string input the front-ends collect. Converted to the API's multipart
// form by the catalog.

use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use stockroom_api::{ImageUpload, ProductForm};

use crate::error::CoreError;
use crate::model::Product;

/// A local image file to upload with a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read an image from disk, keeping only its file name.
    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                CoreError::validation(format!("'{}' is not a file path", path.display()))
            })?
            .to_owned();
        let bytes = std::fs::read(path).map_err(|e| {
            CoreError::validation(format!("cannot read image '{}': {e}", path.display()))
        })?;
        Ok(Self { file_name, bytes })
    }

    fn to_upload(&self) -> ImageUpload {
        ImageUpload::new(self.file_name.clone(), self.bytes.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateProductRequest {
    pub sku: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: u32,
    pub images: Vec<ImageAttachment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProductRequest {
    pub sku: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: u32,
    /// Reference to an existing image, or the file name of a new attachment.
    /// `None` keeps the current thumbnail.
    pub thumbnail: Option<String>,
    pub images: Vec<ImageAttachment>,
}

impl UpdateProductRequest {
    /// Start from the product's current values, with no new images.
    pub fn from_product(product: &Product) -> Self {
        Self {
            sku: product.sku.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            quantity: product.quantity,
            thumbnail: None,
            images: Vec::new(),
        }
    }
}

// ── Parsing ─────────────────────────────────────────────────────────

/// Parse a non-negative price (`"12"`, `"12.5"`, `"$12.50"`).
pub fn parse_price(input: &str) -> Result<Decimal, CoreError> {
    let trimmed = input.trim().trim_start_matches('$');
    let price = Decimal::from_str(trimmed)
        .map_err(|_| CoreError::validation(format!("invalid price '{input}'")))?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(CoreError::validation("price cannot be negative"));
    }
    Ok(price)
}

pub fn parse_quantity(input: &str) -> Result<u32, CoreError> {
    input
        .trim()
        .parse()
        .map_err(|_| CoreError::validation(format!("invalid quantity '{input}'")))
}

// ── Validation ──────────────────────────────────────────────────────

fn require_field(name: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(format!("{name} is required")));
    }
    Ok(())
}

/// Thumbnail choices for an update: existing references first, then the
/// file names of new attachments.
pub fn thumbnail_candidates(existing: &[String], attachments: &[ImageAttachment]) -> Vec<String> {
    let mut out: Vec<String> = existing.to_vec();
    for a in attachments {
        if !out.contains(&a.file_name) {
            out.push(a.file_name.clone());
        }
    }
    out
}

/// The chosen thumbnail must be one of [`thumbnail_candidates`].
pub fn validate_thumbnail(
    choice: &str,
    existing: &[String],
    attachments: &[ImageAttachment],
) -> Result<(), CoreError> {
    if thumbnail_candidates(existing, attachments)
        .iter()
        .any(|c| c == choice)
    {
        Ok(())
    } else {
        Err(CoreError::validation(format!(
            "thumbnail '{choice}' is not one of the product's images"
        )))
    }
}

impl CreateProductRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_field("sku", &self.sku)?;
        require_field("name", &self.name)
    }

    pub(crate) fn to_form(&self) -> ProductForm {
        ProductForm {
            sku: self.sku.trim().to_owned(),
            name: self.name.trim().to_owned(),
            description: self.description.clone(),
            price: self.price,
            quantity: self.quantity,
            thumbnail: None,
            images: self.images.iter().map(ImageAttachment::to_upload).collect(),
        }
    }
}

impl UpdateProductRequest {
    /// Check required fields and the thumbnail against `current`'s images.
    pub fn validate(&self, current: &Product) -> Result<(), CoreError> {
        require_field("sku", &self.sku)?;
        require_field("name", &self.name)?;
        if let Some(choice) = &self.thumbnail {
            validate_thumbnail(choice, &current.images, &self.images)?;
        }
        Ok(())
    }

    pub(crate) fn to_form(&self, current: &Product) -> ProductForm {
        ProductForm {
            sku: self.sku.trim().to_owned(),
            name: self.name.trim().to_owned(),
            description: self.description.clone(),
            price: self.price,
            quantity: self.quantity,
            thumbnail: self.thumbnail.clone().or_else(|| current.thumbnail.clone()),
            images: self.images.iter().map(ImageAttachment::to_upload).collect(),
        }
    }
}
