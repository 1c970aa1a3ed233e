// Product endpoints
//
// Reads are plain JSON. Create and update go out as multipart forms so
// image files can ride along as repeated `images` parts.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{ApiProduct, ImageUpload, ProductForm};

impl ApiClient {
    /// `GET /api/products`
    pub async fn list_products(&self) -> Result<Vec<ApiProduct>, Error> {
        let url = self.api_url("products")?;
        self.get(url, None).await
    }

    /// `GET /api/products/:id`
    pub async fn get_product(&self, id: &str) -> Result<ApiProduct, Error> {
        let url = self.item_url("products", id)?;
        self.get(url, None).await
    }

    /// `POST /api/products` (multipart). The thumbnail field is not sent.
    pub async fn create_product(&self, form: &ProductForm) -> Result<ApiProduct, Error> {
        let url = self.api_url("products")?;
        debug!(
            sku = %form.sku,
            images = form.images.len(),
            "creating product"
        );
        let body = form.to_multipart(false)?;
        self.send_multipart(Method::POST, url, body).await
    }

    /// `PUT /api/products/:id` (multipart, including `thumbnail`).
    pub async fn update_product(&self, id: &str, form: &ProductForm) -> Result<ApiProduct, Error> {
        let url = self.item_url("products", id)?;
        debug!(
            id,
            images = form.images.len(),
            thumbnail = ?form.thumbnail,
            "updating product"
        );
        let body = form.to_multipart(true)?;
        self.send_multipart(Method::PUT, url, body).await
    }

    /// `DELETE /api/products/:id`
    pub async fn delete_product(&self, id: &str) -> Result<(), Error> {
        let url = self.item_url("products", id)?;
        self.delete(url).await
    }
}

impl ProductForm {
    pub(crate) fn to_multipart(&self, with_thumbnail: bool) -> Result<Form, Error> {
        let mut form = Form::new()
            .text("sku", self.sku.clone())
            .text("name", self.name.clone())
            .text("description", self.description.clone())
            .text("price", self.price.to_string())
            .text("quantity", self.quantity.to_string());

        if with_thumbnail {
            form = form.text("thumbnail", self.thumbnail.clone().unwrap_or_default());
        }

        for image in &self.images {
            form = form.part("images", image_part(image)?);
        }
        Ok(form)
    }
}

fn image_part(image: &ImageUpload) -> Result<Part, Error> {
    Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(image.content_type())
        .map_err(|e| Error::Attachment {
            file_name: image.file_name.clone(),
            reason: e.to_string(),
        })
}
