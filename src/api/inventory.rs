use crate::api::client::{ApiClient, Auth};
use crate::api::errors::ApiError;
use crate::api::types::{Bean, Form, Product, ProductMetadata, ProductQuery};
use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Method;
use serde_json::json;

/// Image attached to a product create/edit as the `file` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ProductImage {
    pub async fn read(path: &std::path::Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self { file_name, bytes })
    }
}

/// Catalog endpoints: beans, processing forms and products.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait InventoryApi: Send + Sync {
    async fn list_beans(&self) -> Result<Vec<Bean>, ApiError>;
    async fn get_bean(&self, id: u64) -> Result<Bean, ApiError>;
    async fn create_bean(&self, name: &str) -> Result<String, ApiError>;
    async fn edit_bean(&self, id: u64, name: &str) -> Result<String, ApiError>;
    async fn delete_bean(&self, id: u64) -> Result<(), ApiError>;

    async fn list_forms(&self) -> Result<Vec<Form>, ApiError>;
    async fn get_form(&self, id: u64) -> Result<Form, ApiError>;
    async fn create_form(&self, name: &str) -> Result<String, ApiError>;
    async fn edit_form(&self, id: u64, name: &str) -> Result<String, ApiError>;
    async fn delete_form(&self, id: u64) -> Result<(), ApiError>;

    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError>;
    async fn get_product(&self, id: u64) -> Result<Product, ApiError>;
    async fn create_product(
        &self,
        metadata: &ProductMetadata,
        image: Option<ProductImage>,
    ) -> Result<String, ApiError>;
    async fn edit_product(
        &self,
        id: u64,
        metadata: &ProductMetadata,
        image: Option<ProductImage>,
    ) -> Result<String, ApiError>;
    async fn delete_product(&self, id: u64) -> Result<(), ApiError>;
}

fn product_form(metadata: &ProductMetadata, image: Option<ProductImage>) -> Result<multipart::Form, ApiError> {
    let mut form = multipart::Form::new().text("metadata", serde_json::to_string(metadata)?);
    if let Some(image) = image {
        form = form.part(
            "file",
            multipart::Part::bytes(image.bytes).file_name(image.file_name),
        );
    }
    Ok(form)
}

impl ApiClient {
    async fn send_name(&self, method: Method, path: &str, name: &str) -> Result<String, ApiError> {
        self.send_json(method, path, &json!({ "name": name }), Auth::Bearer)
            .await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, path)?;
        self.send_unit(request, Auth::Bearer).await
    }
}

#[async_trait]
impl InventoryApi for ApiClient {
    async fn list_beans(&self) -> Result<Vec<Bean>, ApiError> {
        self.get("beans", &[]).await
    }

    async fn get_bean(&self, id: u64) -> Result<Bean, ApiError> {
        self.get(&format!("beans/{id}"), &[]).await
    }

    async fn create_bean(&self, name: &str) -> Result<String, ApiError> {
        self.send_name(Method::POST, "beans", name).await
    }

    async fn edit_bean(&self, id: u64, name: &str) -> Result<String, ApiError> {
        self.send_name(Method::PATCH, &format!("beans/{id}"), name).await
    }

    async fn delete_bean(&self, id: u64) -> Result<(), ApiError> {
        self.delete(&format!("beans/{id}")).await
    }

    async fn list_forms(&self) -> Result<Vec<Form>, ApiError> {
        self.get("forms", &[]).await
    }

    async fn get_form(&self, id: u64) -> Result<Form, ApiError> {
        self.get(&format!("forms/{id}"), &[]).await
    }

    async fn create_form(&self, name: &str) -> Result<String, ApiError> {
        self.send_name(Method::POST, "forms", name).await
    }

    async fn edit_form(&self, id: u64, name: &str) -> Result<String, ApiError> {
        self.send_name(Method::PATCH, &format!("forms/{id}"), name).await
    }

    async fn delete_form(&self, id: u64) -> Result<(), ApiError> {
        self.delete(&format!("forms/{id}")).await
    }

    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        self.get("products", &query.to_pairs()).await
    }

    async fn get_product(&self, id: u64) -> Result<Product, ApiError> {
        self.get(&format!("products/{id}"), &[]).await
    }

    async fn create_product(
        &self,
        metadata: &ProductMetadata,
        image: Option<ProductImage>,
    ) -> Result<String, ApiError> {
        let request = self
            .request(Method::POST, "products")?
            .multipart(product_form(metadata, image)?);
        self.send(request, Auth::Bearer).await
    }

    async fn edit_product(
        &self,
        id: u64,
        metadata: &ProductMetadata,
        image: Option<ProductImage>,
    ) -> Result<String, ApiError> {
        let request = self
            .request(Method::PATCH, &format!("products/{id}"))?
            .multipart(product_form(metadata, image)?);
        self.send(request, Auth::Bearer).await
    }

    async fn delete_product(&self, id: u64) -> Result<(), ApiError> {
        self.delete(&format!("products/{id}")).await
    }
}
