//! Cached reads and invalidating writes over the bean, form and product
//! catalog.

use crate::api::{
    classify, Bean, ClassifiedError, Form, InventoryApi, Product, ProductImage, ProductMetadata,
    ProductQuery, Resource,
};
use crate::cache::{QueryCache, QueryKey};
use std::sync::Arc;
use tracing::{debug, info};

pub struct CatalogService<A: ?Sized> {
    api: Arc<A>,
    cache: QueryCache,
}

impl<A: ?Sized> Clone for CatalogService<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            cache: self.cache.clone(),
        }
    }
}

impl<A: InventoryApi + ?Sized> CatalogService<A> {
    pub fn new(api: Arc<A>, cache: QueryCache) -> Self {
        Self { api, cache }
    }

    pub async fn list_beans(&self) -> Result<Vec<Bean>, ClassifiedError> {
        self.cache
            .fetch(QueryKey::beans(), || self.api.list_beans())
            .await
            .map_err(|e| classify(&e, Resource::Bean))
    }

    pub async fn get_bean(&self, id: u64) -> Result<Bean, ClassifiedError> {
        self.cache
            .fetch(QueryKey::bean(id), || self.api.get_bean(id))
            .await
            .map_err(|e| classify(&e, Resource::Bean))
    }

    pub async fn create_bean(&self, name: &str) -> Result<String, ClassifiedError> {
        let message = self
            .api
            .create_bean(name.trim())
            .await
            .map_err(|e| classify(&e, Resource::Bean))?;
        info!(name = %name.trim(), "Bean created");
        self.cache.invalidate(&QueryKey::beans()).await;
        Ok(message)
    }

    pub async fn edit_bean(&self, id: u64, name: &str) -> Result<String, ClassifiedError> {
        let message = self
            .api
            .edit_bean(id, name.trim())
            .await
            .map_err(|e| classify(&e, Resource::Bean))?;
        info!(bean_id = id, "Bean renamed");
        self.cache.invalidate(&QueryKey::beans()).await;
        Ok(message)
    }

    pub async fn delete_bean(&self, id: u64) -> Result<(), ClassifiedError> {
        self.api
            .delete_bean(id)
            .await
            .map_err(|e| classify(&e, Resource::Bean))?;
        info!(bean_id = id, "Bean deleted");
        self.cache.invalidate(&QueryKey::beans()).await;
        Ok(())
    }

    pub async fn list_forms(&self) -> Result<Vec<Form>, ClassifiedError> {
        self.cache
            .fetch(QueryKey::forms(), || self.api.list_forms())
            .await
            .map_err(|e| classify(&e, Resource::Form))
    }

    pub async fn get_form(&self, id: u64) -> Result<Form, ClassifiedError> {
        self.cache
            .fetch(QueryKey::form(id), || self.api.get_form(id))
            .await
            .map_err(|e| classify(&e, Resource::Form))
    }

    pub async fn create_form(&self, name: &str) -> Result<String, ClassifiedError> {
        let message = self
            .api
            .create_form(name.trim())
            .await
            .map_err(|e| classify(&e, Resource::Form))?;
        info!(name = %name.trim(), "Form created");
        self.cache.invalidate(&QueryKey::forms()).await;
        Ok(message)
    }

    pub async fn edit_form(&self, id: u64, name: &str) -> Result<String, ClassifiedError> {
        let message = self
            .api
            .edit_form(id, name.trim())
            .await
            .map_err(|e| classify(&e, Resource::Form))?;
        info!(form_id = id, "Form renamed");
        self.cache.invalidate(&QueryKey::forms()).await;
        Ok(message)
    }

    pub async fn delete_form(&self, id: u64) -> Result<(), ClassifiedError> {
        self.api
            .delete_form(id)
            .await
            .map_err(|e| classify(&e, Resource::Form))?;
        info!(form_id = id, "Form deleted");
        self.cache.invalidate(&QueryKey::forms()).await;
        Ok(())
    }

    pub async fn list_products(
        &self,
        query: &ProductQuery,
    ) -> Result<Vec<Product>, ClassifiedError> {
        self.cache
            .fetch(QueryKey::product_list(&query.cache_segment()), || {
                self.api.list_products(query)
            })
            .await
            .map_err(|e| classify(&e, Resource::Product))
    }

    pub async fn get_product(&self, id: u64) -> Result<Product, ClassifiedError> {
        self.cache
            .fetch(QueryKey::product(id), || self.api.get_product(id))
            .await
            .map_err(|e| classify(&e, Resource::Product))
    }

    pub async fn create_product(
        &self,
        metadata: &ProductMetadata,
        image: Option<ProductImage>,
    ) -> Result<String, ClassifiedError> {
        debug!(with_image = image.is_some(), "Creating product");
        let message = self
            .api
            .create_product(metadata, image)
            .await
            .map_err(|e| classify(&e, Resource::Product))?;
        self.cache.invalidate(&QueryKey::products()).await;
        Ok(message)
    }

    pub async fn edit_product(
        &self,
        id: u64,
        metadata: &ProductMetadata,
        image: Option<ProductImage>,
    ) -> Result<String, ClassifiedError> {
        debug!(product_id = id, with_image = image.is_some(), "Editing product");
        let message = self
            .api
            .edit_product(id, metadata, image)
            .await
            .map_err(|e| classify(&e, Resource::Product))?;
        self.cache.invalidate(&QueryKey::products()).await;
        Ok(message)
    }

    pub async fn delete_product(&self, id: u64) -> Result<(), ClassifiedError> {
        self.api
            .delete_product(id)
            .await
            .map_err(|e| classify(&e, Resource::Product))?;
        info!(product_id = id, "Product deleted");
        self.cache.invalidate(&QueryKey::products()).await;
        Ok(())
    }
}
