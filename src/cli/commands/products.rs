use crate::api::{ApiClient, Product, ProductImage, ProductMetadata, ProductQuery};
use crate::cli::commands::{confirm, print_page_footer, report, with_session, Console};
use crate::cli::{ProductArgs, ProductsCommand};
use crate::workflows::CatalogService;
use anyhow::{Context, Result};
use std::sync::Arc;

fn print_product(product: &Product) {
    println!(
        "🏷️  #{} {} {} ({})",
        product.id, product.bean, product.form, product.roasted
    );
    println!("   💰 {:.2}   📦 {} in stock", product.price, product.quantity);
    if let Some(image) = &product.image {
        println!("   🖼️  {image}");
    }
}

impl ProductArgs {
    fn metadata(&self) -> ProductMetadata {
        ProductMetadata {
            bean: self.bean.trim().to_string(),
            roasted: self.roasted.trim().to_string(),
            form: self.form.trim().to_string(),
            price: self.price,
            quantity: self.quantity,
        }
    }

    async fn image(&self) -> Result<Option<ProductImage>> {
        match &self.image {
            Some(path) => {
                let image = ProductImage::read(path)
                    .await
                    .with_context(|| format!("Failed to read image {}", path.display()))?;
                Ok(Some(image))
            }
            None => Ok(None),
        }
    }
}

pub struct ProductsCommandRunner {
    pub command: ProductsCommand,
}

impl ProductsCommandRunner {
    pub fn new(command: ProductsCommand) -> Self {
        Self { command }
    }

    pub async fn execute(&self, console: &Console) -> Result<()> {
        if let ProductsCommand::Delete { id, yes } = &self.command {
            if !confirm(&format!("Delete product #{id}?"), *yes)? {
                return Ok(());
            }
        }

        with_session(console, |client, _session| async move {
            let catalog = CatalogService::new(Arc::new(client), console.cache.clone());
            self.run(console, &catalog).await
        })
        .await
    }

    async fn run(&self, console: &Console, catalog: &CatalogService<ApiClient>) -> Result<()> {
        match &self.command {
            ProductsCommand::List {
                bean,
                form,
                roast,
                sort,
                page,
                limit,
            } => {
                let page = console.page(*page, *limit);
                let query = ProductQuery {
                    bean: bean.clone(),
                    form: form.clone(),
                    roast: roast.clone(),
                    sort: *sort,
                    offset: Some(page.offset()),
                    limit: Some(page.limit),
                };
                let products = catalog.list_products(&query).await.map_err(report)?;

                println!();
                if products.is_empty() {
                    println!("📋 No products match");
                    return Ok(());
                }
                for product in &products {
                    print_product(product);
                }
                print_page_footer(page, products.len());
            }
            ProductsCommand::Show { id } => {
                let product = catalog.get_product(*id).await.map_err(report)?;
                println!();
                print_product(&product);
            }
            ProductsCommand::Create(args) => {
                let image = args.image().await?;
                let message = catalog
                    .create_product(&args.metadata(), image)
                    .await
                    .map_err(report)?;
                println!("✅ {message}");
            }
            ProductsCommand::Edit { id, product } => {
                let image = product.image().await?;
                let message = catalog
                    .edit_product(*id, &product.metadata(), image)
                    .await
                    .map_err(report)?;
                println!("✅ {message}");
            }
            ProductsCommand::Delete { id, .. } => {
                catalog.delete_product(*id).await.map_err(report)?;
                println!("🗑️  Deleted product #{id}");
            }
        }
        Ok(())
    }
}
