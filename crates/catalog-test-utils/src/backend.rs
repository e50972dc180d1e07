//! In-memory catalog with the server's rules
//!
//! Shared by [`InMemoryCatalog`](crate::InMemoryCatalog) and
//! [`FakeApiServer`](crate::FakeApiServer) so both doubles answer alike.

use catalog_client::{
    ApiError, ApiResult, Category, CategoryId, CategoryPayload, CategorySnapshot, Product,
    ProductFilter, ProductId, ProductPayload, Validate,
};

/// Rejection for deleting a category that still has products
pub const CATEGORY_IN_USE: &str = "Cannot delete category with existing products";

/// Server-side catalog state
#[derive(Debug, Clone, Default)]
pub struct CatalogBackend {
    categories: Vec<Category>,
    products: Vec<Product>,
    last_category_id: u64,
    last_product_id: u64,
}

impl CatalogBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with categories named `names`
    pub fn with_categories(names: &[&str]) -> Self {
        let mut backend = Self::new();
        for name in names {
            // Fixture names are expected to be valid.
            let _ = backend.create_category(&CategoryPayload::new(*name));
        }
        backend
    }

    pub fn list_categories(&self) -> Vec<Category> {
        self.categories.clone()
    }

    pub fn get_category(&self, id: CategoryId) -> ApiResult<Category> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Category not found"))
    }

    pub fn create_category(&mut self, payload: &CategoryPayload) -> ApiResult<Category> {
        reject_invalid(payload)?;
        self.last_category_id += 1;
        let category = Category {
            id: CategoryId(self.last_category_id),
            name: payload.name.trim().to_string(),
            description: description(&payload.description),
        };
        self.categories.push(category.clone());
        Ok(category)
    }

    pub fn update_category(
        &mut self,
        id: CategoryId,
        payload: &CategoryPayload,
    ) -> ApiResult<Category> {
        reject_invalid(payload)?;
        let category = self
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ApiError::not_found("Category not found"))?;
        category.name = payload.name.trim().to_string();
        category.description = description(&payload.description);
        let updated = category.clone();

        for product in self.products.iter_mut().filter(|p| p.category_id == id) {
            product.category = Some(snapshot(&updated));
        }
        Ok(updated)
    }

    pub fn delete_category(&mut self, id: CategoryId) -> ApiResult<()> {
        let index = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| ApiError::not_found("Category not found"))?;
        if self.products.iter().any(|p| p.category_id == id) {
            return Err(ApiError::server(409, CATEGORY_IN_USE));
        }
        self.categories.remove(index);
        Ok(())
    }

    pub fn list_products(&self, filter: &ProductFilter) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| filter.category_id.map_or(true, |id| p.category_id == id))
            .filter(|p| filter.in_stock.map_or(true, |s| p.in_stock == s))
            .cloned()
            .collect()
    }

    pub fn get_product(&self, id: ProductId) -> ApiResult<Product> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Product not found"))
    }

    pub fn create_product(&mut self, payload: &ProductPayload) -> ApiResult<Product> {
        reject_invalid(payload)?;
        let category = self.owning_category(payload.category_id)?;
        self.last_product_id += 1;
        let product = Product {
            id: ProductId(self.last_product_id),
            name: payload.name.trim().to_string(),
            price: payload.price,
            category_id: payload.category_id,
            in_stock: payload.in_stock,
            category: Some(category),
        };
        self.products.push(product.clone());
        Ok(product)
    }

    pub fn update_product(&mut self, id: ProductId, payload: &ProductPayload) -> ApiResult<Product> {
        reject_invalid(payload)?;
        let category = self.owning_category(payload.category_id)?;
        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ApiError::not_found("Product not found"))?;
        product.name = payload.name.trim().to_string();
        product.price = payload.price;
        product.category_id = payload.category_id;
        product.in_stock = payload.in_stock;
        product.category = Some(category);
        Ok(product.clone())
    }

    pub fn delete_product(&mut self, id: ProductId) -> ApiResult<()> {
        let before = self.products.len();
        self.products.retain(|p| p.id != id);
        if self.products.len() == before {
            return Err(ApiError::not_found("Product not found"));
        }
        Ok(())
    }

    fn owning_category(&self, id: CategoryId) -> ApiResult<CategorySnapshot> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(snapshot)
            .ok_or_else(|| ApiError::server(400, "Category not found"))
    }
}

fn reject_invalid(payload: &impl Validate) -> ApiResult<()> {
    payload
        .validate()
        .map_err(|errors| ApiError::server(400, errors.to_string()))
}

fn description(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn snapshot(category: &Category) -> CategorySnapshot {
    CategorySnapshot {
        id: Some(category.id),
        name: category.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_never_reused() {
        let mut backend = CatalogBackend::new();
        let first = backend.create_category(&CategoryPayload::new("Tools")).unwrap();
        backend.delete_category(first.id).unwrap();
        let second = backend.create_category(&CategoryPayload::new("Tools")).unwrap();

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn product_requires_existing_category() {
        let mut backend = CatalogBackend::new();
        let err = backend
            .create_product(&ProductPayload::new("Hammer", 5.0, CategoryId(1)))
            .unwrap_err();

        assert_eq!(err, ApiError::server(400, "Category not found"));
    }

    #[test]
    fn referenced_category_cannot_be_deleted() {
        let mut backend = CatalogBackend::with_categories(&["Tools"]);
        backend
            .create_product(&ProductPayload::new("Hammer", 5.0, CategoryId(1)))
            .unwrap();

        let err = backend.delete_category(CategoryId(1)).unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(backend.list_categories().len(), 1);
    }

    #[test]
    fn filters_combine() {
        let mut backend = CatalogBackend::with_categories(&["Tools", "Food"]);
        backend
            .create_product(&ProductPayload::new("Hammer", 5.0, CategoryId(1)))
            .unwrap();
        backend
            .create_product(&ProductPayload::new("Saw", 9.0, CategoryId(1)).with_in_stock(false))
            .unwrap();
        backend
            .create_product(&ProductPayload::new("Bread", 2.0, CategoryId(2)))
            .unwrap();

        let tools = ProductFilter::all().with_category(CategoryId(1));
        assert_eq!(backend.list_products(&tools).len(), 2);
        assert_eq!(backend.list_products(&tools.with_in_stock(true)).len(), 1);
        assert_eq!(backend.list_products(&ProductFilter::all()).len(), 3);
    }

    #[test]
    fn renaming_a_category_updates_product_snapshots() {
        let mut backend = CatalogBackend::with_categories(&["Tools"]);
        backend
            .create_product(&ProductPayload::new("Hammer", 5.0, CategoryId(1)))
            .unwrap();
        backend
            .update_category(CategoryId(1), &CategoryPayload::new("Hardware"))
            .unwrap();

        let product = backend.get_product(ProductId(1)).unwrap();
        assert_eq!(product.category_name(), Some("Hardware"));
    }
}
