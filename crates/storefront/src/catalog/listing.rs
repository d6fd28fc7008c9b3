//! Category filtering for the product list screen.

use std::fmt;

use pocketstore_core::Product;

/// Label of the filter that matches every product.
pub const ALL_CATEGORIES: &str = "All";

/// A category chip: every product, or one category by name.
///
/// A catalog category that happens to be called `"All"` is
/// `Named("All")` and filters like any other category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Text shown on the chip.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Named(name) => name.as_str(),
        }
    }

    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => product.category_name() == name,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// [`CategoryFilter::All`] first, then each category name in order of first
/// appearance.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<CategoryFilter> {
    let mut filters = vec![CategoryFilter::All];
    for product in products {
        let name = product.category_name();
        let seen = filters
            .iter()
            .any(|f| matches!(f, CategoryFilter::Named(n) if n == name));
        if !seen {
            filters.push(CategoryFilter::named(name));
        }
    }
    filters
}

/// Products matching `filter`.
#[must_use]
pub fn filter_by_category<'a>(products: &'a [Product], filter: &CategoryFilter) -> Vec<&'a Product> {
    products.iter().filter(|p| filter.matches(p)).collect()
}

/// Fetched products plus the currently selected category.
#[derive(Debug, Clone)]
pub struct ProductListing {
    products: Vec<Product>,
    categories: Vec<CategoryFilter>,
    selected: CategoryFilter,
}

impl Default for ProductListing {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ProductListing {
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        let categories = categories(&products);
        Self {
            products,
            categories,
            selected: CategoryFilter::All,
        }
    }

    /// Swap in a freshly fetched product list.
    ///
    /// The selection survives if its category still exists, otherwise it
    /// falls back to [`CategoryFilter::All`].
    pub fn replace(&mut self, products: Vec<Product>) {
        self.categories = categories(&products);
        self.products = products;
        if !self.categories.contains(&self.selected) {
            self.selected = CategoryFilter::All;
        }
    }

    /// Select a category. Returns `false` and keeps the selection if it is
    /// not one of [`Self::categories`].
    pub fn select(&mut self, filter: &CategoryFilter) -> bool {
        if self.categories.contains(filter) {
            self.selected = filter.clone();
            true
        } else {
            false
        }
    }

    #[must_use]
    pub const fn selected(&self) -> &CategoryFilter {
        &self.selected
    }

    #[must_use]
    pub fn categories(&self) -> &[CategoryFilter] {
        &self.categories
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Products shown for the current selection.
    #[must_use]
    pub fn visible(&self) -> Vec<&Product> {
        filter_by_category(&self.products, &self.selected)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
