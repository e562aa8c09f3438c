use thiserror::Error;

/// Error types for the compute module
#[derive(Error, Debug)]
pub enum ComputeError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A cart line was given a quantity below one
    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: i32, quantity: i64 },

    /// The requested size or color is not offered for the product
    #[error("Product {product_id} is not available in {kind} '{value}'")]
    UnavailableOption {
        product_id: i32,
        kind: &'static str,
        value: String,
    },

    /// Unknown catalog sort key
    #[error("Unknown sort order: {0}")]
    UnknownSortOrder(String),

    /// Error while producing the invoice document
    #[error("PDF rendering error: {0}")]
    Pdf(String),
}

impl ComputeError {
    /// True for errors caused by caller input rather than by the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ComputeError::InvalidQuantity { .. }
                | ComputeError::UnavailableOption { .. }
                | ComputeError::UnknownSortOrder(_)
        )
    }
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
