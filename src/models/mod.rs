//! # Data Models
//!
//! This module contains all the data models used throughout the Brand Directory.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod brand;
pub mod image;
pub mod offer;
pub mod user;

pub use brand::Entity as Brand;
pub use image::Entity as Image;
pub use offer::Entity as Offer;
pub use user::Entity as User;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "brand-directory".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
