//! # Repository Layer
//!
//! Repository implementations that encapsulate SeaORM operations for brands,
//! offers, images and users. Every method returns [`RepositoryError`] so
//! handlers can map failures with `?`.
//!
//! [`RepositoryError`]: crate::error::RepositoryError

use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, Condition};

pub mod brand;
pub mod image;
pub mod offer;
pub mod user;

pub use brand::BrandRepository;
pub use image::ImageRepository;
pub use offer::OfferRepository;
pub use user::UserRepository;

/// Validated page coordinates (1-based page).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

/// One page of results plus the total match count.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.limit.max(1))
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Case-insensitive substring match of `term` against any of `columns`.
/// Blank terms match everything.
pub(crate) fn search_condition<C: ColumnTrait>(term: Option<&str>, columns: &[C]) -> Condition {
    let Some(term) = term.map(str::trim).filter(|term| !term.is_empty()) else {
        return Condition::all();
    };

    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    let pattern = format!("%{escaped}%");

    columns.iter().fold(Condition::any(), |condition, column| {
        let lowered: SimpleExpr = Func::lower(Expr::col(column.as_column_ref())).into();
        condition.add(Expr::expr(lowered).like(LikeExpr::new(pattern.clone()).escape('\\')))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        let request = PageRequest { page: 1, limit: 10 };
        assert_eq!(Page::<()>::new(vec![], 0, request).total_pages(), 0);
        assert_eq!(Page::<()>::new(vec![], 10, request).total_pages(), 1);
        assert_eq!(Page::<()>::new(vec![], 11, request).total_pages(), 2);
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(PageRequest { page: 1, limit: 10 }.offset(), 0);
        assert_eq!(PageRequest { page: 3, limit: 25 }.offset(), 50);
    }
}
