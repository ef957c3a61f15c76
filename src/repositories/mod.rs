//! # Repository Layer
//!
//! SeaORM data access for listings, images, leads and admin users.

pub mod lead;
pub mod property;
pub mod property_image;
pub mod user;

pub use lead::{LeadListQuery, LeadRepository, LeadWithProperty, NewLead};
pub use property::PropertyRepository;
pub use property_image::PropertyImageRepository;
pub use user::UserRepository;

/// Escapes `%` and `_` and wraps `term` for a case-insensitive contains match.
pub(crate) fn contains_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// `LOWER(table.column) LIKE '%term%'` with the escaped pattern above.
pub(crate) fn lower_contains<C: sea_orm::ColumnTrait>(
    column: C,
    term: &str,
) -> sea_orm::sea_query::SimpleExpr {
    use sea_orm::sea_query::{Expr, Func, LikeExpr};

    Expr::expr(Func::lower(Expr::col((column.entity_name(), column))))
        .like(LikeExpr::new(contains_pattern(term)).escape('\\'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Moema"), "%moema%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }
}
