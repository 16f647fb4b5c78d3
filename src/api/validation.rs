use super::ApiError;
use crate::constants::limits::MAX_PAGE_SIZE;
use crate::domain::{ItemKind, SearchQuery};

pub fn parse_kind(kind: &str) -> Result<ItemKind, ApiError> {
    ItemKind::from_plural(kind).ok_or_else(|| ApiError::unknown_kind(kind))
}

pub fn validate_item_id(id: &str) -> Result<&str, ApiError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Item ID cannot be empty"));
    }
    Ok(trimmed)
}

pub fn validate_pagination(page: u32, page_size: u32) -> Result<(), ApiError> {
    if page < 1 {
        return Err(ApiError::validation(format!(
            "Invalid page: {page}. Page must be a positive integer"
        )));
    }

    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(ApiError::validation(format!(
            "Invalid page size: {page_size}. Page size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }

    Ok(())
}

pub fn validate_search_query(query: SearchQuery) -> Result<SearchQuery, ApiError> {
    validate_pagination(query.page, query.page_size)?;
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("skins").unwrap(), ItemKind::Skin);
        assert_eq!(parse_kind("keys").unwrap(), ItemKind::Key);
        assert!(matches!(parse_kind("skin"), Err(ApiError::NotFound(_))));
        assert!(matches!(parse_kind("stickers"), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_validate_pagination() {
        assert!(validate_pagination(1, 1).is_ok());
        assert!(validate_pagination(7, 100).is_ok());
        assert!(validate_pagination(0, 20).is_err());
        assert!(validate_pagination(1, 0).is_err());
        assert!(validate_pagination(1, 101).is_err());
    }

    #[test]
    fn test_validate_item_id() {
        assert_eq!(validate_item_id(" skin-1 ").unwrap(), "skin-1");
        assert!(validate_item_id("   ").is_err());
    }
}
