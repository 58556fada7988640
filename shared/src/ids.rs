//! Opaque record identifiers

use uuid::Uuid;

pub const PRODUCT_PREFIX: &str = "prd";
pub const VARIANT_PREFIX: &str = "var";
pub const SUPPLIER_PREFIX: &str = "sup";
pub const TAX_PREFIX: &str = "tax";
pub const CATEGORY_PREFIX: &str = "cat";
pub const MOVEMENT_PREFIX: &str = "mov";
pub const SUPPLIER_PRICE_PREFIX: &str = "spr";
pub const PRICE_HISTORY_PREFIX: &str = "prh";
pub const EXCLUSION_PREFIX: &str = "exc";
pub const TRANSFER_PREFIX: &str = "transfer";

/// Generate a unique id, `<prefix>_<uuid>` when a prefix is given
pub fn generate_id(prefix: Option<&str>) -> String {
    let uuid = Uuid::new_v4();
    match prefix {
        Some(prefix) => format!("{}_{}", prefix, uuid),
        None => uuid.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_prefix() {
        let id = generate_id(Some(MOVEMENT_PREFIX));
        assert!(id.starts_with("mov_"));
        assert_eq!(id.len(), 4 + 36);
        assert_eq!(generate_id(None).len(), 36);
    }

    #[test]
    fn test_generate_id_unique() {
        assert_ne!(generate_id(Some(PRODUCT_PREFIX)), generate_id(Some(PRODUCT_PREFIX)));
    }
}
