const PREFIX: &str = "refdata";

/// Returns the cache key for a reference-data type.
pub fn reference_data_key(type_name: &str) -> String {
    format!("{}:{}", PREFIX, type_name)
}

/// Returns the cache key for a reference-data type within a tenant.
pub fn tenant_reference_data_key(tenant: &str, type_name: &str) -> String {
    format!("{}:{}:{}", PREFIX, tenant, type_name)
}

/// Returns the pattern matching every cache key of a tenant.
pub fn tenant_pattern(tenant: &str) -> String {
    format!("{}:{}:*", PREFIX, tenant)
}

/// Extracts the type name from a cache key, if it is a reference-data key.
///
/// # Examples
///
/// ```
/// use refdata_core::cache::extract_type_name;
///
/// assert_eq!(extract_type_name("refdata:Country"), Some("Country"));
/// assert_eq!(extract_type_name("refdata:acme:Country"), Some("Country"));
/// assert_eq!(extract_type_name("user:123"), None);
/// ```
pub fn extract_type_name(key: &str) -> Option<&str> {
    let rest = key.strip_prefix(PREFIX)?.strip_prefix(':')?;
    rest.rsplit(':').next().filter(|name| !name.is_empty())
}
