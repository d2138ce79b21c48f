use uuid::Uuid;

/// Generate a fresh opaque record identifier (32 lowercase hex characters)
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Whether `id` has the shape of an identifier this service generates.
///
/// Lookups with malformed ids are answered as not found without touching
/// the store.
pub fn is_valid_id(id: &str) -> bool {
    id.len() == 32 && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
