use uuid::Uuid;

/// Generate a collision-resistant string identifier.
///
/// Dashed-hex UUID v4. Uniqueness is probabilistic; there is no check against
/// identifiers already in a store.
pub fn guid() -> String {
    Uuid::new_v4().to_string()
}
