//! DynamoDB key generation functions.
//!
//! Pure functions for generating partition and sort keys following the single-table design.
//! Every record of a partner aggregate lives in the partition `PARTNER#<partner_id>`.

use partnerbook_core::partner::normalize_name;
use ulid::Ulid;

// ============================================================================
// Key prefixes
// ============================================================================

pub const PARTNER_PREFIX: &str = "PARTNER#";
pub const SERVICE_PREFIX: &str = "SERVICE#";
pub const STAFFER_PREFIX: &str = "STAFFER#";

// ============================================================================
// Partner keys
// ============================================================================

/// Generate partition key for a Partner.
///
/// Pattern: `PARTNER#<partner_id>`
pub fn partner_pk(partner_id: Ulid) -> String {
    partition_key(&partner_id.to_string())
}

/// Generate sort key for a Partner.
///
/// Pattern: `PARTNER#<partner_id>` (same as PK, the root sorts first in its partition)
pub fn partner_sk(partner_id: Ulid) -> String {
    format!("{PARTNER_PREFIX}{partner_id}")
}

/// Generate the secondary-index sort key used to look a partner up by name.
///
/// Pattern: `PARTNER#<NORMALIZED NAME>`
pub fn partner_gsi_sk(name: &str) -> String {
    format!("{PARTNER_PREFIX}{}", normalize_name(name))
}

/// Partition key for a raw partner id as received from a caller.
///
/// Ids are not parsed here so lookups for malformed ids simply miss.
pub fn partition_key(partner_id: &str) -> String {
    format!("{PARTNER_PREFIX}{partner_id}")
}

// ============================================================================
// Child keys
// ============================================================================

/// Generate partition key for a child record.
///
/// Pattern: `PARTNER#<partner_id>` (the owner's partition)
pub fn child_pk(partner_id: Ulid) -> String {
    partner_pk(partner_id)
}

/// Generate sort key for a Service.
///
/// Pattern: `SERVICE#<service_id>`
pub fn service_sk(service_id: Ulid) -> String {
    format!("{SERVICE_PREFIX}{service_id}")
}

/// Generate sort key for a Staffer.
///
/// Pattern: `STAFFER#<staffer_id>`
pub fn staffer_sk(staffer_id: Ulid) -> String {
    format!("{STAFFER_PREFIX}{staffer_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partner_id() -> Ulid {
        Ulid::from_string("01HZY8K3J6Q9W2X4V5T7R8M0NB").unwrap()
    }

    #[test]
    fn test_partner_keys() {
        let id = partner_id();
        assert_eq!(partner_pk(id), "PARTNER#01HZY8K3J6Q9W2X4V5T7R8M0NB");
        assert_eq!(partner_sk(id), "PARTNER#01HZY8K3J6Q9W2X4V5T7R8M0NB");
    }

    #[test]
    fn test_child_keys_share_owner_partition() {
        let id = partner_id();
        let service_id = Ulid::from_string("01HZY8M0000000000000000001").unwrap();
        let staffer_id = Ulid::from_string("01HZY8M0000000000000000002").unwrap();

        assert_eq!(child_pk(id), partner_pk(id));
        assert_eq!(service_sk(service_id), "SERVICE#01HZY8M0000000000000000001");
        assert_eq!(staffer_sk(staffer_id), "STAFFER#01HZY8M0000000000000000002");
    }

    #[test]
    fn test_raw_partition_key_matches_typed() {
        let id = partner_id();
        assert_eq!(partition_key(&id.to_string()), partner_pk(id));
        assert_eq!(partition_key("nonexistent-id"), "PARTNER#nonexistent-id");
    }

    #[test]
    fn test_distinct_ids_give_distinct_partitions() {
        let a = Ulid::new();
        let b = Ulid::new();
        assert_ne!(a, b);
        assert_ne!(partner_pk(a), partner_pk(b));
        assert_eq!(partner_pk(a), partner_pk(a));
    }

    #[test]
    fn test_partner_gsi_sk_normalizes_name() {
        assert_eq!(partner_gsi_sk("  Acme Salon "), "PARTNER#ACME SALON");
        assert_eq!(partner_gsi_sk("acme salon"), partner_gsi_sk("ACME SALON"));
    }
}
