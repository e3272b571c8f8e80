//! Cluster shard identity: annotation readers, partition ownership and naming

use std::ops::RangeInclusive;

use kube::ResourceExt;

use crate::crd::Cluster;
use crate::{Error, Result};

/// Annotation carrying the numeric cluster shard identifier
pub const CLUSTER_ANNOTATION: &str = "cloud.atomix.io/cluster";

/// Annotation carrying the owning database name
pub const DATABASE_ANNOTATION: &str = "cloud.atomix.io/database";

impl Cluster {
    /// Cluster shard identifier from the `cloud.atomix.io/cluster` annotation
    ///
    /// The identifier is 1-based: shard `n` owns the `n`th block of partitions.
    pub fn cluster_id(&self) -> Result<i32> {
        let raw = self.annotations().get(CLUSTER_ANNOTATION).ok_or_else(|| {
            Error::ConfigError(format!(
                "cluster {} is missing the {} annotation",
                self.name_any(),
                CLUSTER_ANNOTATION
            ))
        })?;

        let id = parse_cluster_id(raw).ok_or_else(|| {
            Error::ConfigError(format!(
                "annotation {}='{}' on cluster {} is not a valid 32-bit integer",
                CLUSTER_ANNOTATION,
                raw,
                self.name_any()
            ))
        })?;

        if id < 1 {
            return Err(Error::ConfigError(format!(
                "annotation {}='{}' on cluster {} must be >= 1",
                CLUSTER_ANNOTATION,
                raw,
                self.name_any()
            )));
        }

        Ok(id)
    }

    /// Database name from the `cloud.atomix.io/database` annotation
    pub fn database(&self) -> Result<String> {
        self.annotations()
            .get(DATABASE_ANNOTATION)
            .filter(|db| !db.is_empty())
            .cloned()
            .ok_or_else(|| {
                Error::ConfigError(format!(
                    "cluster {} is missing the {} annotation",
                    self.name_any(),
                    DATABASE_ANNOTATION
                ))
            })
    }
}

/// Partition ordinals owned by shard `cluster_id` when each shard owns
/// `partitions` partitions: `[partitions * (cluster_id - 1) + 1, partitions * cluster_id]`.
///
/// Ranges for distinct shard ids are disjoint and each holds exactly
/// `partitions` ordinals.
pub fn partition_range(partitions: i32, cluster_id: i32) -> Result<RangeInclusive<i32>> {
    if partitions < 0 {
        return Err(Error::ConfigError(format!(
            "partition count {} must not be negative",
            partitions
        )));
    }
    if cluster_id < 1 {
        return Err(Error::ConfigError(format!(
            "cluster id {} must be >= 1",
            cluster_id
        )));
    }

    let end = partitions.checked_mul(cluster_id).ok_or_else(|| {
        Error::ConfigError(format!(
            "partition range for cluster {} with {} partitions overflows",
            cluster_id, partitions
        ))
    })?;

    Ok(end - partitions + 1..=end)
}

/// Name of the Partition resource for a database ordinal
///
/// Must match the naming used by whatever creates the Partition resources.
pub fn partition_name(database: &str, ordinal: i32) -> String {
    format!("{}-{}", database, ordinal)
}

/// Parse an integer literal the way the annotation writers emit it:
/// optional sign, then a `0x`, `0o`, `0b` or leading `0` (octal) prefix,
/// else decimal. Single `_` separators are allowed between digits and after
/// a base prefix. Values outside `i32` are rejected.
pub fn parse_cluster_id(raw: &str) -> Option<i32> {
    let (negative, unsigned) = match raw.as_bytes().first()? {
        b'-' => (true, &raw[1..]),
        b'+' => (false, &raw[1..]),
        _ => (false, raw),
    };

    if !separators_ok(unsigned) {
        return None;
    }
    let lower: String = unsigned
        .chars()
        .filter(|&c| c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let (radix, digits) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }

    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).ok()
}

/// Every `_` must sit between two digits, or between a base prefix and a digit
fn separators_ok(unsigned: &str) -> bool {
    let bytes = unsigned.as_bytes();
    let prefixed = bytes.len() >= 2
        && bytes[0] == b'0'
        && matches!(bytes[1].to_ascii_lowercase(), b'b' | b'o' | b'x');
    let hex = prefixed && bytes[1].to_ascii_lowercase() == b'x';

    // '^' start, '0' digit or prefix, '_' separator, '!' anything else
    let mut saw = if prefixed { b'0' } else { b'^' };
    for &b in &bytes[if prefixed { 2 } else { 0 }..] {
        if b.is_ascii_digit() || (hex && b.is_ascii_hexdigit()) {
            saw = b'0';
        } else if b == b'_' {
            if saw != b'0' {
                return false;
            }
            saw = b'_';
        } else {
            if saw == b'_' {
                return false;
            }
            saw = b'!';
        }
    }
    saw != b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal() {
        assert_eq!(parse_cluster_id("1"), Some(1));
        assert_eq!(parse_cluster_id("42"), Some(42));
        assert_eq!(parse_cluster_id("+7"), Some(7));
        assert_eq!(parse_cluster_id("-3"), Some(-3));
        assert_eq!(parse_cluster_id("0"), Some(0));
    }

    #[test]
    fn parses_prefixed_literals() {
        assert_eq!(parse_cluster_id("0x1F"), Some(31));
        assert_eq!(parse_cluster_id("0b101"), Some(5));
        assert_eq!(parse_cluster_id("0o17"), Some(15));
        assert_eq!(parse_cluster_id("017"), Some(15));
    }

    #[test]
    fn rejects_malformed() {
        for raw in ["", "-", "abc", "1.5", " 1", "0x", "0x-1", "09", "2147483648"] {
            assert_eq!(parse_cluster_id(raw), None, "'{}' should be rejected", raw);
        }
    }

    #[test]
    fn accepts_digit_separators() {
        assert_eq!(parse_cluster_id("1_0"), Some(10));
        assert_eq!(parse_cluster_id("0x_1F"), Some(31));
        assert_eq!(parse_cluster_id("-1_000"), Some(-1000));
        assert_eq!(parse_cluster_id("0_17"), Some(15));
    }

    #[test]
    fn rejects_misplaced_separators() {
        for raw in ["_1", "1_", "1__0", "0x__1", "-_1", "_"] {
            assert_eq!(parse_cluster_id(raw), None, "'{}' should be rejected", raw);
        }
    }

    #[test]
    fn accepts_i32_bounds() {
        assert_eq!(parse_cluster_id("2147483647"), Some(i32::MAX));
        assert_eq!(parse_cluster_id("-2147483648"), Some(i32::MIN));
    }

    #[test]
    fn second_shard_of_three_owns_four_to_six() {
        let owned: Vec<i32> = partition_range(3, 2).unwrap().collect();
        assert_eq!(owned, vec![4, 5, 6]);
    }

    #[test]
    fn ranges_have_partition_count_elements_and_never_overlap() {
        for partitions in 1..=8 {
            let mut seen = std::collections::BTreeSet::new();
            for cluster_id in 1..=8 {
                let range = partition_range(partitions, cluster_id).unwrap();
                assert_eq!(range.clone().count(), partitions as usize);
                for ordinal in range {
                    assert!(ordinal >= 1);
                    assert!(
                        seen.insert(ordinal),
                        "ordinal {} claimed twice with {} partitions",
                        ordinal,
                        partitions
                    );
                }
            }
        }
    }

    #[test]
    fn zero_partitions_owns_nothing() {
        assert_eq!(partition_range(0, 4).unwrap().count(), 0);
    }

    #[test]
    fn invalid_range_inputs_are_config_errors() {
        assert!(matches!(partition_range(3, 0), Err(Error::ConfigError(_))));
        assert!(matches!(partition_range(-1, 1), Err(Error::ConfigError(_))));
        assert!(matches!(
            partition_range(i32::MAX, 2),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn partition_names_are_database_scoped() {
        assert_eq!(partition_name("raft", 4), "raft-4");
    }
}
