use std::collections::BTreeSet;

use serde_json::Value;

use super::digest::email_digest;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct MemberPartition {
    pub filtered: Vec<String>,
    pub members_found: usize,
}

/// Splits uploaded addresses into known members and everyone else.
/// Non-string entries are skipped; the rest keep their original spelling.
pub fn partition_members(emails: &[Value], members: &BTreeSet<String>) -> MemberPartition {
    let mut partition = MemberPartition::default();
    for email in emails.iter().filter_map(Value::as_str) {
        if members.contains(&email_digest(email)) {
            partition.members_found += 1;
        } else {
            partition.filtered.push(email.to_string());
        }
    }
    partition
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn blank_address_matches_blank_member() {
        let members: BTreeSet<String> = [email_digest("")].into_iter().collect();
        let partition = partition_members(&[json!("   "), json!("x@example.com")], &members);
        assert_eq!(partition.members_found, 1);
        assert_eq!(partition.filtered, vec!["x@example.com".to_string()]);
    }

    #[test]
    fn known_members_are_removed() {
        let members: BTreeSet<String> = ["alice@example.com"]
            .into_iter()
            .map(email_digest)
            .collect();
        let upload = vec![
            json!(" ALICE@example.com"),
            json!("Bob@Example.com"),
            json!(17),
            json!(""),
            json!("  "),
        ];

        let partition = partition_members(&upload, &members);

        assert_eq!(partition.members_found, 1);
        assert_eq!(
            partition.filtered,
            vec![
                "Bob@Example.com".to_string(),
                String::new(),
                "  ".to_string(),
            ]
        );
    }
}
