use crate::model::user_ref::{decode_json_text, record_login};
use crate::model::UserRef;
use itertools::Itertools;
use log::warn;
use serde_json::Value;

/// Logins carried by a raw `assignee` / `assignees` value, in order, without repeats.
///
/// Strings that do not look like JSON are taken as bare logins. Malformed JSON yields no
/// logins and a warning.
pub fn extract_assignees(value: &Value) -> Vec<String> {
    match value {
        Value::Null => vec![],
        Value::Array(items) => items.iter().filter_map(item_login).unique().collect(),
        Value::Object(_) => match record_login(value) {
            Some(UserRef::Login(login)) => vec![login],
            _ => vec![],
        },
        Value::String(text) => match decode_json_text(text) {
            None => non_empty(text.trim()).into_iter().collect(),
            Some(Ok(decoded)) => extract_assignees(&decoded),
            Some(Err(err)) => {
                warn!("⚠️ Could not decode assignee value: {err}");
                vec![]
            }
        },
        other => {
            warn!("⚠️ Unexpected assignee type: {other}");
            vec![]
        }
    }
}

/// Plural field first, then the singular one; first-seen order, no repeats.
pub fn combine_assignees(assignees: &Value, assignee: &Value) -> Vec<String> {
    extract_assignees(assignees)
        .into_iter()
        .chain(extract_assignees(assignee))
        .unique()
        .collect()
}

fn item_login(item: &Value) -> Option<String> {
    match item {
        Value::Object(_) => record_login(item)?.login().map(String::from),
        Value::String(login) => non_empty(login),
        _ => None,
    }
}

fn non_empty(login: &str) -> Option<String> {
    (!login.is_empty()).then(|| login.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn null_is_empty() {
        assert!(extract_assignees(&Value::Null).is_empty());
    }

    #[test]
    fn list_of_records_and_strings() {
        let value = json!([{"login": "ana"}, "bia", {"id": 3}, {"login": ""}, "", "ana"]);
        assert_eq!(extract_assignees(&value), vec!["ana", "bia"]);
    }

    #[test]
    fn single_record() {
        assert_eq!(extract_assignees(&json!({"login": "ana"})), vec!["ana"]);
        assert!(extract_assignees(&json!({"name": "Ana"})).is_empty());
    }

    #[test]
    fn json_text_is_decoded() {
        assert_eq!(
            extract_assignees(&json!(r#"[{"login": "ana"}, {"login": "bia"}]"#)),
            vec!["ana", "bia"]
        );
        assert_eq!(extract_assignees(&json!(r#"{"login": "ana"}"#)), vec!["ana"]);
        assert!(extract_assignees(&json!("[]")).is_empty());
    }

    #[test]
    fn bare_string_is_a_login() {
        assert_eq!(extract_assignees(&json!("u3")), vec!["u3"]);
        assert!(extract_assignees(&json!("   ")).is_empty());
    }

    #[test]
    fn malformed_json_is_empty() {
        assert!(extract_assignees(&json!(r#"[{"login": "ana""#)).is_empty());
        assert!(extract_assignees(&json!("{not json}")).is_empty());
    }

    #[test]
    fn unexpected_types_are_empty() {
        assert!(extract_assignees(&json!(7)).is_empty());
        assert!(extract_assignees(&json!(false)).is_empty());
    }

    #[test]
    fn combine_keeps_plural_order_then_singular() {
        let combined = combine_assignees(
            &json!([{"login": "bia"}, {"login": "ana"}]),
            &json!({"login": "caio"}),
        );
        assert_eq!(combined, vec!["bia", "ana", "caio"]);
    }

    #[test]
    fn combine_deduplicates_overlap() {
        let combined = combine_assignees(&json!([{"login": "u4"}]), &json!({"login": "u4"}));
        assert_eq!(combined, vec!["u4"]);
    }

    fn reference(login: String, shape: u8) -> Value {
        match shape {
            0 => json!({ "login": login }),
            _ => json!(login),
        }
    }

    proptest! {
        #[test]
        fn combined_list_has_no_duplicates(
            plural in proptest::collection::vec(("[a-d]", 0..2u8), 0..6),
            singular in proptest::option::of("[a-d]"),
        ) {
            let plural = Value::Array(
                plural.into_iter().map(|(login, shape)| reference(login, shape)).collect()
            );
            let singular = singular.map(|login| json!({ "login": login })).unwrap_or(Value::Null);
            let combined = combine_assignees(&plural, &singular);
            prop_assert_eq!(combined.iter().unique().count(), combined.len());
        }
    }
}
