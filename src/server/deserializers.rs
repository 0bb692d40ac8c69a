use serde::{Deserialize, Deserializer};

// pair with #[serde(default)]: a missing key stays None, while an explicit null
// becomes Some(None)
pub fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Body {
        #[serde(default, deserialize_with = "deserialize_present")]
        term: Option<Option<String>>,
    }

    fn term(json: &str) -> Option<Option<String>> {
        serde_json::from_str::<Body>(json).unwrap().term
    }

    #[test]
    fn distinguishes_missing_null_and_value() {
        assert_eq!(term("{}"), None);
        assert_eq!(term(r#"{"term": null}"#), Some(None));
        assert_eq!(term(r#"{"term": "x"}"#), Some(Some("x".to_owned())));
    }
}
