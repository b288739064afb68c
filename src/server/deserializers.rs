use serde::{Deserialize, Deserializer};

// the frontend builds category ids from object keys, so ids arrive both as JSON numbers
// and as numeric strings
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    String(String),
}

impl NumberOrString {
    fn into_i64(self) -> Result<i64, String> {
        match self {
            NumberOrString::Number(v) => Ok(v),
            NumberOrString::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("Wrong value {s}, can not parse to i64")),
        }
    }
}

pub fn deserialize_ids<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<NumberOrString>>::deserialize(deserializer)?;
    values
        .unwrap_or_default()
        .into_iter()
        .map(|v| v.into_i64().map_err(serde::de::Error::custom))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Ids {
        #[serde(default, deserialize_with = "deserialize_ids")]
        ids: Vec<i64>,
    }

    #[test]
    fn accepts_numbers_strings_and_null() {
        let ids: Ids = serde_json::from_str(r#"{"ids": [1, "2", " 3 "]}"#).unwrap();
        assert_eq!(ids.ids, [1, 2, 3]);
        let ids: Ids = serde_json::from_str(r#"{"ids": null}"#).unwrap();
        assert!(ids.ids.is_empty());
        let ids: Ids = serde_json::from_str("{}").unwrap();
        assert!(ids.ids.is_empty());
        assert!(serde_json::from_str::<Ids>(r#"{"ids": ["x"]}"#).is_err());
    }
}
