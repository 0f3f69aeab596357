use std::collections::HashMap;

/// Built-in service colors, followed by the fallback palette for services
/// that are not listed.
static DEFAULT_COLORS: &[(&str, &str)] = &[
    ("Amazon Elastic Compute Cloud - Compute", "#ff9900"),
    ("EC2 - Other", "#ffb84d"),
    ("Amazon Simple Storage Service", "#3f8624"),
    ("Amazon Relational Database Service", "#2e73b8"),
    ("Amazon DynamoDB", "#4d27aa"),
    ("Amazon CloudFront", "#8c4fff"),
    ("AWS Lambda", "#e7157b"),
    ("Amazon Elastic Container Service", "#d45b07"),
    ("Amazon Elastic Container Service for Kubernetes", "#c7511f"),
    ("Amazon ElastiCache", "#c925d1"),
    ("Amazon Elastic Load Balancing", "#7aa116"),
    ("Amazon Virtual Private Cloud", "#248814"),
    ("Amazon Route 53", "#8c6239"),
    ("AmazonCloudWatch", "#e83e8c"),
    ("Amazon Simple Queue Service", "#b0084d"),
    ("Amazon Simple Notification Service", "#dd344c"),
    ("AWS Key Management Service", "#bf0816"),
    ("AWS Secrets Manager", "#dd6b10"),
    ("Amazon OpenSearch Service", "#005eb8"),
    ("Amazon Kinesis", "#6b3a96"),
    ("AWS Glue", "#01a88d"),
    ("Amazon Athena", "#1b660f"),
    ("AWS Cost Explorer", "#545b64"),
    ("MongoDB Atlas (pay-as-you-go)", "#13aa52"),
    ("New Service 1", "#1f77b4"),
    ("New Service 2", "#aec7e8"),
    ("New Service 3", "#ff7f0e"),
    ("New Service 4", "#ffbb78"),
    ("New Service 5", "#2ca02c"),
    ("New Service 6", "#98df8a"),
    ("New Service 7", "#d62728"),
    ("New Service 8", "#ff9896"),
    ("New Service 9", "#9467bd"),
    ("New Service 10", "#c5b0d5"),
    ("New Service 11", "#8c564b"),
    ("New Service 12", "#c49c94"),
];

/// Label of the n-th (1-based) fallback color slot.
pub fn fallback_token(n: usize) -> String {
    format!("New Service {}", n)
}

/// Immutable service → color lookup handed to the dataset builder.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTable {
    colors: HashMap<String, String>,
}

impl ColorTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            colors: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// The built-in table, with `overrides` replacing or adding entries.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut table = Self::default();
        table.colors.extend(
            overrides
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        table
    }

    pub fn get(&self, service: &str) -> Option<&str> {
        self.colors.get(service).map(String::as_str)
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::new(DEFAULT_COLORS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_knows_canonical_mongodb_name() {
        let table = ColorTable::default();
        assert!(table.get("MongoDB Atlas (pay-as-you-go)").is_some());
        assert!(table.get("MongoDB Atlas (Pay as You Go)").is_none());
    }

    #[test]
    fn default_table_has_fallback_slots() {
        let table = ColorTable::default();
        for n in 1..=12 {
            assert!(table.get(&fallback_token(n)).is_some(), "slot {} missing", n);
        }
        assert!(table.get(&fallback_token(13)).is_none());
    }

    #[test]
    fn fallback_token_format() {
        assert_eq!(fallback_token(1), "New Service 1");
        assert_eq!(fallback_token(42), "New Service 42");
    }

    #[test]
    fn overrides_replace_and_extend() {
        let mut overrides = HashMap::new();
        overrides.insert("AWS Lambda".to_string(), "#000000".to_string());
        overrides.insert("Snowflake".to_string(), "#29b5e8".to_string());
        let table = ColorTable::with_overrides(&overrides);
        assert_eq!(table.get("AWS Lambda"), Some("#000000"));
        assert_eq!(table.get("Snowflake"), Some("#29b5e8"));
        assert!(table.get("Amazon Simple Storage Service").is_some());
    }

    #[test]
    fn custom_table_is_isolated_from_defaults() {
        let table = ColorTable::new([("EC2", "red")]);
        assert_eq!(table.get("EC2"), Some("red"));
        assert!(table.get("AWS Lambda").is_none());
        assert!(table.get(&fallback_token(1)).is_none());
    }
}
