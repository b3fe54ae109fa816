use crate::crypto::CryptoAlgorithm;

/// Settings of a [`DidCommService`](crate::DidCommService).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DidCommConfig {
    /// Content encryption used for every packed envelope.
    pub content_encryption: CryptoAlgorithm,
    /// Send v1 messages of legacy compatible protocols with the `did:sov`
    /// message type prefix.
    pub use_did_sov_prefix_where_allowed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DidCommConfig::default();
        assert_eq!(config.content_encryption, CryptoAlgorithm::XC20P);
        assert!(!config.use_did_sov_prefix_where_allowed);
    }

    #[test]
    fn loads_camel_case() -> Result<(), serde_json::Error> {
        let config: DidCommConfig = serde_json::from_str(
            r#"{ "contentEncryption": "A256GCM", "useDidSovPrefixWhereAllowed": true }"#,
        )?;
        assert_eq!(config.content_encryption, CryptoAlgorithm::A256GCM);
        assert!(config.use_did_sov_prefix_where_allowed);
        let partial: DidCommConfig = serde_json::from_str("{}")?;
        assert_eq!(partial, DidCommConfig::default());
        Ok(())
    }
}
