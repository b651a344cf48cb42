use std::collections::BTreeMap;

use md5::{Digest, Md5};

/// Name of the parameter carrying the request signature.
pub const SIGNATURE_PARAM: &str = "signature";

/// Compute the API signature for a set of request parameters.
///
/// The signature is the lowercase hex MD5 of the secret followed by each
/// parameter as `name` + `value`, ordered by name. File parts are not
/// parameters and never take part in signing.
pub fn sign(secret: &str, params: &BTreeMap<String, String>) -> String {
    let mut hasher = Md5::new();
    hasher.update(secret.as_bytes());
    for (name, value) in params {
        if name == SIGNATURE_PARAM {
            continue;
        }
        hasher.update(name.as_bytes());
        hasher.update(value.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Request parameters with their signature attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedParams(BTreeMap<String, String>);

impl SignedParams {
    pub fn new(secret: &str, mut params: BTreeMap<String, String>) -> Self {
        let signature = sign(secret, &params);
        params.insert(SIGNATURE_PARAM.to_owned(), signature);
        Self(params)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

impl IntoIterator for SignedParams {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn signs_sorted_name_value_pairs() {
        let listing = params(&[
            ("format", "xml"),
            ("apiKey", "test-key"),
            ("action", "issuu.documents.list"),
        ]);
        assert_eq!(
            sign("test-secret", &listing),
            "5674e8d8bb02c5396d8e87434d7fc75a"
        );
    }

    #[test]
    fn signature_covers_operation_parameters() {
        let delete = params(&[
            ("action", "issuu.document.delete"),
            ("apiKey", "key"),
            ("format", "xml"),
            ("names", "doc"),
        ]);
        assert_eq!(sign("secret", &delete), "1fe992401ba7d8e1a34e02c2486ca6c8");
    }

    #[test]
    fn signed_params_carry_signature() {
        let signed = SignedParams::new("secret", params(&[("apiKey", "key")]));
        assert_eq!(signed.get("apiKey"), Some("key"));
        assert_eq!(signed.get(SIGNATURE_PARAM).map(str::len), Some(32));
    }

    #[test]
    fn existing_signature_is_not_signed() {
        let mut unsigned = params(&[("apiKey", "key")]);
        let expected = sign("secret", &unsigned);
        unsigned.insert(SIGNATURE_PARAM.to_owned(), "stale".to_owned());
        assert_eq!(sign("secret", &unsigned), expected);
    }
}
