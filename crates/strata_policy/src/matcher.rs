//! Wildcard matching for actions and resources.
//!
//! `*` matches any run of characters and `?` exactly one. Action names are
//! matched case-insensitively, resources case-sensitively.

use regex::{Regex, RegexBuilder};
use strata_core::Reference;

/// Pattern matcher
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher;

impl Matcher {
    /// Create a new matcher
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Match an action pattern such as `kms:Get*` against an action
    #[must_use]
    pub fn match_action(&self, pattern: &str, action: &str) -> bool {
        glob(pattern, false).is_some_and(|re| re.is_match(action))
    }

    /// Match a resource pattern against a resource reference
    ///
    /// Declared-resource references compare through their rendered form, so
    /// `${key.Arn}/*` covers `${key.Arn}/object` but never another key.
    #[must_use]
    pub fn match_resource(&self, pattern: &Reference, resource: &Reference) -> bool {
        if pattern == resource {
            return true;
        }
        glob(&pattern.to_string(), true).is_some_and(|re| re.is_match(&resource.to_string()))
    }

    /// Match against any of several patterns
    #[must_use]
    pub fn match_any_action<'a>(
        &self,
        patterns: impl IntoIterator<Item = &'a str>,
        action: &str,
    ) -> bool {
        patterns.into_iter().any(|p| self.match_action(p, action))
    }
}

fn glob(pattern: &str, case_sensitive: bool) -> Option<Regex> {
    let mut source = String::with_capacity(pattern.len() + 8);
    source.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            other => source.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
        }
    }
    source.push('$');
    RegexBuilder::new(&source)
        .case_insensitive(!case_sensitive)
        .build()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use strata_core::LogicalId;

    #[test]
    fn test_match_action_exact() {
        let m = Matcher::new();
        assert!(m.match_action("sns:Publish", "sns:Publish"));
        assert!(!m.match_action("sns:Publish", "sns:Subscribe"));
    }

    #[test]
    fn test_match_action_wildcard() {
        let m = Matcher::new();
        assert!(m.match_action("kms:Get*", "kms:GetKeyPolicy"));
        assert!(m.match_action("kms:ReEncrypt*", "kms:ReEncryptFrom"));
        assert!(!m.match_action("kms:Get*", "kms:PutKeyPolicy"));
        assert!(m.match_action("*", "s3:GetObject"));
    }

    #[test]
    fn test_match_action_case_insensitive() {
        let m = Matcher::new();
        assert!(m.match_action("KMS:encrypt", "kms:Encrypt"));
    }

    #[test]
    fn test_match_action_question_mark() {
        let m = Matcher::new();
        assert!(m.match_action("s3:?etObject", "s3:GetObject"));
        assert!(!m.match_action("s3:?etObject", "s3:GGetObject"));
    }

    #[test]
    fn test_match_resource_all() {
        let m = Matcher::new();
        let key = Reference::arn_of(LogicalId::new("key").unwrap());
        assert!(m.match_resource(&Reference::literal("*"), &key));
    }

    #[test]
    fn test_match_resource_suffix() {
        let m = Matcher::new();
        let bucket = Reference::literal("arn:aws:s3:::bucket");
        let objects = bucket.clone().with_suffix("/*");
        assert!(m.match_resource(&objects, &Reference::literal("arn:aws:s3:::bucket/a.txt")));
        assert!(!m.match_resource(&objects, &Reference::literal("arn:aws:s3:::other/a.txt")));
        assert!(m.match_resource(&bucket, &bucket));
    }

    #[test]
    fn test_match_resource_distinct_declared() {
        let m = Matcher::new();
        let a = Reference::arn_of(LogicalId::new("a").unwrap());
        let b = Reference::arn_of(LogicalId::new("b").unwrap());
        assert!(!m.match_resource(&a, &b));
    }

    #[test]
    fn test_match_any_action() {
        let m = Matcher::new();
        assert!(m.match_any_action(["sns:Publish", "kms:*"], "kms:Decrypt"));
        assert!(!m.match_any_action(["sns:Publish"], "kms:Decrypt"));
    }

    proptest! {
        #[test]
        fn prop_literal_actions_match_themselves(s in "[a-z0-9]{1,8}:[A-Za-z0-9]{1,16}") {
            prop_assert!(Matcher::new().match_action(&s, &s));
        }

        #[test]
        fn prop_service_wildcard_covers_service(action in "[A-Za-z]{1,16}") {
            let full = format!("sns:{}", action);
            prop_assert!(Matcher::new().match_action("sns:*", &full));
            prop_assert!(!Matcher::new().match_action("kms:*", &full));
        }
    }
}
