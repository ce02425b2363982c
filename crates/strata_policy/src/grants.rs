//! Grant catalog used when composing stack policies.

use crate::statement::PolicyStatement;
use strata_core::Reference;

/// Actions granted to key administrators in the key's resource policy
pub const KEY_ADMIN_ACTIONS: [&str; 17] = [
    "kms:Create*",
    "kms:Describe*",
    "kms:Enable*",
    "kms:List*",
    "kms:Put*",
    "kms:Update*",
    "kms:Revoke*",
    "kms:Disable*",
    "kms:Get*",
    "kms:Delete*",
    "kms:ScheduleKeyDeletion",
    "kms:CancelKeyDeletion",
    "kms:GenerateDataKey",
    "kms:Decrypt",
    "kms:Encrypt",
    "kms:ReEncrypt*",
    "kms:GenerateDataKey*",
];

/// Service allowed to use the key alongside the account root
pub const KEY_SERVICE_PRINCIPAL: &str = "s3.amazonaws.com";

/// Actions a role needs to encrypt and decrypt with a key
pub const KEY_ENCRYPT_DECRYPT_ACTIONS: [&str; 5] = [
    "kms:Encrypt",
    "kms:Decrypt",
    "kms:ReEncrypt*",
    "kms:GenerateDataKey*",
    "kms:DescribeKey",
];

/// Actions a role needs for object storage access
pub const OBJECT_ACCESS_ACTIONS: [&str; 4] = [
    "s3:GetObject",
    "s3:PutObject",
    "s3:DeleteObject",
    "s3:ListBucket",
];

/// Action to publish on a notification topic
pub const TOPIC_PUBLISH_ACTION: &str = "sns:Publish";

/// Key administration statement: all resources, storage service and account root
#[must_use]
pub fn key_administration() -> PolicyStatement {
    let mut stmt = PolicyStatement::allow().with_actions(KEY_ADMIN_ACTIONS);
    stmt.add_all_resources();
    stmt.add_service_principal(KEY_SERVICE_PRINCIPAL);
    stmt.add_account_root_principal();
    stmt
}

/// Encrypt/decrypt with the referenced key
#[must_use]
pub fn key_encrypt_decrypt(key_arn: Reference) -> PolicyStatement {
    PolicyStatement::allow()
        .with_actions(KEY_ENCRYPT_DECRYPT_ACTIONS)
        .with_resource(key_arn)
}

/// Object access on a storage resource and every object beneath it
#[must_use]
pub fn object_access(storage_arn: Reference) -> PolicyStatement {
    PolicyStatement::allow()
        .with_actions(OBJECT_ACCESS_ACTIONS)
        .with_resource(storage_arn.clone())
        .with_resource(storage_arn.with_suffix("/*"))
}

/// Publish on the referenced topic
#[must_use]
pub fn topic_publish(topic_arn: Reference) -> PolicyStatement {
    PolicyStatement::allow()
        .with_actions([TOPIC_PUBLISH_ACTION])
        .with_resource(topic_arn)
}
