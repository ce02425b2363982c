//! Shared fixtures for unit tests.

use crate::config::{
    AssemblyConfig, ConfigBundle, KEY_APP_NAME, KEY_APP_NAME_SHORT, KEY_EMAIL, KEY_SOURCE_ID_SHORT,
    KEY_STORAGE_ARN,
};

pub(crate) fn bundle() -> ConfigBundle {
    ConfigBundle::new()
        .with(KEY_APP_NAME_SHORT, "pm")
        .with(KEY_APP_NAME, "pm-app")
        .with(KEY_SOURCE_ID_SHORT, "PM")
        .with(KEY_EMAIL, "a@x.com")
        .with(KEY_STORAGE_ARN, "arn:aws:s3:::bucket")
}

pub(crate) fn config() -> AssemblyConfig {
    AssemblyConfig::from_bundle(&bundle()).unwrap()
}
