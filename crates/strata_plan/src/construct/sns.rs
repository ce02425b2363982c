//! Notification topics and their subscriptions.

use crate::assembly::AssemblyError;
use crate::config::AssemblyConfig;
use crate::handle::{KeyHandle, Subscription, SubscriptionHandle, Topic, TopicHandle};
use crate::naming;
use crate::resource::{Protocol, Resource, SubscriptionProps, TopicProps};
use crate::scope::DeploymentScope;
use strata_policy::{PolicyStatement, grants};

/// Declare the notification topic, encrypted with `key`
///
/// # Errors
///
/// Returns a composition error if `key` is not live in `scope`
pub fn create_topic(
    scope: &mut DeploymentScope,
    config: &AssemblyConfig,
    key: &KeyHandle,
) -> Result<TopicHandle, AssemblyError> {
    let id = naming::topic_id(&config.app_name)?;
    super::require(scope, key, id.as_str())?;

    let resource = Resource::Topic(TopicProps {
        display_name: naming::topic_display_name(&config.source_id_short),
        master_key: key.arn(),
    });
    Ok(scope.declare::<Topic>(id, resource)?)
}

/// Subscribe the configured e-mail address to `topic`
///
/// # Errors
///
/// Returns a composition error if `topic` is not live in `scope`
pub fn subscribe_email(
    scope: &mut DeploymentScope,
    config: &AssemblyConfig,
    topic: &TopicHandle,
) -> Result<SubscriptionHandle, AssemblyError> {
    let id = naming::subscription_id(&config.app_name)?;
    super::require(scope, topic, id.as_str())?;

    let resource = Resource::Subscription(SubscriptionProps {
        topic: topic.arn(),
        protocol: Protocol::Email,
        endpoint: config.email.clone(),
    });
    Ok(scope.declare::<Subscription>(id, resource)?)
}

/// Statement allowing publication on `topic`
#[must_use]
pub fn publish_statement(topic: &TopicHandle) -> PolicyStatement {
    grants::topic_publish(topic.arn())
}
