//! End-to-end assembly of a small stack, checked through the public API.

use serde_json::{Value, json};
use strata_core::Reference;
use strata_plan::resource::Resource;
use strata_plan::{
    AssemblyError, ConfigBundle, DeploymentScope, LayerSpec, Runtime, Validator, assemble,
    synthesize,
};
use strata_policy::grants::{
    KEY_ADMIN_ACTIONS, KEY_ENCRYPT_DECRYPT_ACTIONS, OBJECT_ACCESS_ACTIONS,
};

const CONFIG: &str = r#"{
    "global": {
        "appNameShort": "pm",
        "app-name": "pm-app",
        "source-id-short": "PM",
        "email": "ops@example.com",
        "storage-arn": "arn:aws:s3:::pm-reservoir",
        "common_location": "layers/common",
        "pandas_location": "layers/pandas"
    },
    "layers": [
        { "name": "common", "runtimes": ["python3.12"] },
        { "name": "pandas", "runtimes": ["python3.11", "python3.12"] }
    ]
}"#;

fn bundle() -> ConfigBundle {
    ConfigBundle::from_json_str(CONFIG).unwrap()
}

fn strings(value: &Value) -> Vec<&str> {
    match value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

#[test]
fn assembles_named_resources() {
    let mut scope = DeploymentScope::new("pm-app-stack");
    let out = assemble(&mut scope, &bundle()).unwrap();

    assert_eq!(out.key.id().as_str(), "pm-kms-key-id");
    assert_eq!(out.topic.id().as_str(), "pm-app-sns-topic");
    assert_eq!(out.subscription.id().as_str(), "pm-app-sns-topic-email-subscription");
    assert_eq!(out.role.id().as_str(), "pm-mainStack-role-id");
    assert_eq!(out.policy.id().as_str(), "pm-app-mainStack-policy-id");
    assert_eq!(
        out.layers.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["common", "pandas"]
    );
    assert_eq!(out.layers["pandas"].id().as_str(), "pm-pandas-Id");

    let Some(Resource::Role(role)) = scope.get(&out.role) else {
        panic!("role missing");
    };
    assert_eq!(role.role_name, "pmmainStack-role");

    let Some(Resource::ManagedPolicy(policy)) = scope.get(&out.policy) else {
        panic!("policy missing");
    };
    assert_eq!(policy.policy_name, "pm-app-mainStack-policy");
    assert_eq!(policy.roles, vec![out.role.reference()]);

    let Some(Resource::Layer(layer)) = scope.get(&out.layers["pandas"]) else {
        panic!("layer missing");
    };
    assert_eq!(layer.layer_name, "pm-app-pandas");
    assert_eq!(layer.compatible_runtimes, vec![Runtime::Python311, Runtime::Python312]);

    assert!(Validator::new().validate(&scope).is_ok());
}

#[test]
fn role_policy_grants_reference_this_stack() {
    let mut scope = DeploymentScope::new("pm-app-stack");
    let out = assemble(&mut scope, &bundle()).unwrap();
    let Some(Resource::ManagedPolicy(policy)) = scope.get(&out.policy) else {
        panic!("policy missing");
    };
    let doc = &policy.document;

    for action in KEY_ENCRYPT_DECRYPT_ACTIONS {
        assert!(doc.allows(action, &out.key.arn()), "{action} on key");
    }
    for action in OBJECT_ACCESS_ACTIONS {
        assert!(doc.allows(action, &Reference::literal("arn:aws:s3:::pm-reservoir")));
        assert!(doc.allows(action, &Reference::literal("arn:aws:s3:::pm-reservoir/raw/file.csv")));
    }
    assert!(doc.allows("sns:Publish", &out.topic.arn()));
    assert!(!doc.allows("sns:Publish", &Reference::literal("arn:aws:sns:us-east-1:1:other")));
    assert!(!doc.allows("s3:GetObject", &Reference::literal("arn:aws:s3:::elsewhere")));
}

#[test]
fn key_policy_in_manifest() {
    let mut scope = DeploymentScope::new("pm-app-stack");
    assemble(&mut scope, &bundle()).unwrap();
    let manifest = synthesize(&scope).unwrap();

    let key = &manifest.resources["pm-kms-key-id"];
    assert_eq!(key.type_name, "AWS::KMS::Key");
    assert_eq!(key.properties["EnableKeyRotation"], true);
    assert_eq!(key.properties["Description"], "pm-app encryption key");

    let statement = &key.properties["KeyPolicy"]["Statement"][0];
    assert_eq!(statement["Effect"], "Allow");
    assert_eq!(strings(&statement["Action"]), KEY_ADMIN_ACTIONS.to_vec());
    assert_eq!(statement["Resource"], "*");
    assert_eq!(statement["Principal"]["Service"], "s3.amazonaws.com");
    assert_eq!(
        statement["Principal"]["AWS"],
        json!({
            "Fn::Join": ["", [
                "arn:",
                { "Ref": "AWS::Partition" },
                ":iam::",
                { "Ref": "AWS::AccountId" },
                ":root"
            ]]
        })
    );

    let subscription = &manifest.resources["pm-app-sns-topic-email-subscription"];
    assert_eq!(subscription.properties["Endpoint"], "ops@example.com");
    assert_eq!(subscription.properties["Protocol"], "email");
}

#[test]
fn creation_order_satisfies_dependencies() {
    let mut scope = DeploymentScope::new("pm-app-stack");
    assemble(&mut scope, &bundle()).unwrap();
    let manifest = synthesize(&scope).unwrap();

    let order: Vec<&str> = manifest.order().collect();
    for (position, id) in order.iter().enumerate() {
        for dep in &manifest.resources[*id].depends_on {
            let at = order.iter().position(|o| o == dep).unwrap();
            assert!(at < position, "{id} created before {dep}");
        }
    }
    assert_eq!(order.len(), 7);
}

#[test]
fn repeated_runs_are_identical() {
    let synth = || {
        let mut scope = DeploymentScope::new("pm-app-stack").with_environment("dev");
        assemble(&mut scope, &bundle()).unwrap();
        synthesize(&scope).unwrap()
    };
    let first = synth();
    let second = synth();
    assert_eq!(first, second);
    assert_eq!(first.digest, second.digest);
    assert!(first.verify());
}

#[test]
fn configuration_change_changes_digest() {
    let digest = |b: &ConfigBundle| {
        let mut scope = DeploymentScope::new("pm-app-stack");
        assemble(&mut scope, b).unwrap();
        synthesize(&scope).unwrap().digest
    };
    let changed = bundle().with("email", "other@example.com");
    assert_ne!(digest(&bundle()), digest(&changed));
}

#[test]
fn missing_layer_location_is_configuration_error() {
    let b = bundle().with_layer(LayerSpec::new("extra", vec![Runtime::Nodejs20]));
    let mut scope = DeploymentScope::new("pm-app-stack");
    let err = assemble(&mut scope, &b).unwrap_err();
    assert!(matches!(err, AssemblyError::Configuration(_)));
    assert!(err.to_string().contains("extra_location"));
    assert!(scope.is_empty());
}
