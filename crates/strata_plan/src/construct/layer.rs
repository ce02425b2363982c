//! Packaging layers.

use crate::assembly::AssemblyError;
use crate::config::{AssemblyConfig, ResolvedLayer};
use crate::handle::{Layer, LayerHandle};
use crate::naming;
use crate::resource::{AssetCode, LayerProps, Resource};
use crate::scope::DeploymentScope;

/// Declare a layer version from a resolved layer declaration
///
/// # Errors
///
/// Returns error if the layer's ID is already taken in `scope`
pub fn create_layer(
    scope: &mut DeploymentScope,
    config: &AssemblyConfig,
    layer: &ResolvedLayer,
) -> Result<LayerHandle, AssemblyError> {
    let id = naming::layer_id(&config.app_name_short, &layer.name)?;
    let resource = Resource::Layer(LayerProps {
        layer_name: format!("{}-{}", config.app_name, layer.name),
        code: AssetCode::new(layer.location.clone()),
        compatible_runtimes: layer.runtimes.clone(),
    });
    Ok(scope.declare::<Layer>(id, resource)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Runtime;
    use crate::test_support::config;

    fn common() -> ResolvedLayer {
        ResolvedLayer {
            name: "common".to_string(),
            location: "layers/common".to_string(),
            runtimes: vec![Runtime::Python312],
        }
    }

    #[test]
    fn test_create_layer() {
        let mut scope = DeploymentScope::new("s");
        let layer = create_layer(&mut scope, &config(), &common()).unwrap();
        assert_eq!(layer.id().as_str(), "pm-common-Id");
        match scope.get(&layer) {
            Some(Resource::Layer(props)) => {
                assert_eq!(props.layer_name, "pm-app-common");
                assert_eq!(props.code, AssetCode::new("layers/common"));
                assert_eq!(props.compatible_runtimes, vec![Runtime::Python312]);
            }
            other => panic!("expected layer, got {:?}", other),
        }
        assert!(scope.dag().dependencies(layer.id()).is_empty());
    }

    #[test]
    fn test_create_layer_twice_rejected() {
        let mut scope = DeploymentScope::new("s");
        create_layer(&mut scope, &config(), &common()).unwrap();
        assert!(create_layer(&mut scope, &config(), &common()).is_err());
    }
}
