#[cfg(test)]
mod tests {
    use super::super::*;
    use std::fs;
    use tempfile::tempdir;

    const APP: &str = r#"
source = ".."

[[stacks]]
name = "Lambda1Stack"
function_id = "Lambda1"
package_name = "demo-lambda1"
handler = "demo_lambda1.lambda_function.lambda_handler"

[[stacks]]
name = "Lambda2Stack"
function_id = "Lambda2"
package_name = "demo-lambda2"
architecture = "x86_64"
runtime = "python3.11"
bundling_image = "ghcr.io/astral-sh/uv:0.5.13-python3.11-bookworm-slim@sha256:dc0c"

[[stacks]]
name = "DockerLambda1Stack"
function_id = "DockerLambda1"
package_name = "demo-lambda1"
kind = "image"
dockerfile = "Dockerfile"
"#;

    #[test]
    fn test_load_app() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("uvlambda.toml");
        fs::write(&path, APP).unwrap();

        let app = AppDefinition::load(&path).unwrap();
        assert_eq!(app.source, dir.path().join(".."));
        assert_eq!(app.stacks.len(), 3);
        assert_eq!(app.stacks[0].kind, FunctionKind::Zip);
        assert_eq!(app.stacks[2].kind, FunctionKind::Image);
        assert_eq!(
            app.stacks[2].dockerfile,
            Some(dir.path().join("Dockerfile"))
        );

        let props = app.stacks[1].props(&app.source).unwrap();
        assert_eq!(props.architecture, Some(Architecture::X86_64));
        assert_eq!(props.runtime, Some(Runtime::parse("python3.11").unwrap()));
        assert!(props.bundling_image.is_some());
        assert_eq!(props.path, app.source);
    }

    #[test]
    fn test_unknown_architecture_is_tagged_with_package() {
        let stack = StackDefinition {
            name: "S".to_string(),
            function_id: "F".to_string(),
            package_name: "demo-lambda1".to_string(),
            handler: None,
            runtime: None,
            architecture: Some("ppc64le".to_string()),
            bundling_image: None,
            kind: FunctionKind::Zip,
            dockerfile: None,
        };
        let err = stack.props(Path::new(".")).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownArchitecture {
                package: "demo-lambda1".to_string(),
                key: "ppc64le".to_string(),
            }
        );
        assert!(err.to_string().starts_with("[demo-lambda1]"));
    }

    #[test]
    fn test_duplicate_stack_names_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("uvlambda.toml");
        fs::write(
            &path,
            r#"
[[stacks]]
name = "A"
function_id = "F1"
package_name = "p1"

[[stacks]]
name = "A"
function_id = "F2"
package_name = "p2"
"#,
        )
        .unwrap();

        let err = AppDefinition::load(&path).unwrap_err();
        assert!(err.to_string().contains("Duplicate stack name"));
    }

    #[test]
    fn test_image_stack_requires_dockerfile() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("uvlambda.toml");
        fs::write(
            &path,
            r#"
[[stacks]]
name = "A"
function_id = "F1"
package_name = "p1"
kind = "image"
"#,
        )
        .unwrap();

        let err = AppDefinition::load(&path).unwrap_err();
        assert!(err.to_string().contains("no dockerfile"));
    }

    #[test]
    fn test_stack_outputs() {
        let app: AppDefinition = toml::from_str(APP).unwrap();
        let stack = &app.stacks[0];
        let manifest = StackManifest::new(
            stack,
            FunctionManifest::Zip {
                handler: "h".to_string(),
                runtime: "python3.11".to_string(),
                architecture: "x86_64".to_string(),
                asset: StagedAsset {
                    package_name: "demo-lambda1".to_string(),
                    hash: "abc".to_string(),
                    path: PathBuf::from("cdk.out/asset.abc"),
                    bundled_locally: true,
                },
                zip_path: PathBuf::from("cdk.out/asset.abc.zip"),
            },
        );

        assert_eq!(manifest.outputs["LambdaFunctionUrl"], "${Lambda1.FunctionUrl}");
        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["function"]["type"], "zip");
        assert_eq!(json["function"]["asset"]["hash"], "abc");
    }

    #[test]
    fn test_demo_app_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/uvlambda.toml");
        let app = AppDefinition::load(&path).unwrap();

        assert_eq!(app.stacks.len(), 3);
        assert!(app.stacks[2].dockerfile.as_ref().unwrap().exists());
        for stack in &app.stacks {
            let props = stack.props(&app.source).unwrap();
            assert!(props.path.join("packages").join(&stack.package_name).exists());
        }
    }
}
