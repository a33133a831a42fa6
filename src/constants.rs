/// Platform constants for bundling and image assets
pub mod platform {
    /// Operating system every function target runs on
    pub const TARGET_OS: &str = "linux";

    /// Linux AMD64 platform identifier
    pub const LINUX_AMD64: &str = "linux/amd64";

    /// Linux ARM64 platform identifier
    pub const LINUX_ARM64: &str = "linux/arm64";
}

/// Defaults for the function runtime and the bundling image
pub mod defaults {
    /// Function runtime baked into the default bundling image
    pub const RUNTIME: &str = "python3.11";

    /// Bundling image pinned by digest. The digest selects the amd64 variant,
    /// so it only supports the default runtime and architecture.
    pub const BUNDLING_IMAGE: &str = "ghcr.io/astral-sh/uv:0.5.13-python3.11-bookworm-slim@sha256:dc0c70e35f899c69cfe3674afac6186b210373d19d7ed77fd8ab1bdc45f8bf15";

    /// Root under which per-package build environments live
    pub const TMP_ROOT: &str = "/tmp";

    /// Directory that receives staged assets and the synthesized manifest
    pub const OUT_DIR: &str = "cdk.out";

    /// Label for errors in values not tied to a package, such as the
    /// `[defaults]` table of the config file
    pub const LABEL: &str = "defaults";

    /// App definition file looked up by `synth`
    pub const APP_FILE: &str = "uvlambda.toml";
}

/// Paths inside the bundling container
pub mod container {
    pub const ASSET_INPUT: &str = "/asset-input";
    pub const ASSET_OUTPUT: &str = "/asset-output";
    pub const UV_CACHE: &str = "/opt/uv-cache";
    pub const UV_CACHE_DIR_ENV: &str = "/opt/uv-cache/";
}

/// Environment variables passed to `uv sync`
pub mod env {
    pub const UV_PROJECT_ENVIRONMENT: &str = "UV_PROJECT_ENVIRONMENT";
    pub const UV_NO_INSTALLER_METADATA: &str = "UV_NO_INSTALLER_METADATA";
    pub const UV_LINK_MODE: &str = "UV_LINK_MODE";
    pub const UV_CACHE_DIR: &str = "UV_CACHE_DIR";
    pub const SOURCE_DATE_EPOCH: &str = "SOURCE_DATE_EPOCH";

    /// Pinned epoch for reproducible bytecode and archives. Zip cannot store
    /// timestamps before 1980, so zero is not usable.
    pub const REPRODUCIBLE_EPOCH: i64 = 444_444_444;
}

/// Acceptance check values
pub mod verify {
    pub const EXPECTED_STATUS: u16 = 200;
    pub const LAMBDA1_BODY: &str = "Hello from Lambda with orjson! Common value: 123";
    pub const LAMBDA2_BODY: &str = "Hello from Lambda with stdlib json and pydantic!";

    /// Stack output holding the function ARN
    pub const FUNCTION_ARN_OUTPUT: &str = "LambdaFunctionArn";

    /// Stack output holding the function URL
    pub const FUNCTION_URL_OUTPUT: &str = "LambdaFunctionUrl";

    /// Service name function URLs are signed for
    pub const SIGNING_SERVICE: &str = "lambda";
}
