//! Acceptance checks against deployed functions
//!
//! Functions answer with a JSON-encoded string body, either through their
//! function URL or through a direct invocation. Targets can be given
//! directly or looked up from a deployed stack's outputs.

use anyhow::{Context, Result};
use aws_config::SdkConfig;
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::Credentials;
use aws_sdk_cloudformation::types::Output;
use aws_sdk_lambda::types::InvocationType;
use aws_sigv4::http_request::{
    sign, SignableBody, SignableRequest, SigningParams, SigningSettings,
};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::Request;
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::Deserialize;
use std::time::SystemTime;
use tracing::{debug, info};

use crate::constants::verify;

#[cfg(test)]
mod tests;

/// Expected response of a deployed function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    pub status: u16,
    pub body: String,
}

impl Expectation {
    pub fn new(body: &str) -> Self {
        Self {
            status: verify::EXPECTED_STATUS,
            body: body.to_string(),
        }
    }

    pub fn lambda1() -> Self {
        Self::new(verify::LAMBDA1_BODY)
    }

    pub fn lambda2() -> Self {
        Self::new(verify::LAMBDA2_BODY)
    }

    /// `1` and `2` select the demo functions, anything else is taken as the
    /// literal body
    pub fn parse(value: &str) -> Self {
        match value {
            "1" => Self::lambda1(),
            "2" => Self::lambda2(),
            body => Self::new(body),
        }
    }
}

/// What to call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A function URL
    Url(String),
    /// A function name or ARN, invoked directly
    Function(String),
    /// A deployed stack. Its `LambdaFunctionUrl` output is called when
    /// `via_url` is set, otherwise its `LambdaFunctionArn` is invoked.
    Stack { name: String, via_url: bool },
}

/// Payload returned by a direct invocation
#[derive(Debug, Deserialize)]
struct InvokePayload {
    #[serde(rename = "statusCode")]
    status_code: u16,
    body: String,
}

/// Check a function URL response. The body must decode to the expected
/// string exactly.
pub fn check_http(status: u16, body: &[u8], expected: &Expectation) -> Result<()> {
    if status != expected.status {
        anyhow::bail!(
            "Expected status {}, got {}: {}",
            expected.status,
            status,
            String::from_utf8_lossy(body)
        );
    }
    let decoded: String = serde_json::from_slice(body).with_context(|| {
        format!(
            "Response body is not a JSON string: {}",
            String::from_utf8_lossy(body)
        )
    })?;
    check_body(&decoded, expected)
}

/// Check the payload of a request-response invocation
pub fn check_invoke_payload(payload: &[u8], expected: &Expectation) -> Result<()> {
    let response: InvokePayload = serde_json::from_slice(payload).with_context(|| {
        format!(
            "Unexpected invocation payload: {}",
            String::from_utf8_lossy(payload)
        )
    })?;
    check_http(response.status_code, response.body.as_bytes(), expected)
}

fn check_body(actual: &str, expected: &Expectation) -> Result<()> {
    if actual != expected.body {
        anyhow::bail!("Expected body {:?}, got {:?}", expected.body, actual);
    }
    Ok(())
}

/// Resolve `target`, call it and check the response. Returns the URL or
/// function that was called.
pub async fn run(
    target: &Target,
    sign_requests: bool,
    region: Option<String>,
    expected: &Expectation,
) -> Result<String> {
    let needs_aws = sign_requests || !matches!(target, Target::Url(_));
    let config = if needs_aws {
        Some(load_aws_config(region).await)
    } else {
        None
    };

    let (called, via_url) = match (target, &config) {
        (Target::Url(url), _) => (url.clone(), true),
        (Target::Function(function), _) => (function.clone(), false),
        (Target::Stack { name, via_url }, Some(config)) => {
            let key = if *via_url {
                verify::FUNCTION_URL_OUTPUT
            } else {
                verify::FUNCTION_ARN_OUTPUT
            };
            (stack_output(config, name, key).await?, *via_url)
        }
        (Target::Stack { .. }, None) => anyhow::bail!("Stack lookup needs AWS configuration"),
    };

    if via_url {
        let headers = match (&config, sign_requests) {
            (Some(config), true) => signed_headers(config, &called).await?,
            _ => Vec::new(),
        };
        let (status, body) = http_get(&called, &headers).await?;
        check_http(status, &body, expected)?;
    } else {
        let config = config.context("Direct invocation needs AWS configuration")?;
        let payload = invoke_function(&config, &called).await?;
        check_invoke_payload(&payload, expected)?;
    }

    Ok(called)
}

/// AWS settings from the default provider chain, optionally pinned to a
/// region
pub async fn load_aws_config(region: Option<String>) -> SdkConfig {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(aws_config::Region::new(region));
    }
    loader.load().await
}

/// Value of the output named `key` among a stack's outputs
pub fn find_output<'a>(outputs: &'a [Output], key: &str) -> Option<&'a str> {
    outputs
        .iter()
        .find(|output| output.output_key() == Some(key))
        .and_then(|output| output.output_value())
}

/// Read one output of a deployed stack
pub async fn stack_output(config: &SdkConfig, stack: &str, key: &str) -> Result<String> {
    let client = aws_sdk_cloudformation::Client::new(config);

    info!("Looking up {} of stack {}", key, stack);
    let response = client
        .describe_stacks()
        .stack_name(stack)
        .send()
        .await
        .with_context(|| format!("Failed to describe stack {}", stack))?;

    let stack_info = response
        .stacks()
        .first()
        .with_context(|| format!("Stack {} not found", stack))?;
    let value = find_output(stack_info.outputs(), key)
        .with_context(|| format!("Stack {} has no {} output", stack, key))?;
    Ok(value.to_string())
}

/// SigV4 headers for a GET of `url` on behalf of `credentials`
pub fn sign_get(
    url: &str,
    credentials: Credentials,
    region: &str,
    time: SystemTime,
) -> Result<Vec<(String, String)>> {
    let identity: Identity = credentials.into();
    let params: SigningParams<'_> = v4::SigningParams::builder()
        .identity(&identity)
        .region(region)
        .name(verify::SIGNING_SERVICE)
        .time(time)
        .settings(SigningSettings::default())
        .build()
        .context("Invalid signing parameters")?
        .into();

    let request = SignableRequest::new("GET", url, std::iter::empty(), SignableBody::Bytes(&[]))
        .with_context(|| format!("Cannot sign request to {}", url))?;
    let (instructions, _signature) = sign(request, &params)
        .with_context(|| format!("Failed to sign request to {}", url))?
        .into_parts();

    Ok(instructions
        .headers()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect())
}

async fn signed_headers(config: &SdkConfig, url: &str) -> Result<Vec<(String, String)>> {
    let credentials = config
        .credentials_provider()
        .context("No AWS credentials configured")?
        .provide_credentials()
        .await
        .context("Failed to load AWS credentials")?;
    let region = config
        .region()
        .context("No AWS region configured, pass --region")?;

    debug!("Signing request to {} for {}", url, region);
    sign_get(url, credentials, region.as_ref(), SystemTime::now())
}

/// GET a function URL with extra `headers`, returning status and body
pub async fn http_get(url: &str, headers: &[(String, String)]) -> Result<(u16, Vec<u8>)> {
    let mut request = Request::get(url);
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }
    let request = request
        .body(Empty::<Bytes>::new())
        .with_context(|| format!("Invalid function URL: {}", url))?;

    let client: Client<_, Empty<Bytes>> =
        Client::builder(TokioExecutor::new()).build(HttpsConnector::new());

    info!("Calling {}", url);
    let response = client
        .request(request)
        .await
        .with_context(|| format!("Request to {} failed", url))?;
    let status = response.status().as_u16();
    let body = response
        .into_body()
        .collect()
        .await
        .context("Failed to read response body")?
        .to_bytes();

    debug!("Response {}: {}", status, String::from_utf8_lossy(&body));
    Ok((status, body.to_vec()))
}

/// Invoke a function synchronously and return its payload
pub async fn invoke_function(config: &SdkConfig, function: &str) -> Result<Vec<u8>> {
    let client = aws_sdk_lambda::Client::new(config);

    info!("Invoking {}", function);
    let output = client
        .invoke()
        .function_name(function)
        .invocation_type(InvocationType::RequestResponse)
        .send()
        .await
        .with_context(|| format!("Failed to invoke {}", function))?;

    if let Some(error) = output.function_error() {
        anyhow::bail!("Function {} raised {}", function, error);
    }

    let payload = output
        .payload()
        .map(|blob| blob.as_ref().to_vec())
        .unwrap_or_default();
    debug!("Payload: {}", String::from_utf8_lossy(&payload));
    Ok(payload)
}
