#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_expectations() {
        assert_eq!(
            Expectation::parse("1").body,
            "Hello from Lambda with orjson! Common value: 123"
        );
        assert_eq!(
            Expectation::parse("2").body,
            "Hello from Lambda with stdlib json and pydantic!"
        );
        assert_eq!(Expectation::parse("custom").body, "custom");
        assert_eq!(Expectation::lambda1().status, 200);
    }

    #[test]
    fn test_check_http_accepts_exact_body() {
        let body = br#""Hello from Lambda with orjson! Common value: 123""#;
        assert!(check_http(200, body, &Expectation::lambda1()).is_ok());
    }

    #[test]
    fn test_check_http_rejects_other_status() {
        let body = br#""Hello from Lambda with orjson! Common value: 123""#;
        let err = check_http(403, body, &Expectation::lambda1()).unwrap_err();
        assert!(err.to_string().contains("Expected status 200, got 403"));
    }

    #[test]
    fn test_check_http_rejects_other_body() {
        // Older deployments answered with a different common value
        let body = br#""Hello from Lambda with orjson! Common value: 42""#;
        assert!(check_http(200, body, &Expectation::lambda1()).is_err());

        // Unencoded text is not accepted
        let raw = b"Hello from Lambda with orjson! Common value: 123";
        assert!(check_http(200, raw, &Expectation::lambda1()).is_err());
    }

    #[test]
    fn test_check_invoke_payload() {
        let payload = serde_json::json!({
            "statusCode": 200,
            "body": "\"Hello from Lambda with stdlib json and pydantic!\"",
        });
        let bytes = serde_json::to_vec(&payload).unwrap();
        assert!(check_invoke_payload(&bytes, &Expectation::lambda2()).is_ok());
        assert!(check_invoke_payload(&bytes, &Expectation::lambda1()).is_err());
    }

    #[test]
    fn test_check_invoke_payload_malformed() {
        let err = check_invoke_payload(b"{\"errorMessage\": \"boom\"}", &Expectation::lambda2())
            .unwrap_err();
        assert!(err.to_string().contains("Unexpected invocation payload"));
    }

    fn output(key: &str, value: &str) -> Output {
        Output::builder().output_key(key).output_value(value).build()
    }

    #[test]
    fn test_find_output() {
        let outputs = vec![
            output("LambdaFunctionUrl", "https://abc.lambda-url.eu-central-1.on.aws/"),
            output("LambdaFunctionArn", "arn:aws:lambda:eu-central-1:123:function:Lambda1"),
        ];

        assert_eq!(
            find_output(&outputs, verify::FUNCTION_ARN_OUTPUT),
            Some("arn:aws:lambda:eu-central-1:123:function:Lambda1")
        );
        assert_eq!(
            find_output(&outputs, verify::FUNCTION_URL_OUTPUT),
            Some("https://abc.lambda-url.eu-central-1.on.aws/")
        );
        assert_eq!(find_output(&outputs, "Missing"), None);
        assert_eq!(find_output(&[], verify::FUNCTION_ARN_OUTPUT), None);
    }

    #[test]
    fn test_sign_get() {
        let credentials = || Credentials::new("AKIDEXAMPLE", "secret", None, None, "test");
        // 2015-08-30T12:36:00Z
        let time = std::time::UNIX_EPOCH + std::time::Duration::from_secs(1_440_938_160);
        let url = "https://abc.lambda-url.eu-central-1.on.aws/";

        let headers = sign_get(url, credentials(), "eu-central-1", time).unwrap();
        let header = |name: &str| {
            headers
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
                .unwrap()
        };

        assert_eq!(header("x-amz-date"), "20150830T123600Z");
        assert!(header("authorization").starts_with(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/eu-central-1/lambda/aws4_request"
        ));
        assert_eq!(
            headers,
            sign_get(url, credentials(), "eu-central-1", time).unwrap()
        );
    }

    #[test]
    fn test_sign_get_with_session_token() {
        let credentials = Credentials::new(
            "AKIDEXAMPLE",
            "secret",
            Some("session".to_string()),
            None,
            "test",
        );
        let headers = sign_get(
            "https://abc.lambda-url.eu-central-1.on.aws/",
            credentials,
            "eu-central-1",
            std::time::SystemTime::now(),
        )
        .unwrap();
        assert!(headers
            .iter()
            .any(|(name, value)| name == "x-amz-security-token" && value == "session"));
    }
}
