#[cfg(test)]
mod tests {
    use super::super::*;
    use clap::Parser;

    fn package_args(args: &[&str]) -> PackageArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Plan { package, .. } => package,
            _ => panic!("expected the plan command"),
        }
    }

    #[test]
    fn test_props_from_flags() {
        let props = package_args(&[
            "uvlambda",
            "plan",
            "demo-lambda2",
            "--runtime",
            "python3.12",
            "--architecture",
            "arm_64",
        ])
        .props()
        .unwrap();

        assert_eq!(props.package_name, "demo-lambda2");
        assert_eq!(props.runtime, Some(Runtime::parse("python3.12").unwrap()));
        assert_eq!(props.architecture, Some(Architecture::Arm64));
        assert_eq!(props.path, PathBuf::from("."));
    }

    #[test]
    fn test_flag_errors_are_tagged_with_package() {
        let err = package_args(&["uvlambda", "plan", "demo-lambda1", "--architecture", "mips"])
            .props()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownArchitecture {
                package: "demo-lambda1".to_string(),
                key: "mips".to_string(),
            }
        );

        let err = package_args(&["uvlambda", "plan", "demo-lambda1", "--runtime", "python3"])
            .props()
            .unwrap_err();
        assert!(err.to_string().starts_with("[demo-lambda1] Invalid runtime 'python3'"));
    }

    fn verify_args(args: &[&str]) -> Option<Target> {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Verify {
                url,
                function,
                stack,
                via_url,
                ..
            } => verify_target(url, function, stack, via_url),
            _ => panic!("expected the verify command"),
        }
    }

    #[test]
    fn test_verify_targets() {
        assert_eq!(
            verify_args(&["uvlambda", "verify", "--stack", "Lambda1Stack", "--expect", "1"]),
            Some(Target::Stack {
                name: "Lambda1Stack".to_string(),
                via_url: false,
            })
        );
        assert_eq!(
            verify_args(&[
                "uvlambda", "verify", "--stack", "Lambda2Stack", "--via-url", "--sign", "--expect", "2",
            ]),
            Some(Target::Stack {
                name: "Lambda2Stack".to_string(),
                via_url: true,
            })
        );
        assert_eq!(
            verify_args(&["uvlambda", "verify", "--function", "Lambda1", "--expect", "1"]),
            Some(Target::Function("Lambda1".to_string()))
        );
    }

    #[test]
    fn test_verify_rejects_ambiguous_targets() {
        assert!(Cli::try_parse_from([
            "uvlambda", "verify", "--url", "https://x", "--stack", "S", "--expect", "1",
        ])
        .is_err());
        assert!(Cli::try_parse_from(["uvlambda", "verify", "--expect", "1"]).is_err());
        assert!(Cli::try_parse_from([
            "uvlambda", "verify", "--url", "https://x", "--via-url", "--expect", "1",
        ])
        .is_err());
    }
}
