//! Fakes for the host and process seams

use crate::bundler::{HostProbe, ProcessOutput, ProcessRunner};
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

pub struct FakeHost {
    pub os: String,
    pub machine: String,
    pub tmp_is_symlink: bool,
}

impl FakeHost {
    pub fn linux(machine: &str) -> Self {
        Self {
            os: "linux".to_string(),
            machine: machine.to_string(),
            tmp_is_symlink: false,
        }
    }
}

impl HostProbe for FakeHost {
    fn os(&self) -> String {
        self.os.clone()
    }

    fn machine(&self) -> String {
        self.machine.clone()
    }

    fn is_symlink(&self, _path: &Path) -> bool {
        self.tmp_is_symlink
    }
}

pub type Handler = Box<dyn Fn(&[String]) -> Result<ProcessOutput> + Send + Sync>;

/// Records every command and answers with `handler`
pub struct FakeRunner {
    pub calls: Mutex<Vec<(Vec<String>, BTreeMap<String, String>)>>,
    handler: Handler,
}

impl FakeRunner {
    pub fn new(handler: impl Fn(&[String]) -> Result<ProcessOutput> + Send + Sync + 'static) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(|_| Ok(ProcessOutput::default()))
    }

    pub fn failing(message: &'static str) -> Self {
        Self::new(move |_| Err(anyhow::anyhow!(message)))
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(args, _)| args[0].clone())
            .collect()
    }
}

impl ProcessRunner for FakeRunner {
    fn run(
        &self,
        args: &[String],
        env: &BTreeMap<String, String>,
        _cwd: Option<&Path>,
    ) -> Result<ProcessOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((args.to_vec(), env.clone()));
        (self.handler)(args)
    }
}
