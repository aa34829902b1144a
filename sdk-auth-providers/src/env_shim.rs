/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Injectable views of the process environment and file system, so
//! provider tests never read (or need to mutate) real process state.

use std::collections::HashMap;
use std::env::VarError;
use std::io;
use std::sync::Arc;

#[derive(Clone)]
pub struct Env(Arc<EnvInner>);

enum EnvInner {
    Real,
    Fake(HashMap<String, String>),
}

impl Default for Env {
    fn default() -> Self {
        Env::real()
    }
}

impl Env {
    pub fn real() -> Self {
        Env(Arc::new(EnvInner::Real))
    }

    pub fn from_slice(vars: &[(&str, &str)]) -> Self {
        Env(Arc::new(EnvInner::Fake(
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        )))
    }

    pub fn get(&self, name: &str) -> Result<String, VarError> {
        match &*self.0 {
            EnvInner::Real => std::env::var(name),
            EnvInner::Fake(vars) => vars.get(name).cloned().ok_or(VarError::NotPresent),
        }
    }
}

/// An injectable view of the file system, so the profile-file provider
/// can be tested against in-memory file contents instead of `~/.aws`.
#[derive(Clone)]
pub struct Fs(Arc<FsInner>);

enum FsInner {
    Real,
    Fake(HashMap<String, String>),
}

impl Default for Fs {
    fn default() -> Self {
        Fs::real()
    }
}

impl Fs {
    pub fn real() -> Self {
        Fs(Arc::new(FsInner::Real))
    }

    pub fn from_map(files: HashMap<String, String>) -> Self {
        Fs(Arc::new(FsInner::Fake(files)))
    }

    pub fn read_to_string(&self, path: &str) -> io::Result<String> {
        match &*self.0 {
            FsInner::Real => std::fs::read_to_string(path),
            FsInner::Fake(files) => files
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_env_reads_back_inserted_vars() {
        let env = Env::from_slice(&[("FOO", "BAR")]);
        assert_eq!(env.get("FOO").unwrap(), "BAR");
        assert_eq!(env.get("OTHER").unwrap_err(), VarError::NotPresent);
    }
}
