/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Credentials from the shared `~/.aws/credentials` (and, for the
//! default region/profile name, `~/.aws/config`) INI files.

use crate::env_shim::{Env, Fs};
use sdk_types::provide_credentials::future;
use sdk_types::{Credentials, CredentialsError, ProvideCredentials};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileFileError {
    #[error("could not read profile file at {path}: {source}")]
    CouldNotReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("profile file contained invalid syntax at line {line}: {text}")]
    InvalidSyntax { line: usize, text: String },
    #[error("profile {0:?} not found")]
    ProfileNotFound(String),
    #[error("profile {0:?} is missing required key {1:?}")]
    MissingKey(String, &'static str),
    #[error("could not determine the home directory (neither HOME nor USERPROFILE is set)")]
    NoHomeDirectory,
}

/// A parsed view of one `[profile]` section's key/value pairs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Profile(HashMap<String, String>);

/// Parse `contents` as AWS-flavored INI: `[default]` or
/// `[profile name]` section headers, `key = value` lines, `#`/`;`
/// comments, blank lines ignored.
fn parse_ini(contents: &str) -> Result<HashMap<String, Profile>, ProfileFileError> {
    let mut profiles = HashMap::new();
    let mut current: Option<String> = None;

    for (idx, raw_line) in contents.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = header.strip_prefix("profile ").unwrap_or(header).trim().to_string();
            profiles.entry(name.clone()).or_insert_with(Profile::default);
            current = Some(name);
            continue;
        }
        let (key, value) = line.split_once('=').ok_or_else(|| ProfileFileError::InvalidSyntax {
            line: idx + 1,
            text: raw_line.to_string(),
        })?;
        let profile_name = current.clone().unwrap_or_else(|| "default".to_string());
        profiles
            .entry(profile_name)
            .or_insert_with(Profile::default)
            .0
            .insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(profiles)
}

#[non_exhaustive]
pub struct ProfileFileCredentialsProvider {
    env: Env,
    fs: Fs,
    contents: Option<String>,
    profile_override: Option<String>,
}

impl Default for ProfileFileCredentialsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileFileCredentialsProvider {
    pub fn new() -> Self {
        ProfileFileCredentialsProvider {
            env: Env::real(),
            fs: Fs::real(),
            contents: None,
            profile_override: None,
        }
    }

    /// Construct a provider over in-memory file contents, bypassing
    /// the real filesystem — used by tests and by callers who have
    /// already loaded the file themselves.
    pub fn from_contents(contents: impl Into<String>) -> Self {
        ProfileFileCredentialsProvider {
            env: Env::real(),
            fs: Fs::real(),
            contents: Some(contents.into()),
            profile_override: None,
        }
    }

    pub fn profile_name(mut self, name: impl Into<String>) -> Self {
        self.profile_override = Some(name.into());
        self
    }

    fn active_profile_name(&self) -> String {
        self.profile_override
            .clone()
            .or_else(|| self.env.get("AWS_PROFILE").ok())
            .unwrap_or_else(|| "default".to_string())
    }

    /// `~/.aws/credentials`, unless overridden by
    /// `AWS_SHARED_CREDENTIALS_FILE`.
    fn credentials_file_path(&self) -> Result<String, ProfileFileError> {
        if let Ok(path) = self.env.get("AWS_SHARED_CREDENTIALS_FILE") {
            return Ok(path);
        }
        let home = self
            .env
            .get("HOME")
            .or_else(|_| self.env.get("USERPROFILE"))
            .map_err(|_| ProfileFileError::NoHomeDirectory)?;
        Ok(format!("{home}/.aws/credentials"))
    }

    fn load_profile(&self) -> sdk_types::provide_credentials::Result {
        let contents = match &self.contents {
            Some(contents) => contents.clone(),
            None => {
                let path = self.credentials_file_path().map_err(|e| CredentialsError::InvalidConfiguration(Box::new(e)))?;
                self.fs.read_to_string(&path).map_err(|source| {
                    if source.kind() == std::io::ErrorKind::NotFound {
                        CredentialsError::CredentialsNotLoaded
                    } else {
                        CredentialsError::ProviderError(Box::new(ProfileFileError::CouldNotReadFile { path, source }))
                    }
                })?
            }
        };
        let profiles = parse_ini(&contents)
            .map_err(|e| CredentialsError::InvalidConfiguration(Box::new(e)))?;
        let name = self.active_profile_name();
        let profile = profiles
            .get(&name)
            .ok_or_else(|| CredentialsError::InvalidConfiguration(Box::new(ProfileFileError::ProfileNotFound(name.clone()))))?;

        let get = |key: &'static str| -> Result<String, ProfileFileError> {
            profile
                .0
                .get(key)
                .cloned()
                .ok_or_else(|| ProfileFileError::MissingKey(name.clone(), key))
        };
        let access_key = get("aws_access_key_id")
            .map_err(|e| CredentialsError::InvalidConfiguration(Box::new(e)))?;
        let secret_key = get("aws_secret_access_key")
            .map_err(|e| CredentialsError::InvalidConfiguration(Box::new(e)))?;
        let session_token = profile.0.get("aws_session_token").cloned();

        Ok(Credentials::new(access_key, secret_key, session_token, None, "ProfileFile"))
    }
}

impl ProvideCredentials for ProfileFileCredentialsProvider {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        future::ProvideCredentials::ready(self.load_profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[default]
aws_access_key_id = AKIDEXAMPLE
aws_secret_access_key = secretvalue

[profile other]
aws_access_key_id = AKIDOTHER
aws_secret_access_key = othersecret
aws_session_token = othertoken
";

    #[tokio::test]
    async fn reads_default_profile() {
        let provider = ProfileFileCredentialsProvider::from_contents(SAMPLE);
        let creds = provider.provide_credentials().await.unwrap();
        assert_eq!(creds.access_key_id(), "AKIDEXAMPLE");
    }

    #[tokio::test]
    async fn reads_from_home_relative_default_path() {
        let env = Env::from_slice(&[("HOME", "/Users/me")]);
        let fs = Fs::from_map(HashMap::from([("/Users/me/.aws/credentials".to_string(), SAMPLE.to_string())]));
        let provider = ProfileFileCredentialsProvider { env, fs, contents: None, profile_override: None };
        let creds = provider.provide_credentials().await.unwrap();
        assert_eq!(creds.access_key_id(), "AKIDEXAMPLE");
    }

    #[tokio::test]
    async fn honors_shared_credentials_file_override() {
        let env = Env::from_slice(&[("AWS_SHARED_CREDENTIALS_FILE", "/opt/custom-creds")]);
        let fs = Fs::from_map(HashMap::from([("/opt/custom-creds".to_string(), SAMPLE.to_string())]));
        let provider = ProfileFileCredentialsProvider { env, fs, contents: None, profile_override: None };
        let creds = provider.provide_credentials().await.unwrap();
        assert_eq!(creds.access_key_id(), "AKIDEXAMPLE");
    }

    #[tokio::test]
    async fn missing_file_is_not_loaded_rather_than_an_error() {
        let env = Env::from_slice(&[("HOME", "/Users/me")]);
        let provider = ProfileFileCredentialsProvider { env, fs: Fs::from_map(HashMap::new()), contents: None, profile_override: None };
        assert!(matches!(
            provider.provide_credentials().await.unwrap_err(),
            CredentialsError::CredentialsNotLoaded
        ));
    }

    #[tokio::test]
    async fn reads_named_profile_section() {
        let provider = ProfileFileCredentialsProvider::from_contents(SAMPLE).profile_name("other");
        let creds = provider.provide_credentials().await.unwrap();
        assert_eq!(creds.access_key_id(), "AKIDOTHER");
        assert_eq!(creds.session_token(), Some("othertoken"));
    }

    #[tokio::test]
    async fn missing_profile_is_invalid_configuration() {
        let provider = ProfileFileCredentialsProvider::from_contents(SAMPLE).profile_name("nonexistent");
        assert!(matches!(
            provider.provide_credentials().await.unwrap_err(),
            CredentialsError::InvalidConfiguration(_)
        ));
    }
}
