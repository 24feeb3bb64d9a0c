// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use figment::Figment;
use serde::de::DeserializeOwned;

/// Boxed error returned when loading or validating a section
pub type ConfigError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Trait implemented by all configuration sections, to load them from the
/// merged config files and environment.
pub trait ConfigurationSection: Sized + DeserializeOwned {
    /// Where this section lives relative to the root, `None` for the root
    /// itself.
    const PATH: Option<&'static str> = None;

    /// Check the values beyond what deserialization enforces
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    fn validate(&self, _figment: &Figment) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Extract and validate the section.
    ///
    /// # Errors
    ///
    /// Returns an error if the section is missing, malformed or invalid
    fn extract(figment: &Figment) -> Result<Self, ConfigError> {
        let this: Self = match Self::PATH {
            Some(path) => figment.extract_inner(path)?,
            None => figment.extract()?,
        };

        this.validate(figment)?;
        Ok(this)
    }
}

/// Extension of [`ConfigurationSection`] for sections which are entirely
/// optional.
pub trait ConfigurationSectionExt: ConfigurationSection + Default {
    /// Extract the section, falling back to its default value when it is
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the section is present but invalid
    fn extract_or_default(figment: &Figment) -> Result<Self, ConfigError> {
        match Self::PATH {
            Some(path) if !figment.contains(path) => Ok(Self::default()),
            _ => Self::extract(figment),
        }
    }
}

impl<T: ConfigurationSection + Default> ConfigurationSectionExt for T {}
