// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use figment::Figment;
use tokio::io::AsyncWriteExt;
use tracing::{info, info_span};

#[derive(Parser, Debug)]
pub(super) struct Options {
    #[command(subcommand)]
    subcommand: Subcommand,
}

#[derive(Parser, Debug)]
enum Subcommand {
    /// Dump the current config as YAML
    Dump {
        /// The path to the config file to dump
        ///
        /// If not specified, the config will be written to stdout
        #[clap(short, long)]
        output: Option<Utf8PathBuf>,
    },

    /// Check a config file
    Check,

    /// Print the JSON schema of the config file
    Schema {
        /// The path to the schema file to write
        ///
        /// If not specified, the schema will be written to stdout
        #[clap(short, long)]
        output: Option<Utf8PathBuf>,
    },
}

impl Options {
    pub async fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        use Subcommand as SC;
        match self.subcommand {
            SC::Dump { output } => {
                let _span = info_span!("cli.config.dump").entered();

                let config = super::load_config(figment)?;
                let config = serde_yaml::to_string(&config)?;

                write_output(output, config.as_bytes()).await?;
            }

            SC::Check => {
                let _span = info_span!("cli.config.check").entered();

                let _config = super::load_config(figment)?;
                info!("Configuration file looks good");
            }

            SC::Schema { output } => {
                let _span = info_span!("cli.config.schema").entered();

                let schema = sso_config::schema();
                let mut schema = serde_json::to_string_pretty(&schema)?;
                schema.push('\n');

                write_output(output, schema.as_bytes()).await?;
            }
        }

        Ok(ExitCode::SUCCESS)
    }
}

async fn write_output(output: Option<Utf8PathBuf>, contents: &[u8]) -> anyhow::Result<()> {
    if let Some(output) = output {
        info!("Writing to {output:?}");
        let mut file = tokio::fs::File::create(output).await?;
        file.write_all(contents).await?;
    } else {
        info!("Writing to standard output");
        let mut stdout = tokio::io::stdout();
        stdout.write_all(contents).await?;
        stdout.flush().await?;
    }

    Ok(())
}
