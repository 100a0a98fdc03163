use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use edof::{Decoder, Encoder, OutputLayout};
use tracing::{error, info, warn};

use crate::cli::Cli;

/// Per-file extraction settings shared across a batch.
#[derive(Debug, Clone)]
pub struct Extractor {
    decoder: Decoder,
    out_dir: Option<PathBuf>,
    all_segments: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub succeeded: usize,
    pub failed: usize,
}

impl Extractor {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            decoder: Decoder::with_config(cli.scan_config()),
            out_dir: cli.out_dir.clone(),
            all_segments: cli.all_segments,
        }
    }

    /// Decode `input` and write its primary image and depth map. Nothing is
    /// written unless decoding succeeds.
    pub fn run(&self, input: &Path) -> Result<Vec<PathBuf>> {
        info!("Processing: {}", input.display());
        let extraction = self
            .decoder
            .decode_file(input)
            .with_context(|| format!("Failed to extract {}", input.display()))?;

        let layout = OutputLayout::for_input(input, self.out_dir.as_deref());
        let written = Encoder::new(layout)
            .with_all_segments(self.all_segments)
            .write(&extraction)
            .with_context(|| format!("Failed to write outputs for {}", input.display()))?;
        Ok(written)
    }

    /// Process every input; failures are logged and counted, never fatal.
    pub fn run_batch(&self, inputs: &[PathBuf]) -> Summary {
        #[cfg(feature = "rayon")]
        let outcomes: Vec<bool> = {
            use rayon::prelude::*;
            inputs.par_iter().map(|input| self.report(input)).collect()
        };
        #[cfg(not(feature = "rayon"))]
        let outcomes: Vec<bool> = inputs.iter().map(|input| self.report(input)).collect();

        let succeeded = outcomes.iter().filter(|ok| **ok).count();
        Summary {
            succeeded,
            failed: outcomes.len() - succeeded,
        }
    }

    fn report(&self, input: &Path) -> bool {
        match self.run(input) {
            Ok(written) => {
                info!("Extracted {} file(s) from {}", written.len(), input.display());
                true
            }
            Err(err) => {
                let format_error = err
                    .downcast_ref::<edof::Error>()
                    .is_some_and(edof::Error::is_format_error);
                if format_error {
                    warn!("{err:#}");
                } else {
                    error!("{err:#}");
                }
                false
            }
        }
    }
}
