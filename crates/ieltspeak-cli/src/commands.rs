//! Subcommand definitions.

use clap::{Args, Subcommand};
use ieltspeak_core::settings::{ENV_ADVANCE_DELAY_MS, ENV_DUPLEX_AUDIO};
use ieltspeak_core::{Category, PracticeSelection};

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the practice questions of one part
    Questions {
        /// Test part: PART1, PART2 or PART3
        #[arg(short, long, default_value = "PART1")]
        category: Category,
    },

    /// List the topics of one part
    Topics {
        /// Test part: PART1, PART2 or PART3
        #[arg(short, long, default_value = "PART1")]
        category: Category,
    },

    /// Show a single question by id
    Question {
        /// Question id as returned by the service
        id: String,
    },

    /// Print practice tips and the parts of the test
    Tips,

    /// Run a spoken practice session
    Practice(PracticeArgs),
}

/// Arguments of `ieltspeak practice`.
#[derive(Debug, Clone, Args)]
pub struct PracticeArgs {
    /// Test part to practise, or `full` for the whole test
    #[arg(short, long, default_value = "PART1")]
    pub category: PracticeSelection,

    /// Use the built-in sample questions and skip speech synthesis
    #[arg(long)]
    pub offline: bool,

    /// Pause between an answer and the next question, in milliseconds
    #[arg(long, env = ENV_ADVANCE_DELAY_MS)]
    pub advance_delay_ms: Option<u64>,

    /// Keep the microphone open while questions play
    #[arg(long, env = ENV_DUPLEX_AUDIO)]
    pub duplex: bool,
}
