//! Encoder command synthesis and execution

pub mod command;
pub mod monitor;
pub mod progress;

pub use command::{CommandBuilder, ConvertSpec, EncoderCommand};
pub use monitor::ProgressMonitor;
pub use progress::{
    ConsoleProgressCallback, JsonProgressCallback, NoOpProgressCallback, ProgressCallback,
    ProgressUpdate,
};
