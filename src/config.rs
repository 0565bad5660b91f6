use crate::scale::TickStyle;
use clap::Parser;
use std::path::PathBuf;

/// Plot a live bar chart from numbers read one per line
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Read samples from a file instead of standard input
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Do not keep the chart on screen at the end of the stream
    #[arg(long)]
    pub no_keep: bool,

    /// Label the axis with round numbers (1, 2, 5 x 10^n) instead of evenly spaced values
    #[arg(long)]
    pub nice_ticks: bool,

    /// Write diagnostics to this file (verbosity via RUST_LOG, default info)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Whether the final frame stays up until a key press.
    pub fn keep(&self) -> bool {
        !self.no_keep
    }

    pub fn tick_style(&self) -> TickStyle {
        if self.nice_ticks {
            TickStyle::Nice
        } else {
            TickStyle::Even
        }
    }
}
